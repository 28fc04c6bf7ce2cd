//! Skillgraph Core Library
//!
//! This crate turns a profession skill taxonomy stored in Apache AGE into:
//! - a nested coverage tree annotated with a user's proficiency
//! - a status report bucketing the user's skills (process, inactive, complete, gray zone)
//!
//! It also includes:
//! - Tagged-literal (agtype) decoding
//! - Pooled PostgreSQL access with AGE session setup
//! - Taxonomy import from JSON documents

pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::progress::{
        ProgressSource, SkillStatus, StatusReport, UnknownStatusPolicy, UserProgress,
        UserSkillRecord,
    };
    pub use crate::domain::taxonomy::{CoverageTree, TaxonomySource, TaxonomyWriter};
    pub use crate::error::{Error, Result};
    pub use crate::infrastructure::age::AgeGraphClient;
    pub use crate::infrastructure::progress::PgProgressRepository;
}
