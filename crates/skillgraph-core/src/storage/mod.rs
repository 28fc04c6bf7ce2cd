//! Storage layer - pooled PostgreSQL access
//!
//! # Usage
//!
//! ```ignore
//! use skillgraph_core::storage::{Database, DatabaseConfig};
//!
//! let db = Database::connect(DatabaseConfig::with_url(url)).await?;
//! db.health_check().await?;
//! db.close().await;
//! ```

pub mod database;

pub use database::{Database, DatabaseConfig, timed};
