//! Domain layer
//!
//! Contains the taxonomy and progress models and the pure algorithms over them.

pub mod progress;
pub mod taxonomy;
