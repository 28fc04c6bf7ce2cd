//! Infrastructure layer
//!
//! Contains implementations for external systems: the AGE graph store and the
//! relational progress tables.

pub mod age;
pub mod progress;
