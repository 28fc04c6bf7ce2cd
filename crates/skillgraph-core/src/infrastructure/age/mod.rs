//! Graph store access through Apache AGE

mod client;
pub mod cypher;

pub use client::AgeGraphClient;
