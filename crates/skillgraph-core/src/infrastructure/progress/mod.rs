//! Relational progress store

mod repository;

pub use repository::PgProgressRepository;
