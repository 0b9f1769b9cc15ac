//! Database repository implementations

pub mod record_repository;

pub use record_repository::Repository;
