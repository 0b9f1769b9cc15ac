//! Shared types and result types for the database layer

pub mod errors;

// Re-export common types
pub use errors::{DatabaseError, StoreError};

// Common result types
pub type DatabaseResult<T> = Result<T, DatabaseError>;
pub type StoreResult<T> = Result<T, StoreError>;
