//! Error types for the database layer

use std::time::Duration;
use thiserror::Error;

use crate::entities::EntityKind;

/// Failures of the record backend itself
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The record store refused the write, e.g. a non-whitelisted attribute.
    #[error("Write rejected: {0}")]
    RejectedWrite(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Errors surfaced by entity repositories
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} {operation} timed out after {timeout:?}")]
    Timeout {
        entity: EntityKind,
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Backend error: {0}")]
    Backend(#[from] DatabaseError),
}

impl StoreError {
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::QueryError(error.to_string())
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(error: serde_json::Error) -> Self {
        DatabaseError::SerializationError(error.to_string())
    }
}
