//! gymdesk database crate
//!
//! Entities, field projection, record backends and the generic entity
//! repository used by the gym dashboard services.

use gymdesk_config::DatabaseConfig;

pub mod backends;
pub mod connection;
pub mod entities;
pub mod fixtures;
pub mod migrations;
pub mod projection;
pub mod record;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

pub use backends::{MemoryBackend, RawRecord, RecordBackend, SqliteBackend};
pub use fixtures::{Fixtures, SeedReport};
pub use record::{Fetched, Record};
pub use repos::Repository;

// Re-export entities
pub use entities::{
    check_in::{CheckIn, CheckInMethod, CheckInType, CreateCheckInRequest, UpdateCheckInRequest},
    class::{CreateClassRequest, DayOfWeek, GymClass, UpdateClassRequest},
    equipment::{
        CreateEquipmentRequest, Equipment, EquipmentCategory, EquipmentStatus,
        UpdateEquipmentRequest,
    },
    kind::EntityKind,
    member::{CreateMemberRequest, Member, MemberStatus, MembershipType, UpdateMemberRequest},
};

// Re-export types
pub use types::{
    errors::{DatabaseError, StoreError},
    DatabaseResult, StoreResult,
};

/// Re-export commonly used types for convenience
pub use sqlx::SqlitePool;

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_database() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let config = DatabaseConfig {
            url: db_url,
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();
        (pool, temp_dir)
    }

    #[tokio::test]
    async fn test_database_initialization() {
        let (pool, _temp_dir) = create_test_database().await;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM records")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let (pool, _temp_dir) = create_test_database().await;

        let result: (bool,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert!(result.0);
    }
}
