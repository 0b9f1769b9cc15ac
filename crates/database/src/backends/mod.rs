//! Record backends.
//!
//! A backend is the opaque record store behind the repositories: it knows
//! collections by [`EntityKind`], stores attribute maps, assigns ids and
//! system timestamps, and performs shallow-merge updates. It knows nothing
//! about the typed entities.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entities::EntityKind;
use crate::types::DatabaseResult;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

/// A stored record: system fields plus the whitelisted attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    pub created_on: DateTime<Utc>,
    pub modified_on: DateTime<Utc>,
    pub fields: Map<String, Value>,
}

#[async_trait]
pub trait RecordBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// All records of a collection in insertion order.
    async fn fetch_records(&self, kind: EntityKind) -> DatabaseResult<Vec<RawRecord>>;

    async fn get_record(&self, kind: EntityKind, id: &str) -> DatabaseResult<Option<RawRecord>>;

    /// Store a new record under a freshly assigned id.
    async fn create_record(
        &self,
        kind: EntityKind,
        fields: Map<String, Value>,
    ) -> DatabaseResult<RawRecord>;

    /// Shallow-merge `fields` into an existing record. `None` when the id is unknown.
    async fn update_record(
        &self,
        kind: EntityKind,
        id: &str,
        fields: Map<String, Value>,
    ) -> DatabaseResult<Option<RawRecord>>;

    /// Remove a record and hand it back. `None` when the id is unknown.
    async fn delete_record(&self, kind: EntityKind, id: &str) -> DatabaseResult<Option<RawRecord>>;
}
