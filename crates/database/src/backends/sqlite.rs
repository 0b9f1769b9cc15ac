//! SQLite-backed record store.
//!
//! All collections share the `records` table; the attribute map of each record
//! is kept as JSON text next to its system fields.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use super::{RawRecord, RecordBackend};
use crate::entities::EntityKind;
use crate::projection::ensure_whitelisted;
use crate::types::{DatabaseError, DatabaseResult};

/// Record backend persisting to SQLite
#[derive(Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Create a new backend over a migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn parse_timestamp(value: &str) -> DatabaseResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|e| DatabaseError::SerializationError(format!("invalid timestamp {value:?}: {e}")))
}

fn parse_body(body: &str) -> DatabaseResult<Map<String, Value>> {
    match serde_json::from_str(body)? {
        Value::Object(fields) => Ok(fields),
        other => Err(DatabaseError::SerializationError(format!(
            "record body is not an attribute map: {other}"
        ))),
    }
}

fn row_to_record(row: &SqliteRow) -> DatabaseResult<RawRecord> {
    let body: String = row.try_get("body")?;
    let created_on: String = row.try_get("created_on")?;
    let modified_on: String = row.try_get("modified_on")?;

    Ok(RawRecord {
        id: row.try_get("public_id")?,
        created_on: parse_timestamp(&created_on)?,
        modified_on: parse_timestamp(&modified_on)?,
        fields: parse_body(&body)?,
    })
}

#[async_trait]
impl RecordBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn fetch_records(&self, kind: EntityKind) -> DatabaseResult<Vec<RawRecord>> {
        let rows = sqlx::query(
            "SELECT public_id, body, created_on, modified_on
             FROM records WHERE entity = ? ORDER BY id ASC",
        )
        .bind(kind.table_name())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect()
    }

    async fn get_record(&self, kind: EntityKind, id: &str) -> DatabaseResult<Option<RawRecord>> {
        let row = sqlx::query(
            "SELECT public_id, body, created_on, modified_on
             FROM records WHERE entity = ? AND public_id = ?",
        )
        .bind(kind.table_name())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn create_record(
        &self,
        kind: EntityKind,
        fields: Map<String, Value>,
    ) -> DatabaseResult<RawRecord> {
        ensure_whitelisted(kind, &fields)?;

        let now = Utc::now();
        let public_id = cuid2::cuid();
        let body = serde_json::to_string(&fields)?;

        sqlx::query(
            "INSERT INTO records (public_id, entity, body, created_on, modified_on)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(kind.table_name())
        .bind(&body)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(entity = %kind, id = %public_id, "inserted record");

        Ok(RawRecord {
            id: public_id,
            created_on: now,
            modified_on: now,
            fields,
        })
    }

    async fn update_record(
        &self,
        kind: EntityKind,
        id: &str,
        fields: Map<String, Value>,
    ) -> DatabaseResult<Option<RawRecord>> {
        ensure_whitelisted(kind, &fields)?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT public_id, body, created_on, modified_on
             FROM records WHERE entity = ? AND public_id = ?",
        )
        .bind(kind.table_name())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut record = row_to_record(&row)?;
        record.fields.extend(fields);
        record.modified_on = Utc::now();

        sqlx::query("UPDATE records SET body = ?, modified_on = ? WHERE entity = ? AND public_id = ?")
            .bind(serde_json::to_string(&record.fields)?)
            .bind(record.modified_on.to_rfc3339())
            .bind(kind.table_name())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(entity = %kind, id = %id, "updated record");
        Ok(Some(record))
    }

    async fn delete_record(&self, kind: EntityKind, id: &str) -> DatabaseResult<Option<RawRecord>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT public_id, body, created_on, modified_on
             FROM records WHERE entity = ? AND public_id = ?",
        )
        .bind(kind.table_name())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let record = row_to_record(&row)?;

        sqlx::query("DELETE FROM records WHERE entity = ? AND public_id = ?")
            .bind(kind.table_name())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(entity = %kind, id = %id, "deleted record");
        Ok(Some(record))
    }
}
