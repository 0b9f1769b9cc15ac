//! In-memory record backend with optional simulated network latency

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use super::{RawRecord, RecordBackend};
use crate::entities::EntityKind;
use crate::projection::ensure_whitelisted;
use crate::types::DatabaseResult;

/// Record backend that keeps every collection in process memory.
///
/// Each instance owns its collections; nothing is shared between instances.
#[derive(Default)]
pub struct MemoryBackend {
    records: RwLock<HashMap<EntityKind, Vec<RawRecord>>>,
    latency: Option<(Duration, Duration)>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every operation by a duration drawn uniformly from `min..=max`.
    ///
    /// `min` must not exceed `max`. A zero `max` disables the delay.
    pub fn with_latency(mut self, min: Duration, max: Duration) -> Self {
        debug_assert!(min <= max, "latency minimum {min:?} exceeds maximum {max:?}");
        self.latency = (max > Duration::ZERO).then_some((min.min(max), max));
        self
    }

    async fn simulate_latency(&self) {
        if let Some((min, max)) = self.latency {
            let delay = if max > min {
                rand::thread_rng().gen_range(min..=max)
            } else {
                max
            };
            debug!(delay_ms = delay.as_millis() as u64, "simulating record store latency");
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl RecordBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_records(&self, kind: EntityKind) -> DatabaseResult<Vec<RawRecord>> {
        self.simulate_latency().await;
        let records = self.records.read().await;
        Ok(records.get(&kind).cloned().unwrap_or_default())
    }

    async fn get_record(&self, kind: EntityKind, id: &str) -> DatabaseResult<Option<RawRecord>> {
        self.simulate_latency().await;
        let records = self.records.read().await;
        Ok(records
            .get(&kind)
            .and_then(|collection| collection.iter().find(|record| record.id == id))
            .cloned())
    }

    async fn create_record(
        &self,
        kind: EntityKind,
        fields: Map<String, Value>,
    ) -> DatabaseResult<RawRecord> {
        ensure_whitelisted(kind, &fields)?;
        self.simulate_latency().await;

        let now = Utc::now();
        let record = RawRecord {
            id: cuid2::cuid(),
            created_on: now,
            modified_on: now,
            fields,
        };

        let mut records = self.records.write().await;
        records.entry(kind).or_default().push(record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        kind: EntityKind,
        id: &str,
        fields: Map<String, Value>,
    ) -> DatabaseResult<Option<RawRecord>> {
        ensure_whitelisted(kind, &fields)?;
        self.simulate_latency().await;

        let mut records = self.records.write().await;
        let Some(record) = records
            .get_mut(&kind)
            .and_then(|collection| collection.iter_mut().find(|record| record.id == id))
        else {
            return Ok(None);
        };

        record.fields.extend(fields);
        record.modified_on = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete_record(&self, kind: EntityKind, id: &str) -> DatabaseResult<Option<RawRecord>> {
        self.simulate_latency().await;

        let mut records = self.records.write().await;
        let Some(collection) = records.get_mut(&kind) else {
            return Ok(None);
        };
        Ok(collection
            .iter()
            .position(|record| record.id == id)
            .map(|index| collection.remove(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn assigns_distinct_ids_and_keeps_insertion_order() {
        let backend = MemoryBackend::new();
        let mut ids = Vec::new();
        for name in ["Bench", "Rack", "Bike"] {
            let record = backend
                .create_record(EntityKind::Equipment, fields(json!({ "name": name })))
                .await
                .unwrap();
            ids.push(record.id);
        }

        let stored = backend.fetch_records(EntityKind::Equipment).await.unwrap();
        let stored_ids: Vec<_> = stored.iter().map(|r| r.id.clone()).collect();
        assert_eq!(stored_ids, ids);
        assert_ne!(ids[0], ids[1]);
        assert!(backend.fetch_records(EntityKind::Member).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn latency_stays_within_bounds() {
        let backend = MemoryBackend::new()
            .with_latency(Duration::from_millis(150), Duration::from_millis(450));

        for _ in 0..5 {
            let started = tokio::time::Instant::now();
            backend.fetch_records(EntityKind::Member).await.unwrap();
            let elapsed = started.elapsed();
            assert!(elapsed >= Duration::from_millis(150), "{elapsed:?}");
            assert!(elapsed <= Duration::from_millis(450), "{elapsed:?}");
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "latency minimum")]
    fn inverted_latency_range_is_rejected() {
        let _ = MemoryBackend::new()
            .with_latency(Duration::from_millis(450), Duration::from_millis(150));
    }

    #[tokio::test]
    async fn update_merges_shallowly() {
        let backend = MemoryBackend::new();
        let created = backend
            .create_record(
                EntityKind::Equipment,
                fields(json!({ "name": "Bench", "status": "operational" })),
            )
            .await
            .unwrap();

        let updated = backend
            .update_record(EntityKind::Equipment, &created.id, fields(json!({ "status": "broken" })))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.fields["name"], "Bench");
        assert_eq!(updated.fields["status"], "broken");
        assert_eq!(updated.created_on, created.created_on);
        assert!(backend
            .update_record(EntityKind::Equipment, "missing", Map::new())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_returns_removed_record() {
        let backend = MemoryBackend::new();
        let created = backend
            .create_record(EntityKind::Class, fields(json!({ "name": "Spin" })))
            .await
            .unwrap();

        let removed = backend.delete_record(EntityKind::Class, &created.id).await.unwrap();
        assert_eq!(removed, Some(created.clone()));
        assert!(backend.get_record(EntityKind::Class, &created.id).await.unwrap().is_none());
        assert!(backend.delete_record(EntityKind::Class, &created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_non_whitelisted_writes() {
        let backend = MemoryBackend::new();
        let result = backend
            .create_record(EntityKind::Member, fields(json!({ "email": "a@b.c", "CreatedBy": "x" })))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn latency_is_applied_within_range() {
        let backend =
            MemoryBackend::new().with_latency(Duration::from_millis(150), Duration::from_millis(450));

        let started = tokio::time::Instant::now();
        backend.fetch_records(EntityKind::Member).await.unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_millis(150), "elapsed {elapsed:?}");
        assert!(elapsed <= Duration::from_millis(460), "elapsed {elapsed:?}");
    }
}
