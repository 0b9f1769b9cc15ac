//! Generic repository over a record backend.

use chrono::Utc;
use serde_json::{Map, Value};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::backends::RecordBackend;
use crate::entities::EntityKind;
use crate::projection::{project, unknown_fields};
use crate::record::{from_raw, to_fields, Fetched, Record};
use crate::types::{StoreError, StoreResult};

/// Typed CRUD access to one collection of the record store.
///
/// Cloning is cheap; clones share the backend.
pub struct Repository<R> {
    backend: Arc<dyn RecordBackend>,
    timeout: Option<Duration>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for Repository<R> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            timeout: self.timeout,
            _record: PhantomData,
        }
    }
}

impl<R: Record> Repository<R> {
    /// Create a new repository over a shared backend
    pub fn new(backend: Arc<dyn RecordBackend>) -> Self {
        Self {
            backend,
            timeout: None,
            _record: PhantomData,
        }
    }

    /// Fail any operation that takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn kind(&self) -> EntityKind {
        R::KIND
    }

    /// All records, as an owned snapshot.
    pub async fn get_all(&self) -> StoreResult<Vec<R>> {
        let raw = self
            .call("get_all", self.backend.fetch_records(R::KIND))
            .await?;

        let mut fetched = raw
            .into_iter()
            .map(Fetched::<R>::decode)
            .collect::<Result<Vec<_>, _>>()?;
        R::arrange(&mut fetched);
        let records: Vec<R> = fetched.into_iter().map(|f| f.record).collect();

        debug!(entity = %R::KIND, count = records.len(), "fetched records");
        Ok(records)
    }

    /// Find a record by id. Unknown ids are `None`, not an error.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<R>> {
        let raw = self
            .call("get_by_id", self.backend.get_record(R::KIND, id))
            .await?;
        Ok(raw.map(from_raw::<R>).transpose()?)
    }

    /// Create a record, defaulting whatever the request leaves out.
    pub async fn create(&self, request: R::Create) -> StoreResult<R> {
        let draft = R::draft(request, Utc::now());
        draft.validate()?;

        let fields = project(R::KIND, &to_fields(&draft)?);
        let raw = self
            .call("create", self.backend.create_record(R::KIND, fields))
            .await?;
        let record = from_raw::<R>(raw)?;

        info!(entity = %R::KIND, id = %record.id(), "created record");
        Ok(record)
    }

    /// Create a record from an untyped form payload. Non-whitelisted
    /// attributes are dropped before the payload is interpreted.
    pub async fn create_from_payload(&self, payload: &Map<String, Value>) -> StoreResult<R> {
        let request: R::Create = Self::interpret(payload)?;
        self.create(request).await
    }

    /// Shallow-merge `update` into the record with the given id.
    pub async fn update(&self, id: &str, update: R::Update) -> StoreResult<R> {
        let mut merged = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| StoreError::not_found(R::KIND, id))?;
        merged.merge(&update);
        merged.validate()?;

        // Forward only the attributes the update names, in their merged form.
        let changed = to_fields(&update)?;
        let fields: Map<String, Value> = project(R::KIND, &to_fields(&merged)?)
            .into_iter()
            .filter(|(field, _)| changed.contains_key(field))
            .collect();
        let raw = self
            .call("update", self.backend.update_record(R::KIND, id, fields))
            .await?
            .ok_or_else(|| StoreError::not_found(R::KIND, id))?;
        let record = from_raw::<R>(raw)?;

        info!(entity = %R::KIND, id = %id, "updated record");
        Ok(record)
    }

    /// Update from an untyped form payload.
    pub async fn update_from_payload(
        &self,
        id: &str,
        payload: &Map<String, Value>,
    ) -> StoreResult<R> {
        let update: R::Update = Self::interpret(payload)?;
        self.update(id, update).await
    }

    /// Remove a record, returning it.
    pub async fn delete(&self, id: &str) -> StoreResult<R> {
        let raw = self
            .call("delete", self.backend.delete_record(R::KIND, id))
            .await?
            .ok_or_else(|| StoreError::not_found(R::KIND, id))?;
        let record = from_raw::<R>(raw)?;

        info!(entity = %R::KIND, id = %id, "deleted record");
        Ok(record)
    }

    fn interpret<T: serde::de::DeserializeOwned>(payload: &Map<String, Value>) -> StoreResult<T> {
        let dropped = unknown_fields(R::KIND, payload);
        if !dropped.is_empty() {
            debug!(entity = %R::KIND, ?dropped, "dropping non-whitelisted attributes");
        }

        serde_json::from_value(Value::Object(project(R::KIND, payload)))
            .map_err(|e| StoreError::Validation(format!("invalid {} payload: {e}", R::KIND)))
    }

    async fn call<T, E, F>(&self, operation: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, E>>,
        StoreError: From<E>,
    {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, fut)
                .await
                .map_err(|_| StoreError::Timeout {
                    entity: R::KIND,
                    operation,
                    timeout,
                })?
                .map_err(StoreError::from),
            None => fut.await.map_err(StoreError::from),
        }
    }
}
