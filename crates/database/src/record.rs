//! The typed view over attribute-map records.
//!
//! Every entity stored by the gym implements [`Record`]. The trait carries the
//! per-kind configuration the generic [`Repository`](crate::Repository) needs:
//! which collection it lives in, how an incoming request is defaulted into a
//! full record, how a partial update is merged, and which invariants a record
//! must satisfy before it is written.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::backends::RawRecord;
use crate::entities::EntityKind;
use crate::types::{DatabaseError, DatabaseResult, StoreResult};

pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Create payload; omitted optional attributes are defaulted by [`Record::draft`].
    type Create: fmt::Debug + DeserializeOwned + Send + Sync;

    /// Partial update payload; `None` attributes keep their previous value.
    type Update: fmt::Debug + Serialize + DeserializeOwned + Send + Sync;

    fn id(&self) -> &str;

    /// Build the record a create request describes, with an empty id.
    fn draft(request: Self::Create, now: DateTime<Utc>) -> Self;

    /// Shallow merge of an update into the record. The id is never touched.
    fn merge(&mut self, update: &Self::Update);

    fn validate(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Order a freshly fetched collection. Newest created first unless
    /// overridden; equal creation instants keep the newest insert first.
    fn arrange(records: &mut [Fetched<Self>]) {
        records.reverse();
        records.sort_by(|a, b| b.created_on.cmp(&a.created_on));
    }
}

/// A decoded record together with the instant the backend created it.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<R> {
    pub created_on: DateTime<Utc>,
    pub record: R,
}

impl<R: Record> Fetched<R> {
    pub fn decode(raw: RawRecord) -> DatabaseResult<Self> {
        let created_on = raw.created_on;
        Ok(Self {
            created_on,
            record: from_raw(raw)?,
        })
    }
}

/// Serialise a value into an attribute map, dropping the `id` attribute.
pub fn to_fields<T: Serialize>(value: &T) -> DatabaseResult<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(mut fields)) => {
            fields.remove("id");
            Ok(fields)
        }
        Ok(other) => Err(DatabaseError::SerializationError(format!(
            "expected an attribute map, got {other}"
        ))),
        Err(e) => Err(DatabaseError::SerializationError(e.to_string())),
    }
}

/// Decode a stored record into its typed form.
pub fn from_raw<R: Record>(raw: RawRecord) -> DatabaseResult<R> {
    let RawRecord { id, mut fields, .. } = raw;
    fields.insert("id".to_string(), Value::String(id.clone()));
    serde_json::from_value(Value::Object(fields)).map_err(|e| {
        DatabaseError::SerializationError(format!("{} {id} could not be decoded: {e}", R::KIND))
    })
}
