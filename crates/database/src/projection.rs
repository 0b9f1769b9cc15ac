//! Field projection for writes to the record store.
//!
//! The record store only accepts writes to the attributes listed in
//! [`EntityKind::updateable_fields`]. Incoming payloads (form submissions,
//! serialised requests) are projected onto that whitelist before they reach a
//! backend, and backends re-check it on every write.

use serde_json::{Map, Value};

use crate::entities::EntityKind;
use crate::types::{DatabaseError, DatabaseResult};

/// Keep only whitelisted attributes. `null` values count as absent and are
/// never forwarded.
pub fn project(kind: EntityKind, payload: &Map<String, Value>) -> Map<String, Value> {
    payload
        .iter()
        .filter(|(field, value)| kind.is_updateable(field) && !value.is_null())
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect()
}

/// Attributes [`project`] would drop because they are not whitelisted.
pub fn unknown_fields(kind: EntityKind, payload: &Map<String, Value>) -> Vec<String> {
    payload
        .keys()
        .filter(|field| !kind.is_updateable(field))
        .cloned()
        .collect()
}

/// Reject a write that carries anything outside the whitelist.
pub fn ensure_whitelisted(kind: EntityKind, fields: &Map<String, Value>) -> DatabaseResult<()> {
    let unknown = unknown_fields(kind, fields);
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(DatabaseError::RejectedWrite(format!(
            "{kind} does not accept attributes: {}",
            unknown.join(", ")
        )))
    }
}
