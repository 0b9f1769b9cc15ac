//! Fixture data for seeding a fresh record store.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::backends::RecordBackend;
use crate::entities::{CheckIn, Equipment, GymClass, Member};
use crate::record::Record;
use crate::repos::Repository;
use crate::types::{DatabaseError, DatabaseResult, StoreResult};

const BUNDLED_FIXTURES: &str = include_str!("../fixtures/gym.json");

/// Raw fixture payloads per collection, shaped like form submissions.
///
/// Member payloads may carry an `id`; check-ins referring to that id are
/// re-pointed at the id the record store assigns during seeding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub members: Vec<Map<String, Value>>,
    #[serde(default)]
    pub equipment: Vec<Map<String, Value>>,
    #[serde(default)]
    pub classes: Vec<Map<String, Value>>,
    #[serde(default)]
    pub check_ins: Vec<Map<String, Value>>,
}

/// Number of records written per collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub members: usize,
    pub equipment: usize,
    pub classes: usize,
    pub check_ins: usize,
}

impl Fixtures {
    /// The fixture set shipped with the crate.
    pub fn bundled() -> DatabaseResult<Self> {
        Self::from_json(BUNDLED_FIXTURES)
    }

    pub fn from_json(json: &str) -> DatabaseResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DatabaseError::SerializationError(format!("invalid fixtures: {e}")))
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
            && self.equipment.is_empty()
            && self.classes.is_empty()
            && self.check_ins.is_empty()
    }

    /// Write every fixture through the regular create path.
    pub async fn seed(&self, backend: Arc<dyn RecordBackend>) -> StoreResult<SeedReport> {
        let members = Repository::<Member>::new(Arc::clone(&backend));
        let equipment = Repository::<Equipment>::new(Arc::clone(&backend));
        let classes = Repository::<GymClass>::new(Arc::clone(&backend));
        let check_ins = Repository::<CheckIn>::new(backend);

        let mut report = SeedReport::default();
        let mut member_ids = HashMap::new();

        for payload in &self.members {
            let member = members.create_from_payload(payload).await?;
            if let Some(fixture_id) = payload.get("id").and_then(fixture_id) {
                member_ids.insert(fixture_id, member.id().to_string());
            }
            report.members += 1;
        }

        for payload in &self.equipment {
            equipment.create_from_payload(payload).await?;
            report.equipment += 1;
        }

        for payload in &self.classes {
            classes.create_from_payload(payload).await?;
            report.classes += 1;
        }

        for payload in &self.check_ins {
            let mut payload = payload.clone();
            let referenced = payload.get("member_id").and_then(fixture_id);
            match referenced.as_ref().and_then(|id| member_ids.get(id)) {
                Some(assigned) => {
                    payload.insert("member_id".to_string(), Value::String(assigned.clone()));
                }
                None => warn!(member_id = ?referenced, "fixture check-in references an unknown member"),
            }
            check_ins.create_from_payload(&payload).await?;
            report.check_ins += 1;
        }

        info!(
            members = report.members,
            equipment = report.equipment,
            classes = report.classes,
            check_ins = report.check_ins,
            "seeded record store from fixtures"
        );
        Ok(report)
    }
}

fn fixture_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
