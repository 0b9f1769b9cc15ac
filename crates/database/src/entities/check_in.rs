//! Check-in entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::EntityKind;
use crate::record::{Fetched, Record};
use crate::types::{StoreError, StoreResult};

/// An attendance event. `member_id` is a plain reference: deleting the member
/// leaves the check-in in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: String,
    pub member_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type", default)]
    pub kind: CheckInType,
    pub method: CheckInMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCheckInRequest {
    pub member_id: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub method: Option<CheckInMethod>,
}

impl CreateCheckInRequest {
    pub fn new(member_id: impl Into<String>, method: CheckInMethod) -> Self {
        Self {
            member_id: member_id.into(),
            timestamp: None,
            method: Some(method),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateCheckInRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<CheckInMethod>,
}

/// Event type tag. Check-ins are the only attendance event recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckInType {
    #[default]
    #[serde(rename = "checkin")]
    CheckIn,
}

/// How the member was identified at the desk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckInMethod {
    #[default]
    Manual,
    Qr,
}

impl CheckInMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckInMethod::Manual => "manual",
            CheckInMethod::Qr => "qr",
        }
    }
}

impl fmt::Display for CheckInMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Record for CheckIn {
    const KIND: EntityKind = EntityKind::CheckIn;
    type Create = CreateCheckInRequest;
    type Update = UpdateCheckInRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn draft(request: CreateCheckInRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            member_id: request.member_id.trim().to_string(),
            timestamp: request.timestamp.unwrap_or(now),
            kind: CheckInType::CheckIn,
            method: request.method.unwrap_or_default(),
        }
    }

    fn merge(&mut self, update: &UpdateCheckInRequest) {
        if let Some(ref member_id) = update.member_id {
            self.member_id = member_id.trim().to_string();
        }
        if let Some(timestamp) = update.timestamp {
            self.timestamp = timestamp;
        }
        if let Some(method) = update.method {
            self.method = method;
        }
    }

    fn validate(&self) -> StoreResult<()> {
        if self.member_id.is_empty() {
            return Err(StoreError::Validation("check-in member id is required".to_string()));
        }
        Ok(())
    }

    // Newest first by event time, not by creation.
    fn arrange(records: &mut [Fetched<Self>]) {
        records.sort_by(|a, b| b.record.timestamp.cmp(&a.record.timestamp));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn arrange_orders_newest_first() {
        let at = |hour| Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap();
        let mut check_ins: Vec<Fetched<CheckIn>> = [9, 17, 12]
            .into_iter()
            .map(|hour| Fetched {
                created_on: at(hour),
                record: CheckIn::draft(CreateCheckInRequest::new("m1", CheckInMethod::Qr).at(at(hour)), at(0)),
            })
            .collect();
        // A late entry for an early visit still sorts by when the visit happened.
        check_ins[0].created_on = at(23);

        CheckIn::arrange(&mut check_ins);

        let hours: Vec<_> = check_ins.iter().map(|c| c.record.timestamp).collect();
        assert_eq!(hours, vec![at(17), at(12), at(9)]);
    }

    #[test]
    fn serialises_type_tag_as_checkin() {
        let check_in = CheckIn::draft(CreateCheckInRequest::new(" m7 ", CheckInMethod::Manual), Utc::now());
        let value = serde_json::to_value(&check_in).unwrap();
        assert_eq!(value["type"], "checkin");
        assert_eq!(value["method"], "manual");
        assert_eq!(value["member_id"], "m7");
    }
}
