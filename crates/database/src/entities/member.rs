//! Member entity definitions

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::EntityKind;
use crate::record::Record;
use crate::types::{StoreError, StoreResult};

/// A gym member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub membership_type: MembershipType,
    pub status: MemberStatus,
    pub join_date: NaiveDate,
    #[serde(default)]
    pub notes: String,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

/// Request for registering a new member
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub membership_type: Option<MembershipType>,
    #[serde(default)]
    pub status: Option<MemberStatus>,
    #[serde(default)]
    pub join_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request for updating an existing member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_type: Option<MembershipType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MemberStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Membership tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipType {
    #[default]
    Basic,
    Premium,
    #[serde(rename = "VIP")]
    Vip,
}

impl MembershipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipType::Basic => "Basic",
            MembershipType::Premium => "Premium",
            MembershipType::Vip => "VIP",
        }
    }
}

impl fmt::Display for MembershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Member status enum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
            MemberStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Record for Member {
    const KIND: EntityKind = EntityKind::Member;
    type Create = CreateMemberRequest;
    type Update = UpdateMemberRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn draft(request: CreateMemberRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone: request.phone.unwrap_or_default(),
            membership_type: request.membership_type.unwrap_or_default(),
            status: request.status.unwrap_or_default(),
            join_date: request.join_date.unwrap_or_else(|| now.date_naive()),
            notes: request.notes.unwrap_or_default(),
        }
    }

    fn merge(&mut self, update: &UpdateMemberRequest) {
        if let Some(ref first_name) = update.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(ref last_name) = update.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(ref email) = update.email {
            self.email = email.clone();
        }
        if let Some(ref phone) = update.phone {
            self.phone = phone.clone();
        }
        if let Some(membership_type) = update.membership_type {
            self.membership_type = membership_type;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(join_date) = update.join_date {
            self.join_date = join_date;
        }
        if let Some(ref notes) = update.notes {
            self.notes = notes.clone();
        }
    }

    fn validate(&self) -> StoreResult<()> {
        if self.email.trim().is_empty() {
            return Err(StoreError::Validation("member email is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, 18, 30, 0).unwrap()
    }

    #[test]
    fn draft_applies_defaults() {
        let member = Member::draft(
            CreateMemberRequest {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                email: "jane@example.com".to_string(),
                ..Default::default()
            },
            now(),
        );

        assert!(member.id.is_empty());
        assert_eq!(member.membership_type, MembershipType::Basic);
        assert_eq!(member.status, MemberStatus::Active);
        assert_eq!(member.join_date, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        assert_eq!(member.full_name(), "Jane Doe");
    }

    #[test]
    fn empty_email_is_rejected() {
        let member = Member::draft(
            CreateMemberRequest {
                email: "   ".to_string(),
                ..Default::default()
            },
            now(),
        );
        assert!(matches!(member.validate(), Err(StoreError::Validation(_))));
    }

    #[test]
    fn wire_names_match_the_record_store() {
        assert_eq!(serde_json::to_value(MembershipType::Vip).unwrap(), "VIP");
        assert_eq!(serde_json::to_value(MemberStatus::Suspended).unwrap(), "suspended");
    }
}
