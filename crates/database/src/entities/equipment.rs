//! Equipment entity definitions

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::EntityKind;
use crate::record::Record;

/// Days between a maintenance and the next one when none is scheduled.
pub const MAINTENANCE_INTERVAL_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: String,
    pub name: String,
    pub category: EquipmentCategory,
    pub purchase_date: NaiveDate,
    pub last_maintenance: NaiveDate,
    pub next_maintenance: NaiveDate,
    pub status: EquipmentStatus,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub notes: String,
}

impl Equipment {
    /// Maintenance is due on or after the scheduled date.
    pub fn is_maintenance_due(&self, today: NaiveDate) -> bool {
        self.next_maintenance <= today
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateEquipmentRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<EquipmentCategory>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_maintenance: Option<NaiveDate>,
    #[serde(default)]
    pub next_maintenance: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<EquipmentStatus>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateEquipmentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EquipmentCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_maintenance: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_maintenance: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EquipmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquipmentCategory {
    #[default]
    Cardio,
    Strength,
    #[serde(rename = "Free Weights")]
    FreeWeights,
    Functional,
}

impl EquipmentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentCategory::Cardio => "Cardio",
            EquipmentCategory::Strength => "Strength",
            EquipmentCategory::FreeWeights => "Free Weights",
            EquipmentCategory::Functional => "Functional",
        }
    }
}

impl fmt::Display for EquipmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    #[default]
    Operational,
    Maintenance,
    Broken,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Operational => "operational",
            EquipmentStatus::Maintenance => "maintenance",
            EquipmentStatus::Broken => "broken",
        }
    }

    /// Under maintenance or broken.
    pub fn needs_attention(&self) -> bool {
        matches!(self, EquipmentStatus::Maintenance | EquipmentStatus::Broken)
    }
}

impl fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Record for Equipment {
    const KIND: EntityKind = EntityKind::Equipment;
    type Create = CreateEquipmentRequest;
    type Update = UpdateEquipmentRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn draft(request: CreateEquipmentRequest, now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        Self {
            id: String::new(),
            name: request.name,
            category: request.category.unwrap_or_default(),
            purchase_date: request.purchase_date.unwrap_or(today),
            last_maintenance: request.last_maintenance.unwrap_or(today),
            next_maintenance: request
                .next_maintenance
                .unwrap_or(today + Duration::days(MAINTENANCE_INTERVAL_DAYS)),
            status: request.status.unwrap_or_default(),
            location: request.location.unwrap_or_default(),
            notes: request.notes.unwrap_or_default(),
        }
    }

    fn merge(&mut self, update: &UpdateEquipmentRequest) {
        if let Some(ref name) = update.name {
            self.name = name.clone();
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(purchase_date) = update.purchase_date {
            self.purchase_date = purchase_date;
        }
        if let Some(last_maintenance) = update.last_maintenance {
            self.last_maintenance = last_maintenance;
        }
        if let Some(next_maintenance) = update.next_maintenance {
            self.next_maintenance = next_maintenance;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(ref location) = update.location {
            self.location = location.clone();
        }
        if let Some(ref notes) = update.notes {
            self.notes = notes.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn draft_schedules_next_maintenance_a_month_out() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        let equipment = Equipment::draft(
            CreateEquipmentRequest {
                name: "Rowing Machine".to_string(),
                ..Default::default()
            },
            now,
        );

        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(equipment.purchase_date, today);
        assert_eq!(equipment.last_maintenance, today);
        assert_eq!(equipment.next_maintenance, NaiveDate::from_ymd_opt(2024, 2, 14).unwrap());
        assert_eq!(equipment.category, EquipmentCategory::Cardio);
        assert_eq!(equipment.status, EquipmentStatus::Operational);

        assert!(!equipment.is_maintenance_due(today));
        assert!(equipment.is_maintenance_due(NaiveDate::from_ymd_opt(2024, 2, 14).unwrap()));
    }

    #[test]
    fn maintenance_and_broken_need_attention() {
        assert!(!EquipmentStatus::Operational.needs_attention());
        assert!(EquipmentStatus::Maintenance.needs_attention());
        assert!(EquipmentStatus::Broken.needs_attention());
        assert_eq!(
            serde_json::to_value(EquipmentCategory::FreeWeights).unwrap(),
            "Free Weights"
        );
    }
}
