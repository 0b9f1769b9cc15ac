//! Entity kind tags and their per-kind record store configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four record collections kept by the gym.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Member,
    Equipment,
    Class,
    CheckIn,
}

const MEMBER_FIELDS: &[&str] = &[
    "first_name",
    "last_name",
    "email",
    "phone",
    "membership_type",
    "status",
    "join_date",
    "notes",
];

const EQUIPMENT_FIELDS: &[&str] = &[
    "name",
    "category",
    "purchase_date",
    "last_maintenance",
    "next_maintenance",
    "status",
    "location",
    "notes",
];

const CLASS_FIELDS: &[&str] = &[
    "name",
    "instructor",
    "day_of_week",
    "start_time",
    "duration",
    "capacity",
    "enrolled",
    "room",
    "description",
];

const CHECK_IN_FIELDS: &[&str] = &["member_id", "timestamp", "type", "method"];

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Member,
        EntityKind::Equipment,
        EntityKind::Class,
        EntityKind::CheckIn,
    ];

    /// Name of the collection in the record store.
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Member => "member",
            EntityKind::Equipment => "equipment",
            EntityKind::Class => "class",
            EntityKind::CheckIn => "check_in",
        }
    }

    /// Attributes a client may write. Everything else (id, created_on,
    /// modified_on) is owned by the record store.
    pub fn updateable_fields(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Member => MEMBER_FIELDS,
            EntityKind::Equipment => EQUIPMENT_FIELDS,
            EntityKind::Class => CLASS_FIELDS,
            EntityKind::CheckIn => CHECK_IN_FIELDS,
        }
    }

    pub fn is_updateable(&self, field: &str) -> bool {
        self.updateable_fields().contains(&field)
    }

    /// Plural label used by dashboards and the CLI.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Member => "members",
            EntityKind::Equipment => "equipment",
            EntityKind::Class => "classes",
            EntityKind::CheckIn => "checkins",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "member" | "members" => Ok(EntityKind::Member),
            "equipment" => Ok(EntityKind::Equipment),
            "class" | "classes" => Ok(EntityKind::Class),
            "check_in" | "checkin" | "checkins" | "check-in" | "check-ins" => {
                Ok(EntityKind::CheckIn)
            }
            other => Err(format!("unknown entity kind: {other}")),
        }
    }
}
