//! Scheduled class entity definitions

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::EntityKind;
use crate::record::{Fetched, Record};
use crate::types::{StoreError, StoreResult};

/// A weekly recurring class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GymClass {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub instructor: String,
    pub day_of_week: DayOfWeek,
    /// `HH:MM`, 24h clock.
    pub start_time: String,
    /// Minutes.
    pub duration: u32,
    pub capacity: u32,
    #[serde(default)]
    pub enrolled: u32,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub description: String,
}

impl GymClass {
    pub fn spots_left(&self) -> u32 {
        self.capacity.saturating_sub(self.enrolled)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateClassRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub day_of_week: Option<DayOfWeek>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub enrolled: Option<u32>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateClassRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<DayOfWeek>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrolled: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Day a class runs on, serialised with its full English name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    #[default]
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// Monday first, the order schedules are displayed in.
    pub const WEEK: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True for a zero-padded 24h `HH:MM` clock time. Schedules compare start
/// times as strings, so `9:00` is rejected.
fn is_clock_time(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 5
        && bytes[2] == b':'
        && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit())
        && NaiveTime::parse_from_str(value, "%H:%M").is_ok()
}

impl Record for GymClass {
    const KIND: EntityKind = EntityKind::Class;
    type Create = CreateClassRequest;
    type Update = UpdateClassRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn draft(request: CreateClassRequest, _now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            name: request.name,
            instructor: request.instructor.unwrap_or_default(),
            day_of_week: request.day_of_week.unwrap_or_default(),
            start_time: request.start_time.unwrap_or_else(|| "09:00".to_string()),
            duration: request.duration.unwrap_or(60),
            capacity: request.capacity.unwrap_or(20),
            enrolled: request.enrolled.unwrap_or(0),
            room: request.room.unwrap_or_default(),
            description: request.description.unwrap_or_default(),
        }
    }

    fn merge(&mut self, update: &UpdateClassRequest) {
        if let Some(ref name) = update.name {
            self.name = name.clone();
        }
        if let Some(ref instructor) = update.instructor {
            self.instructor = instructor.clone();
        }
        if let Some(day_of_week) = update.day_of_week {
            self.day_of_week = day_of_week;
        }
        if let Some(ref start_time) = update.start_time {
            self.start_time = start_time.clone();
        }
        if let Some(duration) = update.duration {
            self.duration = duration;
        }
        if let Some(capacity) = update.capacity {
            self.capacity = capacity;
        }
        if let Some(enrolled) = update.enrolled {
            self.enrolled = enrolled;
        }
        if let Some(ref room) = update.room {
            self.room = room.clone();
        }
        if let Some(ref description) = update.description {
            self.description = description.clone();
        }
    }

    fn validate(&self) -> StoreResult<()> {
        if !is_clock_time(&self.start_time) {
            return Err(StoreError::Validation(format!(
                "class start time must be HH:MM, got {:?}",
                self.start_time
            )));
        }
        if self.enrolled > self.capacity {
            return Err(StoreError::Validation(format!(
                "class enrolment {} exceeds capacity {}",
                self.enrolled, self.capacity
            )));
        }
        Ok(())
    }

    // Monday first; creation order within a day.
    fn arrange(records: &mut [Fetched<Self>]) {
        records.sort_by_key(|f| f.record.day_of_week);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn yoga() -> GymClass {
        GymClass::draft(
            CreateClassRequest {
                name: "Yoga".to_string(),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn draft_uses_form_defaults() {
        let class = yoga();
        assert_eq!(class.day_of_week, DayOfWeek::Monday);
        assert_eq!(class.start_time, "09:00");
        assert_eq!(class.duration, 60);
        assert_eq!(class.capacity, 20);
        assert_eq!(class.enrolled, 0);
        assert_eq!(class.spots_left(), 20);
        assert!(class.validate().is_ok());
    }

    #[test]
    fn enrolment_cannot_exceed_capacity() {
        let mut class = yoga();
        class.merge(&UpdateClassRequest {
            enrolled: Some(21),
            ..Default::default()
        });
        assert!(matches!(class.validate(), Err(StoreError::Validation(_))));
    }

    #[test]
    fn start_time_must_be_clock_time() {
        let mut class = yoga();
        class.start_time = "9am".to_string();
        assert!(class.validate().is_err());
    }

    #[test]
    fn start_time_must_be_zero_padded() {
        let mut class = yoga();
        for bad in ["9:00", " 9:00", "09:0", "24:00", "09:60", "0900", "09:00:00"] {
            class.start_time = bad.to_string();
            assert!(
                matches!(class.validate(), Err(StoreError::Validation(_))),
                "{bad:?} should be rejected"
            );
        }
        for good in ["00:00", "09:00", "18:30", "23:59"] {
            class.start_time = good.to_string();
            assert!(class.validate().is_ok(), "{good:?} should be accepted");
        }
    }

    #[test]
    fn arrange_orders_by_weekday_then_creation() {
        let created = |minute| Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap();
        let class = |name: &str, day| GymClass {
            name: name.to_string(),
            day_of_week: day,
            ..yoga()
        };
        let mut classes = vec![
            Fetched { created_on: created(0), record: class("sun", DayOfWeek::Sunday) },
            Fetched { created_on: created(1), record: class("wed", DayOfWeek::Wednesday) },
            Fetched { created_on: created(2), record: class("mon-a", DayOfWeek::Monday) },
            Fetched { created_on: created(3), record: class("mon-b", DayOfWeek::Monday) },
        ];

        GymClass::arrange(&mut classes);

        let names: Vec<_> = classes.iter().map(|f| f.record.name.as_str()).collect();
        assert_eq!(names, vec!["mon-a", "mon-b", "wed", "sun"]);
    }

    #[test]
    fn weekday_maps_to_full_day_name() {
        assert_eq!(DayOfWeek::from(Weekday::Sun), DayOfWeek::Sunday);
        assert_eq!(serde_json::to_value(DayOfWeek::Wednesday).unwrap(), "Wednesday");
    }
}
