//! Free-text search and status filtering over entity collections.

use gymdesk_database::{CheckIn, Equipment, GymClass, Member};
use std::fmt;

/// The attributes the dashboard search looks at. Each path is optional; a
/// record only has to match one of them.
pub trait Searchable {
    /// `"{first} {last}"` for records that name a person.
    fn person_name(&self) -> Option<String> {
        None
    }

    fn name(&self) -> Option<&str> {
        None
    }

    fn email(&self) -> Option<&str> {
        None
    }

    fn status(&self) -> Option<&str> {
        None
    }
}

impl Searchable for Member {
    fn person_name(&self) -> Option<String> {
        (!self.first_name.is_empty()).then(|| format!("{} {}", self.first_name, self.last_name))
    }

    fn email(&self) -> Option<&str> {
        (!self.email.is_empty()).then_some(self.email.as_str())
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }
}

impl Searchable for Equipment {
    fn name(&self) -> Option<&str> {
        (!self.name.is_empty()).then_some(self.name.as_str())
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }
}

impl Searchable for GymClass {
    fn name(&self) -> Option<&str> {
        (!self.name.is_empty()).then_some(self.name.as_str())
    }
}

impl Searchable for CheckIn {}

/// Status selection of the list screens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(String),
}

impl StatusFilter {
    pub fn matches(&self, status: Option<&str>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status == Some(wanted.as_str()),
        }
    }
}

impl From<&str> for StatusFilter {
    fn from(value: &str) -> Self {
        match value.trim() {
            "" | "all" => StatusFilter::All,
            status => StatusFilter::Only(status.to_string()),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => f.write_str(status),
        }
    }
}

/// Case-insensitive substring match on name, person name or email.
pub fn matches_search<T: Searchable + ?Sized>(record: &T, search_term: &str) -> bool {
    if search_term.is_empty() {
        return true;
    }
    let needle = search_term.to_lowercase();
    let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

    record.person_name().is_some_and(|name| contains(&name))
        || record.name().is_some_and(contains)
        || record.email().is_some_and(contains)
}

/// Records matching both the search term and the status filter, in input order.
pub fn filter_records<T>(records: &[T], search_term: &str, status_filter: &StatusFilter) -> Vec<T>
where
    T: Searchable + Clone,
{
    records
        .iter()
        .filter(|record| {
            matches_search(*record, search_term) && status_filter.matches(record.status())
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use gymdesk_database::{
        CheckInMethod, CreateCheckInRequest, CreateClassRequest, EquipmentCategory,
        EquipmentStatus, MemberStatus, MembershipType, Record,
    };

    fn member(first: &str, last: &str, email: &str, status: MemberStatus) -> Member {
        Member {
            id: format!("{first}-{last}"),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            phone: String::new(),
            membership_type: MembershipType::Basic,
            status,
            join_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            notes: String::new(),
        }
    }

    fn equipment(name: &str, status: EquipmentStatus) -> Equipment {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Equipment {
            id: name.to_string(),
            name: name.to_string(),
            category: EquipmentCategory::Strength,
            purchase_date: today,
            last_maintenance: today,
            next_maintenance: today,
            status,
            location: String::new(),
            notes: String::new(),
        }
    }

    #[test]
    fn empty_filters_are_the_identity() {
        let members = vec![
            member("Jane", "Doe", "jane@example.com", MemberStatus::Active),
            member("Mike", "Chen", "mike@example.com", MemberStatus::Suspended),
            member("Ann", "Lee", "ann@example.com", MemberStatus::Inactive),
        ];
        assert_eq!(filter_records(&members, "", &StatusFilter::All), members);
    }

    #[test]
    fn search_and_status_must_both_hold() {
        let members = vec![member("Jane", "Doe", "jane@example.com", MemberStatus::Active)];

        assert_eq!(filter_records(&members, "doe", &"active".into()), members);
        assert!(filter_records(&members, "doe", &"inactive".into()).is_empty());
        assert!(filter_records(&members, "smith", &StatusFilter::All).is_empty());
    }

    #[test]
    fn search_paths_are_independent() {
        let members = vec![
            member("Jane", "Doe", "jd@example.com", MemberStatus::Active),
            member("", "Nameless", "ghost@gym.io", MemberStatus::Active),
        ];

        // Full name spans first and last name.
        assert_eq!(filter_records(&members, "JANE D", &StatusFilter::All).len(), 1);
        // Without a first name only the email path applies.
        assert!(filter_records(&members, "nameless", &StatusFilter::All).is_empty());
        assert_eq!(filter_records(&members, "GYM.IO", &StatusFilter::All).len(), 1);

        let kit = vec![
            equipment("Olympic Barbell", EquipmentStatus::Operational),
            equipment("Rowing Machine", EquipmentStatus::Broken),
        ];
        let found = filter_records(&kit, "row", &"broken".into());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Rowing Machine");
    }

    #[test]
    fn records_without_status_only_match_all() {
        let classes = vec![GymClass::draft(
            CreateClassRequest {
                name: "Spin".to_string(),
                ..Default::default()
            },
            Utc::now(),
        )];
        assert_eq!(filter_records(&classes, "spin", &StatusFilter::All).len(), 1);
        assert!(filter_records(&classes, "spin", &"active".into()).is_empty());

        let check_ins = vec![CheckIn::draft(
            CreateCheckInRequest::new("m-1", CheckInMethod::Qr),
            Utc::now(),
        )];
        assert_eq!(filter_records(&check_ins, "", &StatusFilter::All).len(), 1);
        assert!(filter_records(&check_ins, "m-1", &StatusFilter::All).is_empty());
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let none: Vec<Member> = Vec::new();
        assert!(filter_records(&none, "anything", &"active".into()).is_empty());
    }

    #[test]
    fn status_filter_parses_all() {
        assert_eq!(StatusFilter::from("all"), StatusFilter::All);
        assert_eq!(StatusFilter::from(""), StatusFilter::All);
        assert_eq!(
            StatusFilter::from("maintenance"),
            StatusFilter::Only("maintenance".to_string())
        );
        assert_eq!(StatusFilter::from("broken").to_string(), "broken");
    }
}
