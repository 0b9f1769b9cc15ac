//! Read-only views over classes and check-ins.

use gymdesk_database::{CheckIn, DayOfWeek, GymClass, Member};
use serde::Serialize;
use std::collections::HashMap;

/// Number of entries in the recent check-in feed.
pub const RECENT_CHECK_INS_LIMIT: usize = 10;

/// Classes grouped per weekday, Monday first, each day ordered by start time.
/// Days without classes are kept with an empty list.
pub fn weekly_schedule(classes: &[GymClass]) -> Vec<(DayOfWeek, Vec<GymClass>)> {
    DayOfWeek::WEEK
        .iter()
        .map(|day| {
            let mut sessions: Vec<GymClass> = classes
                .iter()
                .filter(|c| c.day_of_week == *day)
                .cloned()
                .collect();
            sessions.sort_by(|a, b| a.start_time.cmp(&b.start_time));
            (*day, sessions)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentCheckIn {
    pub check_in: CheckIn,
    /// `None` when the member has since been deleted.
    pub member_name: Option<String>,
}

/// The newest `limit` check-ins, joined with the member's name.
pub fn recent_check_ins(
    check_ins: &[CheckIn],
    members: &[Member],
    limit: usize,
) -> Vec<RecentCheckIn> {
    let names: HashMap<&str, String> = members
        .iter()
        .map(|m| (m.id.as_str(), m.full_name()))
        .collect();

    let mut newest: Vec<&CheckIn> = check_ins.iter().collect();
    newest.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    newest
        .into_iter()
        .take(limit)
        .map(|check_in| RecentCheckIn {
            check_in: check_in.clone(),
            member_name: names.get(check_in.member_id.as_str()).cloned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use gymdesk_database::{CheckInMethod, CheckInType, MemberStatus, MembershipType};

    fn class(name: &str, day_of_week: DayOfWeek, start_time: &str) -> GymClass {
        GymClass {
            id: name.to_string(),
            name: name.to_string(),
            instructor: String::new(),
            day_of_week,
            start_time: start_time.to_string(),
            duration: 45,
            capacity: 10,
            enrolled: 0,
            room: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn schedule_covers_the_whole_week_in_order() {
        let classes = vec![
            class("evening yoga", DayOfWeek::Monday, "18:00"),
            class("sunday stretch", DayOfWeek::Sunday, "10:00"),
            class("early hiit", DayOfWeek::Monday, "06:30"),
        ];

        let schedule = weekly_schedule(&classes);
        let days: Vec<_> = schedule.iter().map(|(day, _)| *day).collect();
        assert_eq!(days, DayOfWeek::WEEK.to_vec());

        let monday: Vec<_> = schedule[0].1.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(monday, vec!["early hiit", "evening yoga"]);
        assert!(schedule[1].1.is_empty());
        assert_eq!(schedule[6].1.len(), 1);
    }

    #[test]
    fn recent_feed_is_newest_first_and_tolerates_deleted_members() {
        let member = Member {
            id: "m1".to_string(),
            first_name: "Sarah".to_string(),
            last_name: "Johnson".to_string(),
            email: "sarah@example.com".to_string(),
            phone: String::new(),
            membership_type: MembershipType::Premium,
            status: MemberStatus::Active,
            join_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            notes: String::new(),
        };
        let check_ins: Vec<CheckIn> = [(1, "m1"), (3, "gone"), (2, "m1")]
            .into_iter()
            .map(|(hour, member_id)| CheckIn {
                id: hour.to_string(),
                member_id: member_id.to_string(),
                timestamp: Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap(),
                kind: CheckInType::CheckIn,
                method: CheckInMethod::Manual,
            })
            .collect();

        let feed = recent_check_ins(&check_ins, &[member], 2);
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].check_in.id, "3");
        assert_eq!(feed[0].member_name, None);
        assert_eq!(feed[1].check_in.id, "2");
        assert_eq!(feed[1].member_name.as_deref(), Some("Sarah Johnson"));
    }
}
