//! Summary counters shown at the top of the dashboard.

use chrono::{DateTime, Datelike, TimeZone};
use gymdesk_database::{CheckIn, DayOfWeek, Equipment, GymClass, Member};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Check-ins whose timestamp falls on the calendar day of `now`.
    pub today_check_ins: usize,
    pub active_members: usize,
    /// Classes scheduled on the weekday of `now`.
    pub classes_today: usize,
    /// Equipment under maintenance or broken.
    pub equipment_alerts: usize,
}

/// Compute the dashboard counters.
///
/// "Today" is the calendar day of `now` in its own time zone; check-in
/// timestamps are converted into that zone before comparing dates.
pub fn compute_stats<Tz: TimeZone>(
    members: &[Member],
    equipment: &[Equipment],
    classes: &[GymClass],
    check_ins: &[CheckIn],
    now: &DateTime<Tz>,
) -> DashboardStats {
    let zone = now.timezone();
    let today = now.date_naive();
    let weekday = DayOfWeek::from(now.weekday());

    DashboardStats {
        today_check_ins: check_ins
            .iter()
            .filter(|c| c.timestamp.with_timezone(&zone).date_naive() == today)
            .count(),
        active_members: members.iter().filter(|m| m.is_active()).count(),
        classes_today: classes.iter().filter(|c| c.day_of_week == weekday).count(),
        equipment_alerts: equipment
            .iter()
            .filter(|e| e.status.needs_attention())
            .count(),
    }
}
