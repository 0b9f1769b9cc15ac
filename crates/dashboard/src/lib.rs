//! gymdesk dashboard services
//!
//! Search and status filters, summary statistics, the check-in recorder and
//! an entity-kind keyed registry of the record store's repositories.

pub mod check_in;
pub mod query;
pub mod schedule;
pub mod stats;
pub mod stores;

pub use check_in::{CheckInError, CheckInRecorder, CheckInResult, DEFAULT_SCAN_DELAY};
pub use query::{filter_records, matches_search, Searchable, StatusFilter};
pub use schedule::{recent_check_ins, weekly_schedule, RecentCheckIn, RECENT_CHECK_INS_LIMIT};
pub use stats::{compute_stats, DashboardStats};
pub use stores::{EntityRecord, GymStores};
