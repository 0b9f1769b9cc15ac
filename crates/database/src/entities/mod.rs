//! Domain entities for the gym record store

pub mod check_in;
pub mod class;
pub mod equipment;
pub mod kind;
pub mod member;

// Re-export all entity types
pub use check_in::{CheckIn, CheckInMethod, CheckInType, CreateCheckInRequest, UpdateCheckInRequest};
pub use class::{CreateClassRequest, DayOfWeek, GymClass, UpdateClassRequest};
pub use equipment::{
    CreateEquipmentRequest, Equipment, EquipmentCategory, EquipmentStatus, UpdateEquipmentRequest,
};
pub use kind::EntityKind;
pub use member::{CreateMemberRequest, Member, MemberStatus, MembershipType, UpdateMemberRequest};
