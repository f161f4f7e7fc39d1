// Data models for CRM backend payloads

pub mod booking;
pub mod chc;
pub mod machine;
pub mod pagination;
pub mod usage;
pub mod user;

pub use booking::{Booking, BookingAction, BookingStatus, NewBooking};
pub use chc::Chc;
pub use machine::{Machine, MachineStatus};
pub use pagination::{flatten_records, Page};
pub use usage::UsageRecord;
pub use user::{RegisterRequest, Role, UserProfile};
