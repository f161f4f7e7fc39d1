use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Active,
    Completed,
    Cancelled,
}

/// Transition requested on `/bookings/chc/{id}/action/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingAction {
    Approve,
    Reject,
    Handover,
    Complete,
    Cancel,
}

impl BookingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Approve => "approve",
            BookingAction::Reject => "reject",
            BookingAction::Handover => "handover",
            BookingAction::Complete => "complete",
            BookingAction::Cancel => "cancel",
        }
    }

    /// Status the booking is expected to reach once the action is accepted
    pub fn target_status(&self) -> BookingStatus {
        match self {
            BookingAction::Approve => BookingStatus::Approved,
            BookingAction::Reject => BookingStatus::Rejected,
            BookingAction::Handover => BookingStatus::Active,
            BookingAction::Complete => BookingStatus::Completed,
            BookingAction::Cancel => BookingStatus::Cancelled,
        }
    }
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approve" => Ok(BookingAction::Approve),
            "reject" => Ok(BookingAction::Reject),
            "handover" => Ok(BookingAction::Handover),
            "complete" => Ok(BookingAction::Complete),
            "cancel" => Ok(BookingAction::Cancel),
            other => Err(format!("unknown booking action: {}", other)),
        }
    }
}

/// Body of a booking status transition
#[derive(Debug, Clone, Serialize)]
pub struct BookingActionRequest<'a> {
    pub action: BookingAction,
    pub notes: &'a str,
}

/// A farmer's machine booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub booking_id: String,
    #[serde(default)]
    pub chc: Option<i64>,
    pub machine: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: BookingStatus,
    pub farmer_name: String,
    pub farmer_contact: String,
    #[serde(default)]
    pub farmer_email: Option<String>,
    #[serde(default)]
    pub farmer_aadhar: Option<String>,
    #[serde(default)]
    pub field_area: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Booking {
    /// Number of calendar days covered, both ends inclusive
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Public booking request sent by a farmer
#[derive(Debug, Clone, Serialize)]
pub struct NewBooking {
    pub machine: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub farmer_name: String,
    pub farmer_contact: String,
    pub farmer_email: String,
    pub farmer_aadhar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_area: Option<String>,
}
