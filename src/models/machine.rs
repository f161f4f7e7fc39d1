use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Operational state of a machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineStatus {
    Idle,
    #[serde(rename = "In Use")]
    InUse,
    Maintenance,
    #[serde(rename = "Out of Service")]
    OutOfService,
}

/// A crop residue machine owned by a CHC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: i64,
    #[serde(default)]
    pub machine_code: Option<String>,
    pub machine_name: String,
    pub machine_type: String,
    #[serde(default)]
    pub purchase_year: Option<i32>,
    #[serde(default)]
    pub funding_source: Option<String>,
    pub status: MachineStatus,
    #[serde(default)]
    pub chc: Option<i64>,
    /// Decimal, serialized by the backend as a string
    #[serde(default)]
    pub total_hours_used: Option<String>,
    #[serde(default)]
    pub last_used_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub last_serviced_date: Option<NaiveDate>,
    #[serde(default)]
    pub next_service_due: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Machine {
    pub fn is_available(&self) -> bool {
        self.status == MachineStatus::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_machine_deserialize() {
        let machine: Machine = serde_json::from_value(json!({
            "id": 12,
            "machine_code": "3-HAP-1",
            "machine_name": "Happy Seeder 9 tyne",
            "machine_type": "Happy Seeder",
            "purchase_year": 2021,
            "funding_source": "SMAM",
            "status": "In Use",
            "chc": 3,
            "total_hours_used": "124.50",
            "last_used_date": "2025-11-02T09:15:00+05:30",
            "last_serviced_date": "2025-10-01",
            "next_service_due": null,
            "chc_name": "Ludhiana CHC"
        }))
        .unwrap();

        assert_eq!(machine.status, MachineStatus::InUse);
        assert!(!machine.is_available());
        assert_eq!(machine.total_hours_used.as_deref(), Some("124.50"));
        assert_eq!(
            machine.last_serviced_date,
            NaiveDate::from_ymd_opt(2025, 10, 1)
        );
        assert!(machine.last_used_date.is_some());
        assert_eq!(machine.extra["chc_name"], "Ludhiana CHC");
    }

    #[test]
    fn test_machine_status_names() {
        assert_eq!(
            serde_json::to_value(MachineStatus::OutOfService).unwrap(),
            json!("Out of Service")
        );
        let status: MachineStatus = serde_json::from_value(json!("Idle")).unwrap();
        assert_eq!(status, MachineStatus::Idle);
    }
}
