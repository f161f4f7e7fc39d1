use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One recorded use of a machine in the field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: i64,
    pub machine: i64,
    #[serde(default)]
    pub chc: Option<i64>,
    #[serde(default)]
    pub booking: Option<i64>,
    pub farmer_name: String,
    pub farmer_contact: String,
    pub usage_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    // Decimal columns come back as strings
    #[serde(default)]
    pub total_hours_used: Option<String>,
    #[serde(default)]
    pub area_covered: Option<String>,
    #[serde(default)]
    pub residue_managed: Option<String>,
    #[serde(default)]
    pub fuel_consumed: Option<String>,
    #[serde(default)]
    pub crop_type: Option<String>,
    #[serde(default)]
    pub operator_name: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_usage_deserialize() {
        let usage: UsageRecord = serde_json::from_value(json!({
            "id": 5,
            "machine": 12,
            "chc": 3,
            "booking": null,
            "farmer_name": "Harjit Kaur",
            "farmer_contact": "9812345678",
            "usage_date": "2025-11-10",
            "start_time": "08:30:00",
            "end_time": "13:00:00",
            "total_hours_used": "4.50",
            "area_covered": "3.00",
            "residue_managed": "6.20",
            "gps_lat": "30.900965"
        }))
        .unwrap();

        assert_eq!(usage.booking, None);
        assert_eq!(usage.start_time, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(usage.residue_managed.as_deref(), Some("6.20"));
        assert_eq!(usage.extra["gps_lat"], "30.900965");
    }
}
