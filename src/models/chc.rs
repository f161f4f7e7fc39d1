use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A Custom Hiring Center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chc {
    pub id: i64,
    pub chc_name: String,
    pub state: String,
    pub district: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub total_machines: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chc_deserialize_with_defaults() {
        let chc: Chc = serde_json::from_value(json!({
            "id": 3,
            "chc_name": "Ludhiana CHC",
            "state": "Punjab",
            "district": "Ludhiana",
            "pincode": "141001",
            "latitude": "30.900965"
        }))
        .unwrap();

        assert!(chc.is_active);
        assert_eq!(chc.total_machines, 0);
        assert_eq!(chc.pincode.as_deref(), Some("141001"));
        assert_eq!(chc.extra["latitude"], "30.900965");
    }
}
