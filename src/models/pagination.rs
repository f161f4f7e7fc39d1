// Pagination envelope handling
//
// List endpoints answer either with a bare array (when `nopage=true` is sent)
// or with `{ "count": n, "next": url, "previous": url, "results": [...] }`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ClientError;

/// One page of a list endpoint, with its metadata intact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub count: Option<u64>,
}

impl<T: DeserializeOwned> Page<T> {
    /// Build a page from either response shape.
    /// A bare array becomes a single page with no `next`.
    pub fn from_value(value: Value) -> Result<Self, ClientError> {
        match value {
            Value::Array(_) => Ok(Self {
                results: decode_items(value)?,
                next: None,
                previous: None,
                count: None,
            }),
            Value::Object(mut map) => {
                let results = match map.remove("results") {
                    Some(items @ Value::Array(_)) => decode_items(items)?,
                    _ => {
                        return Err(ClientError::MalformedResponse(
                            "Paginated response has no results array".to_string(),
                        ))
                    }
                };
                Ok(Self {
                    results,
                    next: map.get("next").and_then(Value::as_str).map(str::to_string),
                    previous: map
                        .get("previous")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    count: map.get("count").and_then(Value::as_u64),
                })
            }
            other => Err(ClientError::MalformedResponse(format!(
                "Expected a list or paginated object, got {}",
                other
            ))),
        }
    }
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

fn decode_items<T: DeserializeOwned>(items: Value) -> Result<Vec<T>, ClientError> {
    serde_json::from_value(items).map_err(|e| ClientError::MalformedResponse(e.to_string()))
}

/// Normalize a list response into a plain sequence of records.
///
/// - bare array: its items
/// - object with a `results` array: the results
/// - anything else: the value itself, wrapped
pub fn flatten_records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                map.insert("results".to_string(), other);
                vec![Value::Object(map)]
            }
            None => vec![Value::Object(map)],
        },
        other => vec![other],
    }
}
