// SPDX-License-Identifier: MIT

//! Conversion between native JSON and the Firestore REST tagged-value
//! representation.
//!
//! The REST API wraps every value in a type tag (`{"stringValue": "x"}`,
//! `{"mapValue": {"fields": {...}}}` and so on). The mobile proxy accepts
//! and returns plain JSON, so it runs documents through this codec in both
//! directions. Integers travel as strings per the wire format.

use crate::error::{AppError, Result};
use serde_json::{json, Map, Value};

/// Encode a native JSON value into a tagged Firestore value.
///
/// RFC 3339 strings become `timestampValue`; everything else maps by type.
pub fn to_tagged(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => {
            if is_rfc3339_timestamp(s) {
                json!({ "timestampValue": s })
            } else {
                json!({ "stringValue": s })
            }
        }
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(to_tagged).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(fields) => {
            json!({ "mapValue": { "fields": to_tagged_fields(fields) } })
        }
    }
}

/// Encode a native JSON object into a tagged `fields` map.
pub fn to_tagged_fields(fields: &Map<String, Value>) -> Value {
    let mut out = Map::new();
    for (key, value) in fields {
        out.insert(key.clone(), to_tagged(value));
    }
    Value::Object(out)
}

/// Decode a tagged Firestore value back into native JSON.
pub fn from_tagged(value: &Value) -> Result<Value> {
    let obj = value
        .as_object()
        .ok_or_else(|| AppError::InvalidArgument("Tagged value must be an object".to_string()))?;

    let (tag, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| AppError::InvalidArgument("Tagged value is empty".to_string()))?;

    match tag.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(inner.clone()),
        "stringValue" | "timestampValue" => Ok(inner.clone()),
        "integerValue" => {
            // May arrive as a string or a bare number
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed.map(|i| json!(i)).ok_or_else(|| {
                AppError::InvalidArgument(format!("Invalid integerValue: {}", inner))
            })
        }
        "doubleValue" => Ok(inner.clone()),
        "arrayValue" => {
            let items = inner
                .get("values")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let decoded: Result<Vec<Value>> = items.iter().map(from_tagged).collect();
            Ok(Value::Array(decoded?))
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            from_tagged_fields(&fields)
        }
        other => Err(AppError::InvalidArgument(format!(
            "Unsupported Firestore value tag: {}",
            other
        ))),
    }
}

/// Decode a tagged `fields` map back into a native JSON object.
pub fn from_tagged_fields(fields: &Map<String, Value>) -> Result<Value> {
    let mut out = Map::new();
    for (key, value) in fields {
        out.insert(key.clone(), from_tagged(value)?);
    }
    Ok(Value::Object(out))
}

fn is_rfc3339_timestamp(s: &str) -> bool {
    // Cheap pre-check avoids parse attempts on ordinary strings
    s.len() >= 20 && s.as_bytes().get(10) == Some(&b'T')
        && chrono::DateTime::parse_from_rfc3339(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_round_trip() {
        let native = json!({
            "name": "Ivan",
            "age": 42,
            "rating": 4.5,
            "active": true,
            "note": null,
        });

        let tagged = to_tagged_fields(native.as_object().unwrap());
        assert_eq!(tagged["name"], json!({ "stringValue": "Ivan" }));
        assert_eq!(tagged["age"], json!({ "integerValue": "42" }));
        assert_eq!(tagged["rating"], json!({ "doubleValue": 4.5 }));
        assert_eq!(tagged["active"], json!({ "booleanValue": true }));
        assert_eq!(tagged["note"], json!({ "nullValue": null }));

        let back = from_tagged_fields(tagged.as_object().unwrap()).unwrap();
        assert_eq!(back, native);
    }

    #[test]
    fn test_timestamps_are_tagged() {
        let tagged = to_tagged(&json!("2025-03-01T10:30:00Z"));
        assert_eq!(
            tagged,
            json!({ "timestampValue": "2025-03-01T10:30:00Z" })
        );

        // Short or non-date strings stay strings
        let tagged = to_tagged(&json!("2025-03-01"));
        assert_eq!(tagged, json!({ "stringValue": "2025-03-01" }));
    }

    #[test]
    fn test_nested_maps_and_arrays() {
        let native = json!({
            "companyInfo": { "name": "Patna Pomosht OOD", "bulstat": "123456789" },
            "tags": ["tow", "battery"],
        });

        let tagged = to_tagged_fields(native.as_object().unwrap());
        let back = from_tagged_fields(tagged.as_object().unwrap()).unwrap();
        assert_eq!(back, native);
    }

    #[test]
    fn test_integer_value_accepts_string_or_number() {
        assert_eq!(
            from_tagged(&json!({ "integerValue": "17" })).unwrap(),
            json!(17)
        );
        assert_eq!(
            from_tagged(&json!({ "integerValue": 17 })).unwrap(),
            json!(17)
        );
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = from_tagged(&json!({ "geoPointValue": {} })).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }
}
