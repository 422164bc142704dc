//! Conversion between Firestore typed values and plain JSON.
//!
//! The REST API wraps every field in a type discriminator
//! (`stringValue`, `mapValue`, ...). Application code works with
//! `serde_json::Value` on both sides of the wire.

use serde_json::{json, Map, Value};

/// Encode a JSON object into a Firestore `fields` map.
///
/// Non-object input encodes to an empty map; Firestore documents are
/// always objects at the top level.
pub fn to_firestore_fields(value: &Value) -> Value {
    match value.as_object() {
        Some(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_firestore_value(v)))
                .collect(),
        ),
        None => Value::Object(Map::new()),
    }
}

pub fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // Firestore integers travel as decimal strings
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": {
                "values": items.iter().map(to_firestore_value).collect::<Vec<_>>()
            }
        }),
        Value::Object(_) => json!({ "mapValue": { "fields": to_firestore_fields(value) } }),
    }
}

/// Decode a Firestore `fields` map back into a plain JSON object.
pub fn from_firestore_fields(fields: &Map<String, Value>) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), from_firestore_value(v)))
            .collect(),
    )
}

pub fn from_firestore_value(value: &Value) -> Value {
    let Some(map) = value.as_object() else {
        return Value::Null;
    };

    if let Some(s) = map.get("stringValue") {
        return s.clone();
    }
    if let Some(b) = map.get("booleanValue") {
        return b.clone();
    }
    if let Some(i) = map.get("integerValue") {
        // decimal string on the wire; fall back to the raw string when it
        // does not fit an i64
        return match i.as_str().and_then(|s| s.parse::<i64>().ok()) {
            Some(parsed) => json!(parsed),
            None => i.clone(),
        };
    }
    if let Some(d) = map.get("doubleValue") {
        return d.clone();
    }
    if let Some(t) = map.get("timestampValue") {
        return t.clone();
    }
    if map.contains_key("nullValue") {
        return Value::Null;
    }
    if let Some(array) = map.get("arrayValue") {
        let items = array
            .get("values")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(from_firestore_value).collect())
            .unwrap_or_default();
        return Value::Array(items);
    }
    if let Some(inner) = map.get("mapValue") {
        return match inner.get("fields").and_then(Value::as_object) {
            Some(fields) => from_firestore_fields(fields),
            None => Value::Object(Map::new()),
        };
    }

    Value::Null
}
