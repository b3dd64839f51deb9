//! Outgoing argument tree normalization
//!
//! The daemon is picky about request shapes: booleans travel as `0`/`1`,
//! numeric strings as numbers, and entries with empty values must not be
//! sent at all. `arguments` applies those rules recursively before a tree
//! goes on the wire.

use serde_json::{Map, Number, Value};

use crate::error::{Result, TransmissionError};

/// Sanitize a caller-supplied argument tree.
///
/// The root must be a mapping (possibly empty). Returns the normalized
/// copy; the caller's original values are consumed, not mutated in place.
pub fn arguments(args: Value) -> Result<Value> {
    match args {
        Value::Object(map) => Ok(Value::Object(sanitize_map(map))),
        other => Err(TransmissionError::InvalidArguments(format!(
            "arguments must be a map, got {other}"
        ))),
    }
}

fn sanitize_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| (key, sanitize_value(value)))
        .filter(|(_, value)| !is_empty(value))
        .collect()
}

fn sanitize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(sanitize_map(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        // The wire protocol has no boolean scalar
        Value::Bool(flag) => Value::Number(Number::from(flag as i64)),
        Value::String(text) => coerce_numeric(text),
        other => other,
    }
}

/// Entries holding these values are dropped from mappings. `0` and `false`
/// never land here: numbers always survive and booleans were already
/// rewritten to `0`/`1`.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn coerce_numeric(text: String) -> Value {
    if let Ok(int) = text.parse::<i64>() {
        return Value::Number(Number::from(int));
    }
    if let Ok(float) = text.parse::<f64>() {
        if float.is_finite() {
            if let Some(number) = Number::from_f64(float) {
                return Value::Number(number);
            }
        }
    }
    Value::String(text)
}
