//! Numeric coercion and the emission contract shared by every response.
//!
//! Totals and scores are emitted with two decimals, non-finite values become
//! `null`, and opaque catalog values are flattened to strings.

use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `serialize_with` target for floating fields.
pub fn serialize_rounded<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() {
        serializer.serialize_f64(round2(*value))
    } else {
        serializer.serialize_none()
    }
}

/// Best-effort numeric view of a loosely typed JSON value; anything that does
/// not parse to a finite number becomes 0.
#[must_use]
pub fn coerce_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Flatten opaque values (extended-JSON ids, dates, nested documents) into their
/// string form. Scalars and arrays pass through untouched.
#[must_use]
pub fn opaque_to_string(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            if let (1, Some((key, inner))) = (map.len(), map.iter().next()) {
                if key.starts_with('$') {
                    match inner {
                        Value::String(s) => return Value::String(s.clone()),
                        Value::Number(n) => return Value::String(n.to_string()),
                        _ => {}
                    }
                }
            }
            Value::String(Value::Object(map).to_string())
        }
        other => other,
    }
}

pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

pub(crate) fn deserialize_lenient_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(coerce_number(&value)))
}
