//! Helpers over the JSON-like value model.
//!
//! Raw, normalized, merged and finalized configuration values are all
//! `serde_json::Value`. Mappings keep insertion order (`preserve_order`).

use serde_json::{Map, Value};

/// Separator between node names in a configuration path.
pub const PATH_SEPARATOR: char = '.';

/// Joins a parent path and a child name.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", parent, PATH_SEPARATOR, name)
    }
}

/// Returns a short, human-readable name for the value's type.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Whether the value is a mapping or a sequence.
pub fn is_array_like(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

/// Whether the value is a JSON number without a fractional part.
pub fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => true,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0),
        _ => false,
    }
}

/// Strict equality: numbers compare numerically (`1 == 1.0`), everything
/// else compares structurally.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if x == y {
                return true;
            }
            match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        _ => a == b,
    }
}

/// Whether the value counts as empty for `cannot_be_empty`.
///
/// `null`, `false`, zero and the empty string are empty. Mappings and
/// sequences never are.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Converts a scalar into a mapping key. Returns `None` for null, mappings
/// and sequences.
pub fn key_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Turns an array-like value into its ordered `(key, value)` entries.
///
/// Sequence entries are keyed by their index. Any other value yields no
/// entries.
pub fn into_entries(value: Value) -> Vec<(String, Value)> {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

/// Turns an array-like value into a mapping, keying sequence entries by
/// index.
pub fn into_mapping(value: Value) -> Map<String, Value> {
    into_entries(value).into_iter().collect()
}

/// Number of entries held by an array-like value.
pub fn entry_count(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        _ => 0,
    }
}
