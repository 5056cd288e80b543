//! JSON value comparison rules shared by evaluation and validation.

use std::cmp::Ordering;

use serde_json::Value;

/// Equality with numeric normalization (`1 == 1.0`).
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Ordering for number/number and string/string; `None` otherwise.
pub(crate) fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// A field value viewed as a set: arrays yield their elements, scalars themselves.
pub(crate) fn as_members(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

pub(crate) fn list_contains(list: &[Value], value: &Value) -> bool {
    list.iter().any(|item| values_equal(item, value))
}

/// Non-null string, number, or bool.
pub(crate) fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

pub(crate) fn is_ordered(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_))
}
