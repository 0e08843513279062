//! Dirty and validity evaluation.
//!
//! Both flags are derived from the registry on demand and never write to it.
//!
//! - A field is **invalid** when it has errors, or when it has validators but
//!   has never been touched. The latter keeps pristine required fields from
//!   passing without flashing an error at the user.
//! - A field is **dirty** when its value differs from its initial value. With
//!   no initial value recorded, it is dirty when it is not the empty string.

use serde_json::Value;

use crate::registry::{empty_value, FieldRecord, FieldRegistry};
use crate::snapshot::InitialSnapshot;

/// Compares two values by content.
///
/// Objects compare regardless of key order, and numbers compare by numeric
/// value, so `1` equals `1.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
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
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Returns whether a single field currently counts as valid.
pub fn is_field_valid(record: &FieldRecord) -> bool {
    record.errors().is_empty() && (record.touched() || record.validators().is_empty())
}

/// Returns whether every registered field is valid.
pub fn is_valid(registry: &FieldRegistry) -> bool {
    registry.iter().all(|(_, record)| is_field_valid(record))
}

/// Returns whether a single field differs from its initial value.
pub fn is_field_dirty(record: &FieldRecord, snapshot: &InitialSnapshot) -> bool {
    match snapshot.get(record.path()) {
        Some(initial) => !values_equal(record.value(), initial),
        None => !values_equal(record.value(), &empty_value()),
    }
}

/// Returns whether any registered field is dirty.
pub fn is_dirty(registry: &FieldRegistry, snapshot: &InitialSnapshot) -> bool {
    registry
        .iter()
        .any(|(_, record)| is_field_dirty(record, snapshot))
}
