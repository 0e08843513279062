//! The initial-value snapshot dirty tracking compares against.

use serde_json::{Map, Value};

use crate::path::FieldPath;

/// Initial values, kept apart from live field state.
///
/// The snapshot is stored as the nested object it was given and looked up per
/// field name, so fields registered after the snapshot was taken still find
/// their baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialSnapshot {
    values: Value,
}

impl InitialSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self {
            values: Value::Object(Map::new()),
        }
    }

    /// Creates a snapshot from nested initial values.
    pub fn from_values(values: Value) -> Self {
        Self { values }
    }

    /// Returns the initial value for a field path, if one was captured.
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        path.lookup(&self.values)
    }

    /// Returns the nested initial values.
    pub fn values(&self) -> &Value {
        &self.values
    }
}

impl Default for InitialSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
