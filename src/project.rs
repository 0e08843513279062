//! Projection of flat field storage into nested values.
//!
//! Fields are stored flat, keyed by dotted name. [`build_nested`] rebuilds the
//! nested object a caller expects to see, e.g. fields `items.0` and `items.1`
//! become `{ "items": [..] }`.

use log::debug;
use serde_json::{Map, Value};

use crate::path::{FieldPath, PathSegment};

/// Which part of a field record to project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    /// The current value.
    Value,
    /// Whether the field has been touched, as a boolean.
    Touched,
    /// The current error messages, as an array of strings.
    Errors,
}

/// The most `null` padding a single index segment may add to an array.
///
/// Index segments further past the end of an array are not expanded: a new
/// container for them is built as an object keyed by the segment text, and an
/// existing array skips the entry.
pub const MAX_INDEX_GAP: usize = 1024;

/// Returns the length an array of `len` items must grow to so that `index`
/// is addressable, or `None` when that would pad past [`MAX_INDEX_GAP`].
pub fn padded_len(len: usize, index: usize) -> Option<usize> {
    if index < len {
        return Some(len);
    }
    if index - len > MAX_INDEX_GAP {
        return None;
    }
    index.checked_add(1)
}

/// Builds a nested object from `(path, value)` entries.
///
/// Entries are applied in order. Missing intermediate containers are created
/// as arrays when the next segment is an index and as objects otherwise. An
/// entry that would have to descend through a scalar, or use a key on an
/// array, is skipped. So is an index too far past the end of an existing
/// array (see [`MAX_INDEX_GAP`]). A later entry that writes a whole container at a prefix
/// replaces what earlier entries built there.
///
/// # Example
///
/// ```rust
/// use formstate::project::build_nested;
/// use formstate::FieldPath;
/// use serde_json::json;
///
/// let a = FieldPath::analyze("items.0");
/// let b = FieldPath::analyze("items.1");
/// let nested = build_nested([(&a, json!("x")), (&b, json!("y"))]);
///
/// assert_eq!(nested, json!({ "items": ["x", "y"] }));
/// ```
pub fn build_nested<'a, I>(entries: I) -> Value
where
    I: IntoIterator<Item = (&'a FieldPath, Value)>,
{
    let mut root = Value::Object(Map::new());
    for (path, value) in entries {
        if !insert(&mut root, path.as_slice(), value) {
            debug!("skipping '{}' during projection: conflicting shape", path);
        }
    }
    root
}

fn insert(container: &mut Value, segments: &[PathSegment], value: Value) -> bool {
    let Some((segment, rest)) = segments.split_first() else {
        return false;
    };

    let Some(next) = rest.first() else {
        return match slot(container, segment) {
            Some(target) => {
                *target = value;
                true
            }
            None => false,
        };
    };

    let Some(child) = slot(container, segment) else {
        return false;
    };
    if child.is_null() {
        *child = if next.index().and_then(|i| padded_len(0, i)).is_some() {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        };
    }
    if !(child.is_object() || child.is_array()) {
        return false;
    }
    insert(child, rest, value)
}

/// Returns the slot `segment` addresses in `container`, creating it as
/// `null` (padding arrays with `null`) when absent.
fn slot<'v>(container: &'v mut Value, segment: &PathSegment) -> Option<&'v mut Value> {
    match container {
        Value::Object(map) => Some(map.entry(segment.key.clone()).or_insert(Value::Null)),
        Value::Array(items) => {
            let index = segment.index()?;
            let len = padded_len(items.len(), index)?;
            if items.len() < len {
                items.resize(len, Value::Null);
            }
            items.get_mut(index)
        }
        _ => None,
    }
}
