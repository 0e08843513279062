//! Field path analysis for dotted field names.
//!
//! This module provides [`FieldPath`] and [`PathSegment`] for turning a flat
//! field name such as `items.0.label` into the ordered segments used to build
//! or navigate a nested structure.

use std::fmt::{self, Display};

use serde_json::Value;

/// A single segment of a field path.
///
/// Every segment keeps its original text in `key`. Segments whose text is a
/// whole base-10 number are additionally tagged as array indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    /// The segment text exactly as it appeared in the field name.
    pub key: String,
    /// Whether the segment addresses an array slot.
    pub is_index: bool,
}

impl PathSegment {
    /// Creates a segment from its text, tagging it as an index when it parses
    /// as a whole number.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let is_index = parse_index(&key).is_some();
        Self { key, is_index }
    }

    /// Returns the array index this segment addresses, if it is an index.
    pub fn index(&self) -> Option<usize> {
        if self.is_index {
            parse_index(&self.key)
        } else {
            None
        }
    }
}

fn parse_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// The analyzed path of a field name.
///
/// # Example
///
/// ```rust
/// use formstate::FieldPath;
///
/// let path = FieldPath::analyze("items.0.label");
///
/// assert_eq!(path.len(), 3);
/// assert!(path.segments().nth(1).unwrap().is_index);
/// assert_eq!(path.to_string(), "items.0.label");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Splits `name` on `.` and tags numeric segments as indices.
    ///
    /// Any string is accepted. A name without dots yields a single segment,
    /// and the empty name yields one empty key segment.
    pub fn analyze(name: &str) -> Self {
        Self {
            segments: name.split('.').map(PathSegment::new).collect(),
        }
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the segments as a slice.
    pub fn as_slice(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the parent path (all segments except the last), or None for a
    /// single-segment path.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            None
        } else {
            Some(Self {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    /// Returns the last segment.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Walks `root` along this path.
    ///
    /// Objects are entered by key and arrays by index. Returns `None` as soon
    /// as a segment cannot be followed.
    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |current, segment| match current {
                Value::Object(map) => map.get(&segment.key),
                Value::Array(items) => segment.index().and_then(|i| items.get(i)),
                _ => None,
            })
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment.key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_segment() {
        let path = FieldPath::analyze("email");
        assert_eq!(path.len(), 1);
        assert_eq!(path.last().unwrap().key, "email");
        assert!(!path.last().unwrap().is_index);
    }

    #[test]
    fn test_numeric_segments_are_indices() {
        let path = FieldPath::analyze("items.0.label");
        let segments: Vec<_> = path.segments().collect();
        assert!(!segments[0].is_index);
        assert!(segments[1].is_index);
        assert_eq!(segments[1].index(), Some(0));
        assert!(!segments[2].is_index);
    }

    #[test]
    fn test_non_numeric_lookalikes() {
        for key in ["-1", "1.5e3", " 1", "1a", ""] {
            let segment = PathSegment::new(key);
            assert!(!segment.is_index, "{key:?} should not be an index");
        }
        assert!(PathSegment::new("007").is_index);
        assert_eq!(PathSegment::new("007").index(), Some(7));
    }

    #[test]
    fn test_display_reproduces_name() {
        for name in ["a", "a.b", "items.0.label", "", "a..b", "x.007"] {
            assert_eq!(FieldPath::analyze(name).to_string(), name);
        }
    }

    #[test]
    fn test_parent_path() {
        let path = FieldPath::analyze("users.0.email");
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "users.0");
        assert_eq!(parent.parent().unwrap().to_string(), "users");
        assert!(FieldPath::analyze("users").parent().is_none());
    }

    #[test]
    fn test_lookup() {
        let root = json!({ "items": [{ "label": "x" }, { "label": "y" }], "n": 1 });

        assert_eq!(
            FieldPath::analyze("items.1.label").lookup(&root),
            Some(&json!("y"))
        );
        assert_eq!(FieldPath::analyze("n").lookup(&root), Some(&json!(1)));
        assert_eq!(FieldPath::analyze("items.5").lookup(&root), None);
        assert_eq!(FieldPath::analyze("items.label").lookup(&root), None);
        assert_eq!(FieldPath::analyze("n.deeper").lookup(&root), None);
    }

    #[test]
    fn test_lookup_object_with_numeric_key() {
        let root = json!({ "a": { "0": "zero" } });
        assert_eq!(FieldPath::analyze("a.0").lookup(&root), Some(&json!("zero")));
    }
}
