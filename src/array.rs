//! Controller for array-valued fields.
//!
//! [`FieldArray`] edits a single field whose value is an array. Each edit
//! computes the whole new array, writes it back through the registry and
//! revalidates the field; the array is never mutated in place.

use log::debug;
use serde_json::Value;

use crate::form::Form;
use crate::project::{padded_len, MAX_INDEX_GAP};

/// Whole-array editing for one field.
///
/// A value that is not an array reads as empty. Mutations on an unregistered
/// field do nothing and report `false`.
///
/// # Example
///
/// ```rust
/// use formstate::{FieldOptions, Form};
/// use futures::executor::block_on;
/// use serde_json::json;
///
/// let form = Form::new();
/// form.add_field("tags", FieldOptions::new().default_value(json!(["a", "b"])));
/// let tags = form.array("tags");
///
/// block_on(tags.add(json!("c")));
/// block_on(tags.swap(0, 2));
/// assert_eq!(tags.items(), vec![json!("c"), json!("b"), json!("a")]);
/// ```
#[derive(Debug, Clone)]
pub struct FieldArray {
    form: Form,
    name: String,
}

impl FieldArray {
    pub(crate) fn new(form: Form, name: &str) -> Self {
        Self {
            form,
            name: name.to_string(),
        }
    }

    /// The field this controller edits.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current items.
    pub fn items(&self) -> Vec<Value> {
        self.form
            .get_value(&self.name)
            .map(into_items)
            .unwrap_or_default()
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// Returns true if there are no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends an item.
    pub async fn add(&self, item: Value) -> bool {
        self.replace(|items| items.push(item)).await
    }

    /// Removes the item at `index`. Out-of-range indices leave the array
    /// unchanged.
    pub async fn remove(&self, index: usize) -> bool {
        self.replace(|items| {
            if index < items.len() {
                items.remove(index);
            }
        })
        .await
    }

    /// Replaces the item at `index`, padding with `null` past the end.
    ///
    /// An index more than [`MAX_INDEX_GAP`] past the end leaves the array
    /// unchanged.
    pub async fn set(&self, index: usize, item: Value) -> bool {
        self.replace(|items| match padded_len(items.len(), index) {
            Some(len) => {
                items.resize(len, Value::Null);
                items[index] = item;
            }
            None => debug!("array set ignored: index {} is too far past the end", index),
        })
        .await
    }

    /// Swaps two items. Out-of-range indices leave the array unchanged.
    pub async fn swap(&self, a: usize, b: usize) -> bool {
        self.replace(|items| {
            if a < items.len() && b < items.len() {
                items.swap(a, b);
            }
        })
        .await
    }

    /// Writes the edited array back and revalidates the field.
    async fn replace(&self, edit: impl FnOnce(&mut Vec<Value>)) -> bool {
        let written = self.form.update_value(&self.name, |current| {
            let mut items = into_items(current);
            edit(&mut items);
            Value::Array(items)
        });
        if !written {
            debug!("array edit ignored: '{}' is not registered", self.name);
            return false;
        }
        self.form.validate(self.name.as_str(), false).await
    }
}

fn into_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}
