//! Bound input elements.
//!
//! The form core never talks to a UI directly. A field may carry an
//! [`ElementHandle`], and registry operations describe what should happen to
//! it as [`ElementEffect`]s that the form applies once its state lock has been
//! released.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// An input element a field is bound to.
///
/// Implementations adapt whatever UI toolkit hosts the form. Only `write` and
/// `focus` are required; `read` is consulted once, when a field is first
/// registered without a default value.
pub trait FieldElement: Send + Sync {
    /// Displays `value` in the element.
    fn write(&self, value: &Value);

    /// Moves input focus to the element.
    fn focus(&self);

    /// Returns the element's current value, if it has one.
    ///
    /// Checkbox-style elements should return `Value::Bool`.
    fn read(&self) -> Option<Value> {
        None
    }
}

/// Shared handle to a bound element.
pub type ElementHandle = Arc<dyn FieldElement>;

/// A side effect to perform on a bound element.
#[derive(Clone)]
pub enum ElementEffect {
    /// Write a value into the element.
    Write(ElementHandle, Value),
    /// Focus the element.
    Focus(ElementHandle),
}

impl ElementEffect {
    /// Performs the effect.
    pub fn apply(self) {
        match self {
            ElementEffect::Write(element, value) => element.write(&value),
            ElementEffect::Focus(element) => element.focus(),
        }
    }
}

impl fmt::Debug for ElementEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementEffect::Write(_, value) => f.debug_tuple("Write").field(value).finish(),
            ElementEffect::Focus(_) => f.write_str("Focus"),
        }
    }
}

/// Applies effects in order.
pub(crate) fn apply_all(effects: impl IntoIterator<Item = ElementEffect>) {
    for effect in effects {
        effect.apply();
    }
}
