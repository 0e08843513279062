//! Field registry: the flat, authoritative store of field records.
//!
//! This module provides [`FieldRegistry`], the map from field name to
//! [`FieldRecord`]. Every mutation goes through one of its operations. The
//! registry never calls a bound element itself; operations that should touch
//! one return [`ElementEffect`]s for the caller to apply.
//!
//! Unknown field names are never an error. Every mutating operation on a name
//! that is not registered is a silent no-op.

use std::fmt;

use indexmap::map::Entry;
use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

use crate::element::{ElementEffect, ElementHandle};
use crate::path::FieldPath;
use crate::project::{build_nested, Member};
use crate::snapshot::InitialSnapshot;
use crate::validation::Validator;

/// The value a field takes when nothing better is known.
pub fn empty_value() -> Value {
    Value::String(String::new())
}

/// State kept for one registered field.
#[derive(Clone)]
pub struct FieldRecord {
    path: FieldPath,
    value: Value,
    touched: bool,
    errors: Vec<String>,
    validators: Vec<Validator>,
    element: Option<ElementHandle>,
    applied_ticket: u64,
}

impl FieldRecord {
    fn new(path: FieldPath, value: Value, validators: Vec<Validator>, ticket_floor: u64) -> Self {
        Self {
            path,
            value,
            touched: false,
            errors: Vec::new(),
            validators,
            element: None,
            applied_ticket: ticket_floor,
        }
    }

    /// The analyzed path of the field name.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// The current value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether the field has been focused or written.
    pub fn touched(&self) -> bool {
        self.touched
    }

    /// Error messages from the latest validation, plus any added externally.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// The field's validators, in the order they run.
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// The bound element, if any.
    pub fn element(&self) -> Option<&ElementHandle> {
        self.element.as_ref()
    }

    fn member(&self, member: Member) -> Value {
        match member {
            Member::Value => self.value.clone(),
            Member::Touched => Value::Bool(self.touched),
            Member::Errors => Value::Array(
                self.errors
                    .iter()
                    .map(|e| Value::String(e.clone()))
                    .collect(),
            ),
        }
    }

    fn write_effect(&self) -> Option<ElementEffect> {
        self.element
            .clone()
            .map(|element| ElementEffect::Write(element, self.value.clone()))
    }
}

impl fmt::Debug for FieldRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRecord")
            .field("path", &self.path.to_string())
            .field("value", &self.value)
            .field("touched", &self.touched)
            .field("errors", &self.errors)
            .field("validators", &self.validators.len())
            .field("bound", &self.element.is_some())
            .finish()
    }
}

/// Which fields an operation applies to.
///
/// # Example
///
/// ```rust
/// use formstate::FieldSelection;
///
/// assert_eq!(FieldSelection::from("email"), FieldSelection::One("email".to_string()));
/// assert_eq!(
///     FieldSelection::from(vec!["a", "b"]),
///     FieldSelection::Many(vec!["a".to_string(), "b".to_string()])
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldSelection {
    /// Every registered field, in registration order.
    #[default]
    All,
    /// A single field.
    One(String),
    /// The listed fields, in the given order.
    Many(Vec<String>),
}

impl From<&str> for FieldSelection {
    fn from(name: &str) -> Self {
        FieldSelection::One(name.to_string())
    }
}

impl From<String> for FieldSelection {
    fn from(name: String) -> Self {
        FieldSelection::One(name)
    }
}

impl From<&String> for FieldSelection {
    fn from(name: &String) -> Self {
        FieldSelection::One(name.clone())
    }
}

impl From<Vec<String>> for FieldSelection {
    fn from(names: Vec<String>) -> Self {
        FieldSelection::Many(names)
    }
}

impl From<Vec<&str>> for FieldSelection {
    fn from(names: Vec<&str>) -> Self {
        FieldSelection::Many(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for FieldSelection {
    fn from(names: &[&str]) -> Self {
        FieldSelection::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

/// What a validation run needs, captured when it starts.
#[derive(Debug, Clone)]
pub struct ValidationTicket {
    /// Sequence number of this run; later runs have larger tokens.
    pub token: u64,
    /// Path of the field being validated.
    pub path: FieldPath,
    /// The field value at the start of the run.
    pub value: Value,
    /// The validators to run.
    pub validators: Vec<Validator>,
}

/// The flat map from field name to field record.
///
/// The registry is synchronous and side-effect free. Every operation that
/// changes state bumps [`FieldRegistry::version`], which derived views use as
/// their cache key.
///
/// # Example
///
/// ```rust
/// use formstate::FieldRegistry;
/// use serde_json::json;
///
/// let mut registry = FieldRegistry::new();
/// registry.add_field("email", Vec::new(), || json!("a@x.com"), None);
///
/// // Registering again keeps the value already entered.
/// registry.add_field("email", Vec::new(), || json!(""), None);
/// assert_eq!(registry.get("email").unwrap().value(), &json!("a@x.com"));
///
/// // Unknown names are ignored.
/// registry.touch("phone");
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct FieldRegistry {
    fields: IndexMap<String, FieldRecord>,
    version: u64,
    tickets: u64,
}

impl FieldRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change counter, incremented by every state-changing operation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Records an external change, such as a new initial snapshot, that
    /// derived views depend on.
    pub fn mark_changed(&mut self) {
        self.version += 1;
    }

    /// Returns the number of registered fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns the record for `name`.
    pub fn get(&self, name: &str) -> Option<&FieldRecord> {
        self.fields.get(name)
    }

    /// Returns the registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// Iterates over `(name, record)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRecord)> {
        self.fields.iter().map(|(name, record)| (name.as_str(), record))
    }

    /// Registers a field, or refreshes an existing registration.
    ///
    /// A new field starts untouched with the value produced by `default`. An
    /// existing field keeps its value, touched flag and errors; only its
    /// validators are replaced. When `element` is supplied it is bound and the
    /// field's value is written to it.
    pub fn add_field(
        &mut self,
        name: &str,
        validators: Vec<Validator>,
        default: impl FnOnce() -> Value,
        element: Option<ElementHandle>,
    ) -> Option<ElementEffect> {
        let path = FieldPath::analyze(name);
        let ticket_floor = self.tickets;

        let record = match self.fields.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                debug!("re-registering field '{}'", name);
                let record = entry.into_mut();
                record.path = path;
                record.validators = validators;
                record
            }
            Entry::Vacant(entry) => {
                debug!("registering field '{}'", name);
                entry.insert(FieldRecord::new(path, default(), validators, ticket_floor))
            }
        };

        let effect = element.map(|element| {
            record.element = Some(element.clone());
            ElementEffect::Write(element, record.value.clone())
        });
        self.mark_changed();
        effect
    }

    /// Forgets a field. Returns whether it was registered.
    pub fn remove_field(&mut self, name: &str) -> bool {
        if self.fields.shift_remove(name).is_some() {
            debug!("removed field '{}'", name);
            self.mark_changed();
            true
        } else {
            debug!("remove_field: '{}' is not registered", name);
            false
        }
    }

    /// Marks a field as touched.
    pub fn touch(&mut self, name: &str) {
        match self.fields.get_mut(name) {
            Some(record) if !record.touched => {
                record.touched = true;
                self.mark_changed();
            }
            Some(_) => {}
            None => debug!("touch: '{}' is not registered", name),
        }
    }

    /// Marks every field as touched.
    pub fn touch_all(&mut self) {
        for record in self.fields.values_mut() {
            record.touched = true;
        }
        self.mark_changed();
    }

    /// Writes a field value and marks the field touched.
    ///
    /// With `push_to_element`, the value is also written to the bound element.
    /// Does not validate.
    pub fn set_field(
        &mut self,
        name: &str,
        value: Value,
        push_to_element: bool,
    ) -> Option<ElementEffect> {
        let Some(record) = self.fields.get_mut(name) else {
            debug!("set_field: '{}' is not registered", name);
            return None;
        };
        record.value = value;
        record.touched = true;
        let effect = if push_to_element {
            record.write_effect()
        } else {
            None
        };
        self.mark_changed();
        effect
    }

    /// Writes a field value without marking the field touched, and pushes it
    /// to the bound element.
    pub fn seed_value(&mut self, name: &str, value: Value) -> Option<ElementEffect> {
        let record = self.fields.get_mut(name)?;
        record.value = value;
        let effect = record.write_effect();
        self.mark_changed();
        effect
    }

    /// Binds (or rebinds) an element to a field.
    pub fn set_field_ref(&mut self, name: &str, element: ElementHandle) {
        match self.fields.get_mut(name) {
            Some(record) => {
                record.element = Some(element);
                self.mark_changed();
            }
            None => debug!("set_field_ref: '{}' is not registered", name),
        }
    }

    /// Appends one error to a field, optionally requesting focus on its
    /// element.
    pub fn add_error(
        &mut self,
        name: &str,
        error: impl Into<String>,
        focus: bool,
    ) -> Option<ElementEffect> {
        let Some(record) = self.fields.get_mut(name) else {
            debug!("add_error: '{}' is not registered", name);
            return None;
        };
        record.errors.push(error.into());
        let effect = if focus {
            record.element.clone().map(ElementEffect::Focus)
        } else {
            None
        };
        self.mark_changed();
        effect
    }

    /// Clears the error lists of the selected fields.
    ///
    /// An empty `Many` selection clears every field, like `All`.
    pub fn clear_errors(&mut self, selection: &FieldSelection) {
        match selection {
            FieldSelection::All => self.fields.values_mut().for_each(|r| r.errors.clear()),
            FieldSelection::Many(names) if names.is_empty() => {
                self.fields.values_mut().for_each(|r| r.errors.clear())
            }
            FieldSelection::One(name) => self.clear_errors_of(std::slice::from_ref(name)),
            FieldSelection::Many(names) => self.clear_errors_of(names),
        }
        self.mark_changed();
    }

    fn clear_errors_of(&mut self, names: &[String]) {
        for name in names {
            if let Some(record) = self.fields.get_mut(name) {
                record.errors.clear();
            }
        }
    }

    /// Starts a validation run for a field, issuing a fresh ticket.
    ///
    /// Returns `None` when the field is not registered.
    pub fn begin_validation(&mut self, name: &str) -> Option<ValidationTicket> {
        let record = self.fields.get(name)?;
        self.tickets += 1;
        Some(ValidationTicket {
            token: self.tickets,
            path: record.path.clone(),
            value: record.value.clone(),
            validators: record.validators.clone(),
        })
    }

    /// Stores the outcome of a validation run.
    ///
    /// The errors replace the field's list only if the field still exists and
    /// no newer run has already been stored. Returns whether they were stored.
    pub fn finish_validation(&mut self, name: &str, token: u64, errors: Vec<String>) -> bool {
        let Some(record) = self.fields.get_mut(name) else {
            debug!("discarding validation of '{}': field was removed", name);
            return false;
        };
        if token <= record.applied_ticket {
            debug!(
                "discarding stale validation of '{}' (ticket {} <= {})",
                name, token, record.applied_ticket
            );
            return false;
        }
        record.applied_ticket = token;
        record.errors = errors;
        self.mark_changed();
        true
    }

    /// Restores every field to its initial value.
    ///
    /// Fields without an initial value get the empty string. Touched flags and
    /// errors are cleared and validations still in flight are discarded when
    /// they finish.
    pub fn reset(&mut self, snapshot: &InitialSnapshot) -> Vec<ElementEffect> {
        let tickets = self.tickets;
        let mut effects = Vec::new();
        for record in self.fields.values_mut() {
            record.value = snapshot
                .get(&record.path)
                .cloned()
                .unwrap_or_else(empty_value);
            record.touched = false;
            record.errors.clear();
            record.applied_ticket = tickets;
            effects.extend(record.write_effect());
        }
        self.mark_changed();
        effects
    }

    /// Copies snapshot values into the fields that have one, without touching
    /// them.
    pub fn seed_from(&mut self, snapshot: &InitialSnapshot) -> Vec<ElementEffect> {
        let mut effects = Vec::new();
        for record in self.fields.values_mut() {
            if let Some(value) = snapshot.get(&record.path) {
                record.value = value.clone();
                effects.extend(record.write_effect());
            }
        }
        self.mark_changed();
        effects
    }

    /// Rebuilds the nested view of one record member across all fields.
    pub fn project(&self, member: Member) -> Value {
        build_nested(
            self.fields
                .values()
                .map(|record| (&record.path, record.member(member))),
        )
    }
}
