//! The form controller.
//!
//! [`Form`] ties the pieces together: a [`FieldRegistry`] and an
//! [`InitialSnapshot`] behind one lock, memoized derived views, and the
//! element effects the registry asks for. It is the surface UI glue talks to.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;
use serde_json::Value;
use stillwater::Validation;

use crate::array::FieldArray;
use crate::config::FormConfig;
use crate::element::{apply_all, ElementHandle};
use crate::error::FormError;
use crate::evaluate;
use crate::memo::Memo;
use crate::path::FieldPath;
use crate::project::Member;
use crate::registry::{
    empty_value, FieldRecord, FieldRegistry, FieldSelection, ValidationTicket,
};
use crate::snapshot::InitialSnapshot;
use crate::validation::Validator;

/// Registration options for a field.
///
/// # Example
///
/// ```rust
/// use formstate::validation::rules;
/// use formstate::FieldOptions;
/// use serde_json::json;
///
/// let options = FieldOptions::new()
///     .validator(rules::required())
///     .default_value(json!("guest"));
/// ```
#[derive(Clone, Default)]
pub struct FieldOptions {
    validators: Vec<Validator>,
    default_value: Option<Value>,
    element: Option<ElementHandle>,
}

impl FieldOptions {
    /// Creates options with no validators, default value or element.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a validator.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Appends several validators.
    pub fn validators(mut self, validators: impl IntoIterator<Item = Validator>) -> Self {
        self.validators.extend(validators);
        self
    }

    /// Sets the value a newly registered field starts with.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Binds an element at registration.
    pub fn element(mut self, element: ElementHandle) -> Self {
        self.element = Some(element);
        self
    }
}

pub(crate) struct FormState {
    pub(crate) registry: FieldRegistry,
    pub(crate) snapshot: InitialSnapshot,
}

struct Views {
    values: Memo<Value>,
    touched: Memo<Value>,
    errors: Memo<Value>,
    valid: Memo<bool>,
    dirty: Memo<bool>,
}

struct FormInner {
    state: RwLock<FormState>,
    config: FormConfig,
    views: Views,
}

/// A form: a set of named fields with values, touched flags, errors and
/// derived views.
///
/// `Form` is a cheap handle; clones share the same state and can be moved to
/// other threads. Operations on unknown field names are silent no-ops.
///
/// # Example
///
/// ```rust
/// use formstate::validation::rules;
/// use formstate::{FieldOptions, Form};
/// use futures::executor::block_on;
/// use serde_json::json;
///
/// let form = Form::new();
/// form.add_field("user.name", FieldOptions::new().validator(rules::required()));
/// form.add_field("user.email", FieldOptions::new().validator(rules::email()));
///
/// // Pristine fields with validators hold the form invalid without errors.
/// assert!(!form.is_valid());
///
/// block_on(form.set_value("user.name", json!("Ada")));
/// block_on(form.set_value("user.email", json!("ada@example.com")));
///
/// assert!(form.is_valid());
/// assert!(form.is_dirty());
/// assert_eq!(
///     form.values(),
///     json!({ "user": { "name": "Ada", "email": "ada@example.com" } })
/// );
/// ```
#[derive(Clone)]
pub struct Form {
    inner: Arc<FormInner>,
}

impl Form {
    /// Creates an empty form with the default configuration.
    pub fn new() -> Self {
        Self::with_config(FormConfig::default())
    }

    /// Creates an empty form with `config`. Configured initial values become
    /// the dirty-tracking baseline.
    pub fn with_config(config: FormConfig) -> Self {
        let snapshot = config
            .initial_values
            .clone()
            .map(InitialSnapshot::from_values)
            .unwrap_or_default();

        Self {
            inner: Arc::new(FormInner {
                state: RwLock::new(FormState {
                    registry: FieldRegistry::new(),
                    snapshot,
                }),
                config,
                views: Views {
                    values: Memo::new("values"),
                    touched: Memo::new("touched"),
                    errors: Memo::new("errors"),
                    valid: Memo::new("valid"),
                    dirty: Memo::new("dirty"),
                },
            }),
        }
    }

    /// Returns the configuration this form was created with.
    pub fn config(&self) -> &FormConfig {
        &self.inner.config
    }

    pub(crate) fn state(&self) -> &RwLock<FormState> {
        &self.inner.state
    }

    /// Registers a field, or re-attaches to an existing one.
    ///
    /// A new field starts with, in order of preference: the configured
    /// default value, its entry in the initial values, the bound element's
    /// current value, or `""`. Registering a name that already exists keeps
    /// its value, touched flag and errors, replaces its validators and, if an
    /// element is given, writes the kept value to it.
    pub fn add_field(&self, name: &str, options: FieldOptions) {
        let FieldOptions {
            validators,
            default_value,
            element,
        } = options;

        // Elements are only read when they could seed a new field, and never
        // under the state lock.
        let from_element = match (&default_value, &element) {
            (None, Some(element)) if !self.contains(name) => element.read(),
            _ => None,
        };

        let effect = {
            let mut state = self.state().write();
            let FormState { registry, snapshot } = &mut *state;
            let path = FieldPath::analyze(name);
            registry.add_field(
                name,
                validators,
                || {
                    default_value
                        .or_else(|| snapshot.get(&path).cloned())
                        .or(from_element)
                        .unwrap_or_else(empty_value)
                },
                element,
            )
        };
        apply_all(effect);
    }

    /// Forgets a field. Validations still running for it are discarded when
    /// they finish.
    pub fn remove_field(&self, name: &str) {
        self.state().write().registry.remove_field(name);
    }

    /// Marks a field as touched.
    pub fn touch(&self, name: &str) {
        self.state().write().registry.touch(name);
    }

    /// Writes a field value and marks it touched, without validating.
    ///
    /// With `push_to_element`, the bound element is updated too.
    pub fn set_field(&self, name: &str, value: Value, push_to_element: bool) {
        let effect = self
            .state()
            .write()
            .registry
            .set_field(name, value, push_to_element);
        apply_all(effect);
    }

    /// Binds (or rebinds) an element to a field.
    pub fn set_field_ref(&self, name: &str, element: ElementHandle) {
        self.state().write().registry.set_field_ref(name, element);
    }

    /// Appends an externally sourced error to a field, e.g. a server-side
    /// rejection. With `focus`, the bound element is focused.
    pub fn add_error(&self, name: &str, error: impl Into<String>, focus: bool) {
        let effect = self.state().write().registry.add_error(name, error, focus);
        apply_all(effect);
    }

    /// Clears errors of the selected fields. An empty list clears all.
    pub fn clear_errors(&self, selection: impl Into<FieldSelection>) {
        self.state()
            .write()
            .registry
            .clear_errors(&selection.into());
    }

    /// Returns a field's current value.
    pub fn get_value(&self, name: &str) -> Option<Value> {
        self.state()
            .read()
            .registry
            .get(name)
            .map(|record| record.value().clone())
    }

    /// Returns a copy of a field's record.
    pub fn field(&self, name: &str) -> Option<FieldRecord> {
        self.state().read().registry.get(name).cloned()
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.state().read().registry.contains(name)
    }

    /// Returns the number of registered fields.
    pub fn len(&self) -> usize {
        self.state().read().registry.len()
    }

    /// Returns true if no field is registered.
    pub fn is_empty(&self) -> bool {
        self.state().read().registry.is_empty()
    }

    /// Returns the registered field names in registration order.
    pub fn field_names(&self) -> Vec<String> {
        self.state().read().registry.names()
    }

    /// Writes a value (pushing it to the bound element) and validates the
    /// field. Returns the validation result.
    pub async fn set_value(&self, name: &str, value: Value) -> bool {
        self.set_field(name, value, true);
        self.validate(name, false).await
    }

    /// Handles an input event: the element already shows `value`, so it is
    /// stored without being pushed back. Validates when
    /// [`FormConfig::validate_on_change`] is set.
    ///
    /// Returns whether the field is valid afterwards.
    pub async fn change(&self, name: &str, value: Value) -> bool {
        self.set_field(name, value, false);
        if self.inner.config.validate_on_change {
            self.validate(name, false).await
        } else {
            self.is_field_valid(name)
        }
    }

    /// Handles a blur event: touches the field and validates it when
    /// [`FormConfig::validate_on_blur`] is set.
    ///
    /// Returns whether the field is valid afterwards.
    pub async fn blur(&self, name: &str) -> bool {
        self.touch(name);
        if self.inner.config.validate_on_blur {
            self.validate(name, false).await
        } else {
            self.is_field_valid(name)
        }
    }

    /// Nested view of all field values.
    pub fn values(&self) -> Value {
        let state = self.state().read();
        self.inner.views.values.get(state.registry.version(), || {
            state.registry.project(Member::Value)
        })
    }

    /// Nested view of all touched flags.
    pub fn touched(&self) -> Value {
        let state = self.state().read();
        self.inner.views.touched.get(state.registry.version(), || {
            state.registry.project(Member::Touched)
        })
    }

    /// Nested view of all error lists.
    pub fn errors(&self) -> Value {
        let state = self.state().read();
        self.inner.views.errors.get(state.registry.version(), || {
            state.registry.project(Member::Errors)
        })
    }

    /// Returns true when no field has errors and every field with validators
    /// has been touched.
    pub fn is_valid(&self) -> bool {
        let state = self.state().read();
        self.inner
            .views
            .valid
            .get(state.registry.version(), || evaluate::is_valid(&state.registry))
    }

    /// Returns true when any field differs from its initial value.
    pub fn is_dirty(&self) -> bool {
        let state = self.state().read();
        self.inner.views.dirty.get(state.registry.version(), || {
            evaluate::is_dirty(&state.registry, &state.snapshot)
        })
    }

    /// Validity of one field. Unknown fields are not valid.
    pub fn is_field_valid(&self, name: &str) -> bool {
        self.state()
            .read()
            .registry
            .get(name)
            .is_some_and(evaluate::is_field_valid)
    }

    /// Dirtiness of one field. Unknown fields are not dirty.
    pub fn is_field_dirty(&self, name: &str) -> bool {
        let state = self.state().read();
        state
            .registry
            .get(name)
            .is_some_and(|record| evaluate::is_field_dirty(record, &state.snapshot))
    }

    /// Returns every field to its initial value, clearing touched flags and
    /// errors.
    pub fn reset(&self) {
        let effects = {
            let mut state = self.state().write();
            let FormState { registry, snapshot } = &mut *state;
            registry.reset(snapshot)
        };
        apply_all(effects);
    }

    /// Replaces the initial values.
    ///
    /// If the form is not dirty at the time of the call, fields that have an
    /// entry in `values` take it as their current value too.
    pub fn set_initial_values(&self, values: Value) {
        let effects = {
            let mut state = self.state().write();
            let FormState { registry, snapshot } = &mut *state;
            let was_dirty = evaluate::is_dirty(registry, snapshot);
            *snapshot = InitialSnapshot::from_values(values);
            if was_dirty {
                debug!("form is dirty; initial values only update the baseline");
                registry.mark_changed();
                Vec::new()
            } else {
                registry.seed_from(snapshot)
            }
        };
        apply_all(effects);
    }

    /// Submits the form.
    ///
    /// Every field is marked touched and validated. If all pass, `on_submit`
    /// receives the nested values and its output is returned. Otherwise the
    /// collected errors are returned and `on_submit` is not called.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formstate::validation::rules;
    /// use formstate::{FieldOptions, Form, FormError};
    /// use futures::executor::block_on;
    /// use serde_json::json;
    ///
    /// let form = Form::new();
    /// form.add_field("name", FieldOptions::new().validator(rules::required()));
    ///
    /// let rejected = block_on(form.submit(|_| async { "sent" }));
    /// assert!(matches!(rejected, Err(FormError::Invalid(_))));
    ///
    /// form.set_field("name", json!("Ada"), true);
    /// let sent = block_on(form.submit(|values| async move { values["name"].clone() }));
    /// assert_eq!(sent.unwrap(), json!("Ada"));
    /// ```
    pub async fn submit<F, Fut, R>(&self, on_submit: F) -> Result<R, FormError>
    where
        F: FnOnce(Value) -> Fut,
        Fut: Future<Output = R>,
    {
        self.state().write().registry.touch_all();

        let focus = self.inner.config.focus_first_error_on_submit;
        match self.validate_with_errors(FieldSelection::All, focus).await {
            Validation::Success(()) => Ok(on_submit(self.values()).await),
            Validation::Failure(errors) => {
                debug!("submission rejected: {}", errors);
                Err(FormError::Invalid(errors))
            }
        }
    }

    /// Returns a controller for the array-valued field `name`.
    pub fn array(&self, name: &str) -> FieldArray {
        FieldArray::new(self.clone(), name)
    }

    /// Starts a validation run for `name`, capturing the ticket and the
    /// whole-form values under the same write lock.
    pub(crate) fn begin_validation(&self, name: &str) -> Option<(ValidationTicket, Value)> {
        let mut state = self.state().write();
        let ticket = state.registry.begin_validation(name)?;
        let registry = &state.registry;
        let all_values = self
            .inner
            .views
            .values
            .get(registry.version(), || registry.project(Member::Value));
        Some((ticket, all_values))
    }

    /// Replaces a field value with `update(current)` under a single write
    /// lock, marking the field touched and pushing the result to its element.
    /// Returns false if the field is not registered.
    pub(crate) fn update_value(&self, name: &str, update: impl FnOnce(Value) -> Value) -> bool {
        let effect = {
            let mut state = self.state().write();
            let Some(current) = state.registry.get(name).map(|r| r.value().clone()) else {
                return false;
            };
            state.registry.set_field(name, update(current), true)
        };
        apply_all(effect);
        true
    }
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state().read();
        f.debug_struct("Form")
            .field("fields", &state.registry.names())
            .field("version", &state.registry.version())
            .finish()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Form>();
    assert_sync::<Form>();
};
