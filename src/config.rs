//! Form configuration.

use serde_json::Value;

/// Behaviour switches for a [`Form`](crate::Form).
///
/// # Example
///
/// ```rust
/// use formstate::{Form, FormConfig};
/// use serde_json::json;
///
/// let config = FormConfig::new()
///     .with_initial_values(json!({ "email": "a@x.com" }))
///     .with_validate_on_change(false);
///
/// let form = Form::with_config(config);
/// assert!(!form.is_dirty());
/// ```
#[derive(Debug, Clone)]
pub struct FormConfig {
    /// Nested initial values, used as the dirty-tracking baseline.
    pub initial_values: Option<Value>,
    /// Validate a field after each input event ([`Form::change`](crate::Form::change)).
    pub validate_on_change: bool,
    /// Validate a field when it loses focus ([`Form::blur`](crate::Form::blur)).
    pub validate_on_blur: bool,
    /// Focus the first failing field when a submission is rejected.
    pub focus_first_error_on_submit: bool,
}

impl FormConfig {
    /// Creates the default configuration: no initial values, validation on
    /// change and blur, focus on submit errors.
    pub fn new() -> Self {
        Self {
            initial_values: None,
            validate_on_change: true,
            validate_on_blur: true,
            focus_first_error_on_submit: true,
        }
    }

    /// Sets the initial values.
    pub fn with_initial_values(mut self, values: Value) -> Self {
        self.initial_values = Some(values);
        self
    }

    /// Sets whether input events trigger validation.
    pub fn with_validate_on_change(mut self, enabled: bool) -> Self {
        self.validate_on_change = enabled;
        self
    }

    /// Sets whether blur events trigger validation.
    pub fn with_validate_on_blur(mut self, enabled: bool) -> Self {
        self.validate_on_blur = enabled;
        self
    }

    /// Sets whether a rejected submission focuses the first failing field.
    pub fn with_focus_first_error_on_submit(mut self, enabled: bool) -> Self {
        self.focus_first_error_on_submit = enabled;
        self
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self::new()
    }
}
