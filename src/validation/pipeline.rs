//! Running validation against a form.
//!
//! A run snapshots the field value and the whole-form values in one write,
//! awaits the validators without holding any lock, and then stores the
//! collected errors in a second write. Runs overlap freely; each carries a ticket and a result is
//! only stored if no newer run for the same field has been stored already.

use log::debug;
use stillwater::prelude::*;
use stillwater::Validation;

use super::run_validators;
use crate::error::{FieldError, FieldErrors};
use crate::form::Form;
use crate::path::FieldPath;
use crate::registry::FieldSelection;
use crate::ValidationResult;

impl Form {
    /// Validates the selected fields, returning true if all of them pass.
    ///
    /// - A single name validates that field; an unregistered name fails.
    /// - A list validates each field in the given order.
    /// - [`FieldSelection::All`] validates every registered field in
    ///   registration order.
    ///
    /// With `focus_on_error`, the element of the first failing field is
    /// focused; later failures in the same call do not steal focus.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formstate::validation::rules;
    /// use formstate::{FieldOptions, FieldSelection, Form};
    /// use futures::executor::block_on;
    ///
    /// let form = Form::new();
    /// form.add_field("name", FieldOptions::new().validator(rules::required()));
    /// form.add_field("nick", FieldOptions::new());
    ///
    /// assert!(!block_on(form.validate("name", false)));
    /// assert!(block_on(form.validate("nick", false)));
    /// assert!(!block_on(form.validate(FieldSelection::All, false)));
    /// assert!(!block_on(form.validate("missing", false)));
    /// ```
    pub async fn validate(&self, selection: impl Into<FieldSelection>, focus_on_error: bool) -> bool {
        self.validate_with_errors(selection, focus_on_error)
            .await
            .is_success()
    }

    /// Like [`Form::validate`], but returns every collected error.
    ///
    /// Unregistered names contribute an error with code `unknown_field`.
    pub async fn validate_with_errors(
        &self,
        selection: impl Into<FieldSelection>,
        focus_on_error: bool,
    ) -> ValidationResult<()> {
        let names = match selection.into() {
            FieldSelection::One(name) => return self.validate_field(&name, focus_on_error).await,
            FieldSelection::Many(names) => names,
            FieldSelection::All => self.field_names(),
        };

        let mut outcome = Validation::Success(());
        for name in names {
            let focus = focus_on_error && outcome.is_success();
            let result = self.validate_field(&name, focus).await;
            outcome = merge(outcome, result);
        }
        outcome
    }

    async fn validate_field(&self, name: &str, focus_on_error: bool) -> ValidationResult<()> {
        let Some((ticket, all_values)) = self.begin_validation(name) else {
            debug!("validate: '{}' is not registered", name);
            return Validation::Failure(FieldErrors::single(
                FieldError::new(FieldPath::analyze(name), "field is not registered")
                    .with_code("unknown_field"),
            ));
        };

        let outcome =
            run_validators(&ticket.validators, &ticket.path, &ticket.value, &all_values).await;
        let messages = match &outcome {
            Validation::Success(()) => Vec::new(),
            Validation::Failure(errors) => errors.messages(),
        };
        let failed = !messages.is_empty();

        let focus_target = {
            let mut state = self.state().write();
            let stored = state
                .registry
                .finish_validation(name, ticket.token, messages);
            if stored && failed && focus_on_error {
                state
                    .registry
                    .get(name)
                    .and_then(|record| record.element().cloned())
            } else {
                None
            }
        };
        if let Some(element) = focus_target {
            element.focus();
        }

        outcome
    }
}

fn merge(acc: ValidationResult<()>, next: ValidationResult<()>) -> ValidationResult<()> {
    match (acc, next) {
        (Validation::Failure(a), Validation::Failure(b)) => Validation::Failure(a.combine(b)),
        (Validation::Failure(e), _) | (_, Validation::Failure(e)) => Validation::Failure(e),
        _ => Validation::Success(()),
    }
}
