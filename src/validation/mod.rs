//! Field validators and the validation pipeline.
//!
//! A [`Validator`] is an asynchronous check of one field value against the
//! whole-form values. A field's validators all run, in order, and every
//! failure is kept: a field with two broken rules reports both messages.
//!
//! # Example
//!
//! ```rust
//! use formstate::validation::{rules, Validator};
//! use formstate::{FieldOptions, Form};
//! use futures::executor::block_on;
//! use serde_json::json;
//!
//! let form = Form::new();
//! form.add_field(
//!     "username",
//!     FieldOptions::new()
//!         .validator(rules::required())
//!         .validator(Validator::from_fn(|value, _| {
//!             (*value == "admin").then(|| "username is reserved".to_string())
//!         })),
//! );
//!
//! form.set_field("username", json!("admin"), true);
//! assert!(!block_on(form.validate("username", false)));
//! assert_eq!(form.errors()["username"], json!(["username is reserved"]));
//! ```

mod pipeline;
pub mod rules;

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use log::warn;
use serde_json::Value;
use stillwater::Validation;

use crate::error::{FieldError, FieldErrors};
use crate::path::FieldPath;
use crate::ValidationResult;

/// Message recorded when a validator panics instead of answering.
pub const VALIDATOR_PANIC_MESSAGE: &str = "validator failed unexpectedly";

/// The future a validator returns: an error message, or `None` when the value
/// is acceptable.
pub type ValidatorFuture = BoxFuture<'static, Option<String>>;

type CheckFn = dyn Fn(Value, Value) -> ValidatorFuture + Send + Sync;

/// An asynchronous field validator.
///
/// The check receives the field's current value and the projected values of
/// the whole form. Returning `None` (or an empty message) means the value
/// passes.
#[derive(Clone)]
pub struct Validator {
    check: Arc<CheckFn>,
}

impl Validator {
    /// Creates a validator from an async closure.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formstate::validation::Validator;
    ///
    /// let available = Validator::new(|value, _all| async move {
    ///     // a real check would consult a remote service here
    ///     (value == "taken").then(|| "already in use".to_string())
    /// });
    /// ```
    pub fn new<F, Fut>(check: F) -> Self
    where
        F: Fn(Value, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<String>> + Send + 'static,
    {
        Self {
            check: Arc::new(move |value, all| check(value, all).boxed()),
        }
    }

    /// Creates a validator from a synchronous closure.
    pub fn from_fn<F>(check: F) -> Self
    where
        F: Fn(&Value, &Value) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(move |value, all| future::ready(check(&value, &all)))
    }

    /// Replaces this validator's failure message.
    ///
    /// Passing values are unaffected; every failure reports `message`.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        let message = message.into();
        let inner = self.check;
        Self {
            check: Arc::new(move |value, all| {
                let message = message.clone();
                inner(value, all)
                    .map(move |outcome| outcome.map(|_| message))
                    .boxed()
            }),
        }
    }

    /// Runs the check, converting panics into [`Check::Panicked`].
    pub(crate) async fn check(&self, value: &Value, all_values: &Value) -> Check {
        let started = panic::catch_unwind(AssertUnwindSafe(|| {
            (self.check)(value.clone(), all_values.clone())
        }));
        let finished = match started {
            Ok(pending) => AssertUnwindSafe(pending).catch_unwind().await,
            Err(payload) => Err(payload),
        };

        match finished {
            Ok(Some(message)) if !message.is_empty() => Check::Failed(message),
            Ok(_) => Check::Passed,
            Err(payload) => {
                warn!("validator panicked: {}", panic_message(payload.as_ref()));
                Check::Panicked
            }
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator")
    }
}

/// Result of running a single validator.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Check {
    Passed,
    Failed(String),
    Panicked,
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

/// Runs every validator against `value`, accumulating all failures.
///
/// Validators run in order and never short-circuit.
pub async fn run_validators(
    validators: &[Validator],
    path: &FieldPath,
    value: &Value,
    all_values: &Value,
) -> ValidationResult<()> {
    let mut errors = Vec::new();

    for validator in validators {
        match validator.check(value, all_values).await {
            Check::Passed => {}
            Check::Failed(message) => errors.push(FieldError::new(path.clone(), message)),
            Check::Panicked => errors.push(
                FieldError::new(path.clone(), VALIDATOR_PANIC_MESSAGE)
                    .with_code("validator_panicked"),
            ),
        }
    }

    match FieldErrors::from_vec(errors) {
        Some(errors) => Validation::Failure(errors),
        None => Validation::Success(()),
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Validator>();
    assert_sync::<Validator>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;

    fn unwrap_failure<T: std::fmt::Debug, E>(v: Validation<T, E>) -> E {
        v.into_result().unwrap_err()
    }

    fn always(message: &'static str) -> Validator {
        Validator::from_fn(move |_, _| Some(message.to_string()))
    }

    #[test]
    fn test_all_validators_run() {
        let path = FieldPath::analyze("name");
        let validators = vec![always("A"), always("B")];

        let result = block_on(run_validators(&validators, &path, &json!(""), &json!({})));
        let errors = unwrap_failure(result);
        assert_eq!(errors.messages(), vec!["A", "B"]);
        assert_eq!(errors.first().field(), "name");
    }

    #[test]
    fn test_no_validators_pass() {
        let path = FieldPath::analyze("name");
        let result = block_on(run_validators(&[], &path, &json!(""), &json!({})));
        assert!(result.is_success());
    }

    #[test]
    fn test_empty_message_counts_as_pass() {
        let path = FieldPath::analyze("name");
        let validators = vec![always("")];
        let result = block_on(run_validators(&validators, &path, &json!(""), &json!({})));
        assert!(result.is_success());
    }

    #[test]
    fn test_async_validator_sees_whole_form() {
        let path = FieldPath::analyze("confirm");
        let validators = vec![Validator::new(|value, all| async move {
            (all["password"] != value).then(|| "mismatch".to_string())
        })];

        let all = json!({ "password": "s3cret", "confirm": "s3cret" });
        let result = block_on(run_validators(&validators, &path, &json!("s3cret"), &all));
        assert!(result.is_success());

        let result = block_on(run_validators(&validators, &path, &json!("other"), &all));
        assert!(result.is_failure());
    }

    #[test]
    fn test_panicking_validator_is_contained() {
        let path = FieldPath::analyze("x");
        let validators = vec![
            Validator::from_fn(|_, _| panic!("boom")),
            always("still runs"),
        ];

        let result = block_on(run_validators(&validators, &path, &json!(1), &json!({})));
        let errors = unwrap_failure(result);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first().message, VALIDATOR_PANIC_MESSAGE);
        assert_eq!(errors.first().code, "validator_panicked");
    }

    #[test]
    fn test_panic_while_polled_is_contained() {
        let validator = Validator::new(|value: Value, _| async move {
            futures::future::ready(()).await;
            if value.is_number() {
                panic!("late boom");
            }
            None
        });

        let check = block_on(validator.check(&json!(1), &json!({})));
        assert_eq!(check, Check::Panicked);
    }

    #[test]
    fn test_with_message_overrides_failures_only() {
        let validator = Validator::from_fn(|value, _| {
            (*value == "bad").then(|| "original".to_string())
        })
        .with_message("custom");

        assert_eq!(
            block_on(validator.check(&json!("bad"), &json!({}))),
            Check::Failed("custom".to_string())
        );
        assert_eq!(block_on(validator.check(&json!("ok"), &json!({}))), Check::Passed);
    }
}
