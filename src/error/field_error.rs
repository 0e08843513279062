//! Field validation error types.
//!
//! This module provides [`FieldError`] for a single failed rule and
//! [`FieldErrors`] for accumulating every failure of a validation run.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::path::FieldPath;

/// A single validation failure on a field.
///
/// # Example
///
/// ```rust
/// use formstate::{FieldError, FieldPath};
///
/// let error = FieldError::new(FieldPath::analyze("email"), "email is required")
///     .with_code("required");
///
/// assert_eq!(error.to_string(), "email: email is required");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// The path of the field that failed validation.
    pub path: FieldPath,
    /// Human-readable error message.
    pub message: String,
    /// Machine-readable error code (e.g., `unknown_field`).
    pub code: String,
}

impl FieldError {
    /// Creates a new field error with the given path and message.
    ///
    /// The error code defaults to "validation_error".
    pub fn new(path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            code: "validation_error".to_string(),
        }
    }

    /// Sets the error code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Returns the field name this error belongs to.
    pub fn field(&self) -> String {
        self.path.to_string()
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for FieldError {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<FieldError>();
    assert_sync::<FieldError>();
};

/// A non-empty collection of field validation errors.
///
/// `FieldErrors` wraps a `NonEmptyVec<FieldError>` so that a
/// `Validation<T, FieldErrors>` failure always carries at least one error.
/// Collections from several fields combine through `Semigroup`:
///
/// ```rust
/// use formstate::{FieldError, FieldErrors, FieldPath};
/// use stillwater::prelude::*;
///
/// let name = FieldErrors::single(FieldError::new(FieldPath::analyze("name"), "required"));
/// let email = FieldErrors::single(FieldError::new(FieldPath::analyze("email"), "invalid"));
///
/// let combined = name.combine(email);
/// assert_eq!(combined.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldErrors(NonEmptyVec<FieldError>);

impl FieldErrors {
    /// Creates a `FieldErrors` containing a single error.
    pub fn single(error: FieldError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Returns the first error in the collection.
    pub fn first(&self) -> &FieldError {
        self.0.head()
    }

    /// Returns all errors recorded for the named field.
    pub fn for_field(&self, name: &str) -> Vec<&FieldError> {
        self.0.iter().filter(|e| e.field() == name).collect()
    }

    /// Returns all errors with the specified error code.
    pub fn with_code(&self, code: &str) -> Vec<&FieldError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    /// Returns the error messages in order.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(|e| e.message.clone()).collect()
    }

    /// Converts this collection into a `Vec<FieldError>`.
    pub fn into_vec(self) -> Vec<FieldError> {
        self.0.into_vec()
    }

    /// Creates a `FieldErrors` from a `Vec<FieldError>`, or `None` when the
    /// vec is empty.
    pub fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        let mut errors = errors.into_iter();
        let first = errors.next()?;
        Some(errors.fold(Self::single(first), |acc, e| acc.combine(Self::single(e))))
    }
}

impl Semigroup for FieldErrors {
    fn combine(self, other: Self) -> Self {
        FieldErrors(self.0.combine(other.0))
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s)", self.len())?;
        for error in self.iter() {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<FieldErrors>();
    assert_sync::<FieldErrors>();
};
