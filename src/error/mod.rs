//! Error types for form validation.
//!
//! This module provides [`FieldError`] and [`FieldErrors`] for accumulated
//! per-field validation failures, and [`FormError`] for the few operations
//! that report failure through a `Result`.

mod field_error;

pub use field_error::{FieldError, FieldErrors};

/// Errors returned by form-level operations.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Submission was refused because at least one field failed validation.
    #[error("form is invalid: {0}")]
    Invalid(FieldErrors),
}
