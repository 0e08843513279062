//! # Formstate
//!
//! A form-state engine: it tracks a dynamic set of named fields, their values,
//! touched flags, validation errors and bound input elements, and derives the
//! nested values object, overall validity and overall dirtiness from them.
//!
//! ## Overview
//!
//! Fields are stored flat under dotted names such as `items.0.label`; the
//! nested views callers read are projected from that flat storage on demand
//! and memoized until the next change. Validation is asynchronous and
//! accumulates every failing rule instead of stopping at the first, in the
//! style of stillwater's `Validation`.
//!
//! ## Core Types
//!
//! - [`Form`]: the controller UI glue talks to
//! - [`FieldRegistry`]: the flat, side-effect free field store behind it
//! - [`FieldPath`]: the analyzed segments of a field name
//! - [`Validator`]: an async check of one field against the whole form
//! - [`FieldArray`]: whole-array editing of an array-valued field
//! - [`FieldElement`]: the adapter trait for bound input elements
//!
//! ## Example
//!
//! ```rust
//! use formstate::validation::rules;
//! use formstate::{FieldOptions, Form, FormConfig};
//! use futures::executor::block_on;
//! use serde_json::json;
//!
//! let form = Form::with_config(
//!     FormConfig::new().with_initial_values(json!({ "email": "a@x.com", "tags": ["rust"] })),
//! );
//! form.add_field("email", FieldOptions::new().validator(rules::required()).validator(rules::email()));
//! form.add_field("tags", FieldOptions::new().validator(rules::min_len(1)));
//!
//! assert!(!form.is_dirty());
//!
//! block_on(form.array("tags").add(json!("forms")));
//! assert!(form.is_dirty());
//!
//! let submitted = block_on(form.submit(|values| async move { values }));
//! assert_eq!(
//!     submitted.unwrap(),
//!     json!({ "email": "a@x.com", "tags": ["rust", "forms"] })
//! );
//! ```

pub mod array;
pub mod config;
pub mod element;
pub mod error;
pub mod evaluate;
pub mod form;
mod memo;
pub mod path;
pub mod project;
pub mod registry;
pub mod snapshot;
pub mod validation;

pub use array::FieldArray;
pub use config::FormConfig;
pub use element::{ElementEffect, ElementHandle, FieldElement};
pub use error::{FieldError, FieldErrors, FormError};
pub use form::{FieldOptions, Form};
pub use path::{FieldPath, PathSegment};
pub use project::Member;
pub use registry::{FieldRecord, FieldRegistry, FieldSelection, ValidationTicket};
pub use snapshot::InitialSnapshot;
pub use validation::{Validator, ValidatorFuture};

/// Type alias for validation results using FieldErrors
pub type ValidationResult<T> = stillwater::Validation<T, FieldErrors>;
