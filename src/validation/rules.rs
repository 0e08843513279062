//! Common field rules.
//!
//! Each function returns a ready-made [`Validator`]. Default messages can be
//! replaced with [`Validator::with_message`].
//!
//! # Example
//!
//! ```rust
//! use formstate::validation::rules;
//! use formstate::{FieldOptions, Form};
//!
//! let form = Form::new();
//! form.add_field(
//!     "email",
//!     FieldOptions::new()
//!         .validator(rules::required().with_message("email is required"))
//!         .validator(rules::email())
//!         .validator(rules::max_len(254)),
//! );
//! ```

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::Validator;
use crate::path::FieldPath;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

static EMAIL: OnceLock<Regex> = OnceLock::new();

/// Fails when the value is missing.
///
/// `null`, the empty string, an empty array and `false` (an unchecked
/// checkbox) count as missing.
pub fn required() -> Validator {
    Validator::from_fn(|value, _| is_missing(value).then(|| "required".to_string()))
}

/// Fails when a string (in characters) or array (in items) is shorter than
/// `min`. Other values pass.
pub fn min_len(min: usize) -> Validator {
    Validator::from_fn(move |value, _| {
        let len = length_of(value)?;
        (len < min).then(|| format!("length must be at least {}, got {}", min, len))
    })
}

/// Fails when a string (in characters) or array (in items) is longer than
/// `max`. Other values pass.
pub fn max_len(max: usize) -> Validator {
    Validator::from_fn(move |value, _| {
        let len = length_of(value)?;
        (len > max).then(|| format!("length must be at most {}, got {}", max, len))
    })
}

/// Fails when a non-empty string does not match `pattern`.
///
/// Empty strings and non-string values pass, leaving presence to
/// [`required`]. Returns an error if the regex pattern is invalid.
///
/// # Example
///
/// ```rust
/// use formstate::validation::rules;
///
/// let digits = rules::pattern(r"^\d+$").unwrap();
/// assert!(rules::pattern(r"(unclosed").is_err());
/// ```
pub fn pattern(pattern: &str) -> Result<Validator, regex::Error> {
    let regex = Regex::new(pattern)?;
    let message = format!("must match pattern '{}'", pattern);
    Ok(regex_rule(regex, message))
}

/// Fails when a non-empty string is not shaped like an email address.
pub fn email() -> Validator {
    let regex = EMAIL
        .get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"));
    regex_rule(regex.clone(), "invalid email address".to_string())
}

/// Fails when the value differs from the value of another field.
///
/// The other field is looked up by name in the whole-form values, so nested
/// names such as `account.password` work.
pub fn equals_field(other: &str) -> Validator {
    let path = FieldPath::analyze(other);
    let message = format!("must match {}", other);
    Validator::from_fn(move |value, all| {
        let expected = path.lookup(all).unwrap_or(&Value::Null);
        (value != expected).then(|| message.clone())
    })
}

fn regex_rule(regex: Regex, message: String) -> Validator {
    Validator::from_fn(move |value, _| match value.as_str() {
        Some(s) if !s.is_empty() && !regex.is_match(s) => Some(message.clone()),
        _ => None,
    })
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(checked) => !checked,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Check;
    use futures::executor::block_on;
    use serde_json::json;

    fn run(validator: &Validator, value: Value) -> Check {
        block_on(validator.check(&value, &json!({})))
    }

    fn passes(validator: &Validator, value: Value) -> bool {
        run(validator, value) == Check::Passed
    }

    #[test]
    fn test_required() {
        let rule = required();
        assert!(!passes(&rule, json!(null)));
        assert!(!passes(&rule, json!("")));
        assert!(!passes(&rule, json!([])));
        assert!(!passes(&rule, json!(false)));

        assert!(passes(&rule, json!("x")));
        assert!(passes(&rule, json!(0)));
        assert!(passes(&rule, json!(true)));
        assert!(passes(&rule, json!({})));
    }

    #[test]
    fn test_min_len_counts_characters() {
        let rule = min_len(3);
        assert!(passes(&rule, json!("héé")));
        assert!(!passes(&rule, json!("hé")));
        assert_eq!(
            run(&rule, json!("ab")),
            Check::Failed("length must be at least 3, got 2".to_string())
        );
    }

    #[test]
    fn test_length_rules_on_arrays() {
        assert!(!passes(&min_len(2), json!(["a"])));
        assert!(passes(&max_len(2), json!(["a", "b"])));
        assert!(!passes(&max_len(2), json!(["a", "b", "c"])));
    }

    #[test]
    fn test_length_rules_ignore_other_types() {
        assert!(passes(&min_len(5), json!(42)));
        assert!(passes(&max_len(0), json!({ "a": 1 })));
    }

    #[test]
    fn test_pattern() {
        let rule = pattern(r"^\d+$").unwrap();
        assert!(passes(&rule, json!("12345")));
        assert!(passes(&rule, json!("")));
        assert!(!passes(&rule, json!("abc")));
        assert!(pattern(r"[invalid").is_err());
    }

    #[test]
    fn test_email() {
        let rule = email();
        assert!(passes(&rule, json!("a@x.com")));
        assert!(passes(&rule, json!("")));
        assert!(!passes(&rule, json!("not-an-email")));
        assert!(!passes(&rule, json!("a@b")));
        assert!(!passes(&rule, json!("a b@x.com")));
    }

    #[test]
    fn test_email_rules_share_one_pattern() {
        let rules: Vec<Validator> = (0..3).map(|_| email()).collect();
        for rule in &rules {
            assert!(passes(rule, json!("a@x.com")));
            assert!(!passes(rule, json!("a@b")));
        }
        let cached = EMAIL.get().expect("compiled on first use");
        assert_eq!(cached.as_str(), EMAIL_PATTERN);
    }

    #[test]
    fn test_equals_field() {
        let rule = equals_field("account.password");
        let all = json!({ "account": { "password": "hunter2" } });

        assert_eq!(
            block_on(rule.check(&json!("hunter2"), &all)),
            Check::Passed
        );
        assert_eq!(
            block_on(rule.check(&json!("hunter3"), &all)),
            Check::Failed("must match account.password".to_string())
        );
    }

    #[test]
    fn test_with_message() {
        let rule = required().with_message("please fill in your name");
        assert_eq!(
            run(&rule, json!("")),
            Check::Failed("please fill in your name".to_string())
        );
    }
}
