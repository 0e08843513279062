//! Tests for field registry operations through the form surface.

use std::sync::Arc;

use formstate::validation::rules;
use formstate::{FieldElement, FieldOptions, Form};
use parking_lot::Mutex;
use serde_json::{json, Value};

#[derive(Default)]
struct TestElement {
    writes: Mutex<Vec<Value>>,
    focused: Mutex<usize>,
    current: Option<Value>,
}

impl TestElement {
    fn showing(value: Value) -> Self {
        Self {
            current: Some(value),
            ..Self::default()
        }
    }

    fn writes(&self) -> Vec<Value> {
        self.writes.lock().clone()
    }

    fn focus_count(&self) -> usize {
        *self.focused.lock()
    }
}

impl FieldElement for TestElement {
    fn write(&self, value: &Value) {
        self.writes.lock().push(value.clone());
    }

    fn focus(&self) {
        *self.focused.lock() += 1;
    }

    fn read(&self) -> Option<Value> {
        self.current.clone()
    }
}

#[test]
fn test_reregistration_keeps_value() {
    let form = Form::new();
    form.add_field("n", FieldOptions::new().default_value(json!("d1")));
    form.add_field("n", FieldOptions::new().default_value(json!("d2")));

    assert_eq!(form.get_value("n"), Some(json!("d1")));
    assert_eq!(form.len(), 1);
}

#[test]
fn test_reregistration_keeps_touched_and_errors() {
    let form = Form::new();
    form.add_field("n", FieldOptions::new());
    form.touch("n");
    form.add_error("n", "server says no", false);

    form.add_field("n", FieldOptions::new().validator(rules::required()));

    let record = form.field("n").unwrap();
    assert!(record.touched());
    assert_eq!(record.errors(), ["server says no".to_string()]);
    assert_eq!(record.validators().len(), 1);
}

#[test]
fn test_late_element_receives_existing_value() {
    let form = Form::new();
    form.add_field("n", FieldOptions::new());
    form.set_field("n", json!("typed before mount"), false);

    let element = Arc::new(TestElement::default());
    form.add_field("n", FieldOptions::new().element(element.clone()));

    assert_eq!(element.writes(), vec![json!("typed before mount")]);
}

#[test]
fn test_element_seeds_default_when_none_given() {
    let form = Form::new();
    let checkbox = Arc::new(TestElement::showing(json!(true)));
    form.add_field("terms", FieldOptions::new().element(checkbox.clone()));

    assert_eq!(form.get_value("terms"), Some(json!(true)));
    assert_eq!(checkbox.writes(), vec![json!(true)]);
}

#[test]
fn test_unknown_names_never_change_the_registry() {
    let form = Form::new();
    form.add_field("a", FieldOptions::new().default_value(json!("keep")));
    let element = Arc::new(TestElement::default());

    form.touch("ghost");
    form.set_field("ghost", json!(1), true);
    form.add_error("ghost", "e", true);
    form.set_field_ref("ghost", element.clone());
    form.remove_field("ghost");
    form.clear_errors("ghost");

    assert_eq!(form.len(), 1);
    assert_eq!(form.field_names(), vec!["a".to_string()]);
    let record = form.field("a").unwrap();
    assert_eq!(record.value(), &json!("keep"));
    assert!(!record.touched());
    assert!(record.errors().is_empty());
    assert!(element.writes().is_empty());
    assert_eq!(element.focus_count(), 0);
}

#[test]
fn test_set_field_push_to_element() {
    let form = Form::new();
    let element = Arc::new(TestElement::default());
    form.add_field("n", FieldOptions::new().element(element.clone()));

    form.set_field("n", json!("pushed"), true);
    form.set_field("n", json!("silent"), false);

    assert_eq!(element.writes(), vec![json!(""), json!("pushed")]);
    assert_eq!(form.get_value("n"), Some(json!("silent")));
    assert!(form.field("n").unwrap().touched());
}

#[test]
fn test_set_field_ref_replaces_element() {
    let form = Form::new();
    let first = Arc::new(TestElement::default());
    let second = Arc::new(TestElement::default());
    form.add_field("n", FieldOptions::new().element(first.clone()));
    form.set_field_ref("n", second.clone());

    form.set_field("n", json!("x"), true);

    assert_eq!(first.writes(), vec![json!("")]);
    assert_eq!(second.writes(), vec![json!("x")]);
}

#[test]
fn test_add_error_with_focus() {
    let form = Form::new();
    let element = Arc::new(TestElement::default());
    form.add_field("n", FieldOptions::new().element(element.clone()));

    form.add_error("n", "first", false);
    form.add_error("n", "second", true);

    assert_eq!(
        form.field("n").unwrap().errors(),
        ["first".to_string(), "second".to_string()]
    );
    assert_eq!(element.focus_count(), 1);
    assert_eq!(form.errors(), json!({ "n": ["first", "second"] }));
}

#[test]
fn test_clear_errors_variants() {
    let form = Form::new();
    for name in ["a", "b", "c"] {
        form.add_field(name, FieldOptions::new());
        form.add_error(name, "e", false);
    }

    form.clear_errors(vec!["a", "b"]);
    assert_eq!(form.errors(), json!({ "a": [], "b": [], "c": ["e"] }));

    form.add_error("a", "again", false);
    form.clear_errors(Vec::<String>::new());
    assert_eq!(form.errors(), json!({ "a": [], "b": [], "c": [] }));

    form.add_error("b", "again", false);
    form.clear_errors(formstate::FieldSelection::All);
    assert_eq!(form.errors(), json!({ "a": [], "b": [], "c": [] }));
}

#[test]
fn test_remove_field_drops_it_from_views() {
    let form = Form::new();
    form.add_field("user.name", FieldOptions::new().default_value(json!("Ada")));
    form.add_field("user.age", FieldOptions::new().default_value(json!(36)));
    assert_eq!(form.values(), json!({ "user": { "name": "Ada", "age": 36 } }));

    form.remove_field("user.age");

    assert_eq!(form.values(), json!({ "user": { "name": "Ada" } }));
    assert!(!form.contains("user.age"));
}

#[test]
fn test_removed_field_registers_fresh() {
    let form = Form::new();
    form.add_field("n", FieldOptions::new().default_value(json!("old")));
    form.touch("n");
    form.remove_field("n");

    form.add_field("n", FieldOptions::new().default_value(json!("new")));

    let record = form.field("n").unwrap();
    assert_eq!(record.value(), &json!("new"));
    assert!(!record.touched());
}
