//! Nested views projected from dotted field names.

use formstate::{FieldOptions, Form};
use serde_json::json;

#[test]
fn test_object_projection() {
    let form = Form::new();
    form.add_field("a.b", FieldOptions::new().default_value(json!(1)));
    form.add_field("a.c", FieldOptions::new().default_value(json!(2)));

    assert_eq!(form.values(), json!({ "a": { "b": 1, "c": 2 } }));
}

#[test]
fn test_array_projection() {
    let form = Form::new();
    form.add_field("items.0", FieldOptions::new().default_value(json!("x")));
    form.add_field("items.1", FieldOptions::new().default_value(json!("y")));

    assert_eq!(form.values(), json!({ "items": ["x", "y"] }));
}

#[test]
fn test_array_of_objects() {
    let form = Form::new();
    form.add_field("items.0.label", FieldOptions::new().default_value(json!("first")));
    form.add_field("items.0.qty", FieldOptions::new().default_value(json!(2)));
    form.add_field("items.1.label", FieldOptions::new().default_value(json!("second")));

    assert_eq!(
        form.values(),
        json!({ "items": [{ "label": "first", "qty": 2 }, { "label": "second" }] })
    );
}

#[test]
fn test_sparse_indices_are_padded() {
    let form = Form::new();
    form.add_field("rows.2", FieldOptions::new().default_value(json!("c")));

    assert_eq!(form.values(), json!({ "rows": [null, null, "c"] }));
}

#[test]
fn test_touched_and_errors_views() {
    let form = Form::new();
    form.add_field("user.name", FieldOptions::new());
    form.add_field("user.tags.0", FieldOptions::new());

    form.touch("user.name");
    form.add_error("user.tags.0", "unknown tag", false);

    assert_eq!(
        form.touched(),
        json!({ "user": { "name": true, "tags": [false] } })
    );
    assert_eq!(
        form.errors(),
        json!({ "user": { "name": [], "tags": [["unknown tag"]] } })
    );
}

#[test]
fn test_views_follow_removal() {
    let form = Form::new();
    form.add_field("a.b", FieldOptions::new().default_value(json!(1)));
    form.add_field("a.c", FieldOptions::new().default_value(json!(2)));
    assert_eq!(form.values(), json!({ "a": { "b": 1, "c": 2 } }));

    form.remove_field("a.b");
    assert_eq!(form.values(), json!({ "a": { "c": 2 } }));
}

#[test]
fn test_empty_form_projects_empty_object() {
    let form = Form::new();
    assert_eq!(form.values(), json!({}));
    assert_eq!(form.touched(), json!({}));
    assert_eq!(form.errors(), json!({}));
}

#[test]
fn test_huge_index_segment_does_not_break_views() {
    let form = Form::new();
    form.add_field("items.0", FieldOptions::new().default_value(json!("a")));
    form.add_field("items.4000000000", FieldOptions::new().default_value(json!("b")));
    form.add_field("rows.18446744073709551615", FieldOptions::new().default_value(json!("x")));

    assert_eq!(
        form.values(),
        json!({ "items": ["a"], "rows": { "18446744073709551615": "x" } })
    );
    assert!(futures::executor::block_on(form.validate(formstate::FieldSelection::All, false)));
    assert!(futures::executor::block_on(form.submit(|values| async move { values })).is_ok());
}
