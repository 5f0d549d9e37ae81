use serde_json::{Value, json};

use survey_spec::{AnswerMap, Condition, VirtualBindings};

fn cond(value: Value) -> Condition {
    serde_json::from_value(value).expect("condition")
}

fn answers(value: Value) -> AnswerMap {
    match value {
        Value::Object(map) => map,
        other => panic!("answers must be an object, got {}", other),
    }
}

fn no_selection() -> VirtualBindings {
    VirtualBindings::default()
}

#[test]
fn eq_is_the_default_operator() {
    let condition = cond(json!({ "field": "loading_dock", "value": "No" }));
    assert!(condition.evaluate(&answers(json!({ "loading_dock": "No" })), &no_selection()));
    assert!(!condition.evaluate(&answers(json!({ "loading_dock": "Yes" })), &no_selection()));
}

#[test]
fn absent_answers_read_as_null() {
    let eq_null = cond(json!({ "field": "power_outlet", "value": null }));
    let neq_null = cond(json!({ "field": "power_outlet", "op": "neq", "value": null }));
    let blank = answers(json!({}));

    assert!(eq_null.evaluate(&blank, &no_selection()));
    assert!(!neq_null.evaluate(&blank, &no_selection()));

    let eq_no = cond(json!({ "field": "power_outlet", "value": "No" }));
    assert!(!eq_no.evaluate(&blank, &no_selection()));
}

#[test]
fn numbers_compare_by_value_not_representation() {
    let condition = cond(json!({ "field": "stairs_count", "value": 1 }));
    assert!(condition.evaluate(&answers(json!({ "stairs_count": 1.0 })), &no_selection()));
}

#[test]
fn ordering_coerces_numeric_strings() {
    let condition = cond(json!({ "field": "stairs_count", "op": "gt", "value": 3 }));
    assert!(condition.evaluate(&answers(json!({ "stairs_count": "4" })), &no_selection()));
    assert!(!condition.evaluate(&answers(json!({ "stairs_count": "3" })), &no_selection()));
}

#[test]
fn ordering_on_non_numeric_text_is_false_both_ways() {
    let gt = cond(json!({ "field": "stairs_count", "op": "gt", "value": 3 }));
    let lte = cond(json!({ "field": "stairs_count", "op": "lte", "value": 3 }));
    let noisy = answers(json!({ "stairs_count": "a few" }));

    assert!(!gt.evaluate(&noisy, &no_selection()));
    assert!(!lte.evaluate(&noisy, &no_selection()));
}

#[test]
fn booleans_coerce_to_zero_and_one_for_ordering() {
    let condition = cond(json!({ "field": "bolt_down", "op": "gte", "value": 1 }));
    assert!(condition.evaluate(&answers(json!({ "bolt_down": true })), &no_selection()));
    assert!(!condition.evaluate(&answers(json!({ "bolt_down": false })), &no_selection()));
}

#[test]
fn in_matches_any_selected_option() {
    let condition = cond(json!({ "field": "floor_type", "op": "in", "value": ["Other"] }));
    let multi = answers(json!({ "floor_type": ["Concrete", "Other"] }));
    let single = answers(json!({ "floor_type": ["Concrete"] }));

    assert!(condition.evaluate(&multi, &no_selection()));
    assert!(!condition.evaluate(&single, &no_selection()));
}

#[test]
fn in_accepts_a_scalar_operand_as_singleton_set() {
    let condition = cond(json!({ "field": "floor_type", "op": "in", "value": "Other" }));
    assert!(condition.evaluate(&answers(json!({ "floor_type": "Other" })), &no_selection()));
}

#[test]
fn nothing_is_a_member_of_null() {
    let in_null = cond(json!({ "field": "floor_type", "op": "in", "value": null }));
    let nin_null = cond(json!({ "field": "floor_type", "op": "nin", "value": null }));
    let answered = answers(json!({ "floor_type": "Wood" }));

    assert!(!in_null.evaluate(&answered, &no_selection()));
    assert!(nin_null.evaluate(&answered, &no_selection()));
}

#[test]
fn contains_is_substring_on_text_answers() {
    let condition = cond(json!({ "field": "path_desc", "op": "contains", "value": "stairs" }));
    let described = answers(json!({ "path_desc": "two flights of stairs at rear" }));

    assert!(condition.evaluate(&described, &no_selection()));
    assert!(!condition.evaluate(&answers(json!({ "path_desc": "level path" })), &no_selection()));
}

#[test]
fn contains_is_membership_on_array_answers() {
    let condition = cond(json!({ "field": "floor_type", "op": "contains", "value": "Other" }));
    assert!(condition.evaluate(&answers(json!({ "floor_type": ["Wood", "Other"] })), &no_selection()));
    assert!(!condition.evaluate(&answers(json!({})), &no_selection()));
}

#[test]
fn empty_groups_have_fixed_truth_values() {
    assert!(cond(json!({ "all": [] })).evaluate(&answers(json!({})), &no_selection()));
    assert!(!cond(json!({ "any": [] })).evaluate(&answers(json!({})), &no_selection()));
}

#[test]
fn bare_arrays_are_implicit_all_groups() {
    let condition = cond(json!([
        { "field": "loading_dock", "value": "No" },
        { "field": "stairs_count", "op": "gt", "value": 0 }
    ]));
    let both = answers(json!({ "loading_dock": "No", "stairs_count": 2 }));
    let one = answers(json!({ "loading_dock": "No", "stairs_count": 0 }));

    assert!(condition.evaluate(&both, &no_selection()));
    assert!(!condition.evaluate(&one, &no_selection()));
}

#[test]
fn any_needs_a_single_match() {
    let condition = cond(json!({
        "any": [
            { "field": "never_answered", "value": "x" },
            { "field": "loading_dock", "value": "No" }
        ]
    }));
    assert!(condition.evaluate(&answers(json!({ "loading_dock": "No" })), &no_selection()));
}

#[test]
fn groups_nest() {
    let condition = cond(json!({
        "all": [
            { "field": "loading_dock", "value": "No" },
            { "any": [
                { "field": "stairs_count", "op": "gt", "value": 0 },
                { "field": "path_desc", "op": "contains", "value": "ramp" }
            ]}
        ]
    }));
    let ramp = answers(json!({ "loading_dock": "No", "path_desc": "ramp at side door" }));
    let flat = answers(json!({ "loading_dock": "No", "path_desc": "straight in" }));

    assert!(condition.evaluate(&ramp, &no_selection()));
    assert!(!condition.evaluate(&flat, &no_selection()));
}

#[test]
fn virtual_fields_shadow_answers() {
    let condition = cond(json!({ "field": "__model__", "value": "D4" }));
    let bindings = VirtualBindings::new("Smart Safe", "TiDel", "D4");
    let decoy = answers(json!({ "__model__": "D3" }));

    assert!(condition.evaluate(&decoy, &bindings));
    assert!(!condition.evaluate(&decoy, &no_selection()));
}

#[test]
fn clause_listing_walks_nested_groups() {
    let condition = cond(json!({
        "all": [
            { "field": "loading_dock", "value": "No" },
            { "any": [{ "field": "__model__", "value": "D4" }] }
        ]
    }));
    let fields: Vec<&str> = condition
        .clauses()
        .iter()
        .map(|clause| clause.field.as_str())
        .collect();
    assert_eq!(fields, vec!["loading_dock", "__model__"]);
}
