use serde_json::json;

use survey_spec::{
    QuestionDocument, ResolvedSchema, Selection, ValidationError, resolve, validate_document,
    validate_resolved,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "questions" => include_str!("fixtures/questions.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn survey_document() -> QuestionDocument {
    serde_json::from_str(fixture("questions")).expect("deserialize")
}

fn tidel_d4() -> Selection {
    Selection::new("Smart Safe", "TiDel", "D4")
}

#[test]
fn clean_document_passes_both_passes() {
    let doc = survey_document();
    assert_eq!(validate_document(&doc), vec![]);

    let schema = resolve(&doc, &tidel_d4()).expect("resolve");
    assert_eq!(validate_resolved(&schema), vec![]);
}

#[test]
fn document_pass_collects_every_violation_at_once() {
    let doc: QuestionDocument = serde_json::from_value(json!({
        "base_sections": [{
            "key": "contact",
            "title": "section.contact",
            "fields": [
                { "name": "", "type": "text" },
                { "name": "serial_plate", "type": "photo" },
                { "name": "mount_style", "type": "single-choice" },
                {
                    "name": "notes",
                    "type": "textarea",
                    "visible_if": { "field": "mount_stle", "op": "eq", "value": "Wall" }
                }
            ]
        }],
        "overrides": {
            "modl:TiDel": { "required": ["notes"] },
            "make:Glory": {
                "insert_after": [{
                    "after": "no_such_field",
                    "field": { "name": "extra_notes", "type": "textarea" }
                }]
            }
        }
    }))
    .expect("deserialize");

    let errors = validate_document(&doc);
    assert_eq!(errors.len(), 6);
    assert!(errors.contains(&ValidationError::UnnamedField {
        location: "contact".into(),
    }));
    assert!(errors.contains(&ValidationError::UnknownFieldType {
        field: "serial_plate".into(),
        raw: "photo".into(),
    }));
    assert!(errors.contains(&ValidationError::EmptyOptions {
        field: "mount_style".into(),
    }));
    assert!(errors.contains(&ValidationError::UnknownVisibleIfReference {
        field: "notes".into(),
        reference: "mount_stle".into(),
    }));
    assert!(errors.contains(&ValidationError::UnknownScope {
        key: "modl:TiDel".into(),
    }));
    assert!(errors.contains(&ValidationError::UnresolvedAnchor {
        scope: "make:Glory".into(),
        anchor: "no_such_field".into(),
    }));
}

#[test]
fn anchors_in_inapplicable_scopes_are_still_checked() {
    let doc: QuestionDocument = serde_json::from_value(json!({
        "base_sections": [{
            "key": "delivery",
            "title": "section.delivery",
            "fields": [
                { "name": "path_desc", "type": "textarea", "label": "field.path_desc" }
            ]
        }],
        "overrides": {
            "make:Glory": {
                "insert_after": [{
                    "after": "path_dsc",
                    "field": { "name": "ramp_notes", "type": "textarea" }
                }]
            }
        }
    }))
    .expect("deserialize");

    // A TiDel selection never applies the Glory scope, so resolution is fine.
    assert!(resolve(&doc, &tidel_d4()).is_ok());
    assert_eq!(
        validate_document(&doc),
        vec![ValidationError::UnresolvedAnchor {
            scope: "make:Glory".into(),
            anchor: "path_dsc".into(),
        }]
    );
}

#[test]
fn inserted_names_count_as_known_references() {
    let doc: QuestionDocument = serde_json::from_value(json!({
        "base_sections": [{
            "key": "delivery",
            "title": "section.delivery",
            "fields": [
                { "name": "path_desc", "type": "textarea", "label": "field.path_desc" },
                {
                    "name": "dolly_notes",
                    "type": "textarea",
                    "visible_if": { "field": "dolly_ok", "op": "eq", "value": "No" }
                }
            ]
        }],
        "overrides": {
            "make:TiDel": {
                "insert_after": [{
                    "after": "path_desc",
                    "field": {
                        "name": "dolly_ok",
                        "type": "single-choice",
                        "options": ["Yes", "No"]
                    }
                }]
            },
            "model:TiDel|D4": {
                "insert_after": [{
                    "after": "dolly_ok",
                    "field": { "name": "dolly_photo", "type": "file" }
                }]
            }
        }
    }))
    .expect("deserialize");

    assert_eq!(validate_document(&doc), vec![]);
}

#[test]
fn virtual_references_need_no_declaration() {
    let doc: QuestionDocument = serde_json::from_value(json!({
        "base_sections": [{
            "key": "install",
            "title": "section.install",
            "fields": [{
                "name": "vault_anchor",
                "type": "single-choice",
                "options": ["Epoxy", "Bolt"],
                "visible_if": {
                    "any": [
                        { "field": "__model__", "value": "D4" },
                        { "field": "__category__", "value": "Smart Safe" }
                    ]
                }
            }]
        }]
    }))
    .expect("deserialize");

    assert_eq!(validate_document(&doc), vec![]);
}

#[test]
fn resolved_pass_reports_duplicate_section_keys() {
    let doc: QuestionDocument = serde_json::from_value(json!({
        "base_sections": [
            {
                "key": "delivery",
                "title": "section.delivery",
                "fields": [{ "name": "path_desc", "type": "textarea" }]
            },
            {
                "key": "delivery",
                "title": "section.delivery_redux",
                "fields": [{ "name": "dock_notes", "type": "textarea" }]
            }
        ]
    }))
    .expect("deserialize");

    let schema = resolve(&doc, &tidel_d4()).expect("names are unique");
    assert_eq!(
        validate_resolved(&schema),
        vec![ValidationError::DuplicateSectionKey {
            key: "delivery".into(),
        }]
    );
}

#[test]
fn resolved_pass_reports_cross_section_duplicates() {
    let schema: ResolvedSchema = serde_json::from_value(json!({
        "sections": [
            {
                "key": "contact",
                "title": "section.contact",
                "fields": [{
                    "name": "store_name",
                    "type": "text",
                    "required": true,
                    "hidden": false
                }]
            },
            {
                "key": "site",
                "title": "section.site",
                "fields": [{
                    "name": "store_name",
                    "type": "text",
                    "required": false,
                    "hidden": false
                }]
            }
        ]
    }))
    .expect("deserialize");

    assert_eq!(
        validate_resolved(&schema),
        vec![ValidationError::DuplicateFieldName {
            name: "store_name".into(),
        }]
    );
}

#[test]
fn resolved_pass_checks_kinds_options_and_references() {
    let schema: ResolvedSchema = serde_json::from_value(json!({
        "sections": [{
            "key": "install",
            "title": "section.install",
            "fields": [
                {
                    "name": "floor_type",
                    "type": "single-select",
                    "required": false,
                    "hidden": false
                },
                {
                    "name": "anchor_depth",
                    "type": "depth-gauge",
                    "required": false,
                    "hidden": false,
                    "visible_if": { "field": "bolt_down", "value": "Yes" }
                }
            ]
        }]
    }))
    .expect("deserialize");

    let errors = validate_resolved(&schema);
    assert_eq!(errors.len(), 3);
    assert!(errors.contains(&ValidationError::EmptyOptions {
        field: "floor_type".into(),
    }));
    assert!(errors.contains(&ValidationError::UnknownFieldType {
        field: "anchor_depth".into(),
        raw: "depth-gauge".into(),
    }));
    assert!(errors.contains(&ValidationError::UnknownVisibleIfReference {
        field: "anchor_depth".into(),
        reference: "bolt_down".into(),
    }));
}

#[test]
fn duplicates_inside_one_authored_section_are_reported() {
    let doc: QuestionDocument = serde_json::from_value(json!({
        "base_sections": [{
            "key": "contact",
            "title": "section.contact",
            "fields": [
                { "name": "store_name", "type": "text" },
                { "name": "store_name", "type": "text" }
            ]
        }]
    }))
    .expect("deserialize");

    assert_eq!(
        validate_document(&doc),
        vec![ValidationError::DuplicateFieldName {
            name: "store_name".into(),
        }]
    );
}
