use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::expr::{Condition, is_virtual};
use crate::resolve::ResolvedSchema;
use crate::spec::document::{QuestionDocument, Scope};
use crate::spec::field::{FieldKind, Section};

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ValidationError {
    #[error("duplicate field name '{name}'")]
    DuplicateFieldName { name: String },
    #[error("duplicate section key '{key}'")]
    DuplicateSectionKey { key: String },
    #[error("unnamed field in '{location}'")]
    UnnamedField { location: String },
    #[error("field '{field}' has unrecognized type '{raw}'")]
    UnknownFieldType { field: String, raw: String },
    #[error("choice field '{field}' has an empty options list")]
    EmptyOptions { field: String },
    #[error("field '{field}' has a visible_if reference to unknown field '{reference}'")]
    UnknownVisibleIfReference { field: String, reference: String },
    #[error("override scope '{scope}' inserts after unknown field '{anchor}'")]
    UnresolvedAnchor { scope: String, anchor: String },
    #[error("override scope key '{key}' is not a recognized scope")]
    UnknownScope { key: String },
}

pub fn validate_document(doc: &QuestionDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    // Anchors and visible_if references are checked against every field the
    // document can contribute, so scopes the resolver never applies still
    // get coverage.
    let known = document_names(doc);

    for section in &doc.base_sections {
        check_section(section, &known, &mut errors);
    }
    for sections in doc.category_packs.values() {
        for section in sections {
            check_section(section, &known, &mut errors);
        }
    }

    for (key, patch) in &doc.overrides {
        if Scope::parse(key).is_none() {
            errors.push(ValidationError::UnknownScope { key: key.clone() });
        }
        for insertion in &patch.insert_after {
            if !known.contains(insertion.after.as_str()) {
                errors.push(ValidationError::UnresolvedAnchor {
                    scope: key.clone(),
                    anchor: insertion.after.clone(),
                });
            }
            let field = &insertion.field;
            check_field(
                key,
                &field.name,
                &field.kind,
                &field.options,
                field.visible_if.as_ref(),
                &known,
                &mut errors,
            );
        }
    }

    errors
}

pub fn validate_resolved(schema: &ResolvedSchema) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut section_keys = BTreeSet::new();
    for section in &schema.sections {
        if !section_keys.insert(section.key.as_str()) {
            errors.push(ValidationError::DuplicateSectionKey {
                key: section.key.clone(),
            });
        }
    }

    let known: BTreeSet<&str> = schema.fields().map(|field| field.name.as_str()).collect();

    let mut seen = BTreeSet::new();
    for section in &schema.sections {
        for field in &section.fields {
            if !field.name.is_empty() && !seen.insert(field.name.as_str()) {
                errors.push(ValidationError::DuplicateFieldName {
                    name: field.name.clone(),
                });
            }
            check_field(
                &section.key,
                &field.name,
                &field.kind,
                &field.options,
                field.visible_if.as_ref(),
                &known,
                &mut errors,
            );
        }
    }

    errors
}

fn document_names(doc: &QuestionDocument) -> BTreeSet<&str> {
    let mut names = BTreeSet::new();
    for section in &doc.base_sections {
        names.extend(section.fields.iter().map(|field| field.name.as_str()));
    }
    for sections in doc.category_packs.values() {
        for section in sections {
            names.extend(section.fields.iter().map(|field| field.name.as_str()));
        }
    }
    for patch in doc.overrides.values() {
        names.extend(
            patch
                .insert_after
                .iter()
                .map(|insertion| insertion.field.name.as_str()),
        );
    }
    names
}

fn check_section(section: &Section, known: &BTreeSet<&str>, errors: &mut Vec<ValidationError>) {
    let mut local = BTreeSet::new();
    for field in &section.fields {
        if !field.name.is_empty() && !local.insert(field.name.as_str()) {
            errors.push(ValidationError::DuplicateFieldName {
                name: field.name.clone(),
            });
        }
        check_field(
            &section.key,
            &field.name,
            &field.kind,
            &field.options,
            field.visible_if.as_ref(),
            known,
            errors,
        );
    }
}

fn check_field(
    location: &str,
    name: &str,
    kind: &FieldKind,
    options: &[String],
    visible_if: Option<&Condition>,
    known: &BTreeSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    if name.is_empty() {
        errors.push(ValidationError::UnnamedField {
            location: location.to_string(),
        });
    }
    if let FieldKind::Other(raw) = kind {
        errors.push(ValidationError::UnknownFieldType {
            field: name.to_string(),
            raw: raw.clone(),
        });
    }
    if kind.is_choice() && options.is_empty() {
        errors.push(ValidationError::EmptyOptions {
            field: name.to_string(),
        });
    }
    if let Some(condition) = visible_if {
        for clause in condition.clauses() {
            if !is_virtual(&clause.field) && !known.contains(clause.field.as_str()) {
                errors.push(ValidationError::UnknownVisibleIfReference {
                    field: name.to_string(),
                    reference: clause.field.clone(),
                });
            }
        }
    }
}
