use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::expr::{Condition, VirtualBindings};
use crate::spec::document::{QuestionDocument, Scope};
use crate::spec::field::{FieldDef, FieldKind, Section};

/// The `(category, make, model)` triple a survey session is keyed by. The
/// strings are the same ones override scope keys are built from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Selection {
    pub category: String,
    pub make: String,
    pub model: String,
}

impl Selection {
    pub fn new(
        category: impl Into<String>,
        make: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            make: make.into(),
            model: model.into(),
        }
    }

    /// Applicable override scopes, widest to narrowest.
    pub fn scope_chain(&self) -> [Scope; 4] {
        [
            Scope::Global,
            Scope::Category(self.category.clone()),
            Scope::Make(self.make.clone()),
            Scope::Model {
                make: self.make.clone(),
                model: self.model.clone(),
            },
        ]
    }

    pub fn virtuals(&self) -> VirtualBindings {
        VirtualBindings::new(
            self.category.as_str(),
            self.make.as_str(),
            self.model.as_str(),
        )
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.category, self.make, self.model)
    }
}

/// Failures that abort resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("override scope '{scope}' inserts after unknown field '{anchor}'")]
    UnresolvedAnchor { scope: String, anchor: String },
    #[error("duplicate field name '{name}' in resolved schema")]
    DuplicateFieldName { name: String },
}

/// Accumulated override state for one selection, before application.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeMerge {
    pub required: BTreeSet<String>,
    pub hidden: BTreeSet<String>,
    pub defaults: BTreeMap<String, Value>,
    pub insertions: Vec<QueuedInsertion>,
}

/// An insertion queued during scope merging, tagged with its source scope.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedInsertion {
    pub scope: Scope,
    pub after: String,
    pub field: FieldDef,
}

/// Folds every applicable override layer into one merge state.
///
/// `required` and `hide_fields` union across scopes; a later scope's
/// default overwrites an earlier one's (model beats make beats category
/// beats global); insertions keep queue order. Absent scopes contribute
/// nothing.
pub fn merge_scopes(doc: &QuestionDocument, selection: &Selection) -> ScopeMerge {
    let mut merge = ScopeMerge::default();
    for scope in selection.scope_chain() {
        let Some(patch) = doc.overrides.get(&scope.to_string()) else {
            continue;
        };
        merge.required.extend(patch.required.iter().cloned());
        merge.hidden.extend(patch.hide_fields.iter().cloned());
        for (name, value) in &patch.defaults {
            merge.defaults.insert(name.clone(), value.clone());
        }
        for insertion in &patch.insert_after {
            merge.insertions.push(QueuedInsertion {
                scope: scope.clone(),
                after: insertion.after.clone(),
                field: insertion.field.clone(),
            });
        }
    }
    merge
}

/// A field with every override applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedField {
    pub name: String,
    #[serde(rename = "type")]
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<Condition>,
    pub required: bool,
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSection {
    pub key: String,
    #[serde(default)]
    pub title: String,
    pub fields: Vec<ResolvedField>,
}

/// Ordered output of `resolve`, ready for session use and rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSchema {
    pub sections: Vec<ResolvedSection>,
}

impl ResolvedSchema {
    /// Fields in document order, across sections.
    pub fn fields(&self) -> impl Iterator<Item = &ResolvedField> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields().find(|field| field.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields().map(|field| field.name.as_str()).collect()
    }
}

/// Resolves one selection against the document.
///
/// Pure: no I/O, no shared state; identical inputs produce identical
/// schemas. A missing category pack contributes nothing. Hidden fields stay
/// in the schema (and in the anchor namespace) with `hidden = true` and
/// `required` forced false.
pub fn resolve(
    doc: &QuestionDocument,
    selection: &Selection,
) -> Result<ResolvedSchema, ResolveError> {
    let mut sections: Vec<Section> = doc.base_sections.clone();
    if let Some(pack) = doc.category_packs.get(&selection.category) {
        sections.extend(pack.iter().cloned());
    }

    let merge = merge_scopes(doc, selection);

    let mut names = BTreeSet::new();
    for section in &sections {
        for field in &section.fields {
            if !names.insert(field.name.clone()) {
                return Err(ResolveError::DuplicateFieldName {
                    name: field.name.clone(),
                });
            }
        }
    }

    // Insertions land one at a time so later entries can anchor on earlier
    // ones. `landed` redirects same-anchor repeats behind the field the
    // previous insertion placed, keeping queue order in the document.
    let mut landed: BTreeMap<String, String> = BTreeMap::new();
    for queued in &merge.insertions {
        let target = landed
            .get(&queued.after)
            .cloned()
            .unwrap_or_else(|| queued.after.clone());
        let Some((section_index, field_index)) = locate_field(&sections, &target) else {
            return Err(ResolveError::UnresolvedAnchor {
                scope: queued.scope.to_string(),
                anchor: queued.after.clone(),
            });
        };
        if !names.insert(queued.field.name.clone()) {
            return Err(ResolveError::DuplicateFieldName {
                name: queued.field.name.clone(),
            });
        }
        landed.insert(queued.after.clone(), queued.field.name.clone());
        sections[section_index]
            .fields
            .insert(field_index + 1, queued.field.clone());
    }

    let sections = sections
        .into_iter()
        .map(|section| ResolvedSection {
            key: section.key,
            title: section.title,
            fields: section
                .fields
                .into_iter()
                .map(|field| annotate(field, &merge))
                .collect(),
        })
        .collect();

    Ok(ResolvedSchema { sections })
}

fn annotate(field: FieldDef, merge: &ScopeMerge) -> ResolvedField {
    let hidden = merge.hidden.contains(&field.name);
    let required = !hidden && (field.required || merge.required.contains(&field.name));
    let default = merge.defaults.get(&field.name).cloned().or(field.default);
    ResolvedField {
        name: field.name,
        kind: field.kind,
        label: field.label,
        options: field.options,
        help: field.help,
        visible_if: field.visible_if,
        required,
        hidden,
        default,
    }
}

fn locate_field(sections: &[Section], name: &str) -> Option<(usize, usize)> {
    sections.iter().enumerate().find_map(|(section_index, section)| {
        section
            .fields
            .iter()
            .position(|field| field.name == name)
            .map(|field_index| (section_index, field_index))
    })
}
