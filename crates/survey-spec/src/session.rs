use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::expr::VirtualBindings;
use crate::resolve::{ResolveError, ResolvedField, ResolvedSchema, Selection, resolve};
use crate::spec::document::QuestionDocument;
use crate::validate::{ValidationError, validate_resolved};

/// Field name -> entered value. Owned by the session; `set_answer` is the
/// only mutation entry point.
pub type AnswerMap = Map<String, Value>;

/// Errors surfaced when a session (re)builds its schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("resolved schema failed validation with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),
    #[error("catalog has no model '{model}' for make '{make}'")]
    UnknownEquipment { make: String, model: String },
}

/// Submission gate summary: what still blocks report generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubmissionCheck {
    pub missing_required: Vec<String>,
    pub unknown_answers: Vec<String>,
}

impl SubmissionCheck {
    pub fn ready(&self) -> bool {
        self.missing_required.is_empty() && self.unknown_answers.is_empty()
    }
}

/// Drives one survey: holds the selection and answer snapshot, re-resolves
/// on selection changes (cache-assisted), and exposes the active/required
/// field views the renderer and the report pipeline consume.
///
/// Single-threaded and synchronous; resolution is pure, so cached schemas
/// never go stale until `reload` swaps the documents.
#[derive(Debug, Clone)]
pub struct FormSession {
    document: QuestionDocument,
    catalog: Catalog,
    selection: Selection,
    resolved: ResolvedSchema,
    answers: AnswerMap,
    cache: BTreeMap<Selection, ResolvedSchema>,
}

impl FormSession {
    pub fn new(
        document: QuestionDocument,
        catalog: Catalog,
        selection: Selection,
    ) -> Result<Self, SessionError> {
        let resolved = build_schema(&document, &selection)?;
        let mut cache = BTreeMap::new();
        cache.insert(selection.clone(), resolved.clone());
        Ok(Self {
            document,
            catalog,
            selection,
            resolved,
            answers: AnswerMap::new(),
            cache,
        })
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn resolved(&self) -> &ResolvedSchema {
        &self.resolved
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn document(&self) -> &QuestionDocument {
        &self.document
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Schemas resolved so far in this session (current selection included).
    pub fn cached_selections(&self) -> usize {
        self.cache.len()
    }

    /// Switches the selection, re-resolving and re-validating. Answers for
    /// fields no longer present are discarded. On failure the session is
    /// left unchanged.
    pub fn set_selection(&mut self, selection: Selection) -> Result<(), SessionError> {
        if selection == self.selection {
            return Ok(());
        }
        let resolved = match self.cache.get(&selection) {
            Some(hit) => hit.clone(),
            None => {
                let schema = build_schema(&self.document, &selection)?;
                self.cache.insert(selection.clone(), schema.clone());
                schema
            }
        };
        self.selection = selection;
        self.resolved = resolved;
        self.prune_answers();
        Ok(())
    }

    /// Derives the selection for a catalog model and switches to it.
    pub fn set_equipment(&mut self, make_key: &str, model_key: &str) -> Result<(), SessionError> {
        let selection = self.catalog.selection_for(make_key, model_key).ok_or_else(|| {
            SessionError::UnknownEquipment {
                make: make_key.to_string(),
                model: model_key.to_string(),
            }
        })?;
        self.set_selection(selection)
    }

    pub fn set_answer(&mut self, name: impl Into<String>, value: Value) {
        self.answers.insert(name.into(), value);
    }

    /// Answer if present, otherwise the field's resolved default.
    pub fn value_of(&self, name: &str) -> Option<&Value> {
        self.answers.get(name).or_else(|| {
            self.resolved
                .field(name)
                .and_then(|field| field.default.as_ref())
        })
    }

    /// Fields that are not hidden and whose `visible_if` holds against the
    /// current answers and selection, in document order. Hidden-by-override
    /// and invisible-by-expression are indistinguishable here.
    pub fn active_fields(&self) -> Vec<&ResolvedField> {
        let virtuals = self.selection.virtuals();
        self.resolved
            .fields()
            .filter(|field| field_active(field, &self.answers, &virtuals))
            .collect()
    }

    /// Active fields with `required = true`, in document order.
    pub fn required_fields(&self) -> Vec<&ResolvedField> {
        self.active_fields()
            .into_iter()
            .filter(|field| field.required)
            .collect()
    }

    /// Writes defaults for non-hidden fields that have one and no answer
    /// yet, through the answer entry point. Returns how many were filled.
    pub fn prefill_defaults(&mut self) -> usize {
        let pending: Vec<(String, Value)> = self
            .resolved
            .fields()
            .filter(|field| !field.hidden && !self.answers.contains_key(&field.name))
            .filter_map(|field| {
                field
                    .default
                    .clone()
                    .map(|value| (field.name.clone(), value))
            })
            .collect();
        let count = pending.len();
        for (name, value) in pending {
            self.set_answer(name, value);
        }
        count
    }

    /// The submission gate: required active fields without a real answer
    /// (absent, null, blank string, or empty list) block submission, as do
    /// answer keys naming no resolved field.
    pub fn submission_check(&self) -> SubmissionCheck {
        let missing_required = self
            .required_fields()
            .into_iter()
            .filter(|field| {
                self.answers
                    .get(&field.name)
                    .map(|value| is_blank(value))
                    .unwrap_or(true)
            })
            .map(|field| field.name.clone())
            .collect();

        let known: BTreeSet<&str> = self.resolved.fields().map(|f| f.name.as_str()).collect();
        let unknown_answers = self
            .answers
            .keys()
            .filter(|key| !known.contains(key.as_str()))
            .cloned()
            .collect();

        SubmissionCheck {
            missing_required,
            unknown_answers,
        }
    }

    /// Swaps in freshly loaded documents, clears the resolution cache,
    /// re-resolves the current selection, and reconciles answers. On
    /// failure the session keeps the old documents.
    pub fn reload(
        &mut self,
        document: QuestionDocument,
        catalog: Catalog,
    ) -> Result<(), SessionError> {
        let resolved = build_schema(&document, &self.selection)?;
        self.document = document;
        self.catalog = catalog;
        self.cache.clear();
        self.cache.insert(self.selection.clone(), resolved.clone());
        self.resolved = resolved;
        self.prune_answers();
        Ok(())
    }

    fn prune_answers(&mut self) {
        let resolved = &self.resolved;
        self.answers
            .retain(|name, _| resolved.field(name).is_some());
    }
}

fn field_active(field: &ResolvedField, answers: &AnswerMap, virtuals: &VirtualBindings) -> bool {
    if field.hidden {
        return false;
    }
    match &field.visible_if {
        Some(condition) => condition.evaluate(answers, virtuals),
        None => true,
    }
}

fn build_schema(
    document: &QuestionDocument,
    selection: &Selection,
) -> Result<ResolvedSchema, SessionError> {
    let schema = resolve(document, selection)?;
    let errors = validate_resolved(&schema);
    if errors.is_empty() {
        Ok(schema)
    } else {
        Err(SessionError::Validation(errors))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
