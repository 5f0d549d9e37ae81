use std::collections::BTreeMap;
use std::fmt;

use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::field::{FieldDef, Section};

/// One override layer, keyed by scope in `QuestionDocument::overrides`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScopeOverride {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hide_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insert_after: Vec<Insertion>,
}

/// A field spliced into the document directly after an anchor field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Insertion {
    pub after: String,
    pub field: FieldDef,
}

/// The authored survey document: ordered base sections, per-category packs,
/// and scope-keyed overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionDocument {
    pub base_sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub category_packs: BTreeMap<String, Vec<Section>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, ScopeOverride>,
}

/// Override applicability, widest to narrowest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Global,
    Category(String),
    Make(String),
    Model { make: String, model: String },
}

impl Scope {
    /// Parses an override map key: `*`, `category:<name>`, `make:<name>`,
    /// or `model:<make>|<model>`.
    pub fn parse(raw: &str) -> Option<Scope> {
        let trimmed = raw.trim();
        if trimmed == "*" {
            return Some(Scope::Global);
        }
        let (kind, rest) = trimmed.split_once(':')?;
        if rest.is_empty() {
            return None;
        }
        match kind {
            "category" => Some(Scope::Category(rest.to_string())),
            "make" => Some(Scope::Make(rest.to_string())),
            "model" => {
                let (make, model) = rest.split_once('|')?;
                if make.is_empty() || model.is_empty() {
                    return None;
                }
                Some(Scope::Model {
                    make: make.to_string(),
                    model: model.to_string(),
                })
            }
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "*"),
            Scope::Category(name) => write!(f, "category:{name}"),
            Scope::Make(name) => write!(f, "make:{name}"),
            Scope::Model { make, model } => write!(f, "model:{make}|{model}"),
        }
    }
}

/// JSON Schema for authored question documents, for editor tooling.
pub fn document_schema() -> Value {
    serde_json::to_value(schema_for!(QuestionDocument)).unwrap_or_default()
}
