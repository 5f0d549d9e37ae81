use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::expr::Condition;

/// Widget kinds the survey renderer understands.
///
/// Unrecognized kinds survive round-trips as `Other` so the validator can
/// report them instead of failing the whole document at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    #[default]
    Text,
    Textarea,
    SingleChoice,
    MultiChoice,
    Time,
    Numeric,
    SingleSelect,
    MultiSelect,
    BooleanChoice,
    File,
    Other(String),
}

impl FieldKind {
    pub fn from_label(label: &str) -> Self {
        match label {
            "text" => FieldKind::Text,
            "textarea" => FieldKind::Textarea,
            "single-choice" => FieldKind::SingleChoice,
            "multi-choice" => FieldKind::MultiChoice,
            "time" => FieldKind::Time,
            "numeric" => FieldKind::Numeric,
            "single-select" => FieldKind::SingleSelect,
            "multi-select" => FieldKind::MultiSelect,
            "boolean-choice" => FieldKind::BooleanChoice,
            "file" => FieldKind::File,
            other => FieldKind::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::SingleChoice => "single-choice",
            FieldKind::MultiChoice => "multi-choice",
            FieldKind::Time => "time",
            FieldKind::Numeric => "numeric",
            FieldKind::SingleSelect => "single-select",
            FieldKind::MultiSelect => "multi-select",
            FieldKind::BooleanChoice => "boolean-choice",
            FieldKind::File => "file",
            FieldKind::Other(raw) => raw,
        }
    }

    /// Kinds whose widgets present an options list.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            FieldKind::SingleChoice
                | FieldKind::MultiChoice
                | FieldKind::SingleSelect
                | FieldKind::MultiSelect
        )
    }

    /// Kinds whose answers carry multiple selected values.
    pub fn is_multi(&self) -> bool {
        matches!(self, FieldKind::MultiChoice | FieldKind::MultiSelect)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FieldKind::Other(_))
    }
}

impl From<String> for FieldKind {
    fn from(raw: String) -> Self {
        FieldKind::from_label(&raw)
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.label().to_string()
    }
}

/// One survey question as authored. `label` and `help` are localization
/// keys; display strings are looked up outside the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type", default)]
    #[schemars(with = "String")]
    pub kind: FieldKind,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// An ordered group of fields under one heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Section {
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDef>,
}
