use std::collections::BTreeMap;

use regex::Regex;
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resolve::Selection;

const KG_PER_LB: f64 = 0.453_592_37;
const IN_PER_MM: f64 = 0.039_370_078_7;

/// The equipment database the session controller consumes: categories,
/// makes, and models. Make filters model; category never filters make.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Catalog {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, CategoryDef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub makes: BTreeMap<String, MakeRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryDef {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MakeRecord {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub models: BTreeMap<String, ModelRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModelRecord {
    #[serde(default)]
    pub label: String,
    /// Category key, resolved to a label through `Catalog::category_label`.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub dimensions: Dimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaRefs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_rules: Option<PhotoRules>,
}

/// Authored free-text measurements, e.g. `"50 kg / 110 lb"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Dimensions {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub weight: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub width: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub depth: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub height: String,
}

impl Dimensions {
    /// `W x D x H` summary line for equipment-info blocks.
    pub fn summary(&self) -> String {
        format!("{} x {} x {}", self.width, self.depth, self.height)
    }
}

/// Asset references carried as data; the engine never opens files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MediaRefs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub brochures: Vec<String>,
}

/// Photo-count bounds the upload UI enforces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PhotoRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_photos: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_photos: Option<u32>,
}

impl Catalog {
    pub fn category_keys(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    /// Display label for a category key, title-casing the key when the
    /// catalog has no entry (or the entry has no label).
    pub fn category_label(&self, key: &str) -> String {
        self.categories
            .get(key)
            .map(|category| category.label.as_str())
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| title_case(key))
    }

    pub fn make_keys(&self) -> Vec<&str> {
        self.makes.keys().map(String::as_str).collect()
    }

    pub fn make(&self, key: &str) -> Option<&MakeRecord> {
        self.makes.get(key)
    }

    pub fn model(&self, make_key: &str, model_key: &str) -> Option<&ModelRecord> {
        self.makes
            .get(make_key)
            .and_then(|make| make.models.get(model_key))
    }

    pub fn model_keys_for(&self, make_key: &str) -> Vec<&str> {
        self.makes
            .get(make_key)
            .map(|make| make.models.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every `(make_key, model_key)` pair in catalog order.
    pub fn equipment_keys(&self) -> Vec<(&str, &str)> {
        self.makes
            .iter()
            .flat_map(|(make_key, make)| {
                make.models
                    .keys()
                    .map(move |model_key| (make_key.as_str(), model_key.as_str()))
            })
            .collect()
    }

    /// Builds the scope-facing selection (label strings) for one model.
    pub fn selection_for(&self, make_key: &str, model_key: &str) -> Option<Selection> {
        let make = self.makes.get(make_key)?;
        let model = make.models.get(model_key)?;
        Some(Selection::new(
            self.category_label(&model.category),
            display_label(&make.label, make_key),
            display_label(&model.label, model_key),
        ))
    }
}

fn display_label(label: &str, key: &str) -> String {
    if label.is_empty() {
        title_case(key)
    } else {
        label.to_string()
    }
}

/// `smart_safe` -> `Smart Safe`.
fn title_case(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Completes an authored weight into the dual-unit form, e.g. `"65 kg"` ->
/// `"65 kg / 143 lb"`. Text without a parseable quantity yields `None` and
/// callers keep the authored string.
pub fn normalize_weight(text: &str) -> Option<String> {
    let pattern = Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(kg|kilograms?|lbs?|pounds?)\b").ok()?;
    let captures = pattern.captures(text)?;
    let amount: f64 = captures.get(1)?.as_str().parse().ok()?;
    let unit = captures.get(2)?.as_str().to_lowercase();
    let (kg, lb) = if unit.starts_with('k') {
        (amount, amount / KG_PER_LB)
    } else {
        (amount * KG_PER_LB, amount)
    };
    Some(format!("{} kg / {} lb", kg.round() as i64, lb.round() as i64))
}

/// Completes an authored length into the dual-unit form, e.g. `"300 mm"` ->
/// `"300 mm / 11.8 in"`.
pub fn normalize_length(text: &str) -> Option<String> {
    let pattern =
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(mm|millimeters?|cm|centimeters?|in|inches?)\b").ok()?;
    let captures = pattern.captures(text)?;
    let amount: f64 = captures.get(1)?.as_str().parse().ok()?;
    let unit = captures.get(2)?.as_str().to_lowercase();
    let millimeters = if unit.starts_with('m') {
        amount
    } else if unit.starts_with('c') {
        amount * 10.0
    } else {
        amount / IN_PER_MM
    };
    let inches = millimeters * IN_PER_MM;
    Some(format!("{} mm / {:.1} in", millimeters.round() as i64, inches))
}

/// JSON Schema for authored catalog documents, for editor tooling.
pub fn catalog_schema() -> Value {
    serde_json::to_value(schema_for!(Catalog)).unwrap_or_default()
}
