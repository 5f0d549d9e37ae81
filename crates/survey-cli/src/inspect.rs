use std::collections::BTreeSet;

use serde_json::{Value, json};
use survey_spec::{
    Catalog, Dimensions, FormSession, PhotoRules, ResolvedField, normalize_length,
    normalize_weight,
};

/// Text listing of the resolved schema plus the current submission gate.
pub fn schema_text(session: &FormSession) -> String {
    let active: BTreeSet<&str> = session
        .active_fields()
        .iter()
        .map(|field| field.name.as_str())
        .collect();

    let mut lines = vec![format!("Selection: {}", session.selection())];
    for section in &session.resolved().sections {
        lines.push(format!("[{}] {}", section.key, section.title));
        for field in &section.fields {
            lines.push(field_line(field, &active));
        }
    }

    let check = session.submission_check();
    if check.ready() {
        lines.push("Ready to submit.".into());
    } else {
        if !check.missing_required.is_empty() {
            lines.push(format!(
                "Missing required answers: {}",
                check.missing_required.join(", ")
            ));
        }
        if !check.unknown_answers.is_empty() {
            lines.push(format!(
                "Unknown answer fields: {}",
                check.unknown_answers.join(", ")
            ));
        }
    }

    lines.join("\n")
}

fn field_line(field: &ResolvedField, active: &BTreeSet<&str>) -> String {
    let mut entry = format!(" - {} ({})", field.name, field.kind.label());
    if field.required {
        entry.push_str(" [required]");
    }
    if field.hidden {
        entry.push_str(" [hidden]");
    } else if !active.contains(field.name.as_str()) {
        entry.push_str(" [inactive]");
    }
    entry
}

/// Machine-readable form of the same view.
pub fn schema_json(session: &FormSession) -> Value {
    let active: Vec<&str> = session
        .active_fields()
        .iter()
        .map(|field| field.name.as_str())
        .collect();
    json!({
        "selection": session.selection(),
        "schema": session.resolved(),
        "active": active,
        "check": session.submission_check(),
    })
}

/// Equipment listing with normalized dimensions.
pub fn catalog_text(catalog: &Catalog) -> String {
    let mut lines = Vec::new();
    for (make_key, make) in &catalog.makes {
        let make_label = if make.label.is_empty() {
            make_key
        } else {
            &make.label
        };
        lines.push(format!("{} ({})", make_label, make_key));
        for (model_key, model) in &make.models {
            let model_label = if model.label.is_empty() {
                model_key
            } else {
                &model.label
            };
            lines.push(format!(" - {} ({})", model_label, model_key));
            lines.push(format!(
                "   category: {}",
                catalog.category_label(&model.category)
            ));
            if !model.dimensions.weight.is_empty() {
                lines.push(format!(
                    "   weight: {}",
                    normalize_weight(&model.dimensions.weight)
                        .unwrap_or_else(|| model.dimensions.weight.clone())
                ));
            }
            if let Some(size) = normalized_size(&model.dimensions) {
                lines.push(format!("   size: {}", size));
            }
            if let Some(rules) = &model.photo_rules {
                lines.push(format!("   photos: {}", describe_photo_rules(rules)));
            }
            if let Some(media) = &model.media {
                if let Some(hero) = &media.hero_image {
                    lines.push(format!("   hero: {}", hero));
                }
                if !media.brochures.is_empty() {
                    lines.push(format!("   brochures: {}", media.brochures.join(", ")));
                }
            }
        }
    }
    lines.join("\n")
}

/// `W x D x H`, each side normalized where the authored text parses.
fn normalized_size(dimensions: &Dimensions) -> Option<String> {
    let sides = [
        &dimensions.width,
        &dimensions.depth,
        &dimensions.height,
    ];
    if sides.iter().any(|side| side.is_empty()) {
        return None;
    }
    let normalized = sides
        .into_iter()
        .map(|side| normalize_length(side).unwrap_or_else(|| side.clone()))
        .collect::<Vec<_>>();
    Some(normalized.join(" x "))
}

fn describe_photo_rules(rules: &PhotoRules) -> String {
    match (rules.min_photos, rules.max_photos) {
        (Some(min), Some(max)) => format!("{} to {} photos", min, max),
        (Some(min), None) => format!("at least {} photos", min),
        (None, Some(max)) => format!("up to {} photos", max),
        (None, None) => "unrestricted".into(),
    }
}

/// Equipment listing as JSON, with derived selections per model.
pub fn catalog_json(catalog: &Catalog) -> Value {
    let equipment: Vec<Value> = catalog
        .equipment_keys()
        .into_iter()
        .filter_map(|(make_key, model_key)| {
            let selection = catalog.selection_for(make_key, model_key)?;
            let model = catalog.model(make_key, model_key)?;
            Some(json!({
                "make_key": make_key,
                "model_key": model_key,
                "selection": selection,
                "dimensions": model.dimensions,
                "photo_rules": model.photo_rules,
                "media": model.media,
            }))
        })
        .collect();
    json!({
        "categories": catalog.category_keys(),
        "equipment": equipment,
    })
}
