use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Clause field names bound to the current selection instead of an answer.
pub const VIRTUAL_CATEGORY: &str = "__category__";
pub const VIRTUAL_MAKE: &str = "__make__";
pub const VIRTUAL_MODEL: &str = "__model__";

static JSON_NULL: Value = Value::Null;

pub fn is_virtual(name: &str) -> bool {
    matches!(name, VIRTUAL_CATEGORY | VIRTUAL_MAKE | VIRTUAL_MODEL)
}

/// Comparison operators for `visible_if` clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    #[default]
    Eq,
    Neq,
    In,
    Nin,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
}

/// One comparison against an answer or a virtual selection field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Clause {
    pub field: String,
    #[serde(default)]
    pub op: Operator,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
}

/// Boolean condition tree used for `visible_if`.
///
/// A bare JSON array is accepted as an implicit `all` group; legacy
/// documents use that form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Condition {
    All { all: Vec<Condition> },
    Any { any: Vec<Condition> },
    Clause(Clause),
    List(Vec<Condition>),
}

impl Condition {
    /// Evaluates against the answer map and selection bindings. Never
    /// errors: absent answers read as null, empty `all` is true, empty
    /// `any` is false.
    pub fn evaluate(&self, answers: &Map<String, Value>, virtuals: &VirtualBindings) -> bool {
        match self {
            Condition::All { all } => all.iter().all(|child| child.evaluate(answers, virtuals)),
            Condition::Any { any } => any.iter().any(|child| child.evaluate(answers, virtuals)),
            Condition::Clause(clause) => clause.evaluate(answers, virtuals),
            Condition::List(children) => {
                children.iter().all(|child| child.evaluate(answers, virtuals))
            }
        }
    }

    /// Leaf clauses in document order.
    pub fn clauses(&self) -> Vec<&Clause> {
        let mut found = Vec::new();
        self.collect(&mut found);
        found
    }

    fn collect<'a>(&'a self, found: &mut Vec<&'a Clause>) {
        match self {
            Condition::All { all } => all.iter().for_each(|child| child.collect(found)),
            Condition::Any { any } => any.iter().for_each(|child| child.collect(found)),
            Condition::Clause(clause) => found.push(clause),
            Condition::List(children) => children.iter().for_each(|child| child.collect(found)),
        }
    }
}

impl Clause {
    pub fn evaluate(&self, answers: &Map<String, Value>, virtuals: &VirtualBindings) -> bool {
        let answer = virtuals
            .get(&self.field)
            .or_else(|| answers.get(&self.field))
            .unwrap_or(&JSON_NULL);
        self.op.apply(answer, &self.value)
    }
}

impl Operator {
    fn apply(&self, answer: &Value, operand: &Value) -> bool {
        match self {
            Operator::Eq => scalar_eq(answer, operand),
            Operator::Neq => !scalar_eq(answer, operand),
            Operator::In => in_set(answer, operand),
            Operator::Nin => !in_set(answer, operand),
            Operator::Gt => ordering(answer, operand).map(|o| o.is_gt()).unwrap_or(false),
            Operator::Gte => ordering(answer, operand).map(|o| o.is_ge()).unwrap_or(false),
            Operator::Lt => ordering(answer, operand).map(|o| o.is_lt()).unwrap_or(false),
            Operator::Lte => ordering(answer, operand).map(|o| o.is_le()).unwrap_or(false),
            Operator::Contains => contains(answer, operand),
        }
    }
}

/// Values for the three virtual fields, bound from the current selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualBindings {
    category: Value,
    make: Value,
    model: Value,
}

impl VirtualBindings {
    pub fn new(
        category: impl Into<String>,
        make: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            category: Value::String(category.into()),
            make: Value::String(make.into()),
            model: Value::String(model.into()),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        match field {
            VIRTUAL_CATEGORY => Some(&self.category),
            VIRTUAL_MAKE => Some(&self.make),
            VIRTUAL_MODEL => Some(&self.model),
            _ => None,
        }
    }
}

// Numbers compare by value, everything else structurally.
fn scalar_eq(lhs: &Value, rhs: &Value) -> bool {
    if let (Value::Number(a), Value::Number(b)) = (lhs, rhs) {
        return a.as_f64() == b.as_f64();
    }
    lhs == rhs
}

fn in_set(answer: &Value, operand: &Value) -> bool {
    match answer {
        Value::Array(selected) => selected.iter().any(|item| member_of(item, operand)),
        other => member_of(other, operand),
    }
}

// A scalar operand acts as a singleton set.
fn member_of(needle: &Value, set: &Value) -> bool {
    match set {
        Value::Null => false,
        Value::Array(items) => items.iter().any(|item| scalar_eq(item, needle)),
        Value::Object(map) => needle.as_str().map(|key| map.contains_key(key)).unwrap_or(false),
        scalar => scalar_eq(scalar, needle),
    }
}

fn contains(answer: &Value, operand: &Value) -> bool {
    match answer {
        Value::Null => false,
        Value::Array(items) => items.iter().any(|item| scalar_eq(item, operand)),
        Value::Object(map) => operand.as_str().map(|key| map.contains_key(key)).unwrap_or(false),
        other => value_text(other).contains(&value_text(operand)),
    }
}

fn ordering(answer: &Value, operand: &Value) -> Option<std::cmp::Ordering> {
    let lhs = coerce_number(answer)?;
    let rhs = coerce_number(operand)?;
    lhs.partial_cmp(&rhs)
}

// Booleans coerce to 0/1 and numeric strings are parsed for ordering.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::Number(number) => number.as_f64(),
        Value::String(text) if !text.trim().is_empty() => text.trim().parse().ok(),
        _ => None,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
