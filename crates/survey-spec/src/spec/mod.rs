pub mod document;
pub mod field;

pub use document::{Insertion, QuestionDocument, Scope, ScopeOverride, document_schema};
pub use field::{FieldDef, FieldKind, Section};
