#![allow(missing_docs)]

pub mod catalog;
pub mod expr;
pub mod resolve;
pub mod session;
pub mod spec;
pub mod validate;

pub use catalog::{
    Catalog, CategoryDef, Dimensions, MakeRecord, MediaRefs, ModelRecord, PhotoRules,
    catalog_schema, normalize_length, normalize_weight,
};
pub use expr::{
    Clause, Condition, Operator, VIRTUAL_CATEGORY, VIRTUAL_MAKE, VIRTUAL_MODEL, VirtualBindings,
    is_virtual,
};
pub use resolve::{
    QueuedInsertion, ResolveError, ResolvedField, ResolvedSchema, ResolvedSection, ScopeMerge,
    Selection, merge_scopes, resolve,
};
pub use session::{AnswerMap, FormSession, SessionError, SubmissionCheck};
pub use spec::{
    FieldDef, FieldKind, Insertion, QuestionDocument, Scope, ScopeOverride, Section,
    document_schema,
};
pub use validate::{ValidationError, validate_document, validate_resolved};
