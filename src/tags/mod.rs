//! Tag grammar parsing
//!
//! Two independent grammars, one raw string each:
//! - attribute tags (`key:value;flag`) describing column and table facts
//! - relationship tags (`kind:Target,option:value,toggle`) describing associations
//!
//! [`TagParser`] owns the per-run parse cache. Semantic checks over parsed
//! attribute sets live in [`rules`] and run during validation, not parsing.

mod attribute;
mod parser;
mod relationship;
pub mod rules;

pub use attribute::{AttributeSet, MULTI_VALUE_SEPARATOR};
pub use parser::{CacheStats, TagParser};
pub use relationship::{
    DependentAction, RelationKind, RelationOptions, Relationship, RelationshipDescriptor,
    DEFAULT_IDENTITY_COLUMN,
};

use thiserror::Error;

/// Errors raised while parsing a relationship tag
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagParseError {
    #[error("relationship tag is empty")]
    EmptyTag,

    #[error("first segment `{segment}` must be `kind:Target`")]
    MissingKind { segment: String },

    #[error("unknown relationship kind `{kind}` (expected belongs_to, has_one, has_many or many_to_many)")]
    UnknownKind { kind: String },

    #[error("{kind} relationship is missing its target entity")]
    MissingTarget { kind: RelationKind },

    #[error("malformed option segment `{segment}`")]
    MalformedOption { segment: String },

    #[error("unknown relationship option `{key}`")]
    UnknownOption { key: String },

    #[error("unknown bare token `{token}`")]
    UnknownToken { token: String },

    #[error("option `{key}` given more than once")]
    DuplicateOption { key: String },

    #[error("invalid value `{value}` for `{key}` (expected {expected})")]
    InvalidOptionValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("option `{key}` does not apply to {kind} relationships")]
    OptionNotApplicable { key: String, kind: RelationKind },

    #[error("{kind} relationship requires `{field}`")]
    MissingRequiredField {
        kind: RelationKind,
        field: &'static str,
    },
}
