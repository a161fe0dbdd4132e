//! Error types for model construction and entity manipulation.
//!
//! [`ModelError`] is raised while building a [`crate::Model`] and is fatal:
//! a half-built schema graph cannot serve entities. [`DataError`] is raised
//! per call on entities; callers decide whether to skip the record (`.ok()`)
//! or abort.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("property name `{property}` on schema `{schema}` is reserved")]
    ReservedProperty { schema: String, property: String },

    #[error("schema `{schema}` extends unknown schema `{parent}`")]
    MissingParent { schema: String, parent: String },

    #[error("property `{property}` has unknown range `{range}`")]
    MissingRange { property: String, range: String },

    #[error("property `{property}` declares a reverse but has no range")]
    MissingReverseRange { property: String },

    #[error("property `{property}` declares a reverse without a name")]
    UnnamedReverse { property: String },

    #[error("reverse `{reverse}` of `{property}` collides with a non-entity property")]
    ReverseConflict { property: String, reverse: String },

    #[error("property `{property}` has unknown type `{type_name}`")]
    UnknownType { property: String, type_name: String },

    #[error("schema inheritance cycle through `{schema}`")]
    Cycle { schema: String },

    #[error("schema definitions do not parse: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("unknown schema `{0}`")]
    UnknownSchema(String),

    #[error("unknown property `{property}` on schema `{schema}`")]
    UnknownProperty { schema: String, property: String },

    #[error("stub property `{0}` cannot be written directly")]
    StubProperty(String),

    #[error("`{property}` cannot reference the entity itself ({id})")]
    SelfReference { property: String, id: String },

    #[error("no common schema: {left} and {right}")]
    NoCommonSchema { left: String, right: String },

    #[error("invalid value for `{property}`: {value:?}")]
    InvalidValue { property: String, value: String },

    #[error("required property `{property}` missing on `{schema}`")]
    MissingRequired { schema: String, property: String },

    #[error("entity has no id")]
    MissingId,
}
