//! Record error types.

use std::fmt::{self, Display};

use thiserror::Error;

/// Error type for record validation, mutation attempts and key derivation.
///
/// Every variant is a synchronous, local failure. Nothing is retried and no
/// partially built record is ever returned alongside an error.
#[derive(Debug, Error)]
pub enum RecordError {
    /// One or more non-null fields were not supplied.
    #[error(
        "The following {} required: {}",
        plural(.fields, "field is", "fields are"),
        .fields.join(", ")
    )]
    MissingRequiredFields { fields: Vec<String> },

    /// One or more non-null fields were supplied as null.
    #[error(
        "The following {} can not be null: {}",
        plural(.fields, "field", "fields"),
        .fields.join(", ")
    )]
    NullRequiredFields { fields: Vec<String> },

    /// Keys outside the declared field whitelist were supplied.
    #[error(
        "Extra keys: {}. Only the following keys can be used in the record: {}",
        .extra.join(", "),
        .allowed.join(", ")
    )]
    UnexpectedFields {
        extra: Vec<String>,
        allowed: Vec<String>,
    },

    /// Declared fields were omitted from a kind that requires all of them.
    #[error(
        "Missing keys: {}. The following keys must be used in the record: {}",
        .missing.join(", "),
        .required.join(", ")
    )]
    MissingFields {
        missing: Vec<String>,
        required: Vec<String>,
    },

    /// A sealed record was asked to change.
    #[error("'{record}' object does not support {path} {mutation}")]
    Immutable {
        record: String,
        path: AccessPath,
        mutation: Mutation,
    },

    /// A hash-index field holds a value with no stable linear representation.
    #[error(
        "Fields that return unordered value types cannot be used to create hash keys. field: {field}"
    )]
    UnorderedValueType { field: String },

    /// JSON encoding failed.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for record operations.
pub type Result<T> = std::result::Result<T, RecordError>;

/// Which surface of a record a mutation attempt went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPath {
    /// A named side attribute.
    Attribute,
    /// A record field.
    Item,
}

impl Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessPath::Attribute => write!(f, "attribute"),
            AccessPath::Item => write!(f, "item"),
        }
    }
}

/// The kind of mutation that was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Assignment,
    Deletion,
}

impl Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Assignment => write!(f, "assignment"),
            Mutation::Deletion => write!(f, "deletion"),
        }
    }
}

impl RecordError {
    /// Returns true for the errors raised by the validator.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RecordError::MissingRequiredFields { .. }
                | RecordError::NullRequiredFields { .. }
                | RecordError::UnexpectedFields { .. }
                | RecordError::MissingFields { .. }
        )
    }

    /// Names of the fields this error is about, if any.
    pub fn fields(&self) -> &[String] {
        match self {
            RecordError::MissingRequiredFields { fields }
            | RecordError::NullRequiredFields { fields } => fields,
            RecordError::UnexpectedFields { extra, .. } => extra,
            RecordError::MissingFields { missing, .. } => missing,
            RecordError::UnorderedValueType { field } => std::slice::from_ref(field),
            RecordError::Immutable { .. } | RecordError::Json(_) => &[],
        }
    }
}

fn plural<'a>(names: &[String], one: &'a str, many: &'a str) -> &'a str {
    if names.len() == 1 { one } else { many }
}
