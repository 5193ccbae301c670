//! Error types for the merge engine.
//!
//! These are hard failures: they mean an entity's schema and its accessors
//! disagree. Expected validation failures in a patch document never surface
//! here; they become diagnostics on a [`MergeOutcome`](crate::MergeOutcome).

use crate::FieldType;
use thiserror::Error;

/// Metadata misconfiguration detected while merging.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("entity '{entity}' declares field '{field}' but has no accessor for it")]
    MissingAccessor { entity: String, field: String },

    #[error("field '{entity}.{field}' is declared as {expected} but its accessor exposes {actual}")]
    KindMismatch {
        entity: String,
        field: String,
        expected: String,
        actual: String,
    },

    #[error("cannot assign {got} to a field of type {expected}")]
    ScalarMismatch { expected: String, got: String },

    #[error("null assigned to non-nullable field of type {0}")]
    NullNotAllowed(String),

    #[error("entity '{entity}' has an invalid identity key: {reason}")]
    InvalidKey { entity: String, reason: String },

    #[error("field '{field}' expects entity type '{expected}', found '{actual}'")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },
}

impl Error {
    /// Error for an accessor asked about a field it does not handle.
    pub fn missing_accessor(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Error::MissingAccessor {
            entity: entity.into(),
            field: field.into(),
        }
    }

    pub(crate) fn scalar_mismatch(expected: FieldType, got: impl Into<String>) -> Self {
        Error::ScalarMismatch {
            expected: expected.to_string(),
            got: got.into(),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
