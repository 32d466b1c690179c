//! Contract errors.
//!
//! Validation failures are not errors: they are data attached to fields
//! (see [`crate::validation::ValidationError`]). `FormError` covers misuse of
//! the API and configuration loading.

use thiserror::Error;

use crate::model::{Field, ValueKind};

/// Errors returned by fallible form operations.
#[derive(Debug, Error)]
pub enum FormError {
    /// A field name did not match any registration field.
    #[error("unknown field `{0}`")]
    UnknownField(String),

    /// A value of the wrong kind was written to a field.
    #[error("field `{field}` expects a {expected} value, got {found}")]
    TypeMismatch {
        field: Field,
        expected: ValueKind,
        found: ValueKind,
    },

    /// The configuration document could not be parsed.
    #[error("invalid form configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("failed to read form configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for form operations.
pub type FormResult<T> = Result<T, FormError>;
