//! Error types for Stash.

use thiserror::Error;

/// Common error type for Stash.
#[derive(Error, Debug)]
pub enum StashError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Validation error attributable to a single input field.
    #[error("validation error: {field}: {message}")]
    FieldValidation {
        /// Name of the offending field.
        field: String,
        /// Human-readable message.
        message: String,
    },

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A write collided with a uniqueness constraint.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StashError {
    /// Create a field-level validation error.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        StashError::FieldValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for StashError {
    fn from(e: sqlx::Error) -> Self {
        StashError::Database(e.to_string())
    }
}

/// Result type alias for Stash operations.
pub type Result<T> = std::result::Result<T, StashError>;
