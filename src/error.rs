//! Error types for the evaluation engine.

use thiserror::Error;

/// Errors produced by the evaluation engine.
///
/// Scoring never fails for low-quality input; a score of 0 is a valid
/// result. These variants are reserved for structurally invalid records,
/// broken configuration, and report emission problems.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The input record is structurally invalid (empty query, negative or
    /// non-finite timing, mismatched comparison sets).
    #[error("invalid evaluation input: {reason}")]
    InvalidInput { reason: String },

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Markdown report rendering failed.
    #[error("report template error: {0}")]
    Template(#[from] tera::Error),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File I/O failed while reading runs or writing reports.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EvalError {
    /// Shorthand for an [`EvalError::InvalidInput`].
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        EvalError::InvalidInput {
            reason: reason.into(),
        }
    }
}
