//! Error types for the ConsoleDesk engine

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed date/time string reached the time basis. Callers in the
    /// pricing path must skip the offending entry, never abort the whole
    /// computation.
    #[error("Invalid time input: {0}")]
    InvalidTimeInput(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Transient or business-rule failure on submit; the form returns to
    /// the editable state with entered data intact.
    #[error("Submission failed: {0}")]
    RecoverableSubmission(String),

    /// Authoritative slot state has diverged from the local selection.
    /// A forced refresh of slot availability is required before retry.
    #[error("Slot conflict: {message}")]
    SlotConflict {
        message: String,
        failed_slot_ids: Vec<i64>,
    },

    #[error("External service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ServiceUnavailable(err.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
