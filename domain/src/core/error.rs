//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("No models configured for the council")]
    NoModels,

    #[error("Too many council models: {0} (anonymized labels support at most 26)")]
    TooManyModels(usize),

    #[error("Model '{0}' appears more than once in the council")]
    DuplicateModel(String),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Unknown strategy '{name}'. Available: {available}")]
    UnknownStrategy { name: String, available: String },

    #[error("Invalid strategy parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid feedback value {0} (expected -1, 0 or 1)")]
    InvalidFeedback(i64),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }

    /// Whether the error was caused by caller input (never worth retrying)
    pub fn is_client_input(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidQuestion(_)
                | DomainError::UnknownStrategy { .. }
                | DomainError::InvalidParameter { .. }
                | DomainError::InvalidFeedback(_)
                | DomainError::TooManyModels(_)
                | DomainError::DuplicateModel(_)
        )
    }
}
