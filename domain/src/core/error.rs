//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),
}

impl DomainError {
    /// Check if this error was caused by user input (as opposed to configuration)
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, DomainError::EmptyMessage)
    }
}
