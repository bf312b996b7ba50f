//! Error types for window-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A search request or a constructed value failed validation.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid RRULE: {0}")]
    InvalidRule(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A calendar source could not supply data for a participant.
    #[error("Calendar source error for '{participant}': {message}")]
    Source {
        participant: String,
        message: String,
    },
}

impl EngineError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidParameters(message.into())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
