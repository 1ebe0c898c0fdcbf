//! Domain errors - error types for the entity model

use thiserror::Error;

use crate::value_objects::SnowflakeParseError;

/// Entity model errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid emoji: {0}")]
    InvalidEmoji(&'static str),

    #[error("Invalid snowflake: {0}")]
    InvalidSnowflake(#[from] SnowflakeParseError),
}

impl DomainError {
    /// Get a short error code string for logs and error observers
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidEmoji(_) => "INVALID_EMOJI",
            Self::InvalidSnowflake(_) => "INVALID_SNOWFLAKE",
        }
    }
}
