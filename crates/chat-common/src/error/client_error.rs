//! Client error types
//!
//! Umbrella error for session setup and the replay binary. Errors local to a
//! single packet or listener never surface here; they go to error observers.

use crate::config::ConfigError;
use crate::telemetry::TracingError;

/// Client-wide error type
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // Telemetry errors
    #[error(transparent)]
    Tracing(#[from] TracingError),

    // Packet source errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl ClientError {
    /// Get an error code string
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Tracing(_) => "TRACING_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<anyhow::Error> for ClientError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
