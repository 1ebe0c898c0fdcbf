//! Dispatch error types

use crate::listeners::BoxError;
use thiserror::Error;

/// Failure of a single listener invocation
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listener returned an error
    #[error("listener failed: {0}")]
    Failed(BoxError),

    /// The listener panicked
    #[error("listener panicked: {0}")]
    Panicked(String),
}

impl ListenerError {
    /// Get error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Failed(_) => "LISTENER_FAILED",
            Self::Panicked(_) => "LISTENER_PANICKED",
        }
    }
}

/// Dispatch submission errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The dispatcher has been shut down
    #[error("dispatcher is shut down")]
    Closed,
}
