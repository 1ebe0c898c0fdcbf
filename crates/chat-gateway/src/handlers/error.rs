//! Handler error types

use crate::dispatch::DispatchError;
use crate::protocol::DecodeError;
use thiserror::Error;

/// Handler error type
///
/// Aborts the packet being handled and nothing else.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Malformed packet
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The event could not be submitted
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

impl HandlerError {
    /// Get error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(DecodeError::MissingField(_)) => "MISSING_FIELD",
            Self::Decode(DecodeError::InvalidField { .. }) => "INVALID_FIELD",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Dispatch(_) => "DISPATCHER_CLOSED",
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
