//! Event dispatch
//!
//! Runs gathered listeners for one event at a time per scope root, isolating
//! listener failures and reporting them to an [`ErrorObserver`].

mod dispatcher;
mod error;
mod observer;

pub use dispatcher::{EventDispatcher, Invocation};
pub use error::{DispatchError, ListenerError};
pub use observer::{ErrorObserver, ListenerFailure, TracingErrorObserver};

use chat_core::Snowflake;
use std::fmt;

/// Context dispatches are serialized under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeRoot {
    /// Events inside one guild
    Guild(Snowflake),
    /// Events with no owning guild
    Global,
}

impl ScopeRoot {
    /// Root for an optional owning guild
    #[must_use]
    pub fn for_owner(owner: Option<Snowflake>) -> Self {
        owner.map_or(Self::Global, Self::Guild)
    }
}

impl fmt::Display for ScopeRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guild(id) => write!(f, "guild:{id}"),
            Self::Global => f.write_str("global"),
        }
    }
}
