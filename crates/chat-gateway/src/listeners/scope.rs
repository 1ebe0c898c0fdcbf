//! Listener scopes

use crate::dispatch::ScopeRoot;
use chat_core::{Channel, Snowflake};
use std::fmt;

/// Where a listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKey {
    /// A single message
    Message(Snowflake),
    /// A single user
    User(Snowflake),
    /// A channel
    Channel(Snowflake),
    /// A guild (server)
    Guild(Snowflake),
    /// Every event of the kind
    Global,
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(id) => write!(f, "message:{id}"),
            Self::User(id) => write!(f, "user:{id}"),
            Self::Channel(id) => write!(f, "channel:{id}"),
            Self::Guild(id) => write!(f, "guild:{id}"),
            Self::Global => f.write_str("global"),
        }
    }
}

/// Ordered scopes to gather listeners from, plus the root to dispatch under
///
/// Scopes run from the most specific entity outwards and always end with
/// [`ScopeKey::Global`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeChain {
    scopes: Vec<ScopeKey>,
    root: ScopeRoot,
}

impl ScopeChain {
    /// Chain for an event inside a channel
    ///
    /// `entities` come first (message, then user), followed by the channel,
    /// the owning guild when the channel is guild-bound, and the global scope.
    #[must_use]
    pub fn for_channel(channel: &Channel, entities: &[ScopeKey]) -> Self {
        let owner = channel.owner_guild();

        let mut scopes = Vec::with_capacity(entities.len() + 3);
        scopes.extend_from_slice(entities);
        scopes.push(ScopeKey::Channel(channel.id));
        if let Some(guild_id) = owner {
            scopes.push(ScopeKey::Guild(guild_id));
        }
        scopes.push(ScopeKey::Global);

        Self {
            scopes,
            root: ScopeRoot::for_owner(owner),
        }
    }

    /// Chain for a guild-level event
    #[must_use]
    pub fn for_guild(guild_id: Snowflake) -> Self {
        Self {
            scopes: vec![ScopeKey::Guild(guild_id), ScopeKey::Global],
            root: ScopeRoot::Guild(guild_id),
        }
    }

    /// Chain for a session-level event
    #[must_use]
    pub fn global() -> Self {
        Self {
            scopes: vec![ScopeKey::Global],
            root: ScopeRoot::Global,
        }
    }

    /// Scopes in gather order
    #[must_use]
    pub fn scopes(&self) -> &[ScopeKey] {
        &self.scopes
    }

    /// Dispatch root
    #[must_use]
    pub fn root(&self) -> ScopeRoot {
        self.root
    }
}
