//! Message author - either a user account or a webhook

use crate::value_objects::Snowflake;

/// Who sent a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageAuthor {
    /// A regular user or bot account
    User {
        id: Snowflake,
        username: String,
        discriminator: Option<String>,
        avatar: Option<String>,
        bot: bool,
    },
    /// A webhook posting under a custom name
    Webhook {
        id: Snowflake,
        name: String,
        avatar: Option<String>,
    },
}

impl MessageAuthor {
    /// Get the author id (user id or webhook id)
    pub fn id(&self) -> Snowflake {
        match self {
            Self::User { id, .. } | Self::Webhook { id, .. } => *id,
        }
    }

    /// Get the author's name
    pub fn name(&self) -> &str {
        match self {
            Self::User { username, .. } => username,
            Self::Webhook { name, .. } => name,
        }
    }

    /// Get the discriminator, if the author is a user that has one
    pub fn discriminator(&self) -> Option<&str> {
        match self {
            Self::User { discriminator, .. } => discriminator.as_deref(),
            Self::Webhook { .. } => None,
        }
    }

    /// Get the avatar hash
    pub fn avatar(&self) -> Option<&str> {
        match self {
            Self::User { avatar, .. } | Self::Webhook { avatar, .. } => avatar.as_deref(),
        }
    }

    /// Get the discriminated name, e.g. `name#1234`, or just the name
    pub fn discriminated_name(&self) -> String {
        match self.discriminator() {
            Some(discriminator) => format!("{}#{discriminator}", self.name()),
            None => self.name().to_string(),
        }
    }

    /// Check if the author is a user account
    #[inline]
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    /// Check if the author is a webhook
    #[inline]
    pub fn is_webhook(&self) -> bool {
        matches!(self, Self::Webhook { .. })
    }

    /// Check if the author is a bot account
    pub fn is_bot(&self) -> bool {
        matches!(self, Self::User { bot: true, .. })
    }

    /// Get the user id if the author is a user
    pub fn user_id(&self) -> Option<Snowflake> {
        match self {
            Self::User { id, .. } => Some(*id),
            Self::Webhook { .. } => None,
        }
    }

    /// Check if the author is the connected account
    pub fn is_yourself(&self, current_user: Option<Snowflake>) -> bool {
        current_user.is_some() && self.user_id() == current_user
    }
}
