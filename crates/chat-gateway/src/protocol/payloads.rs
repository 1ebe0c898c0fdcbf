//! Dispatch payload definitions
//!
//! Serde shapes for the packets that carry whole entities, plus the
//! conversions into cache entities.

use chat_core::{Channel, ChannelType, Emoji, Guild, Message, MessageAuthor, Reaction, Snowflake, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User object embedded in READY and MESSAGE_CREATE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    pub id: Snowflake,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl UserPayload {
    /// Convert into a cache user
    #[must_use]
    pub fn into_user(self) -> User {
        let mut user = User::new(self.id, self.username);
        user.discriminator = self.discriminator.filter(|d| d != "0");
        user.avatar = self.avatar;
        user.bot = self.bot;
        user
    }
}

/// Guild stub listed in READY before its GUILD_CREATE arrives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailableGuild {
    pub id: Snowflake,
    #[serde(default)]
    pub unavailable: bool,
}

/// Payload for READY
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyPayload {
    pub user: UserPayload,
    pub session_id: String,
    #[serde(default)]
    pub guilds: Vec<UnavailableGuild>,
}

/// Payload for CHANNEL_CREATE / CHANNEL_UPDATE / CHANNEL_DELETE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelPayload {
    pub id: Snowflake,
    #[serde(rename = "type", default)]
    pub kind: i16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Snowflake>,
}

impl ChannelPayload {
    /// Convert into a cache channel
    ///
    /// Channels listed inside GUILD_CREATE omit `guild_id`, so the
    /// enclosing guild is passed as a fallback.
    #[must_use]
    pub fn into_channel(self, fallback_guild: Option<Snowflake>) -> Channel {
        let channel_type = ChannelType::from(self.kind);
        let guild_id = if channel_type.is_guild() {
            self.guild_id.or(fallback_guild)
        } else {
            None
        };

        let mut channel = Channel::new(self.id, guild_id, channel_type);
        channel.name = self.name;
        channel.topic = self.topic;
        channel.position = self.position;
        channel.parent_id = self.parent_id;
        channel
    }
}

/// Payload for GUILD_CREATE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildPayload {
    pub id: Snowflake,
    pub name: String,
    pub owner_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub channels: Vec<ChannelPayload>,
}

impl GuildPayload {
    /// Split into the guild and its channels
    #[must_use]
    pub fn into_parts(self) -> (Guild, Vec<Channel>) {
        let mut guild = Guild::new(self.id, self.name, self.owner_id);
        guild.icon = self.icon;

        let guild_id = guild.id;
        let channels = self
            .channels
            .into_iter()
            .map(|c| c.into_channel(Some(guild_id)))
            .collect();

        (guild, channels)
    }
}

/// Payload for GUILD_DELETE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildDeletePayload {
    pub id: Snowflake,
    /// Set when the guild went away because of an outage rather than removal
    #[serde(default)]
    pub unavailable: bool,
}

/// Reaction summary attached to a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionCountPayload {
    pub emoji: Emoji,
    pub count: u32,
    #[serde(default)]
    pub me: bool,
}

/// Payload for MESSAGE_CREATE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePayload {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    pub author: UserPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<Snowflake>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reactions: Vec<ReactionCountPayload>,
}

impl MessagePayload {
    /// Author of the message; webhook posts carry the webhook id and display name
    #[must_use]
    pub fn author(&self) -> MessageAuthor {
        match self.webhook_id {
            Some(webhook_id) => MessageAuthor::Webhook {
                id: webhook_id,
                name: self.author.username.clone(),
                avatar: self.author.avatar.clone(),
            },
            None => MessageAuthor::User {
                id: self.author.id,
                username: self.author.username.clone(),
                discriminator: self.author.discriminator.clone().filter(|d| d != "0"),
                avatar: self.author.avatar.clone(),
                bot: self.author.bot,
            },
        }
    }

    /// Convert into a cache message
    #[must_use]
    pub fn into_message(self) -> Message {
        let author = self.author();
        let reactions = self
            .reactions
            .into_iter()
            .map(|r| Reaction::with_count(r.emoji, r.count, r.me))
            .collect();

        let mut message = Message::new(self.id, self.channel_id, author, self.content)
            .with_reactions(reactions);
        message.edited_at = self.edited_timestamp;
        message
    }
}

/// Payload for MESSAGE_UPDATE (partial message)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageUpdatePayload {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_timestamp: Option<DateTime<Utc>>,
}
