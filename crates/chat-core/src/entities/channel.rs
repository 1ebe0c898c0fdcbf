//! Channel entity - represents a text channel, DM, or category

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Channel type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum ChannelType {
    /// Guild text channel
    #[default]
    GuildText = 0,
    /// Direct message between users
    Dm = 1,
    /// Guild voice channel
    GuildVoice = 2,
    /// Direct message between multiple users
    GroupDm = 3,
    /// Guild category for organizing channels
    GuildCategory = 4,
}

impl ChannelType {
    /// Whether channels of this type live inside a guild
    #[inline]
    #[must_use]
    pub fn is_guild(self) -> bool {
        !matches!(self, Self::Dm | Self::GroupDm)
    }
}

impl From<i16> for ChannelType {
    fn from(value: i16) -> Self {
        match value {
            1 => Self::Dm,
            2 => Self::GuildVoice,
            3 => Self::GroupDm,
            4 => Self::GuildCategory,
            _ => Self::GuildText, // Default for 0 and unknown values
        }
    }
}

/// Channel entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub name: Option<String>,
    pub channel_type: ChannelType,
    pub topic: Option<String>,
    pub position: i32,
    pub parent_id: Option<Snowflake>,
}

impl Channel {
    /// Create a new channel of any type
    #[must_use]
    pub fn new(id: Snowflake, guild_id: Option<Snowflake>, channel_type: ChannelType) -> Self {
        Self {
            id,
            guild_id,
            name: None,
            channel_type,
            topic: None,
            position: 0,
            parent_id: None,
        }
    }

    /// Create a new guild text channel
    #[must_use]
    pub fn new_text(id: Snowflake, guild_id: Snowflake, name: String) -> Self {
        Self {
            name: Some(name),
            ..Self::new(id, Some(guild_id), ChannelType::GuildText)
        }
    }

    /// Create a new DM channel
    #[must_use]
    pub fn new_dm(id: Snowflake) -> Self {
        Self::new(id, None, ChannelType::Dm)
    }

    /// The guild that owns this channel, if it is guild-bound
    ///
    /// Scope fan-out and dispatch ordering are both derived from this value.
    #[inline]
    #[must_use]
    pub fn owner_guild(&self) -> Option<Snowflake> {
        self.guild_id
    }

    /// Get display name (channel name or fallback for DMs)
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Direct Message")
    }
}
