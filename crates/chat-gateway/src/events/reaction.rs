//! Reaction events

use super::{Event, GatewayEventType};
use chat_core::{Emoji, Snowflake};

/// A user added a reaction to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionAddEvent {
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub user_id: Snowflake,
    pub emoji: Emoji,
}

impl Event for ReactionAddEvent {
    const KIND: GatewayEventType = GatewayEventType::MessageReactionAdd;
}

/// A user removed their reaction from a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionRemoveEvent {
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub user_id: Snowflake,
    pub emoji: Emoji,
}

impl Event for ReactionRemoveEvent {
    const KIND: GatewayEventType = GatewayEventType::MessageReactionRemove;
}

/// All reactions were removed from a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionRemoveAllEvent {
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
}

impl Event for ReactionRemoveAllEvent {
    const KIND: GatewayEventType = GatewayEventType::MessageReactionRemoveAll;
}

/// Every reaction using one emoji was removed from a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionRemoveEmojiEvent {
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub emoji: Emoji,
}

impl Event for ReactionRemoveEmojiEvent {
    const KIND: GatewayEventType = GatewayEventType::MessageReactionRemoveEmoji;
}
