//! Message events

use super::{Event, GatewayEventType};
use chat_core::{Message, Snowflake};

/// A message was sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCreateEvent {
    pub guild_id: Option<Snowflake>,
    /// The message as decoded from the packet
    pub message: Message,
}

impl Event for MessageCreateEvent {
    const KIND: GatewayEventType = GatewayEventType::MessageCreate;
}

/// A message was edited
///
/// Only the fields present in the packet are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageUpdateEvent {
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub content: Option<String>,
}

impl Event for MessageUpdateEvent {
    const KIND: GatewayEventType = GatewayEventType::MessageUpdate;
}

/// A message was deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDeleteEvent {
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    /// Last cached snapshot of the message, if it was cached
    pub cached: Option<Message>,
}

impl Event for MessageDeleteEvent {
    const KIND: GatewayEventType = GatewayEventType::MessageDelete;
}
