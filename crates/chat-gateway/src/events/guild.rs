//! Guild and connection events

use super::{Event, GatewayEventType};
use chat_core::Snowflake;

/// The session is ready
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyEvent {
    pub user_id: Snowflake,
    pub session_id: String,
    /// Guilds that will follow as GUILD_CREATE packets
    pub guild_ids: Vec<Snowflake>,
}

impl Event for ReadyEvent {
    const KIND: GatewayEventType = GatewayEventType::Ready;
}

/// A guild became available or was joined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildCreateEvent {
    pub guild_id: Snowflake,
    pub name: String,
    pub channel_count: usize,
}

impl Event for GuildCreateEvent {
    const KIND: GatewayEventType = GatewayEventType::GuildCreate;
}

/// A guild was left or became unavailable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildDeleteEvent {
    pub guild_id: Snowflake,
    /// True for an outage, false when the client left or the guild was deleted
    pub unavailable: bool,
}

impl Event for GuildDeleteEvent {
    const KIND: GatewayEventType = GatewayEventType::GuildDelete;
}
