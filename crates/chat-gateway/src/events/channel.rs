//! Channel events

use super::{Event, GatewayEventType};
use chat_core::Channel;

/// A channel was created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelCreateEvent {
    pub channel: Channel,
}

impl Event for ChannelCreateEvent {
    const KIND: GatewayEventType = GatewayEventType::ChannelCreate;
}

/// A channel was updated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelUpdateEvent {
    pub channel: Channel,
    /// Snapshot before the update, if the channel was cached
    pub previous: Option<Channel>,
}

impl Event for ChannelUpdateEvent {
    const KIND: GatewayEventType = GatewayEventType::ChannelUpdate;
}

/// A channel was deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDeleteEvent {
    pub channel: Channel,
}

impl Event for ChannelDeleteEvent {
    const KIND: GatewayEventType = GatewayEventType::ChannelDelete;
}
