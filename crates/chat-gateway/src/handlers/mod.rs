//! Packet handlers
//!
//! One handler per dispatch packet type. A handler decodes its packet,
//! applies it to the entity cache, builds the typed event from packet fields
//! and fans it out to the listeners gathered along the event's scope chain.

mod channel;
mod error;
mod guild;
mod message;
mod reaction;

pub use channel::{ChannelCreateHandler, ChannelDeleteHandler, ChannelUpdateHandler};
pub use error::{HandlerError, HandlerResult};
pub use guild::{GuildCreateHandler, GuildDeleteHandler, ReadyHandler};
pub use message::{MessageCreateHandler, MessageDeleteHandler, MessageUpdateHandler};
pub use reaction::{
    ReactionAddHandler, ReactionRemoveAllHandler, ReactionRemoveEmojiHandler,
    ReactionRemoveHandler,
};

use crate::events::GatewayEventType;
use crate::protocol::Packet;
use crate::session::ClientContext;
use chat_core::{Channel, Snowflake};
use std::collections::HashMap;

/// Decode-and-apply capability for one packet type
pub trait PacketHandler: Send + Sync {
    /// Packet type this handler is registered under
    fn packet_type(&self) -> GatewayEventType;

    /// Apply a packet
    ///
    /// A packet whose channel is not cached is dropped and returns `Ok`.
    fn handle(&self, ctx: &ClientContext, packet: &Packet) -> HandlerResult<()>;
}

/// Handlers keyed by packet type
pub struct HandlerRegistry {
    handlers: HashMap<GatewayEventType, Box<dyn PacketHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Create a registry with a handler for every known packet type
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ReadyHandler);
        registry.register(GuildCreateHandler);
        registry.register(GuildDeleteHandler);
        registry.register(ChannelCreateHandler);
        registry.register(ChannelUpdateHandler);
        registry.register(ChannelDeleteHandler);
        registry.register(MessageCreateHandler);
        registry.register(MessageUpdateHandler);
        registry.register(MessageDeleteHandler);
        registry.register(ReactionAddHandler);
        registry.register(ReactionRemoveHandler);
        registry.register(ReactionRemoveAllHandler);
        registry.register(ReactionRemoveEmojiHandler);
        registry
    }

    /// Register a handler, replacing any handler for the same packet type
    pub fn register(&mut self, handler: impl PacketHandler + 'static) {
        self.handlers.insert(handler.packet_type(), Box::new(handler));
    }

    /// Look up the handler for a packet type tag
    pub fn get(&self, tag: &str) -> Option<&dyn PacketHandler> {
        let kind = GatewayEventType::from_str(tag)?;
        self.handlers.get(&kind).map(|handler| &**handler)
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if no handlers are registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("HandlerRegistry").field("handlers", &kinds).finish()
    }
}

/// Look up the channel a packet targets, logging when it is not cached
fn resolve_channel(ctx: &ClientContext, packet: &Packet, channel_id: Snowflake) -> Option<Channel> {
    let channel = ctx.cache().channel(channel_id);
    if channel.is_none() {
        tracing::debug!(
            packet_type = %packet.event_type,
            channel_id = %channel_id,
            "Channel not cached, packet dropped"
        );
    }
    channel
}
