//! Gateway events
//!
//! Typed event values handed to listeners. Each event is built from packet
//! fields after the cache has been mutated, and carries the ids listeners need
//! to re-resolve current state from the cache.

mod channel;
mod event_types;
mod guild;
mod message;
mod reaction;

pub use channel::{ChannelCreateEvent, ChannelDeleteEvent, ChannelUpdateEvent};
pub use event_types::GatewayEventType;
pub use guild::{GuildCreateEvent, GuildDeleteEvent, ReadyEvent};
pub use message::{MessageCreateEvent, MessageDeleteEvent, MessageUpdateEvent};
pub use reaction::{
    ReactionAddEvent, ReactionRemoveAllEvent, ReactionRemoveEmojiEvent, ReactionRemoveEvent,
};

use std::fmt::Debug;

/// A typed event that listeners can subscribe to
pub trait Event: Debug + Send + Sync + 'static {
    /// The packet type this event is produced from
    const KIND: GatewayEventType;
}
