//! # chat-gateway
//!
//! Inbound event pipeline for the real-time client.
//!
//! ## Pipeline
//!
//! A [`protocol::Packet`] is routed by type tag to its
//! [`handlers::PacketHandler`], which mutates the entity cache and builds a
//! typed event. Listeners are gathered from the
//! [`listeners::ListenerRegistry`] along the event's scope chain (entity,
//! channel, guild, global) and handed to the [`dispatch::EventDispatcher`],
//! which runs them one event at a time per guild.
//!
//! ## Example
//!
//! ```ignore
//! use chat_gateway::events::ReactionRemoveAllEvent;
//! use chat_gateway::listeners::ScopeKey;
//! use chat_gateway::session::ClientContext;
//!
//! let ctx = ClientContext::new(config);
//! ctx.listeners().register::<ReactionRemoveAllEvent>(ScopeKey::Global, |event| {
//!     println!("reactions cleared on {}", event.message_id);
//!     Ok(())
//! });
//!
//! ctx.handle_packet(&packet);
//! ctx.shutdown().await;
//! ```

pub mod dispatch;
pub mod events;
pub mod handlers;
pub mod listeners;
pub mod protocol;
pub mod session;

pub use session::{ClientContext, PacketPump, PacketSource};
