//! # chat-cache
//!
//! In-memory entity cache for the real-time client.
//!
//! ## Features
//!
//! - **Per-entity locking**: every cached entity sits behind its own `RwLock`,
//!   so packets touching unrelated entities never contend
//! - **Snapshot reads**: readers get cloned snapshots taken under the entity's
//!   read lock, never a half-applied mutation
//! - **Message capacity**: the oldest messages are evicted once the configured
//!   capacity is exceeded
//!
//! ## Example
//!
//! ```ignore
//! use chat_cache::EntityCache;
//!
//! let cache = EntityCache::new(&config.cache);
//! cache.insert_channel(channel);
//!
//! if let Some(channel) = cache.channel(channel_id) {
//!     cache.update_message(message_id, Message::remove_all_reactions);
//! }
//! ```

pub mod store;

pub use store::{ChannelRemoval, EntityCache, GuildRemoval};
