//! # chat-core
//!
//! Entity model for the real-time client: the mutable snapshots held by the
//! entity cache (messages, channels, guilds, users), reaction records, emoji
//! identity, and snowflake ids.
//! This crate has zero dependencies on the gateway or cache layers.

pub mod entities;
pub mod error;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Channel, ChannelType, Guild, Message, MessageAuthor, Reaction, User};
pub use error::DomainError;
pub use value_objects::{Emoji, Snowflake, SnowflakeParseError};
