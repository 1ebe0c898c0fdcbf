//! Test fixtures and packet builders
//!
//! Provides reusable entities and gateway packets for integration tests.

use chat_core::{Channel, Guild, Message, MessageAuthor, Snowflake};
use chat_gateway::protocol::Packet;
use serde_json::json;

/// Guild used by the seeded fixtures
pub const GUILD_ID: Snowflake = Snowflake::new(10);
/// Guild text channel
pub const CHANNEL_ID: Snowflake = Snowflake::new(100);
/// Direct message channel
pub const DM_CHANNEL_ID: Snowflake = Snowflake::new(150);
/// Message in [`CHANNEL_ID`]
pub const MESSAGE_ID: Snowflake = Snowflake::new(200);
/// A user
pub const USER_A: Snowflake = Snowflake::new(301);
/// Another user
pub const USER_B: Snowflake = Snowflake::new(302);

pub fn guild(id: Snowflake) -> Guild {
    Guild::new(id, format!("guild-{id}"), USER_A)
}

pub fn text_channel(id: Snowflake, guild_id: Snowflake) -> Channel {
    Channel::new_text(id, guild_id, format!("channel-{id}"))
}

pub fn message(id: Snowflake, channel_id: Snowflake) -> Message {
    let author = MessageAuthor::User {
        id: USER_A,
        username: "alice".to_string(),
        discriminator: None,
        avatar: None,
        bot: false,
    };
    Message::new(id, channel_id, author, format!("message {id}"))
}

pub fn thumbs_up() -> serde_json::Value {
    json!({ "id": null, "name": "👍" })
}

/// MESSAGE_REACTION_REMOVE_ALL for a message
pub fn remove_all_packet(channel_id: Snowflake, message_id: Snowflake) -> Packet {
    Packet::new(
        "MESSAGE_REACTION_REMOVE_ALL",
        json!({
            "channel_id": channel_id.to_string(),
            "message_id": message_id.to_string(),
        }),
    )
}

/// MESSAGE_REACTION_ADD of 👍 by a user
pub fn reaction_add_packet(channel_id: Snowflake, message_id: Snowflake, user_id: Snowflake) -> Packet {
    Packet::new(
        "MESSAGE_REACTION_ADD",
        json!({
            "channel_id": channel_id.to_string(),
            "message_id": message_id.to_string(),
            "user_id": user_id.to_string(),
            "emoji": thumbs_up(),
        }),
    )
}

/// Parse a packet from a raw gateway envelope
pub fn envelope(raw: &str) -> Packet {
    Packet::from_json(raw).expect("fixture envelope must parse")
}
