//! Inbound packet protocol
//!
//! Decoded dispatch packets and the payload shapes handlers decode them into.

mod packet;
mod payloads;

pub use packet::{DecodeError, Packet};
pub use payloads::{
    ChannelPayload, GuildDeletePayload, GuildPayload, MessagePayload, MessageUpdatePayload,
    ReactionCountPayload, ReadyPayload, UnavailableGuild, UserPayload,
};
