//! Cached entities - mutable snapshots of remote state

mod author;
mod channel;
mod guild;
mod message;
mod reaction;
mod user;

pub use author::MessageAuthor;
pub use channel::{Channel, ChannelType};
pub use guild::Guild;
pub use message::Message;
pub use reaction::Reaction;
pub use user::User;
