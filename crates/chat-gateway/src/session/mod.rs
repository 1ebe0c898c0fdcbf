//! Client session
//!
//! The context that owns every piece of per-session state, and the pump that
//! feeds inbound packets through it.

mod context;
mod pump;

pub use context::ClientContext;
pub use pump::{PacketPump, PacketSource};
