//! Channel packet handlers
//!
//! Channel packets carry the whole channel, so they never depend on the
//! channel already being cached.

use super::{HandlerResult, PacketHandler};
use crate::events::{ChannelCreateEvent, ChannelDeleteEvent, ChannelUpdateEvent, GatewayEventType};
use crate::listeners::{ScopeChain, ScopeKey};
use crate::protocol::{ChannelPayload, Packet};
use crate::session::ClientContext;
use chat_core::Channel;

fn decode_channel(packet: &Packet) -> HandlerResult<Channel> {
    let payload: ChannelPayload = packet.decode()?;
    Ok(payload.into_channel(None))
}

/// Handles CHANNEL_CREATE
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelCreateHandler;

impl PacketHandler for ChannelCreateHandler {
    fn packet_type(&self) -> GatewayEventType {
        GatewayEventType::ChannelCreate
    }

    fn handle(&self, ctx: &ClientContext, packet: &Packet) -> HandlerResult<()> {
        let channel = decode_channel(packet)?;
        ctx.cache().insert_channel(channel.clone());

        let chain = ScopeChain::for_channel(&channel, &[]);
        ctx.fan_out(&chain, ChannelCreateEvent { channel })?;
        Ok(())
    }
}

/// Handles CHANNEL_UPDATE
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelUpdateHandler;

impl PacketHandler for ChannelUpdateHandler {
    fn packet_type(&self) -> GatewayEventType {
        GatewayEventType::ChannelUpdate
    }

    fn handle(&self, ctx: &ClientContext, packet: &Packet) -> HandlerResult<()> {
        let channel = decode_channel(packet)?;
        let previous = ctx.cache().channel(channel.id);
        ctx.cache().insert_channel(channel.clone());

        let chain = ScopeChain::for_channel(&channel, &[]);
        ctx.fan_out(&chain, ChannelUpdateEvent { channel, previous })?;
        Ok(())
    }
}

/// Handles CHANNEL_DELETE
///
/// Cached messages of the channel go with it. Listeners scoped to the channel
/// or to any of those messages are dropped after they receive the event.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelDeleteHandler;

impl PacketHandler for ChannelDeleteHandler {
    fn packet_type(&self) -> GatewayEventType {
        GatewayEventType::ChannelDelete
    }

    fn handle(&self, ctx: &ClientContext, packet: &Packet) -> HandlerResult<()> {
        let channel = decode_channel(packet)?;
        let removal = ctx.cache().remove_channel(channel.id);

        let chain = ScopeChain::for_channel(&channel, &[]);
        let scope = ScopeKey::Channel(channel.id);
        ctx.fan_out(&chain, ChannelDeleteEvent { channel })?;

        ctx.listeners().remove_scope(scope);
        for message_id in removal.message_ids {
            ctx.listeners().remove_scope(ScopeKey::Message(message_id));
        }
        Ok(())
    }
}
