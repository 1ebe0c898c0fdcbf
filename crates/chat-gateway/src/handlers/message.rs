//! Message packet handlers

use super::{resolve_channel, HandlerResult, PacketHandler};
use crate::events::{GatewayEventType, MessageCreateEvent, MessageDeleteEvent, MessageUpdateEvent};
use crate::listeners::{ScopeChain, ScopeKey};
use crate::protocol::{MessagePayload, MessageUpdatePayload, Packet};
use crate::session::ClientContext;
use chrono::Utc;

/// Handles MESSAGE_CREATE
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageCreateHandler;

impl PacketHandler for MessageCreateHandler {
    fn packet_type(&self) -> GatewayEventType {
        GatewayEventType::MessageCreate
    }

    fn handle(&self, ctx: &ClientContext, packet: &Packet) -> HandlerResult<()> {
        let payload: MessagePayload = packet.decode()?;

        let Some(channel) = resolve_channel(ctx, packet, payload.channel_id) else {
            return Ok(());
        };

        if payload.webhook_id.is_none() {
            ctx.cache().insert_user(payload.author.clone().into_user());
        }

        let guild_id = payload.guild_id.or(channel.owner_guild());
        let message = payload.into_message();
        ctx.cache().insert_message(message.clone());

        let entities: Vec<ScopeKey> = message
            .author
            .user_id()
            .map(ScopeKey::User)
            .into_iter()
            .collect();
        let chain = ScopeChain::for_channel(&channel, &entities);

        ctx.fan_out(&chain, MessageCreateEvent { guild_id, message })?;
        Ok(())
    }
}

/// Handles MESSAGE_UPDATE
///
/// Only content edits are applied to the cached message.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageUpdateHandler;

impl PacketHandler for MessageUpdateHandler {
    fn packet_type(&self) -> GatewayEventType {
        GatewayEventType::MessageUpdate
    }

    fn handle(&self, ctx: &ClientContext, packet: &Packet) -> HandlerResult<()> {
        let payload: MessageUpdatePayload = packet.decode()?;

        let Some(channel) = resolve_channel(ctx, packet, payload.channel_id) else {
            return Ok(());
        };

        if let Some(content) = &payload.content {
            let edited_at = payload.edited_timestamp.unwrap_or_else(Utc::now);
            let cached = ctx
                .cache()
                .update_message(payload.id, |message| message.edit(content.clone(), edited_at))
                .is_some();
            tracing::trace!(message_id = %payload.id, cached, "Message edited");
        }

        let chain = ScopeChain::for_channel(&channel, &[ScopeKey::Message(payload.id)]);
        let event = MessageUpdateEvent {
            message_id: payload.id,
            channel_id: payload.channel_id,
            guild_id: payload.guild_id.or(channel.owner_guild()),
            content: payload.content,
        };

        ctx.fan_out(&chain, event)?;
        Ok(())
    }
}

/// Handles MESSAGE_DELETE
///
/// Listeners attached to the message receive the delete event and are then dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageDeleteHandler;

impl PacketHandler for MessageDeleteHandler {
    fn packet_type(&self) -> GatewayEventType {
        GatewayEventType::MessageDelete
    }

    fn handle(&self, ctx: &ClientContext, packet: &Packet) -> HandlerResult<()> {
        let message_id = packet.snowflake("id")?;
        let channel_id = packet.snowflake("channel_id")?;
        let guild_id = packet.optional_snowflake("guild_id")?;

        let Some(channel) = resolve_channel(ctx, packet, channel_id) else {
            return Ok(());
        };

        let cached = ctx.cache().remove_message(message_id);

        let chain = ScopeChain::for_channel(&channel, &[ScopeKey::Message(message_id)]);
        let event = MessageDeleteEvent {
            message_id,
            channel_id,
            guild_id: guild_id.or(channel.owner_guild()),
            cached,
        };

        ctx.fan_out(&chain, event)?;
        ctx.listeners().remove_scope(ScopeKey::Message(message_id));
        Ok(())
    }
}
