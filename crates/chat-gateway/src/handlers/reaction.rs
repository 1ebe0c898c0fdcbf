//! Reaction packet handlers

use super::{resolve_channel, HandlerResult, PacketHandler};
use crate::events::{
    GatewayEventType, ReactionAddEvent, ReactionRemoveAllEvent, ReactionRemoveEmojiEvent,
    ReactionRemoveEvent,
};
use crate::listeners::{ScopeChain, ScopeKey};
use crate::protocol::Packet;
use crate::session::ClientContext;
use chat_core::Message;

/// Handles MESSAGE_REACTION_ADD
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactionAddHandler;

impl PacketHandler for ReactionAddHandler {
    fn packet_type(&self) -> GatewayEventType {
        GatewayEventType::MessageReactionAdd
    }

    fn handle(&self, ctx: &ClientContext, packet: &Packet) -> HandlerResult<()> {
        let channel_id = packet.snowflake("channel_id")?;
        let message_id = packet.snowflake("message_id")?;
        let user_id = packet.snowflake("user_id")?;
        let emoji = packet.emoji("emoji")?;
        let guild_id = packet.optional_snowflake("guild_id")?;

        let Some(channel) = resolve_channel(ctx, packet, channel_id) else {
            return Ok(());
        };

        let is_me = ctx.cache().is_current_user(user_id);
        let cached = ctx
            .cache()
            .update_message(message_id, |message| message.add_reaction(&emoji, user_id, is_me))
            .is_some();

        tracing::trace!(message_id = %message_id, emoji = %emoji, cached, "Reaction added");

        let chain = ScopeChain::for_channel(
            &channel,
            &[ScopeKey::Message(message_id), ScopeKey::User(user_id)],
        );
        let event = ReactionAddEvent {
            message_id,
            channel_id,
            guild_id: guild_id.or(channel.owner_guild()),
            user_id,
            emoji,
        };

        ctx.fan_out(&chain, event)?;
        Ok(())
    }
}

/// Handles MESSAGE_REACTION_REMOVE
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactionRemoveHandler;

impl PacketHandler for ReactionRemoveHandler {
    fn packet_type(&self) -> GatewayEventType {
        GatewayEventType::MessageReactionRemove
    }

    fn handle(&self, ctx: &ClientContext, packet: &Packet) -> HandlerResult<()> {
        let channel_id = packet.snowflake("channel_id")?;
        let message_id = packet.snowflake("message_id")?;
        let user_id = packet.snowflake("user_id")?;
        let emoji = packet.emoji("emoji")?;
        let guild_id = packet.optional_snowflake("guild_id")?;

        let Some(channel) = resolve_channel(ctx, packet, channel_id) else {
            return Ok(());
        };

        let is_me = ctx.cache().is_current_user(user_id);
        let cached = ctx
            .cache()
            .update_message(message_id, |message| {
                message.remove_reaction(&emoji, user_id, is_me);
            })
            .is_some();

        tracing::trace!(message_id = %message_id, emoji = %emoji, cached, "Reaction removed");

        let chain = ScopeChain::for_channel(
            &channel,
            &[ScopeKey::Message(message_id), ScopeKey::User(user_id)],
        );
        let event = ReactionRemoveEvent {
            message_id,
            channel_id,
            guild_id: guild_id.or(channel.owner_guild()),
            user_id,
            emoji,
        };

        ctx.fan_out(&chain, event)?;
        Ok(())
    }
}

/// Handles MESSAGE_REACTION_REMOVE_ALL
///
/// Clears the cached message's reactions when it is cached; listeners are
/// notified either way.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactionRemoveAllHandler;

impl PacketHandler for ReactionRemoveAllHandler {
    fn packet_type(&self) -> GatewayEventType {
        GatewayEventType::MessageReactionRemoveAll
    }

    fn handle(&self, ctx: &ClientContext, packet: &Packet) -> HandlerResult<()> {
        let channel_id = packet.snowflake("channel_id")?;
        let message_id = packet.snowflake("message_id")?;
        let guild_id = packet.optional_snowflake("guild_id")?;

        let Some(channel) = resolve_channel(ctx, packet, channel_id) else {
            return Ok(());
        };

        let cached = ctx
            .cache()
            .update_message(message_id, Message::remove_all_reactions)
            .is_some();

        tracing::trace!(message_id = %message_id, cached, "All reactions removed");

        let chain = ScopeChain::for_channel(&channel, &[ScopeKey::Message(message_id)]);
        let event = ReactionRemoveAllEvent {
            message_id,
            channel_id,
            guild_id: guild_id.or(channel.owner_guild()),
        };

        ctx.fan_out(&chain, event)?;
        Ok(())
    }
}

/// Handles MESSAGE_REACTION_REMOVE_EMOJI
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactionRemoveEmojiHandler;

impl PacketHandler for ReactionRemoveEmojiHandler {
    fn packet_type(&self) -> GatewayEventType {
        GatewayEventType::MessageReactionRemoveEmoji
    }

    fn handle(&self, ctx: &ClientContext, packet: &Packet) -> HandlerResult<()> {
        let channel_id = packet.snowflake("channel_id")?;
        let message_id = packet.snowflake("message_id")?;
        let emoji = packet.emoji("emoji")?;
        let guild_id = packet.optional_snowflake("guild_id")?;

        let Some(channel) = resolve_channel(ctx, packet, channel_id) else {
            return Ok(());
        };

        let cached = ctx
            .cache()
            .update_message(message_id, |message| message.remove_reactions_by_emoji(&emoji))
            .is_some();

        tracing::trace!(message_id = %message_id, emoji = %emoji, cached, "Emoji reactions removed");

        let chain = ScopeChain::for_channel(&channel, &[ScopeKey::Message(message_id)]);
        let event = ReactionRemoveEmojiEvent {
            message_id,
            channel_id,
            guild_id: guild_id.or(channel.owner_guild()),
            emoji,
        };

        ctx.fan_out(&chain, event)?;
        Ok(())
    }
}
