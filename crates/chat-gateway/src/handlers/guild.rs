//! Session and guild packet handlers

use super::{HandlerResult, PacketHandler};
use crate::dispatch::ScopeRoot;
use crate::events::{GatewayEventType, GuildCreateEvent, GuildDeleteEvent, ReadyEvent};
use crate::listeners::{ScopeChain, ScopeKey};
use crate::protocol::{GuildDeletePayload, GuildPayload, Packet, ReadyPayload};
use crate::session::ClientContext;

/// Handles READY
///
/// Records the current user so reactions can track `me`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadyHandler;

impl PacketHandler for ReadyHandler {
    fn packet_type(&self) -> GatewayEventType {
        GatewayEventType::Ready
    }

    fn handle(&self, ctx: &ClientContext, packet: &Packet) -> HandlerResult<()> {
        let payload: ReadyPayload = packet.decode()?;
        let user = payload.user.into_user();
        let user_id = user.id;

        ctx.cache().set_current_user(user_id);
        ctx.cache().insert_user(user);

        tracing::info!(
            user_id = %user_id,
            session_id = %payload.session_id,
            guilds = payload.guilds.len(),
            "Session ready"
        );

        let event = ReadyEvent {
            user_id,
            session_id: payload.session_id,
            guild_ids: payload.guilds.iter().map(|g| g.id).collect(),
        };

        ctx.fan_out(&ScopeChain::global(), event)?;
        Ok(())
    }
}

/// Handles GUILD_CREATE
#[derive(Debug, Clone, Copy, Default)]
pub struct GuildCreateHandler;

impl PacketHandler for GuildCreateHandler {
    fn packet_type(&self) -> GatewayEventType {
        GatewayEventType::GuildCreate
    }

    fn handle(&self, ctx: &ClientContext, packet: &Packet) -> HandlerResult<()> {
        let payload: GuildPayload = packet.decode()?;
        let (guild, channels) = payload.into_parts();

        let event = GuildCreateEvent {
            guild_id: guild.id,
            name: guild.name.clone(),
            channel_count: channels.len(),
        };

        ctx.cache().insert_guild(guild);
        for channel in channels {
            ctx.cache().insert_channel(channel);
        }

        ctx.fan_out(&ScopeChain::for_guild(event.guild_id), event)?;
        Ok(())
    }
}

/// Handles GUILD_DELETE
///
/// An outage only marks the guild unavailable. Leaving the guild removes it
/// with its channels and their messages, drops listeners scoped to any of
/// them, and retires the guild's dispatch queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuildDeleteHandler;

impl PacketHandler for GuildDeleteHandler {
    fn packet_type(&self) -> GatewayEventType {
        GatewayEventType::GuildDelete
    }

    fn handle(&self, ctx: &ClientContext, packet: &Packet) -> HandlerResult<()> {
        let payload: GuildDeletePayload = packet.decode()?;
        let guild_id = payload.id;
        let chain = ScopeChain::for_guild(guild_id);
        let event = GuildDeleteEvent {
            guild_id,
            unavailable: payload.unavailable,
        };

        if payload.unavailable {
            ctx.cache()
                .update_guild(guild_id, |guild| guild.unavailable = true);
            ctx.fan_out(&chain, event)?;
            return Ok(());
        }

        let removal = ctx.cache().remove_guild(guild_id);
        ctx.fan_out(&chain, event)?;

        let listeners = ctx.listeners();
        listeners.remove_scope(ScopeKey::Guild(guild_id));
        for channel_id in removal.channel_ids {
            listeners.remove_scope(ScopeKey::Channel(channel_id));
        }
        for message_id in removal.message_ids {
            listeners.remove_scope(ScopeKey::Message(message_id));
        }

        ctx.dispatcher().retire(ScopeRoot::Guild(guild_id));
        Ok(())
    }
}
