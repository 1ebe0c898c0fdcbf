//! Gateway packet replay
//!
//! Reads newline-delimited dispatch envelopes (`{"t": .., "d": ..}`) from
//! stdin and runs them through the client pipeline with logging listeners.
//!
//! Run with:
//! ```bash
//! cargo run -p chat-gateway < packets.jsonl
//! ```
//!
//! Configuration is loaded from environment variables.

use async_trait::async_trait;
use chat_common::{try_init_tracing_with_config, ClientConfig, ClientResult, TracingConfig};
use chat_gateway::events::{
    ChannelCreateEvent, ChannelDeleteEvent, GuildCreateEvent, GuildDeleteEvent,
    MessageCreateEvent, MessageDeleteEvent, ReactionAddEvent, ReactionRemoveAllEvent,
    ReactionRemoveEmojiEvent, ReactionRemoveEvent, ReadyEvent,
};
use chat_gateway::listeners::ScopeKey;
use chat_gateway::protocol::Packet;
use chat_gateway::{ClientContext, PacketPump, PacketSource};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(code = e.code(), error = %e, "Replay failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> ClientResult<()> {
    let config = ClientConfig::from_env()?;

    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_client(&config)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        app = %config.app.name,
        env = ?config.app.env,
        workers = config.gateway.max_concurrent_handlers,
        message_capacity = config.cache.message_capacity,
        "Configuration loaded"
    );

    let ctx = ClientContext::new(config);
    register_logging_listeners(&ctx);

    let mut source = StdinSource::new();
    let received = PacketPump::new(ctx.clone()).run(&mut source).await;
    ctx.shutdown().await;

    if let Some(e) = source.failure.take() {
        return Err(e.into());
    }

    info!(
        received,
        dispatched = ctx.dispatcher().dispatch_count(),
        "Replay finished"
    );
    Ok(())
}

fn register_logging_listeners(ctx: &ClientContext) {
    let listeners = ctx.listeners();

    listeners.register::<ReadyEvent>(ScopeKey::Global, |e| {
        info!(user_id = %e.user_id, guilds = e.guild_ids.len(), "READY");
        Ok(())
    });
    listeners.register::<GuildCreateEvent>(ScopeKey::Global, |e| {
        info!(guild_id = %e.guild_id, name = %e.name, channels = e.channel_count, "GUILD_CREATE");
        Ok(())
    });
    listeners.register::<GuildDeleteEvent>(ScopeKey::Global, |e| {
        info!(guild_id = %e.guild_id, unavailable = e.unavailable, "GUILD_DELETE");
        Ok(())
    });
    listeners.register::<ChannelCreateEvent>(ScopeKey::Global, |e| {
        info!(channel_id = %e.channel.id, name = %e.channel.display_name(), "CHANNEL_CREATE");
        Ok(())
    });
    listeners.register::<ChannelDeleteEvent>(ScopeKey::Global, |e| {
        info!(channel_id = %e.channel.id, "CHANNEL_DELETE");
        Ok(())
    });
    listeners.register::<MessageCreateEvent>(ScopeKey::Global, |e| {
        info!(
            message_id = %e.message.id,
            author = %e.message.author.discriminated_name(),
            content = %e.message.preview(80),
            "MESSAGE_CREATE"
        );
        Ok(())
    });
    listeners.register::<MessageDeleteEvent>(ScopeKey::Global, |e| {
        info!(message_id = %e.message_id, cached = e.cached.is_some(), "MESSAGE_DELETE");
        Ok(())
    });
    listeners.register::<ReactionAddEvent>(ScopeKey::Global, |e| {
        info!(message_id = %e.message_id, user_id = %e.user_id, emoji = %e.emoji, "MESSAGE_REACTION_ADD");
        Ok(())
    });
    listeners.register::<ReactionRemoveEvent>(ScopeKey::Global, |e| {
        info!(message_id = %e.message_id, user_id = %e.user_id, emoji = %e.emoji, "MESSAGE_REACTION_REMOVE");
        Ok(())
    });
    listeners.register::<ReactionRemoveAllEvent>(ScopeKey::Global, |e| {
        info!(message_id = %e.message_id, channel_id = %e.channel_id, "MESSAGE_REACTION_REMOVE_ALL");
        Ok(())
    });
    listeners.register::<ReactionRemoveEmojiEvent>(ScopeKey::Global, |e| {
        info!(message_id = %e.message_id, emoji = %e.emoji, "MESSAGE_REACTION_REMOVE_EMOJI");
        Ok(())
    });
}

/// Newline-delimited JSON envelopes on stdin
struct StdinSource {
    lines: Lines<BufReader<Stdin>>,
    line: u64,
    /// Read error that ended the stream early
    failure: Option<std::io::Error>,
}

impl StdinSource {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            line: 0,
            failure: None,
        }
    }
}

#[async_trait]
impl PacketSource for StdinSource {
    async fn next_packet(&mut self) -> Option<Packet> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(text)) => {
                    self.line += 1;
                    if text.trim().is_empty() {
                        continue;
                    }
                    match Packet::from_json(&text) {
                        Ok(packet) => return Some(packet),
                        Err(e) => warn!(line = self.line, error = %e, "Skipping unparsable line"),
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    error!(line = self.line, error = %e, "Failed to read stdin");
                    self.failure = Some(e);
                    return None;
                }
            }
        }
    }
}
