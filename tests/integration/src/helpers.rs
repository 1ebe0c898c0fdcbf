//! Test helpers for integration tests
//!
//! Provides a client context with seeded cache state, listeners that record
//! what they see, and an error observer that keeps failures for assertions.

use std::sync::Arc;

use chat_common::ClientConfig;
use chat_gateway::dispatch::{ErrorObserver, ListenerFailure};
use chat_gateway::events::Event;
use chat_gateway::handlers::HandlerError;
use chat_gateway::listeners::{ListenerHandle, ScopeKey};
use chat_gateway::protocol::Packet;
use chat_gateway::ClientContext;
use parking_lot::Mutex;

use crate::fixtures::{guild, message, text_channel, CHANNEL_ID, DM_CHANNEL_ID, GUILD_ID, MESSAGE_ID};

/// Error observer that records every failure it receives
#[derive(Debug, Default)]
pub struct RecordingObserver {
    packet_errors: Mutex<Vec<(String, &'static str)>>,
    listener_failures: Mutex<Vec<(usize, &'static str)>>,
}

impl RecordingObserver {
    /// (packet type, error code) per aborted packet
    pub fn packet_errors(&self) -> Vec<(String, &'static str)> {
        self.packet_errors.lock().clone()
    }

    /// (listener position, error code) per failed listener
    pub fn listener_failures(&self) -> Vec<(usize, &'static str)> {
        self.listener_failures.lock().clone()
    }
}

impl ErrorObserver for RecordingObserver {
    fn on_packet_error(&self, packet: &Packet, error: &HandlerError) {
        self.packet_errors
            .lock()
            .push((packet.event_type.clone(), error.code()));
    }

    fn on_listener_failure(&self, failure: &ListenerFailure) {
        self.listener_failures
            .lock()
            .push((failure.position, failure.error.code()));
    }
}

/// Client context plus the observer it reports to
pub struct TestClient {
    pub ctx: ClientContext,
    pub observer: Arc<RecordingObserver>,
}

impl TestClient {
    /// Client with an empty cache
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Client with an empty cache and custom config
    pub fn with_config(config: ClientConfig) -> Self {
        let observer = Arc::new(RecordingObserver::default());
        let ctx = ClientContext::with_observer(config, observer.clone());
        Self { ctx, observer }
    }

    /// Client with guild 10, channel 100 (in guild 10), DM channel 150 and
    /// message 200 (in channel 100) cached
    pub fn seeded() -> Self {
        let client = Self::new();
        let cache = client.ctx.cache();

        cache.insert_guild(guild(GUILD_ID));
        cache.insert_channel(text_channel(CHANNEL_ID, GUILD_ID));
        cache.insert_channel(chat_core::Channel::new_dm(DM_CHANNEL_ID));
        cache.insert_message(message(MESSAGE_ID, CHANNEL_ID));

        client
    }

    /// Handle packets in order, then wait for their dispatches
    pub async fn feed(&self, packets: impl IntoIterator<Item = Packet>) {
        for packet in packets {
            self.ctx.handle_packet(&packet);
        }
        self.ctx.dispatcher().flush().await;
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared log of labelled listener invocations
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener that appends `label` on every event
    pub fn listen<E: Event>(&self, ctx: &ClientContext, scope: ScopeKey, label: &str) -> ListenerHandle {
        let calls = Arc::clone(&self.calls);
        let label = label.to_string();
        ctx.listeners().register::<E>(scope, move |_| {
            calls.lock().push(label.clone());
            Ok(())
        })
    }

    /// Register a listener that records each event with `describe`
    pub fn record<E: Event>(
        &self,
        ctx: &ClientContext,
        scope: ScopeKey,
        describe: impl Fn(&E) -> String + Send + Sync + 'static,
    ) -> ListenerHandle {
        let calls = Arc::clone(&self.calls);
        ctx.listeners().register::<E>(scope, move |event| {
            calls.lock().push(describe(event));
            Ok(())
        })
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.calls.lock().push(entry.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, label: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == label).count()
    }
}
