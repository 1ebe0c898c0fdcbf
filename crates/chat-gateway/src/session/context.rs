//! Client context
//!
//! Shared state for one client session: created at session start and torn
//! down with [`ClientContext::shutdown`]. Handlers receive it explicitly.

use crate::dispatch::{DispatchError, ErrorObserver, EventDispatcher, Invocation, TracingErrorObserver};
use crate::events::Event;
use crate::handlers::HandlerRegistry;
use crate::listeners::{ListenerRegistry, ScopeChain};
use crate::protocol::Packet;
use chat_cache::EntityCache;
use chat_common::ClientConfig;
use std::sync::Arc;

/// Client session context
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct ClientContext {
    /// Client configuration
    config: Arc<ClientConfig>,
    /// Cached entities
    cache: Arc<EntityCache>,
    /// Registered listeners
    listeners: Arc<ListenerRegistry>,
    /// Per-root event dispatcher
    dispatcher: Arc<EventDispatcher>,
    /// Packet handlers by type
    handlers: Arc<HandlerRegistry>,
    /// Receives packet and listener failures
    observer: Arc<dyn ErrorObserver>,
}

impl ClientContext {
    /// Create a context that logs failures through `tracing`
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_observer(config, Arc::new(TracingErrorObserver))
    }

    /// Create a context with a custom error observer
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn with_observer(config: ClientConfig, observer: Arc<dyn ErrorObserver>) -> Self {
        Self::with_handlers(config, HandlerRegistry::with_defaults(), observer)
    }

    /// Create a context with a custom handler set
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn with_handlers(
        config: ClientConfig,
        handlers: HandlerRegistry,
        observer: Arc<dyn ErrorObserver>,
    ) -> Self {
        Self {
            cache: EntityCache::new_shared(&config.cache),
            listeners: ListenerRegistry::new_shared(),
            dispatcher: Arc::new(EventDispatcher::new(Arc::clone(&observer))),
            handlers: Arc::new(handlers),
            observer,
            config: Arc::new(config),
        }
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the entity cache
    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    /// Get the listener registry
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Get the event dispatcher
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Get the packet handlers
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Route one packet to its handler
    ///
    /// Never fails: unknown packet types are logged and skipped, and handler
    /// errors go to the error observer.
    pub fn handle_packet(&self, packet: &Packet) {
        let Some(handler) = self.handlers.get(&packet.event_type) else {
            tracing::debug!(packet_type = %packet.event_type, "No handler for packet type");
            return;
        };

        if let Err(e) = handler.handle(self, packet) {
            self.observer.on_packet_error(packet, &e);
        }
    }

    /// Gather listeners for `event` along `chain` and dispatch them
    pub fn fan_out<E: Event>(&self, chain: &ScopeChain, event: E) -> Result<(), DispatchError> {
        let listeners = self.listeners.gather::<E>(chain.scopes());
        self.dispatcher
            .dispatch(chain.root(), listeners, Invocation::of(event))
    }

    /// End the session
    ///
    /// Waits for queued dispatches to finish, then stops the dispatcher.
    pub async fn shutdown(&self) {
        self.dispatcher.flush().await;
        self.dispatcher.shutdown();

        tracing::info!(
            guilds = self.cache.guild_count(),
            channels = self.cache.channel_count(),
            messages = self.cache.message_count(),
            listeners = self.listeners.len(),
            "Client session closed"
        );
    }
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("cache", &self.cache)
            .field("listeners", &self.listeners)
            .field("dispatcher", &self.dispatcher)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ListenerFailure;
    use crate::events::ReactionRemoveAllEvent;
    use crate::handlers::HandlerError;
    use crate::listeners::ScopeKey;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct CodeObserver {
        codes: Mutex<Vec<&'static str>>,
    }

    impl ErrorObserver for CodeObserver {
        fn on_packet_error(&self, _packet: &Packet, error: &HandlerError) {
            self.codes.lock().push(error.code());
        }

        fn on_listener_failure(&self, failure: &ListenerFailure) {
            self.codes.lock().push(failure.error.code());
        }
    }

    #[tokio::test]
    async fn test_unknown_packet_type_is_ignored() {
        let observer = Arc::new(CodeObserver::default());
        let ctx = ClientContext::with_observer(ClientConfig::default(), observer.clone());

        ctx.handle_packet(&Packet::new("TYPING_START", json!({ "channel_id": "1" })));

        assert!(observer.codes.lock().is_empty());
        assert_eq!(ctx.dispatcher().dispatch_count(), 0);
    }

    #[tokio::test]
    async fn test_decode_errors_reach_observer() {
        let observer = Arc::new(CodeObserver::default());
        let ctx = ClientContext::with_observer(ClientConfig::default(), observer.clone());

        ctx.handle_packet(&Packet::new("MESSAGE_REACTION_REMOVE_ALL", json!({ "message_id": "1" })));
        ctx.handle_packet(&Packet::new("MESSAGE_REACTION_REMOVE_ALL", json!("not an object")));

        assert_eq!(*observer.codes.lock(), vec!["MISSING_FIELD", "DECODE_ERROR"]);
    }

    #[tokio::test]
    async fn test_shutdown_stops_dispatch() {
        let ctx = ClientContext::new(ClientConfig::default());
        ctx.listeners()
            .register::<ReactionRemoveAllEvent>(ScopeKey::Global, |_| Ok(()));

        ctx.shutdown().await;

        let event = ReactionRemoveAllEvent {
            message_id: chat_core::Snowflake::new(1),
            channel_id: chat_core::Snowflake::new(2),
            guild_id: None,
        };
        assert!(matches!(
            ctx.fan_out(&ScopeChain::global(), event),
            Err(DispatchError::Closed)
        ));
    }
}
