//! Error observers
//!
//! The only surface through which packet and listener failures become visible.

use super::{ListenerError, ScopeRoot};
use crate::events::GatewayEventType;
use crate::handlers::HandlerError;
use crate::protocol::Packet;

/// A listener failure with the context it happened in
#[derive(Debug)]
pub struct ListenerFailure {
    pub root: ScopeRoot,
    pub kind: GatewayEventType,
    /// Index of the listener in the gathered list
    pub position: usize,
    pub error: ListenerError,
}

/// Receives failures that are isolated from the pipeline
pub trait ErrorObserver: Send + Sync {
    /// A packet was aborted
    fn on_packet_error(&self, packet: &Packet, error: &HandlerError);

    /// A listener failed; sibling listeners still ran
    fn on_listener_failure(&self, failure: &ListenerFailure);
}

/// Observer that logs failures through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorObserver;

impl ErrorObserver for TracingErrorObserver {
    fn on_packet_error(&self, packet: &Packet, error: &HandlerError) {
        tracing::error!(
            packet_type = %packet.event_type,
            sequence = ?packet.sequence,
            code = error.code(),
            error = %error,
            "Packet handling failed"
        );
    }

    fn on_listener_failure(&self, failure: &ListenerFailure) {
        tracing::error!(
            root = %failure.root,
            kind = %failure.kind,
            position = failure.position,
            code = failure.error.code(),
            error = %failure.error,
            "Listener failed"
        );
    }
}
