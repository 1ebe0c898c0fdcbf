//! Packet pump
//!
//! Pulls packets from an inbound source and routes each to one of
//! `max_concurrent_handlers` lanes by the scope root its handler dispatches
//! under. A lane handles its packets one at a time on the blocking pool, so
//! packets for the same root keep their arrival order while different roots
//! proceed in parallel.

use super::ClientContext;
use crate::dispatch::ScopeRoot;
use crate::events::GatewayEventType;
use crate::protocol::Packet;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};

/// Inbound packet stream
#[async_trait]
pub trait PacketSource: Send {
    /// Next packet, or `None` once the stream has ended
    async fn next_packet(&mut self) -> Option<Packet>;
}

#[async_trait]
impl PacketSource for mpsc::Receiver<Packet> {
    async fn next_packet(&mut self) -> Option<Packet> {
        self.recv().await
    }
}

#[async_trait]
impl<'a, S: PacketSource + ?Sized> PacketSource for &'a mut S {
    async fn next_packet(&mut self) -> Option<Packet> {
        (**self).next_packet().await
    }
}

enum LaneWork {
    Handle(Packet),
    /// Completes once every packet sent to the lane before it is handled
    Settle(oneshot::Sender<()>),
}

/// Worker lanes feeding packets to a [`ClientContext`]
#[derive(Debug)]
pub struct PacketPump {
    ctx: ClientContext,
    lanes: usize,
    lane_buffer: usize,
}

impl PacketPump {
    /// Create a pump sized from the context's gateway config
    pub fn new(ctx: ClientContext) -> Self {
        let gateway = &ctx.config().gateway;
        let lanes = gateway.max_concurrent_handlers.max(1);
        let lane_buffer = gateway.packet_buffer.max(1);
        Self {
            ctx,
            lanes,
            lane_buffer,
        }
    }

    /// Bounded channel sized from the context's gateway config
    ///
    /// The receiver is a [`PacketSource`].
    pub fn channel(ctx: &ClientContext) -> (mpsc::Sender<Packet>, mpsc::Receiver<Packet>) {
        mpsc::channel(ctx.config().gateway.packet_buffer.max(1))
    }

    /// Handle packets until the source ends
    ///
    /// Returns the number of packets taken from the source. Packets still
    /// queued in lanes when the source ends are handled before returning.
    pub async fn run<S: PacketSource>(&self, mut source: S) -> u64 {
        let mut tasks = JoinSet::new();
        let lanes: Vec<mpsc::Sender<LaneWork>> = (0..self.lanes)
            .map(|lane| {
                let (tx, rx) = mpsc::channel(self.lane_buffer);
                tasks.spawn(run_lane(lane, self.ctx.clone(), rx));
                tx
            })
            .collect();
        let mut received = 0u64;

        while let Some(packet) = source.next_packet().await {
            received += 1;

            let root = match packet_root(&self.ctx, &packet) {
                Some(root) => root,
                None => {
                    // The channel may be created by a packet still in a lane
                    settle(&lanes).await;
                    packet_root(&self.ctx, &packet).unwrap_or(ScopeRoot::Global)
                }
            };

            let lane = &lanes[lane_index(root, lanes.len())];
            if lane.send(LaneWork::Handle(packet)).await.is_err() {
                tracing::error!(root = %root, "Packet lane closed, stopping pump");
                break;
            }
        }

        drop(lanes);
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Packet lane failed");
            }
        }

        tracing::debug!(received, "Packet source ended");
        received
    }

    /// Run the pump on its own task
    pub fn spawn<S: PacketSource + 'static>(self, source: S) -> JoinHandle<u64> {
        tokio::spawn(async move { self.run(source).await })
    }
}

async fn run_lane(lane: usize, ctx: ClientContext, mut rx: mpsc::Receiver<LaneWork>) {
    while let Some(work) = rx.recv().await {
        match work {
            LaneWork::Handle(packet) => {
                let ctx = ctx.clone();
                // Awaited so the next packet in this lane sees this one's cache writes
                let handled = tokio::task::spawn_blocking(move || ctx.handle_packet(&packet)).await;
                if let Err(e) = handled {
                    tracing::error!(lane, error = %e, "Packet handler task failed");
                }
            }
            LaneWork::Settle(done) => {
                let _ = done.send(());
            }
        }
    }
}

/// Wait until every lane has handled what was routed to it so far
async fn settle(lanes: &[mpsc::Sender<LaneWork>]) {
    let mut pending = Vec::with_capacity(lanes.len());
    for lane in lanes {
        let (tx, rx) = oneshot::channel();
        if lane.send(LaneWork::Settle(tx)).await.is_ok() {
            pending.push(rx);
        }
    }
    futures::future::join_all(pending).await;
}

/// Scope root the packet's handler will dispatch under
///
/// `None` when the packet names a channel that is not cached yet.
fn packet_root(ctx: &ClientContext, packet: &Packet) -> Option<ScopeRoot> {
    if let Ok(Some(guild_id)) = packet.optional_snowflake("guild_id") {
        return Some(ScopeRoot::Guild(guild_id));
    }

    match GatewayEventType::from_str(&packet.event_type) {
        Some(GatewayEventType::GuildCreate | GatewayEventType::GuildDelete) => {
            Some(packet.snowflake("id").map_or(ScopeRoot::Global, ScopeRoot::Guild))
        }
        Some(
            GatewayEventType::Ready
            | GatewayEventType::ChannelCreate
            | GatewayEventType::ChannelUpdate
            | GatewayEventType::ChannelDelete,
        )
        | None => Some(ScopeRoot::Global),
        Some(_) => match packet.snowflake("channel_id") {
            Ok(channel_id) => ctx
                .cache()
                .channel(channel_id)
                .map(|channel| ScopeRoot::for_owner(channel.owner_guild())),
            // Malformed; the handler reports it
            Err(_) => Some(ScopeRoot::Global),
        },
    }
}

fn lane_index(root: ScopeRoot, lanes: usize) -> usize {
    match root {
        ScopeRoot::Global => 0,
        ScopeRoot::Guild(id) => (id.into_inner() % lanes as u64) as usize,
    }
}
