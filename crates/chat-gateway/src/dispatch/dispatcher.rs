//! Event dispatcher
//!
//! Each scope root owns an unbounded queue drained by one task, so dispatches
//! under the same root run one at a time in submission order while different
//! roots proceed in parallel. Listener callbacks are synchronous and run on the
//! blocking pool.
//!
//! A retired queue keeps draining what it already holds. A later queue for the
//! same root waits for it before running anything.

use super::{DispatchError, ErrorObserver, ListenerError, ListenerFailure, ScopeRoot};
use crate::events::{Event, GatewayEventType};
use crate::listeners::{BoxError, Listener};
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Completes when a retired queue has drained
type Drained = Shared<BoxFuture<'static, ()>>;

enum Work {
    Run(Job),
    /// Completes once everything queued before it has run
    Barrier(oneshot::Sender<()>),
}

/// How to call each listener of a dispatch
///
/// Captures the event so the dispatcher never needs to know listener types.
pub struct Invocation<L> {
    kind: GatewayEventType,
    call: Box<dyn Fn(&L) -> Result<(), BoxError> + Send + Sync>,
}

impl<L> Invocation<L> {
    /// Create an invocation from a call closure
    pub fn new(
        kind: GatewayEventType,
        call: impl Fn(&L) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            call: Box::new(call),
        }
    }

    /// Event kind being dispatched
    #[must_use]
    pub fn kind(&self) -> GatewayEventType {
        self.kind
    }
}

impl<E: Event> Invocation<Listener<E>> {
    /// Invocation that passes `event` to typed listeners
    pub fn of(event: E) -> Self {
        Self::new(E::KIND, move |listener: &Listener<E>| listener(&event))
    }
}

/// Per-root serialized dispatcher
pub struct EventDispatcher {
    /// Queue per scope root
    queues: DashMap<ScopeRoot, Queue>,
    /// Retired queues still draining
    retired: DashMap<ScopeRoot, Drained>,
    /// Runtime the queue tasks are spawned on
    runtime: Handle,
    /// Receives listener failures
    observer: Arc<dyn ErrorObserver>,
    /// Whether new dispatches are accepted
    running: AtomicBool,
    /// Number of accepted dispatches
    dispatched: AtomicU64,
}

impl EventDispatcher {
    /// Create a dispatcher on the current tokio runtime
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new(observer: Arc<dyn ErrorObserver>) -> Self {
        Self::with_handle(Handle::current(), observer)
    }

    /// Create a dispatcher on a specific runtime
    pub fn with_handle(runtime: Handle, observer: Arc<dyn ErrorObserver>) -> Self {
        Self {
            queues: DashMap::new(),
            retired: DashMap::new(),
            runtime,
            observer,
            running: AtomicBool::new(true),
            dispatched: AtomicU64::new(0),
        }
    }

    /// Submit listeners for one event under `root`
    ///
    /// Returns once the work is queued. Listener failures are reported to the
    /// observer and never returned here.
    pub fn dispatch<L>(
        &self,
        root: ScopeRoot,
        listeners: Vec<L>,
        invoke: Invocation<L>,
    ) -> Result<(), DispatchError>
    where
        L: Send + 'static,
    {
        if !self.running.load(Ordering::SeqCst) {
            return Err(DispatchError::Closed);
        }
        self.dispatched.fetch_add(1, Ordering::Relaxed);

        if listeners.is_empty() {
            tracing::trace!(root = %root, kind = %invoke.kind, "No listeners, dispatch skipped");
            return Ok(());
        }

        tracing::trace!(
            root = %root,
            kind = %invoke.kind,
            listeners = listeners.len(),
            "Queueing dispatch"
        );

        let observer = Arc::clone(&self.observer);
        let job: Job = Box::new(move || run_listeners(root, &listeners, &invoke, observer.as_ref()));

        self.enqueue(root, Work::Run(job))
    }

    /// Wait until every dispatch queued so far has finished
    pub async fn flush(&self) {
        let barriers: Vec<_> = self
            .queues
            .iter()
            .filter_map(|queue| {
                let (tx, rx) = oneshot::channel();
                queue.value().tx.send(Work::Barrier(tx)).ok().map(|()| rx)
            })
            .collect();
        let retired: Vec<Drained> = self
            .retired
            .iter()
            .map(|drained| drained.value().clone())
            .collect();

        futures::future::join(
            futures::future::join_all(barriers),
            futures::future::join_all(retired),
        )
        .await;
        self.prune_retired();
    }

    /// Drop the queue for `root` once its queued work has run
    ///
    /// Used when the root's entity is gone. Returns false if `root` had no
    /// queue.
    pub fn retire(&self, root: ScopeRoot) -> bool {
        self.prune_retired();
        let Some((_, queue)) = self.queues.remove(&root) else {
            return false;
        };

        // Dropping the sender ends the drain task after its last job
        let Queue { tx, drained } = queue;
        drop(tx);
        self.retired.insert(root, drained);
        tracing::debug!(root = %root, "Dispatch queue retired");
        true
    }

    /// Stop accepting dispatches
    ///
    /// Work already queued still runs; queue tasks exit once drained.
    pub fn shutdown(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            self.queues.clear();
            self.prune_retired();
            tracing::info!(
                dispatched = self.dispatch_count(),
                "Event dispatcher stopped"
            );
        }
    }

    /// Check if the dispatcher accepts work
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of dispatches accepted so far
    pub fn dispatch_count(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Number of scope roots with a live queue
    #[cfg(test)]
    pub(crate) fn queue_count(&self) -> usize {
        self.queues.len()
    }

    fn enqueue(&self, root: ScopeRoot, work: Work) -> Result<(), DispatchError> {
        let entry = self.queues.entry(root);
        // Checked under the entry lock so shutdown cannot miss a new queue
        if !self.is_running() {
            return Err(DispatchError::Closed);
        }

        let queue = entry.or_insert_with(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            let previous = self.retired.remove(&root).map(|(_, drained)| drained);
            let task = self.runtime.spawn(drain_queue(root, rx, previous));
            tracing::debug!(root = %root, "Dispatch queue created");
            Queue {
                tx,
                drained: task.map(|_| ()).boxed().shared(),
            }
        });

        queue.tx.send(work).map_err(|_| DispatchError::Closed)
    }

    fn prune_retired(&self) {
        self.retired
            .retain(|_, drained| drained.clone().now_or_never().is_none());
    }
}

struct Queue {
    tx: mpsc::UnboundedSender<Work>,
    drained: Drained,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("queues", &self.queues.len())
            .field("retired", &self.retired.len())
            .field("running", &self.is_running())
            .field("dispatched", &self.dispatch_count())
            .finish()
    }
}

async fn drain_queue(
    root: ScopeRoot,
    mut rx: mpsc::UnboundedReceiver<Work>,
    previous: Option<Drained>,
) {
    if let Some(previous) = previous {
        previous.await;
    }

    while let Some(work) = rx.recv().await {
        match work {
            Work::Run(job) => {
                // Awaiting here keeps the next job for this root from starting early
                if let Err(e) = tokio::task::spawn_blocking(job).await {
                    tracing::error!(root = %root, error = %e, "Dispatch job aborted");
                }
            }
            Work::Barrier(done) => {
                let _ = done.send(());
            }
        }
    }

    tracing::debug!(root = %root, "Dispatch queue drained");
}

fn run_listeners<L>(
    root: ScopeRoot,
    listeners: &[L],
    invoke: &Invocation<L>,
    observer: &dyn ErrorObserver,
) {
    for (position, listener) in listeners.iter().enumerate() {
        let error = match panic::catch_unwind(AssertUnwindSafe(|| (invoke.call)(listener))) {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => ListenerError::Failed(e),
            Err(payload) => ListenerError::Panicked(panic_message(payload.as_ref())),
        };

        observer.on_listener_failure(&ListenerFailure {
            root,
            kind: invoke.kind,
            position,
            error,
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
