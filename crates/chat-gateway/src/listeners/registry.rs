//! Listener registry
//!
//! Stores listeners keyed by (scope, event kind) using `DashMap` so
//! registration can run concurrently with dispatch. Reads clone the
//! listener list under the shard lock, so a dispatch always works from a
//! consistent snapshot that later (un)registrations do not touch.

use super::{BoxError, Listener, ScopeKey};
use crate::events::{Event, GatewayEventType};
use dashmap::DashMap;
use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type RegistryKey = (ScopeKey, GatewayEventType);

struct Registration {
    id: u64,
    /// Always a `Listener<E>` where `E::KIND` matches the key
    listener: Box<dyn Any + Send + Sync>,
}

/// Handle returned by [`ListenerRegistry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    id: u64,
    scope: ScopeKey,
    kind: GatewayEventType,
}

impl ListenerHandle {
    /// Scope the listener is attached to
    #[must_use]
    pub fn scope(&self) -> ScopeKey {
        self.scope
    }

    /// Event kind the listener receives
    #[must_use]
    pub fn kind(&self) -> GatewayEventType {
        self.kind
    }
}

/// Registry of listeners by scope and event kind
pub struct ListenerRegistry {
    entries: DashMap<RegistryKey, Vec<Registration>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create an empty registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a listener for events of type `E` at `scope`
    ///
    /// Listeners under the same scope run in registration order.
    pub fn register<E: Event>(
        &self,
        scope: ScopeKey,
        listener: impl Fn(&E) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> ListenerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let kind = E::KIND;
        let listener: Listener<E> = Arc::new(listener);

        self.entries
            .entry((scope, kind))
            .or_default()
            .push(Registration {
                id,
                listener: Box::new(listener),
            });

        tracing::debug!(listener_id = id, scope = %scope, kind = %kind, "Listener registered");

        ListenerHandle { id, scope, kind }
    }

    /// Remove a listener
    ///
    /// Returns false if it was already removed. Dispatches that have already
    /// gathered the listener still run it.
    pub fn unregister(&self, handle: ListenerHandle) -> bool {
        let key = (handle.scope, handle.kind);

        let removed = self
            .entries
            .get_mut(&key)
            .is_some_and(|mut registrations| {
                let before = registrations.len();
                registrations.retain(|r| r.id != handle.id);
                registrations.len() != before
            });

        if removed {
            self.entries.remove_if(&key, |_, registrations| registrations.is_empty());
            tracing::debug!(listener_id = handle.id, scope = %handle.scope, "Listener unregistered");
        }

        removed
    }

    /// Snapshot of the listeners for `E` at one scope, in registration order
    #[must_use]
    pub fn listeners_for<E: Event>(&self, scope: ScopeKey) -> Vec<Listener<E>> {
        self.entries
            .get(&(scope, E::KIND))
            .map(|registrations| {
                registrations
                    .iter()
                    .filter_map(|r| r.listener.downcast_ref::<Listener<E>>().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Concatenate the listeners of each scope, in the order given
    ///
    /// A callback registered at two scopes appears twice.
    #[must_use]
    pub fn gather<E: Event>(&self, scopes: &[ScopeKey]) -> Vec<Listener<E>> {
        scopes
            .iter()
            .flat_map(|scope| self.listeners_for::<E>(*scope))
            .collect()
    }

    /// Drop every listener attached to `scope`, returning how many were removed
    pub fn remove_scope(&self, scope: ScopeKey) -> usize {
        let mut removed = 0;
        self.entries.retain(|(entry_scope, _), registrations| {
            if *entry_scope == scope {
                removed += registrations.len();
                false
            } else {
                true
            }
        });

        if removed > 0 {
            tracing::debug!(scope = %scope, removed, "Scope listeners dropped");
        }
        removed
    }

    /// Number of listeners at one scope, across all event kinds
    #[cfg(test)]
    pub(crate) fn scope_len(&self, scope: ScopeKey) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.key().0 == scope)
            .map(|entry| entry.value().len())
            .sum()
    }

    /// Total number of registered listeners
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().map(|entry| entry.value().len()).sum()
    }

    /// Check if no listeners are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("keys", &self.entries.len())
            .field("listeners", &self.len())
            .finish()
    }
}
