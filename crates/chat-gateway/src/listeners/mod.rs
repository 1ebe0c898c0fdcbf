//! Listener registry
//!
//! Callbacks registered per (scope, event kind), and the scope chains
//! handlers gather them across.

mod registry;
mod scope;

pub use registry::{ListenerHandle, ListenerRegistry};
pub use scope::{ScopeChain, ScopeKey};

use std::sync::Arc;

/// Error type a listener may return
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A registered listener callback for events of type `E`
pub type Listener<E> = Arc<dyn Fn(&E) -> Result<(), BoxError> + Send + Sync>;
