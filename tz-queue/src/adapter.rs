use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tz_omx_api::{OmxCallbackEvent, OmxCallbacks};

use crate::event::Command;
use crate::queue::CommandQueue;

struct RegistryEntry {
    queue: CommandQueue,
    alive: Arc<AtomicBool>,
}

/// Process-wide registry mapping a stable numeric graph id to the queue
/// that should receive its callbacks (§9: "Use a stable key ... look up
/// the owning graph in a registry; the adapter refuses to dispatch if the
/// key is unknown"). Stands in for `pAppData` plus a global IL-core-style
/// lookup table, since components only ever carry the numeric id, never a
/// borrowed reference to the graph.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    entries: Arc<Mutex<HashMap<u64, RegistryEntry>>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `graph_id`, returning the liveness flag the caller should
    /// clear at unload (via [`CallbackRegistry::unregister`]) and an
    /// adapter bound to this id.
    pub fn register(&self, graph_id: u64, queue: CommandQueue) -> CallbackAdapter {
        let alive = Arc::new(AtomicBool::new(true));
        let mut entries = self.entries.lock().expect("callback registry mutex poisoned");
        entries.insert(
            graph_id,
            RegistryEntry {
                queue,
                alive: alive.clone(),
            },
        );
        CallbackAdapter {
            registry: self.clone(),
            graph_id,
            alive,
        }
    }

    /// Removes the graph from the registry. Callbacks that arrive after
    /// this point are discarded (§4.2, Cancellation).
    pub fn unregister(&self, graph_id: u64) {
        let mut entries = self.entries.lock().expect("callback registry mutex poisoned");
        if let Some(entry) = entries.remove(&graph_id) {
            entry.alive.store(false, Ordering::SeqCst);
        }
    }

    fn dispatch(&self, graph_id: u64, event: OmxCallbackEvent) {
        let entries = self.entries.lock().expect("callback registry mutex poisoned");
        let Some(entry) = entries.get(&graph_id) else {
            tracing::debug!(graph_id, "dropping callback: graph no longer registered");
            return;
        };
        if entry.queue.try_enqueue(Command::new(event)).is_err() {
            tracing::warn!(graph_id, "dropping callback: command queue full or closed");
        }
    }
}

/// The trampoline target every component owned by a graph is wired to
/// (§4.3). Strictly wait-free with respect to the graph: it only
/// enqueues, and never calls back into OMX IL from within a callback.
pub struct CallbackAdapter {
    registry: CallbackRegistry,
    graph_id: u64,
    alive: Arc<AtomicBool>,
}

impl OmxCallbacks for CallbackAdapter {
    fn on_event(&self, event: OmxCallbackEvent) {
        self.registry.dispatch(self.graph_id, event);
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}
