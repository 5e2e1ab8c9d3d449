use std::sync::Arc;

use tz_omx_api::{ComponentHandle, ComponentIdentity, OmxComponent, StateId};

/// One component slot in a graph's ordered handle list (§3, "Graph
/// instance": "handles are listed in data-flow order"). `recorded_state`
/// is the graph's own bookkeeping of where the component last acknowledged
/// being, independent of (and authoritative over, for FSM purposes) a
/// live `OMX_GetState` query.
pub struct ComponentEntry {
    pub handle: ComponentHandle,
    pub identity: ComponentIdentity,
    pub component: Arc<dyn OmxComponent>,
    pub recorded_state: StateId,
}

/// The ordered component-handle list a graph owns (§3, "Graph instance").
/// Sources first, sinks last; tunnels are declared between consecutive
/// handles unless a graph variant overrides that.
#[derive(Default)]
pub struct ComponentList {
    entries: Vec<ComponentEntry>,
}

impl ComponentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, identity: ComponentIdentity, handle: ComponentHandle, component: Arc<dyn OmxComponent>) {
        self.entries.push(ComponentEntry {
            handle,
            identity,
            component,
            recorded_state: StateId::Loaded,
        });
    }

    pub fn handles(&self) -> Vec<ComponentHandle> {
        self.entries.iter().map(|e| e.handle).collect()
    }

    pub fn handles_reversed(&self) -> Vec<ComponentHandle> {
        let mut h = self.handles();
        h.reverse();
        h
    }

    pub fn get(&self, handle: ComponentHandle) -> Option<&ComponentEntry> {
        self.entries.iter().find(|e| e.handle == handle)
    }

    pub fn get_mut(&mut self, handle: ComponentHandle) -> Option<&mut ComponentEntry> {
        self.entries.iter_mut().find(|e| e.handle == handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `is_last_eos(h)` per §9's resolution of the open question: "h is
    /// the last handle in the current component list".
    pub fn is_last(&self, handle: ComponentHandle) -> bool {
        self.entries.last().map(|e| e.handle) == Some(handle)
    }

    pub fn is_first(&self, handle: ComponentHandle) -> bool {
        self.entries.first().map(|e| e.handle) == Some(handle)
    }

    pub fn record_state(&mut self, handle: ComponentHandle, state: StateId) {
        if let Some(entry) = self.get_mut(handle) {
            entry.recorded_state = state;
        }
    }

    pub fn drain(&mut self) -> Vec<ComponentEntry> {
        std::mem::take(&mut self.entries)
    }
}
