use std::collections::HashMap;

use tz_omx_api::{ComponentHandle, PortIndex, StateId};

/// One entry per handle that must still acknowledge a target state (§3,
/// "Expected-transition set"). `is_complete` only returns `true` once
/// every recorded entry for that state has been observed, regardless of
/// arrival order across components (§5: "no total order is promised").
#[derive(Debug, Default)]
pub struct ExpectedTransitions {
    pending: HashMap<ComponentHandle, StateId>,
}

impl ExpectedTransitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one expected entry per handle *before* the caller issues
    /// the corresponding `OMX_SendCommand` (§9 supplement: ordering
    /// matters so a synchronous callback is never missed).
    pub fn expect_all(&mut self, handles: &[ComponentHandle], target: StateId) {
        for h in handles {
            self.pending.insert(*h, target);
        }
    }

    /// Acknowledges `handle` having reached `reached`. A mismatched
    /// acknowledgment (handle not pending, or pending for a different
    /// target) is logged and otherwise ignored rather than panicking,
    /// matching the FSM's `no_transition` trap philosophy (§4.5).
    pub fn ack(&mut self, handle: ComponentHandle, reached: StateId) {
        match self.pending.get(&handle) {
            Some(target) if *target == reached => {
                self.pending.remove(&handle);
            }
            Some(target) => {
                tracing::warn!(
                    ?handle,
                    ?reached,
                    ?target,
                    "OmxTrans acknowledged a state other than the one expected"
                );
            }
            None => {
                tracing::debug!(?handle, ?reached, "OmxTrans with no expected transition pending");
            }
        }
    }

    /// `is_trans_complete(h, s)` (§4.4): true once no handle is still
    /// pending on `state`. `h` only needs to have been the handle that
    /// just acknowledged; completeness is evaluated across the whole set.
    pub fn is_complete(&self, state: StateId) -> bool {
        !self.pending.values().any(|s| *s == state)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_handles(&self) -> Vec<ComponentHandle> {
        self.pending.keys().copied().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortTransitionKind {
    Disable,
    Enable,
}

/// Symmetric structure for pending port disable/enable acknowledgments
/// (§3).
#[derive(Debug, Default)]
pub struct ExpectedPortTransitions {
    pending: HashMap<(ComponentHandle, PortIndex, PortTransitionKind), ()>,
}

impl ExpectedPortTransitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect(&mut self, handle: ComponentHandle, port: PortIndex, kind: PortTransitionKind) {
        self.pending.insert((handle, port, kind), ());
    }

    pub fn ack(&mut self, handle: ComponentHandle, port: PortIndex, kind: PortTransitionKind) {
        self.pending.remove(&(handle, port, kind));
    }

    /// True once no port is still awaiting acknowledgment of `kind` —
    /// vacuously true if none was ever expected, which is how a submachine
    /// bypasses the disable step entirely when `is_disabled_evt_required()`
    /// says it is not needed.
    pub fn is_all_complete(&self, kind: PortTransitionKind) -> bool {
        !self.pending.keys().any(|(_, _, k)| *k == kind)
    }
}
