use serde::{Deserialize, Serialize};

/// The OMX 1.2 lifecycle plus the transitional sub-states used internally
/// while asynchronous work (buffer alloc/free, port disable/enable) is
/// outstanding (§3, "Component-side state ids").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateId {
    Loaded,
    Idle,
    Executing,
    Pause,
    WaitForResources,
    LoadedToIdle,
    IdleToLoaded,
    IdleToExecuting,
    ExecutingToIdle,
    PauseToIdle,
}

impl StateId {
    /// One of the five OMX 1.2 main states, as opposed to a transitional
    /// sub-state. Expected-transition bookkeeping (§3) only ever targets a
    /// main state; sub-states are observed, never waited on directly.
    pub fn is_main_state(self) -> bool {
        matches!(
            self,
            StateId::Loaded | StateId::Idle | StateId::Executing | StateId::Pause | StateId::WaitForResources
        )
    }

    /// The sub-state a component passes through while moving from `self`
    /// to `target`, or `None` if the OMX 1.2 state graph has no direct or
    /// legal edge between the two main states.
    pub fn transitional(self, target: StateId) -> Option<StateId> {
        use StateId::*;
        match (self, target) {
            (Loaded, Idle) => Some(LoadedToIdle),
            (Idle, Loaded) => Some(IdleToLoaded),
            (Idle, Executing) => Some(IdleToExecuting),
            (Executing, Idle) => Some(ExecutingToIdle),
            (Pause, Idle) => Some(PauseToIdle),
            _ => None,
        }
    }
}
