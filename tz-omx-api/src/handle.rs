use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier returned by the IL core for a registered component
/// (§3, "Component handle"). The core never shares a handle between
/// graphs; `ComponentHandle` is `Copy` so it can be passed freely through
/// events without borrowing the owning `Graph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentHandle(u64);

impl ComponentHandle {
    /// Mints a fresh handle id. Stands in for `OMX_GetHandle`'s allocation
    /// of an opaque `OMX_HANDLETYPE`; real components would be allocated by
    /// the IL core, not by the graph engine itself.
    pub fn new() -> Self {
        ComponentHandle(NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl Default for ComponentHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// The role string, friendly name, and owner token the graph keeps
/// alongside each handle (§3). `owner` mirrors `pAppData`: a stable key
/// used by the callback adapter to look up the owning graph without
/// dereferencing the handle itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentIdentity {
    pub role: String,
    pub name: String,
    pub owner: u64,
}
