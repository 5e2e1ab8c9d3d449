/// The slice of the outbound callback interface that `retrieve_metadata`
/// emits through. The rest of the outbound interface (`on_loaded`,
/// `on_execd`, ...) belongs to the graph layer; metadata emission is the
/// one outbound callback `ops` itself drives, since it is the only
/// operation that walks component config directly.
pub trait MetadataSink: Send {
    /// `first` is `true` only for the very first `(key, value)` pair
    /// emitted across an entire `retrieve_metadata` sweep, not per
    /// component. The original graph operations walk every handle before
    /// reporting a single heading, so the heading is sweep-wide.
    fn on_metadata(&mut self, key: &str, value: &str, first: bool);
}

/// The full outbound interface a graph fires towards whatever embeds it:
/// lifecycle acknowledgments, metadata, volume, and terminal error. Lives
/// here (rather than in the FSM or graph crate) so both `GraphOps` and
/// `GraphFsm` can hand callers a single shared trait object without
/// `tz-fsm` depending on the graph-assembly crate.
pub trait GraphCallbacks: Send + Sync {
    fn on_loaded(&self) {}
    fn on_execd(&self) {}
    fn on_paused(&self) {}
    fn on_resumed(&self) {}
    fn on_stopped(&self) {}
    fn on_unloaded(&self) {}

    fn on_metadata(&self, key: &str, value: &str, first: bool) {
        let _ = (key, value, first);
    }

    fn on_volume_acked(&self, percent: u32) {
        let _ = percent;
    }

    fn on_error(&self, message: &str) {
        let _ = message;
    }
}

/// A no-op implementation, useful for graphs constructed before an
/// embedder has started listening.
pub struct NullCallbacks;

impl GraphCallbacks for NullCallbacks {}
