use std::sync::Arc;

pub use tz_ops::{GraphCallbacks, NullCallbacks};
use tz_ops::MetadataSink;

/// Bridges the shared, `&self`-based [`GraphCallbacks`] a `Graph` is
/// constructed with into the single-owner, `&mut self`-based
/// [`MetadataSink`] `GraphOps::retrieve_metadata` expects.
pub struct CallbacksMetadataSink {
    pub(crate) callbacks: Arc<dyn GraphCallbacks>,
}

impl MetadataSink for CallbacksMetadataSink {
    fn on_metadata(&mut self, key: &str, value: &str, first: bool) {
        self.callbacks.on_metadata(key, value, first);
    }
}
