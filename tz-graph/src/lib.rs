//! Graph assembly: wires `tz-queue`'s command queue and callback adapter to
//! `tz-fsm`'s state machine and `tz-ops`'s actions into one playback
//! graph's public upward API (§4, §5, §6).

pub mod factory;
pub mod graph;
pub mod outbound;

pub use factory::GraphFactory;
pub use graph::{Graph, GraphError};
pub use outbound::{CallbacksMetadataSink, GraphCallbacks, NullCallbacks};

pub use tz_fsm::{GraphState, GraphVariant};
pub use tz_ops::{ProbeError, ProbeOutcome, Prober};
pub use tz_queue::CallbackRegistry;
