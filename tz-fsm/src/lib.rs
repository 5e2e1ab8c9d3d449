//! Hierarchical per-graph state machine: top-level lifecycle plus the
//! `configuring`, `skipping`, `auto_detecting`, `updating_graph`, and
//! `reconfiguring_tunnel_<i>` submachines, expressed as one flattened
//! state enum and an explicit match-based dispatcher rather than a
//! generic table-driven engine.

pub mod fsm;
pub mod state;

pub use fsm::GraphFsm;
pub use state::{GraphState, GraphVariant};
