//! OMX IL 1.2 C-API surface, rendered as Rust types and traits instead of
//! FFI (§6, §9 re-architecture guidance). This crate owns no behavior: it
//! is the shared vocabulary `tz-ops`, `tz-queue`, `tz-fsm`, `tz-graph`, and
//! `tz-component-sim` all build against.

pub mod command;
pub mod component;
pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod index;
pub mod port;
pub mod state;
pub mod tunnel;

pub use command::OmxCommand;
pub use component::{IlCore, OmxCallbacks, OmxComponent, ParamValue};
pub use config::{
    GraphConfig, HttpServerConfig, PlaybackConfig, ServerTuningConfig, StreamingServiceConfig,
    UriListConfig,
};
pub use error::{OmxError, OmxResult};
pub use events::OmxCallbackEvent;
pub use handle::{ComponentHandle, ComponentIdentity};
pub use index::OmxIndex;
pub use port::{Coding, Domain, PopulationStatus, PortDef, PortDirection, PortIndex};
pub use state::StateId;
pub use tunnel::{Tunnel, TunnelId};
