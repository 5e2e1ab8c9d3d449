use crate::command::OmxCommand;
use crate::error::OmxResult;
use crate::events::OmxCallbackEvent;
use crate::handle::{ComponentHandle, ComponentIdentity};
use crate::index::OmxIndex;
use crate::port::PortIndex;
use crate::state::StateId;
use crate::tunnel::SupplierSide;

/// Sink for the raw callbacks a component fires (§4.3). The callback
/// adapter is the one real implementation, in `tz-queue`; `is_alive`
/// backs "the adapter verifies the graph is still alive" (§4.2,
/// Cancellation) before it dispatches.
pub trait OmxCallbacks: Send + Sync {
    fn on_event(&self, event: OmxCallbackEvent);
    fn is_alive(&self) -> bool;
}

/// The per-component subset of the OMX IL 1.2 C API the core calls (§6).
/// A concrete implementation (real or simulated) owns one component's
/// internal state and its own thread(s); every method here corresponds to
/// a single, possibly-blocking-briefly, possibly-asynchronous OMX call.
pub trait OmxComponent: Send + Sync {
    fn identity(&self) -> &ComponentIdentity;

    /// `OMX_SendCommand`. Synchronous acceptance/rejection only; the
    /// resulting state (or `CommandCanceled`) arrives later as an
    /// `OmxCallbackEvent::Trans`/`PortDisabled`/`PortEnabled` callback.
    fn send_command(&self, cmd: OmxCommand) -> OmxResult<()>;

    fn get_state(&self) -> StateId;

    fn set_parameter(&self, index: OmxIndex, port: Option<PortIndex>, value: ParamValue) -> OmxResult<()>;
    fn get_parameter(&self, index: OmxIndex, port: Option<PortIndex>) -> OmxResult<ParamValue>;
    fn set_config(&self, index: OmxIndex, port: Option<PortIndex>, value: ParamValue) -> OmxResult<()>;
    fn get_config(&self, index: OmxIndex, port: Option<PortIndex>) -> OmxResult<ParamValue>;

    /// `OMX_GetExtensionIndex`, resolving a vendor string to an index.
    fn get_extension_index(&self, name: &str) -> OmxResult<OmxIndex>;
}

/// A loosely typed stand-in for the union of parameter/config payloads
/// `OMX_GetParameter`/`OMX_SetParameter`/`OMX_GetConfig`/`OMX_SetConfig`
/// pass by structure pointer in the real C API. The graph engine never
/// needs to branch on its shape; only `ops` callers and component
/// implementations do.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    ContentUri(String),
    AudioPcm { sample_rate_hz: u32, channels: u32, bits_per_sample: u32 },
    AudioCoded { bitrate_kbps: u32, sample_rate_hz: u32, channels: u32 },
    Volume(f32),
    Mute(bool),
    MetadataItemCount(u32),
    MetadataItem { key: String, value: String },
    BufferSupplier(SupplierSide),
    PreAnnouncementsMode(bool),
    /// HTTP-server graph's `configure_station` payload (§4.5).
    StationInfo { name: String, genre: String },
    /// HTTP-server graph's `configure_server` payload (§4.5).
    ServerTuning { buffer_seconds: u32, max_clients: u32 },
}

/// The IL-core-level calls that operate above any single component:
/// lifecycle and tunneling (§6). Modeled as its own trait rather than
/// folded into `OmxComponent` because `OMX_GetHandle`/`OMX_FreeHandle`/
/// `OMX_SetupTunnel`/`OMX_TeardownTunnel` are not dispatched through a
/// component instance that doesn't exist yet.
pub trait IlCore: Send + Sync {
    fn get_handle(
        &self,
        role: &str,
        name: &str,
        callbacks: std::sync::Arc<dyn OmxCallbacks>,
    ) -> OmxResult<(ComponentHandle, std::sync::Arc<dyn OmxComponent>)>;

    fn free_handle(&self, handle: ComponentHandle) -> OmxResult<()>;

    fn setup_tunnel(
        &self,
        output: ComponentHandle,
        output_port: PortIndex,
        input: ComponentHandle,
        input_port: PortIndex,
    ) -> OmxResult<SupplierSide>;

    fn teardown_tunnel(
        &self,
        output: ComponentHandle,
        output_port: PortIndex,
        input: ComponentHandle,
        input_port: PortIndex,
    ) -> OmxResult<()>;
}
