use tz_omx_api::TunnelId;

/// Every state the per-graph FSM can occupy, top-level states and
/// submachine states flattened into one enum. Not every variant reaches
/// every state: `GraphVariant` decides which branches `GraphFsm::process`
/// actually exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphState {
    Inited,
    Loaded,

    // `configuring` submachine
    ConfDisablingPorts,
    ConfAwaitingPortDisabled,
    ConfProbing,
    ConfAwaitingPortSettings,
    ConfConfig2Idle,
    ConfIdle2Exe,

    Executing,

    // `skipping` submachine
    SkipToIdle,
    SkipIdle2Loaded,

    Exe2Pause,
    Paused,
    Pause2Exe,
    Pause2Idle,
    Exe2Idle,
    Idle,
    Idle2Loaded,

    // `auto_detecting` submachine (streaming/youtube/tunein variants)
    AutoDetectDriving,
    AutoDetectAwaitingSettings,
    AutoDetectAwaitingFormat,

    // `updating_graph` submachine
    UpdatingGraphToIdle,
    UpdatingGraphToExe,

    // `reconfiguring_tunnel_<i>` submachine
    ReconfDisabling(TunnelId),
    ReconfEnabling(TunnelId),

    Unloaded,
}

/// Distinguishes the graph variants described informally alongside the
/// generic decoder lifecycle. `GraphFsm` carries one of these and consults
/// it wherever the lifecycle genuinely forks, rather than duplicating the
/// whole state machine per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphVariant {
    Decoder,
    HttpServer,
    StreamingService,
    Chromecast,
    YouTube,
}

impl GraphVariant {
    /// `StreamingService` (and by extension `YouTube`, which is a
    /// streaming-service graph with a second tunnel) prepends
    /// auto-detection to the lifecycle so the decoder/renderer tail is
    /// chosen only after the source announces its format.
    pub fn auto_detects(self) -> bool {
        matches!(self, GraphVariant::StreamingService | GraphVariant::YouTube)
    }

    /// Chromecast has no internal tunnels: a single source/sink pair, no
    /// `configuring` port-disable/probe dance, just `disabling_comp_ports
    /// -> config2idle -> idle2exe`.
    pub fn has_tunnels(self) -> bool {
        !matches!(self, GraphVariant::Chromecast)
    }

    /// `HttpServer` and `Chromecast` have nothing to probe — there is no
    /// content URI to inspect, only station/server tuning or a cast
    /// target already fully specified by the caller's config (§4.5:
    /// Chromecast's lifecycle is "`disabling_comp_ports -> config2idle ->
    /// idle2exe -> Executing`" with no probing step at all). Entering
    /// `configuring` for these variants skips straight past
    /// `ConfDisablingPorts`/`ConfProbing` to `configure` + `loaded2idle`.
    pub fn skips_probing(self) -> bool {
        matches!(self, GraphVariant::HttpServer | GraphVariant::Chromecast)
    }
}
