use std::collections::HashSet;
use std::sync::Arc;

use tz_omx_api::{
    ComponentHandle, ComponentIdentity, Coding, GraphConfig, IlCore, OmxCallbacks, OmxCommand,
    OmxComponent, OmxError, OmxIndex, OmxResult, ParamValue, PortIndex, StateId, Tunnel, TunnelId,
};

use crate::expected::{ExpectedPortTransitions, ExpectedTransitions, PortTransitionKind};
use crate::handles::ComponentList;
use crate::outbound::MetadataSink;
use crate::probe::{ProbeError, ProbeOutcome, Prober};

/// `(code, human-readable message)`, the last internal error `ops`
/// recorded (§3, "Graph instance").
pub type InternalError = (OmxError, String);

/// Graph operations (§4.4): the stateful service a graph owns. Every
/// action here is atomic from the FSM's point of view, may issue one or
/// more OMX IL calls, and records any failure so the dispatcher's
/// error-containment check (§4.2) can see it after the action returns.
pub struct GraphOps {
    il_core: Arc<dyn IlCore>,
    callbacks: Arc<dyn OmxCallbacks>,
    components: ComponentList,
    tunnels: Vec<Tunnel>,
    expected: ExpectedTransitions,
    expected_ports: ExpectedPortTransitions,

    last_error: Option<InternalError>,
    last_op_succeeded: bool,
    destination_state: Option<StateId>,

    playlist_uris: Vec<String>,
    playlist_index: i64,
    pending_skip_jump: i32,
    pending_position: Option<f64>,
    pending_http_server: Option<tz_omx_api::HttpServerConfig>,
    pending_server_tuning: Option<tz_omx_api::ServerTuningConfig>,

    prober: Box<dyn Prober>,
    probe_outcome: Option<ProbeOutcome>,
    probe_ok: bool,

    eos_seen: HashSet<ComponentHandle>,
    port_settings_required: bool,

    volume_percent: u32,
    muted: bool,

    metadata_sink: Option<Box<dyn MetadataSink>>,
}

impl GraphOps {
    pub fn new(il_core: Arc<dyn IlCore>, callbacks: Arc<dyn OmxCallbacks>, prober: Box<dyn Prober>) -> Self {
        GraphOps {
            il_core,
            callbacks,
            components: ComponentList::new(),
            tunnels: Vec::new(),
            expected: ExpectedTransitions::new(),
            expected_ports: ExpectedPortTransitions::new(),
            last_error: None,
            last_op_succeeded: true,
            destination_state: None,
            playlist_uris: Vec::new(),
            playlist_index: 0,
            pending_skip_jump: 1,
            pending_position: None,
            pending_http_server: None,
            pending_server_tuning: None,
            prober,
            probe_outcome: None,
            probe_ok: true,
            eos_seen: HashSet::new(),
            port_settings_required: false,
            volume_percent: 100,
            muted: false,
            metadata_sink: None,
        }
    }

    pub fn set_metadata_sink(&mut self, sink: Box<dyn MetadataSink>) {
        self.metadata_sink = Some(sink);
    }

    fn record<T>(&mut self, label: &str, result: OmxResult<T>) -> Option<T> {
        match result {
            Ok(v) => {
                self.last_op_succeeded = true;
                Some(v)
            }
            Err(err) => {
                tracing::error!(op = label, ?err, "ops action failed");
                self.last_error = Some((err, format!("{label}: {err}")));
                self.last_op_succeeded = false;
                None
            }
        }
    }

    // ---- actions -------------------------------------------------------

    /// `load` (§4.4): instantiate every component in `roles`, registering
    /// the graph's callback adapter on each.
    pub fn load(&mut self, roles: &[(String, String)]) {
        for (role, name) in roles {
            let result = self.il_core.get_handle(role, name, self.callbacks.clone());
            match result {
                Ok((handle, component)) => {
                    let identity = ComponentIdentity {
                        role: role.clone(),
                        name: name.clone(),
                        owner: 0,
                    };
                    self.components.push(identity, handle, component);
                    self.last_op_succeeded = true;
                }
                Err(err) => {
                    tracing::error!(?err, role, "OMX_GetHandle failed");
                    self.last_error = Some((err, format!("load: GetHandle({role}) failed: {err}")));
                    self.last_op_succeeded = false;
                    return;
                }
            }
        }
    }

    /// `setup` (§4.4): sets up one tunnel per adjacent `(output, input)`
    /// pair described by `links`, in order. The output side is negotiated
    /// first (§0 supplement): `OMX_SetupTunnel` is issued on the producer,
    /// whose preferred supplier the consumer may only override by
    /// declaring `Unspecified`.
    pub fn setup(&mut self, links: &[(ComponentHandle, PortIndex, ComponentHandle, PortIndex)]) {
        for (i, (out_h, out_p, in_h, in_p)) in links.iter().enumerate() {
            let result = self.il_core.setup_tunnel(*out_h, *out_p, *in_h, *in_p);
            match self.record("setup_tunnel", result) {
                Some(supplier) => {
                    let mut tunnel = Tunnel::new(TunnelId(i as u32), *out_h, *out_p, *in_h, *in_p);
                    tunnel.supplier = supplier;
                    tunnel.enabled = true;
                    self.tunnels.push(tunnel);
                }
                None => return,
            }
        }
    }

    /// Stores an incoming `GraphConfig` in the slot matching its variant
    /// rather than one shared "last config" field, so a station/stream
    /// config and a separately-sent server-tuning config don't clobber
    /// each other (§0 open-question decision, DESIGN.md): `configure_server`
    /// reads `pending_server_tuning` independently of whatever
    /// `configure_station`/`configure_stream` last saw in
    /// `pending_http_server`.
    pub fn store_config(&mut self, config: GraphConfig) {
        match config {
            GraphConfig::UriList(ref list) => {
                self.playlist_uris = list.uris.clone();
                self.playlist_index = list.current_index as i64;
            }
            GraphConfig::HttpServer(ref cfg) => self.pending_http_server = Some(cfg.clone()),
            GraphConfig::ServerTuning(ref cfg) => self.pending_server_tuning = Some(cfg.clone()),
            GraphConfig::StreamingService(_) | GraphConfig::Playback(_) => {}
        }
        self.last_op_succeeded = true;
    }

    pub fn store_skip(&mut self, jump: i32) {
        self.pending_skip_jump = jump;
        self.last_op_succeeded = true;
    }

    pub fn store_position(&mut self, position: f64) {
        self.pending_position = Some(position);
        self.last_op_succeeded = true;
    }

    /// `probe` (§4.4): read-only inspection of the current URI. A
    /// recoverable failure clears `probe_ok` so the FSM's
    /// `is_probing_result_ok` guard routes to the retry branch; a fatal
    /// one is additionally surfaced as a `FormatNotDetected` internal
    /// error so the dispatcher's error-containment path tears the graph
    /// down (§7, error kind 2/4).
    pub fn probe(&mut self) {
        let Some(uri) = self.current_uri().map(str::to_owned) else {
            self.probe_ok = false;
            return;
        };
        match self.prober.probe(&uri) {
            Ok(outcome) => {
                self.probe_outcome = Some(outcome);
                self.probe_ok = true;
                self.last_op_succeeded = true;
            }
            Err(ProbeError { message, recoverable: true }) => {
                tracing::warn!(uri, message, "recoverable probe failure");
                self.probe_ok = false;
                self.last_op_succeeded = true;
            }
            Err(ProbeError { message, recoverable: false }) => {
                tracing::error!(uri, message, "fatal probe failure");
                self.probe_ok = false;
                self.last_error = Some((OmxError::FormatNotDetected, message));
                self.last_op_succeeded = false;
            }
        }
    }

    pub fn reset_error(&mut self) {
        self.last_error = None;
        self.last_op_succeeded = true;
    }

    /// `configure` (§4.4): content URI on the source, PCM mode on the
    /// renderer, codec params on everything in between, all derived from
    /// the last successful probe.
    pub fn configure(&mut self) {
        let Some(uri) = self.current_uri().map(str::to_owned) else {
            return;
        };
        let handles = self.components.handles();
        let Some((&source, rest)) = handles.split_first() else {
            return;
        };
        let result = self
            .components
            .get(source)
            .map(|e| e.component.clone())
            .ok_or(OmxError::BadParameter)
            .and_then(|c| c.set_parameter(OmxIndex::ParamContentURI, None, ParamValue::ContentUri(uri)));
        if self.record("configure(source uri)", result).is_none() {
            return;
        }

        let Some(outcome) = self.probe_outcome.clone() else {
            return;
        };

        if let Some((&sink, middle)) = rest.split_last() {
            let result = self
                .components
                .get(sink)
                .map(|e| e.component.clone())
                .ok_or(OmxError::BadParameter)
                .and_then(|c| {
                    c.set_parameter(
                        OmxIndex::ParamAudioPcm,
                        None,
                        ParamValue::AudioPcm {
                            sample_rate_hz: outcome.sample_rate_hz,
                            channels: outcome.channels,
                            bits_per_sample: 16,
                        },
                    )
                });
            if self.record("configure(sink pcm)", result).is_none() {
                return;
            }

            let codec_index = coding_to_index(outcome.coding);
            for &h in middle {
                let result = self
                    .components
                    .get(h)
                    .map(|e| e.component.clone())
                    .ok_or(OmxError::BadParameter)
                    .and_then(|c| {
                        c.set_parameter(
                            codec_index,
                            None,
                            ParamValue::AudioCoded {
                                bitrate_kbps: outcome.bitrate_kbps,
                                sample_rate_hz: outcome.sample_rate_hz,
                                channels: outcome.channels,
                            },
                        )
                    });
                if self.record("configure(codec params)", result).is_none() {
                    return;
                }
            }
        }
    }

    /// `configure_station` (§4.5, HTTP-server variant): applies the
    /// station name/genre to the encoder (first handle).
    pub fn configure_station(&mut self) {
        let Some(cfg) = self.pending_http_server.clone() else {
            return;
        };
        let Some(&encoder) = self.components.handles().first() else {
            return;
        };
        let result = self
            .components
            .get(encoder)
            .map(|e| e.component.clone())
            .ok_or(OmxError::BadParameter)
            .and_then(|c| {
                c.set_parameter(
                    OmxIndex::TizoniaParamStationInfo,
                    None,
                    ParamValue::StationInfo { name: cfg.station_name, genre: cfg.genre },
                )
            });
        self.record("configure_station", result);
    }

    /// `configure_stream` (§4.5): applies the bitrate/sample-rate/channel
    /// triple to the encoder.
    pub fn configure_stream(&mut self) {
        let Some(cfg) = self.pending_http_server.clone() else {
            return;
        };
        let Some(&encoder) = self.components.handles().first() else {
            return;
        };
        let result = self
            .components
            .get(encoder)
            .map(|e| e.component.clone())
            .ok_or(OmxError::BadParameter)
            .and_then(|c| {
                c.set_parameter(
                    OmxIndex::ParamAudioMp3,
                    None,
                    ParamValue::AudioCoded {
                        bitrate_kbps: cfg.bitrate_kbps,
                        sample_rate_hz: cfg.sample_rate_hz,
                        channels: cfg.channels,
                    },
                )
            });
        self.record("configure_stream", result);
    }

    /// `configure_server` (§4.5): applies buffer/client tuning to the
    /// server (last handle). `ServerTuningConfig` arrives as its own
    /// `GraphConfig` variant (§3) rather than nested in `HttpServerConfig`,
    /// and is stored in its own slot (`pending_server_tuning`) so sending
    /// it separately from the station config doesn't clobber, or get
    /// clobbered by, `pending_http_server`.
    pub fn configure_server(&mut self) {
        let Some(cfg) = self.pending_server_tuning.clone() else {
            return;
        };
        let Some(&server) = self.components.handles().last() else {
            return;
        };
        let result = self
            .components
            .get(server)
            .map(|e| e.component.clone())
            .ok_or(OmxError::BadParameter)
            .and_then(|c| {
                c.set_parameter(
                    OmxIndex::TizoniaParamServerTuning,
                    None,
                    ParamValue::ServerTuning { buffer_seconds: cfg.buffer_seconds, max_clients: cfg.max_clients },
                )
            });
        self.record("configure_server", result);
    }

    /// Finds which tunnel a port-settings-changed callback is reporting
    /// on, matching either end of the tunnel (§4.5: YouTube's second
    /// tunnel can renegotiate independently of the first, so callers must
    /// not assume `TunnelId(0)`).
    pub fn tunnel_for(&self, handle: ComponentHandle, port: PortIndex) -> Option<TunnelId> {
        self.tunnels
            .iter()
            .find(|t| (t.output_handle == handle && t.output_port == port) || (t.input_handle == handle && t.input_port == port))
            .map(|t| t.id)
    }

    pub fn disable_tunnel(&mut self, tid: TunnelId) {
        let Some(tunnel) = self.tunnels.iter().find(|t| t.id == tid).cloned() else {
            return;
        };
        self.issue_port_command(tunnel.output_handle, tunnel.output_port, OmxCommand::PortDisable(Some(tunnel.output_port)), PortTransitionKind::Disable);
        self.issue_port_command(tunnel.input_handle, tunnel.input_port, OmxCommand::PortDisable(Some(tunnel.input_port)), PortTransitionKind::Disable);
    }

    pub fn enable_tunnel(&mut self, tid: TunnelId) {
        let Some(tunnel) = self.tunnels.iter().find(|t| t.id == tid).cloned() else {
            return;
        };
        self.issue_port_command(tunnel.output_handle, tunnel.output_port, OmxCommand::PortEnable(Some(tunnel.output_port)), PortTransitionKind::Enable);
        self.issue_port_command(tunnel.input_handle, tunnel.input_port, OmxCommand::PortEnable(Some(tunnel.input_port)), PortTransitionKind::Enable);
    }

    fn issue_port_command(&mut self, handle: ComponentHandle, port: PortIndex, cmd: OmxCommand, kind: PortTransitionKind) {
        self.expected_ports.expect(handle, port, kind);
        let result = self
            .components
            .get(handle)
            .map(|e| e.component.clone())
            .ok_or(OmxError::BadParameter)
            .and_then(|c| c.send_command(cmd));
        if result.is_err() {
            self.expected_ports.ack(handle, port, kind);
        }
        self.record("issue_port_command", result);
    }

    /// Re-applies the negotiated PCM parameters to both ends of tunnel
    /// `tid` after a mid-playback `OmxPortSettings` renegotiation (§4.5,
    /// `reconfiguring_tunnel_<i>`).
    pub fn reconfigure_tunnel(&mut self, tid: TunnelId, pcm: ParamValue) {
        let Some(tunnel) = self.tunnels.iter().find(|t| t.id == tid).cloned() else {
            return;
        };
        for handle in [tunnel.output_handle, tunnel.input_handle] {
            let result = self
                .components
                .get(handle)
                .map(|e| e.component.clone())
                .ok_or(OmxError::BadParameter)
                .and_then(|c| c.set_parameter(OmxIndex::ParamAudioPcm, None, pcm.clone()));
            if self.record("reconfigure_tunnel", result).is_none() {
                return;
            }
        }
    }

    fn transition_all(&mut self, target: StateId, downward: bool) {
        let handles = if downward {
            self.components.handles_reversed()
        } else {
            self.components.handles()
        };
        // Record expectations before issuing any command (§0 supplement).
        self.expected.expect_all(&handles, target);
        for h in &handles {
            let result = self
                .components
                .get(*h)
                .map(|e| e.component.clone())
                .ok_or(OmxError::BadParameter)
                .and_then(|c| c.send_command(OmxCommand::StateSet(target)));
            if self.record("transition_all", result).is_none() {
                return;
            }
        }
    }

    pub fn loaded2idle(&mut self) {
        self.transition_all(StateId::Idle, false);
    }

    pub fn idle2exe(&mut self) {
        self.transition_all(StateId::Executing, false);
    }

    pub fn exe2pause(&mut self) {
        self.transition_all(StateId::Pause, false);
    }

    pub fn pause2exe(&mut self) {
        self.transition_all(StateId::Executing, false);
    }

    pub fn exe2idle(&mut self) {
        self.transition_all(StateId::Idle, true);
    }

    pub fn idle2loaded(&mut self) {
        self.transition_all(StateId::Loaded, true);
    }

    /// Drives only the source (first handle) through a transition,
    /// independent of the rest of the pipeline — used by the HTTP-server
    /// graph variant (§4.5) where the encoder and server are driven
    /// separately.
    pub fn source_transition(&mut self, target: StateId) {
        let Some(source) = self.components.handles().first().copied() else {
            return;
        };
        self.expected.expect_all(&[source], target);
        let result = self
            .components
            .get(source)
            .map(|e| e.component.clone())
            .ok_or(OmxError::BadParameter)
            .and_then(|c| c.send_command(OmxCommand::StateSet(target)));
        self.record("source_transition", result);
    }

    /// Drives every handle but the source through a transition — used to
    /// bring the decoder/renderer tail `updating_graph` just added up to
    /// the source's own state once auto-detection has picked them (§4.5).
    pub fn tail_transition(&mut self, target: StateId) {
        let tail: Vec<ComponentHandle> = self.components.handles().into_iter().skip(1).collect();
        if tail.is_empty() {
            return;
        }
        self.expected.expect_all(&tail, target);
        for h in &tail {
            let result = self
                .components
                .get(*h)
                .map(|e| e.component.clone())
                .ok_or(OmxError::BadParameter)
                .and_then(|c| c.send_command(OmxCommand::StateSet(target)));
            if self.record("tail_transition", result).is_none() {
                return;
            }
        }
    }

    pub fn ack_transition(&mut self, handle: ComponentHandle, reached: StateId) {
        self.components.record_state(handle, reached);
        self.expected.ack(handle, reached);
    }

    pub fn ack_port_disabled(&mut self, handle: ComponentHandle, port: PortIndex) {
        self.expected_ports.ack(handle, port, PortTransitionKind::Disable);
    }

    pub fn ack_port_enabled(&mut self, handle: ComponentHandle, port: PortIndex) {
        self.expected_ports.ack(handle, port, PortTransitionKind::Enable);
    }

    pub fn record_eos(&mut self, handle: ComponentHandle) -> bool {
        self.eos_seen.insert(handle)
    }

    pub fn require_port_settings_evt(&mut self, required: bool) {
        self.port_settings_required = required;
    }

    /// Advances the playlist cursor by the stored jump (default +/-1).
    pub fn skip(&mut self) {
        self.playlist_index += self.pending_skip_jump as i64;
        self.pending_skip_jump = 1;
        self.last_op_succeeded = true;
    }

    pub fn volume(&mut self, absolute: f32) {
        let absolute = absolute.clamp(0.0, 1.0);
        self.volume_percent = (absolute * 100.0).round() as u32;
        self.apply_volume();
    }

    /// Signed integer percent delta clamped to `0..=100` (§9, open
    /// question resolved in SPEC_FULL.md §0).
    pub fn volume_step(&mut self, delta: i32) {
        let new = (self.volume_percent as i32 + delta).clamp(0, 100) as u32;
        self.volume_percent = new;
        self.apply_volume();
    }

    fn apply_volume(&mut self) {
        let Some(sink) = self.components.handles().last().copied() else {
            return;
        };
        let value = ParamValue::Volume(self.volume_percent as f32 / 100.0);
        let result = self
            .components
            .get(sink)
            .map(|e| e.component.clone())
            .ok_or(OmxError::BadParameter)
            .and_then(|c| c.set_config(OmxIndex::ConfigAudioVolume, None, value));
        self.record("volume", result);
    }

    pub fn mute(&mut self) {
        self.muted = !self.muted;
        let Some(sink) = self.components.handles().last().copied() else {
            return;
        };
        let value = ParamValue::Mute(self.muted);
        let result = self
            .components
            .get(sink)
            .map(|e| e.component.clone())
            .ok_or(OmxError::BadParameter)
            .and_then(|c| c.set_config(OmxIndex::ConfigAudioMute, None, value));
        self.record("mute", result);
    }

    pub fn tear_down_tunnels(&mut self) {
        for tunnel in self.tunnels.drain(..) {
            if let Err(err) = self.il_core.teardown_tunnel(
                tunnel.output_handle,
                tunnel.output_port,
                tunnel.input_handle,
                tunnel.input_port,
            ) {
                tracing::warn!(?err, tunnel = tunnel.id.0, "teardown_tunnel failed, ignoring");
            }
        }
        self.last_op_succeeded = true;
    }

    pub fn destroy_graph(&mut self) {
        for entry in self.components.drain() {
            if let Err(err) = self.il_core.free_handle(entry.handle) {
                tracing::warn!(?err, name = entry.identity.name, "free_handle failed");
            }
        }
        self.last_op_succeeded = true;
    }

    /// `retrieve_metadata` (§4.4, §6): walks every handle's metadata
    /// items, emitting each through the metadata sink. Only the very
    /// first pair across the whole sweep is flagged as a heading.
    pub fn retrieve_metadata(&mut self) {
        let handles = self.components.handles();
        let mut first_emitted = false;
        for h in handles {
            let Some(component) = self.components.get(h).map(|e| e.component.clone()) else {
                continue;
            };
            let count = match component.get_config(OmxIndex::ConfigMetadataItemCount, None) {
                Ok(ParamValue::MetadataItemCount(n)) => n,
                _ => continue,
            };
            for _ in 0..count {
                if let Ok(ParamValue::MetadataItem { key, value }) =
                    component.get_config(OmxIndex::ConfigMetadataItem, None)
                {
                    if let Some(sink) = self.metadata_sink.as_deref_mut() {
                        sink.on_metadata(&key, &value, !first_emitted);
                    }
                    first_emitted = true;
                }
            }
        }
        self.last_op_succeeded = true;
    }

    pub fn record_fatal_error(&mut self, handle: ComponentHandle, err: OmxError, port: Option<PortIndex>) {
        let name = self
            .components
            .get(handle)
            .map(|e| e.identity.name.clone())
            .unwrap_or_else(|| "<unknown>".to_string());
        let message = match port {
            Some(p) => format!("component '{name}' port {p}: {err}"),
            None => format!("component '{name}': {err}"),
        };
        tracing::error!(name, ?err, port, "fatal component error");
        self.last_error = Some((err, message));
        self.last_op_succeeded = false;
    }

    pub fn record_destination(&mut self, state: StateId) {
        self.destination_state = Some(state);
    }

    // ---- guards ----------------------------------------------------------

    pub fn is_trans_complete(&self, _handle: ComponentHandle, state: StateId) -> bool {
        self.expected.is_complete(state)
    }

    /// True once every port expected to disable has acknowledged, not just
    /// `(handle, port)` — a tunnel's two ends are expected together, so
    /// completeness has to be evaluated across the whole pending set, the
    /// same way `is_trans_complete` does for state transitions.
    pub fn is_port_disabling_complete(&self, _handle: ComponentHandle, _port: PortIndex) -> bool {
        self.expected_ports.is_all_complete(PortTransitionKind::Disable)
    }

    pub fn is_port_enabling_complete(&self, _handle: ComponentHandle, _port: PortIndex) -> bool {
        self.expected_ports.is_all_complete(PortTransitionKind::Enable)
    }

    pub fn is_last_op_succeeded(&self) -> bool {
        self.last_op_succeeded
    }

    pub fn is_end_of_play(&self) -> bool {
        self.playlist_index < 0 || self.playlist_index as usize >= self.playlist_uris.len()
    }

    pub fn is_probing_result_ok(&self) -> bool {
        self.probe_ok
    }

    pub fn is_fatal_error(&self, err: OmxError) -> bool {
        err.is_fatal()
    }

    pub fn is_tunnel_altered(&self, _tid: TunnelId, _handle: ComponentHandle, _port: PortIndex, index: OmxIndex) -> bool {
        matches!(
            index,
            OmxIndex::ParamAudioPcm
                | OmxIndex::ParamAudioMp3
                | OmxIndex::ParamAudioAac
                | OmxIndex::ParamAudioVorbis
                | OmxIndex::TizoniaParamAudioOpus
                | OmxIndex::TizoniaParamAudioFlac
                | OmxIndex::TizoniaParamAudioMp2
        )
    }

    /// §9: "treat `is_last_eos(h)` as 'h is the last handle in the current
    /// component list'".
    pub fn is_last_eos(&self, handle: ComponentHandle) -> bool {
        self.components.is_last(handle)
    }

    pub fn is_first_eos(&self, handle: ComponentHandle) -> bool {
        !self.eos_seen.contains(&handle)
    }

    pub fn is_component_state(&self, handle: ComponentHandle, state: StateId) -> bool {
        self.components.get(handle).map(|e| e.recorded_state) == Some(state)
    }

    pub fn is_destination_state(&self, state: StateId) -> bool {
        self.destination_state == Some(state)
    }

    pub fn is_disabled_evt_required(&self) -> bool {
        !self.expected_ports.is_all_complete(PortTransitionKind::Disable)
    }

    pub fn is_port_settings_evt_required(&self) -> bool {
        self.port_settings_required
    }

    pub fn internal_error(&self) -> Option<InternalError> {
        self.last_error.clone()
    }

    pub fn take_internal_error(&mut self) -> Option<InternalError> {
        self.last_error.take()
    }

    pub fn current_uri(&self) -> Option<&str> {
        if self.playlist_index < 0 {
            return None;
        }
        self.playlist_uris.get(self.playlist_index as usize).map(String::as_str)
    }

    pub fn component_handles(&self) -> Vec<ComponentHandle> {
        self.components.handles()
    }

    pub fn tunnels(&self) -> &[Tunnel] {
        &self.tunnels
    }

    pub fn probe_outcome(&self) -> Option<&ProbeOutcome> {
        self.probe_outcome.as_ref()
    }

    pub fn volume_percent(&self) -> u32 {
        self.volume_percent
    }
}

fn coding_to_index(coding: Coding) -> OmxIndex {
    match coding {
        Coding::Mp3 => OmxIndex::ParamAudioMp3,
        Coding::Aac => OmxIndex::ParamAudioAac,
        Coding::Vorbis => OmxIndex::ParamAudioVorbis,
        Coding::Opus => OmxIndex::TizoniaParamAudioOpus,
        Coding::Flac => OmxIndex::TizoniaParamAudioFlac,
        Coding::Mp2 => OmxIndex::TizoniaParamAudioMp2,
        Coding::Pcm | Coding::Unused => OmxIndex::ParamAudioPcm,
    }
}
