use std::sync::Arc;

use tz_omx_api::{OmxCallbackEvent, OmxError, StateId, TunnelId};
use tz_ops::{GraphCallbacks, GraphOps};
use tz_queue::{EventProcessor, ExternalEvent, GraphEvent, InternalEvent};

use crate::state::{GraphState, GraphVariant};

/// Drives one graph's hierarchical state machine. Owns the `ops` instance
/// the actions and guards run against, plus the handful of fields a
/// submachine needs across events (which tunnel is mid-reconfiguration,
/// events deferred while it runs).
pub struct GraphFsm {
    state: GraphState,
    variant: GraphVariant,
    ops: GraphOps,
    callbacks: Arc<dyn GraphCallbacks>,
    /// Events that arrived while `reconfiguring_tunnel_<i>` was active;
    /// replayed in order once it exits.
    deferred: Vec<GraphEvent>,
    reconfiguring: bool,
}

impl GraphFsm {
    pub fn new(variant: GraphVariant, ops: GraphOps, callbacks: Arc<dyn GraphCallbacks>) -> Self {
        GraphFsm {
            state: GraphState::Inited,
            variant,
            ops,
            callbacks,
            deferred: Vec::new(),
            reconfiguring: false,
        }
    }

    pub fn state(&self) -> GraphState {
        self.state
    }

    pub fn ops(&self) -> &GraphOps {
        &self.ops
    }

    pub fn ops_mut(&mut self) -> &mut GraphOps {
        &mut self.ops
    }

    fn goto(&mut self, next: GraphState) {
        tracing::debug!(from = ?self.state, to = ?next, "fsm transition");
        self.state = next;
    }

    /// Top-level dispatch. Mirrors the "no_transition trap": an event the
    /// current state doesn't recognize is logged and dropped rather than
    /// panicking.
    pub fn process(&mut self, event: GraphEvent) {
        if self.reconfiguring && Self::defers_during_reconfiguration(&event) {
            self.deferred.push(event);
            return;
        }

        match (&self.state, event) {
            // `Unloaded` is terminal: every event arriving afterwards is
            // dropped without side effects, including a late `OmxErr`.
            (GraphState::Unloaded, _) => {}

            // Inited --Load--> Loaded
            (GraphState::Inited, GraphEvent::External(ExternalEvent::Load(cfg))) => {
                self.ops.store_config(cfg);
                let roles = self.roles_for_variant();
                self.ops.load(&roles);
                if self.ops.is_last_op_succeeded() {
                    let links = self.links_for_variant();
                    self.ops.setup(&links);
                }
                self.callbacks.on_loaded();
                self.goto(GraphState::Loaded);
            }

            // Loaded --Execute--> Configuring (enters at disabling_comp_ports), or,
            // for streaming/youtube variants, Auto-detecting first.
            (GraphState::Loaded, GraphEvent::External(ExternalEvent::Execute(cfg))) => {
                self.ops.store_config(cfg);
                if self.ops.is_last_op_succeeded() {
                    if self.variant.auto_detects() {
                        self.enter_auto_detecting();
                    } else {
                        self.enter_configuring();
                    }
                }
            }

            // `configuring` submachine
            (GraphState::ConfDisablingPorts, _noop) => {
                if self.ops.is_disabled_evt_required() {
                    self.goto(GraphState::ConfAwaitingPortDisabled);
                } else {
                    self.ops.probe();
                    self.goto(GraphState::ConfProbing);
                    self.advance_probing();
                }
            }
            (GraphState::ConfAwaitingPortDisabled, GraphEvent::Omx(OmxCallbackEvent::PortDisabled { handle, port, .. })) => {
                self.ops.ack_port_disabled(handle, port);
                if self.ops.is_port_disabling_complete(handle, port) {
                    self.ops.probe();
                    self.goto(GraphState::ConfProbing);
                    self.advance_probing();
                }
            }
            (GraphState::ConfProbing, _noop) => self.advance_probing(),

            (GraphState::ConfAwaitingPortSettings, GraphEvent::Omx(OmxCallbackEvent::PortSettings { .. })) => {
                self.ops.configure();
                self.ops.loaded2idle();
                self.goto(GraphState::ConfConfig2Idle);
            }

            (GraphState::ConfConfig2Idle, GraphEvent::Omx(OmxCallbackEvent::Trans { handle, reached_state, .. })) => {
                self.ops.ack_transition(handle, reached_state);
                if self.ops.is_trans_complete(handle, StateId::Idle) {
                    self.ops.idle2exe();
                    self.goto(GraphState::ConfIdle2Exe);
                }
            }

            (GraphState::ConfIdle2Exe, GraphEvent::Omx(OmxCallbackEvent::Trans { handle, reached_state, .. })) => {
                self.ops.ack_transition(handle, reached_state);
                if self.ops.is_trans_complete(handle, StateId::Executing) {
                    self.exit_configuring();
                }
            }

            // `executing` main state
            (GraphState::Executing, GraphEvent::External(ExternalEvent::Skip(jump))) => {
                self.ops.store_skip(jump);
                self.enter_skipping();
            }
            (GraphState::Executing, GraphEvent::External(ExternalEvent::Seek(pos))) => {
                self.ops.store_position(pos);
            }
            // `Position` is a progress report, not a seek request: the
            // renderer's own clock drives it, so the graph just records it.
            (GraphState::Executing, GraphEvent::External(ExternalEvent::Position(pos))) => {
                self.ops.store_position(pos);
            }
            (GraphState::Executing, GraphEvent::External(ExternalEvent::VolumeStep(delta))) => {
                self.ops.volume_step(delta);
                self.callbacks.on_volume_acked(self.ops.volume_percent());
            }
            (GraphState::Executing, GraphEvent::External(ExternalEvent::Volume(v))) => {
                self.ops.volume(v);
                self.callbacks.on_volume_acked(self.ops.volume_percent());
            }
            (GraphState::Executing, GraphEvent::External(ExternalEvent::Mute)) => {
                self.ops.mute();
            }
            (GraphState::Executing, GraphEvent::External(ExternalEvent::Pause)) => {
                self.ops.exe2pause();
                self.goto(GraphState::Exe2Pause);
            }
            (GraphState::Executing, GraphEvent::External(ExternalEvent::Stop)) => {
                self.ops.record_destination(StateId::Idle);
                self.ops.exe2idle();
                self.goto(GraphState::Exe2Idle);
            }
            (GraphState::Executing, GraphEvent::External(ExternalEvent::Unload)) => {
                self.ops.exe2idle();
                self.goto(GraphState::Exe2Idle);
            }
            (GraphState::Executing, GraphEvent::Internal(InternalEvent::Err(err, msg))) => {
                if self.ops.is_fatal_error(err) {
                    tracing::warn!(?err, msg, "fatal error while executing");
                    self.callbacks.on_error(&msg);
                    self.ops.exe2idle();
                    self.goto(GraphState::Exe2Idle);
                } else {
                    self.enter_skipping();
                }
            }
            (GraphState::Executing, GraphEvent::Omx(OmxCallbackEvent::Eos { handle, .. })) => {
                if self.ops.is_last_eos(handle) {
                    self.enter_skipping();
                }
            }
            (GraphState::Executing, GraphEvent::Internal(InternalEvent::Timer(_))) => {
                // progress display ticks; no state change.
            }
            (GraphState::Executing, GraphEvent::Omx(OmxCallbackEvent::PortSettings { handle, port, index })) => {
                if let Some(tid) = self.ops.tunnel_for(handle, port) {
                    if self.ops.is_tunnel_altered(tid, handle, port, index) {
                        self.enter_reconfiguring(tid);
                    }
                }
            }

            // `skipping` submachine
            (GraphState::SkipToIdle, GraphEvent::Omx(OmxCallbackEvent::Trans { handle, reached_state, .. })) => {
                self.ops.ack_transition(handle, reached_state);
                if self.ops.is_trans_complete(handle, StateId::Idle) {
                    self.ops.idle2loaded();
                    self.goto(GraphState::SkipIdle2Loaded);
                }
            }
            (GraphState::SkipIdle2Loaded, GraphEvent::Omx(OmxCallbackEvent::Trans { handle, reached_state, .. })) => {
                self.ops.ack_transition(handle, reached_state);
                if self.ops.is_trans_complete(handle, StateId::Loaded) {
                    self.ops.skip();
                    self.exit_skipping();
                }
            }

            // `exe2pause` / `paused` / `pause2exe` / `pause2idle`
            (GraphState::Exe2Pause, GraphEvent::Omx(OmxCallbackEvent::Trans { handle, reached_state, .. })) => {
                self.ops.ack_transition(handle, reached_state);
                if self.ops.is_trans_complete(handle, StateId::Pause) {
                    self.callbacks.on_paused();
                    self.goto(GraphState::Paused);
                }
            }
            (GraphState::Paused, GraphEvent::External(ExternalEvent::Execute(_) | ExternalEvent::Pause)) => {
                self.ops.pause2exe();
                self.goto(GraphState::Pause2Exe);
            }
            (GraphState::Paused, GraphEvent::External(ExternalEvent::Stop)) => {
                self.ops.record_destination(StateId::Idle);
                self.ops.pause2idle();
                self.goto(GraphState::Pause2Idle);
            }
            (GraphState::Paused, GraphEvent::External(ExternalEvent::Unload)) => {
                self.ops.pause2idle();
                self.goto(GraphState::Pause2Idle);
            }
            (GraphState::Pause2Exe, GraphEvent::Omx(OmxCallbackEvent::Trans { handle, reached_state, .. })) => {
                self.ops.ack_transition(handle, reached_state);
                if self.ops.is_trans_complete(handle, StateId::Executing) {
                    self.callbacks.on_resumed();
                    self.goto(GraphState::Executing);
                }
            }
            (GraphState::Pause2Idle, GraphEvent::Omx(OmxCallbackEvent::Trans { handle, reached_state, .. })) => {
                self.ops.ack_transition(handle, reached_state);
                if !self.ops.is_trans_complete(handle, StateId::Idle) {
                    return;
                }
                if self.ops.is_destination_state(StateId::Idle) {
                    self.callbacks.on_stopped();
                    self.goto(GraphState::Idle);
                } else {
                    self.ops.idle2loaded();
                    self.goto(GraphState::Idle2Loaded);
                }
            }

            // `exe2idle` / `idle` / `idle2loaded`
            (GraphState::Exe2Idle, GraphEvent::Omx(OmxCallbackEvent::Trans { handle, reached_state, .. })) => {
                self.ops.ack_transition(handle, reached_state);
                if !self.ops.is_trans_complete(handle, StateId::Idle) {
                    return;
                }
                if self.ops.is_destination_state(StateId::Idle) {
                    self.callbacks.on_stopped();
                    self.goto(GraphState::Idle);
                } else {
                    self.ops.idle2loaded();
                    self.goto(GraphState::Idle2Loaded);
                }
            }
            (GraphState::Idle, GraphEvent::External(ExternalEvent::Execute(_))) => {
                self.ops.idle2exe();
                self.callbacks.on_execd();
                self.goto(GraphState::Executing);
            }
            (GraphState::Idle, GraphEvent::External(ExternalEvent::Unload)) => {
                self.ops.idle2loaded();
                self.goto(GraphState::Idle2Loaded);
            }
            (GraphState::Idle2Loaded, GraphEvent::Omx(OmxCallbackEvent::Trans { handle, reached_state, .. })) => {
                self.ops.ack_transition(handle, reached_state);
                if self.ops.is_trans_complete(handle, StateId::Loaded) {
                    self.ops.tear_down_tunnels();
                    self.ops.destroy_graph();
                    self.callbacks.on_unloaded();
                    self.goto(GraphState::Unloaded);
                }
            }

            // `reconfiguring_tunnel_<i>` submachine
            (GraphState::ReconfDisabling(tid), GraphEvent::Omx(OmxCallbackEvent::PortDisabled { handle, port, .. })) => {
                let tid = *tid;
                self.ops.ack_port_disabled(handle, port);
                if self.ops.is_port_disabling_complete(handle, port) {
                    let pcm = self
                        .ops
                        .probe_outcome()
                        .map(|o| tz_omx_api::ParamValue::AudioPcm {
                            sample_rate_hz: o.sample_rate_hz,
                            channels: o.channels,
                            bits_per_sample: 16,
                        })
                        .unwrap_or(tz_omx_api::ParamValue::AudioPcm { sample_rate_hz: 44100, channels: 2, bits_per_sample: 16 });
                    self.ops.reconfigure_tunnel(tid, pcm);
                    self.ops.enable_tunnel(tid);
                    self.goto(GraphState::ReconfEnabling(tid));
                }
            }
            (GraphState::ReconfEnabling(tid), GraphEvent::Omx(OmxCallbackEvent::PortEnabled { handle, port, .. })) => {
                let tid = *tid;
                self.ops.ack_port_enabled(handle, port);
                if self.ops.is_port_enabling_complete(handle, port) {
                    self.exit_reconfiguring();
                }
            }

            // `auto_detecting` submachine. The source's own Idle/Executing
            // acks from `enter_auto_detecting` arrive here, not in
            // `updating_graph` (§5: single-component ordering) — ack them
            // so they don't linger as a permanently-pending expectation
            // once `updating_graph` starts expecting the tail instead.
            (GraphState::AutoDetectDriving, GraphEvent::Omx(OmxCallbackEvent::Trans { handle, reached_state, .. })) => {
                self.ops.ack_transition(handle, reached_state);
            }
            (GraphState::AutoDetectDriving, GraphEvent::Omx(OmxCallbackEvent::PortSettings { .. })) => {
                self.goto(GraphState::AutoDetectAwaitingFormat);
            }
            (GraphState::AutoDetectDriving, GraphEvent::Omx(OmxCallbackEvent::FormatDetected { .. })) => {
                self.goto(GraphState::AutoDetectAwaitingSettings);
            }
            (GraphState::AutoDetectAwaitingFormat, GraphEvent::Omx(OmxCallbackEvent::FormatDetected { .. })) => {
                self.enter_updating_graph();
            }
            (GraphState::AutoDetectAwaitingSettings, GraphEvent::Omx(OmxCallbackEvent::PortSettings { .. })) => {
                self.enter_updating_graph();
            }
            (GraphState::AutoDetectDriving, GraphEvent::Internal(InternalEvent::Err(err, _))) if err == OmxError::FormatNotDetected => {
                self.enter_skipping();
            }

            // `updating_graph` submachine: drives the newly-added
            // decoder/renderer tail `Loaded -> Idle -> Executing` while the
            // source, already `Executing`, stays put (§4.5).
            (GraphState::UpdatingGraphToIdle, GraphEvent::Omx(OmxCallbackEvent::Trans { handle, reached_state, .. })) => {
                self.ops.ack_transition(handle, reached_state);
                if self.ops.is_trans_complete(handle, StateId::Idle) {
                    self.ops.tail_transition(StateId::Executing);
                    self.goto(GraphState::UpdatingGraphToExe);
                }
            }
            (GraphState::UpdatingGraphToExe, GraphEvent::Omx(OmxCallbackEvent::Trans { handle, reached_state, .. })) => {
                self.ops.ack_transition(handle, reached_state);
                if self.ops.is_trans_complete(handle, StateId::Executing) {
                    self.ops.enable_tunnel(TunnelId(0));
                    self.ops.retrieve_metadata();
                    self.callbacks.on_execd();
                    self.goto(GraphState::Executing);
                }
            }

            // A component's own `OmxErr` callback just records the error;
            // the dispatcher's post-`process` containment check turns a
            // recorded error into the synthetic `InternalEvent::Err` the
            // arms above and below react to (§4.2, "error containment").
            (_, GraphEvent::Omx(OmxCallbackEvent::Err { handle, err, port, .. })) => {
                self.ops.record_fatal_error(handle, err, port);
            }

            // Orthogonal `AllOk` region: anything not matched above that
            // carries a fatal error tears the whole graph down rather than
            // tripping the no-transition trap.
            (_, GraphEvent::Internal(InternalEvent::Err(err, msg))) => {
                tracing::error!(?err, msg, state = ?self.state, "unhandled error, tearing down graph");
                self.callbacks.on_error(&msg);
                self.ops.tear_down_tunnels();
                self.ops.destroy_graph();
                self.callbacks.on_unloaded();
                self.goto(GraphState::Unloaded);
            }

            (state, event) => {
                tracing::warn!(?state, ?event, "no transition");
            }
        }
    }

    fn advance_probing(&mut self) {
        if self.ops.is_end_of_play() {
            self.exit_configuring_end_of_play();
            return;
        }
        if self.ops.is_probing_result_ok() {
            if self.ops.is_port_settings_evt_required() {
                self.goto(GraphState::ConfAwaitingPortSettings);
            } else {
                self.ops.configure();
                self.ops.loaded2idle();
                self.goto(GraphState::ConfConfig2Idle);
            }
        } else {
            self.ops.reset_error();
            self.ops.skip();
            self.ops.probe();
            self.goto(GraphState::ConfProbing);
            // `probing -> probing` is a "none" (epsilon) transition in the
            // original table; recurse immediately rather than waiting for
            // another event to re-enter this arm.
            self.advance_probing();
        }
    }

    fn enter_configuring(&mut self) {
        if self.variant.skips_probing() {
            // HttpServer/Chromecast have no content URI to probe: apply
            // whatever station/server/cast config is already pending and
            // go straight to `ConfConfig2Idle`, bypassing the port-disable
            // and probing steps entirely (§4.5).
            match self.variant {
                GraphVariant::HttpServer => {
                    self.ops.configure_station();
                    self.ops.configure_stream();
                    self.ops.configure_server();
                }
                GraphVariant::Chromecast => self.ops.configure(),
                _ => unreachable!("skips_probing() only returns true for HttpServer/Chromecast"),
            }
            self.ops.loaded2idle();
            self.goto(GraphState::ConfConfig2Idle);
            return;
        }
        self.goto(GraphState::ConfDisablingPorts);
        self.process(GraphEvent::Internal(InternalEvent::Configured)); // drive the none-event entry action
    }

    fn exit_configuring(&mut self) {
        self.ops.retrieve_metadata();
        self.callbacks.on_execd();
        self.goto(GraphState::Executing);
    }

    fn exit_configuring_end_of_play(&mut self) {
        self.ops.tear_down_tunnels();
        self.ops.destroy_graph();
        self.callbacks.on_unloaded();
        self.goto(GraphState::Unloaded);
    }

    fn enter_skipping(&mut self) {
        self.ops.exe2idle();
        self.goto(GraphState::SkipToIdle);
    }

    fn exit_skipping(&mut self) {
        if self.ops.is_end_of_play() {
            self.ops.tear_down_tunnels();
            self.ops.destroy_graph();
            self.callbacks.on_unloaded();
            self.goto(GraphState::Unloaded);
        } else {
            self.enter_configuring();
        }
    }

    fn enter_reconfiguring(&mut self, tid: TunnelId) {
        self.reconfiguring = true;
        self.ops.disable_tunnel(tid);
        self.goto(GraphState::ReconfDisabling(tid));
    }

    fn exit_reconfiguring(&mut self) {
        self.reconfiguring = false;
        self.goto(GraphState::Executing);
        for event in std::mem::take(&mut self.deferred) {
            self.process(event);
        }
    }

    /// Drives the source handle alone from `Loaded` towards `Executing`
    /// (mirroring `source_transition`'s un-awaited use for the HTTP-server
    /// variant) and waits for whichever of `PortSettings`/`FormatDetected`
    /// arrives first; that callback, not the source's own state-transition
    /// ack, is this submachine's real synchronization point.
    fn enter_auto_detecting(&mut self) {
        self.ops.source_transition(StateId::Idle);
        self.ops.source_transition(StateId::Executing);
        self.goto(GraphState::AutoDetectDriving);
    }

    fn enter_updating_graph(&mut self) {
        self.ops.configure();
        self.ops.tail_transition(StateId::Idle);
        self.goto(GraphState::UpdatingGraphToIdle);
    }

    fn defers_during_reconfiguration(event: &GraphEvent) -> bool {
        matches!(
            event,
            GraphEvent::External(ExternalEvent::Skip(_)) | GraphEvent::Omx(OmxCallbackEvent::PortSettings { .. })
        )
    }

    fn roles_for_variant(&self) -> Vec<(String, String)> {
        match self.variant {
            GraphVariant::Decoder => vec![
                ("audio_decoder.source".into(), "http_source".into()),
                ("audio_decoder.decoder".into(), "decoder".into()),
                ("audio_decoder.renderer".into(), "pcm_renderer".into()),
            ],
            GraphVariant::HttpServer => vec![
                ("audio_encoder.encoder".into(), "pcm_encoder".into()),
                ("audio_encoder.server".into(), "http_server".into()),
            ],
            GraphVariant::StreamingService => vec![
                ("audio_source.service".into(), "streaming_source".into()),
                ("audio_source.renderer".into(), "pcm_renderer".into()),
            ],
            GraphVariant::Chromecast => vec![("audio_sink.chromecast".into(), "chromecast_sink".into())],
            // Three handles so the generic `windows(2)` tunnel-building
            // below yields the two downstream tunnels §4.5 describes
            // (`reconfiguring_tunnel_0`/`reconfiguring_tunnel_1`): one
            // source->decoder, one decoder->renderer.
            GraphVariant::YouTube => vec![
                ("audio_source.youtube".into(), "youtube_source".into()),
                ("audio_decoder.decoder".into(), "decoder".into()),
                ("audio_source.renderer".into(), "pcm_renderer".into()),
            ],
        }
    }

    fn links_for_variant(&self) -> Vec<(tz_omx_api::ComponentHandle, tz_omx_api::PortIndex, tz_omx_api::ComponentHandle, tz_omx_api::PortIndex)> {
        if !self.variant.has_tunnels() {
            return Vec::new();
        }
        let handles = self.ops.component_handles();
        handles
            .windows(2)
            .map(|pair| (pair[0], 0u32, pair[1], 0u32))
            .collect()
    }
}

impl EventProcessor for GraphFsm {
    fn process(&mut self, event: GraphEvent) {
        GraphFsm::process(self, event)
    }

    fn take_internal_error(&mut self) -> Option<(OmxError, String)> {
        self.ops.take_internal_error()
    }
}
