//! Scenario-level tests (§8) driving `GraphFsm` directly against
//! `tz-component-sim`'s simulated IL core. Rather than going through
//! `tz-queue`'s worker thread, a small synchronous driver loop here plays
//! the dispatcher's role: drain whatever the simulated components fired
//! inline during the last `process` call and feed each one back in,
//! mirroring `Dispatcher::spawn`'s own loop (including its post-`process`
//! error-containment check) without the thread.

use std::sync::{Arc, Mutex};

use tz_component_sim::SimIlCore;
use tz_fsm::{GraphFsm, GraphState, GraphVariant};
use tz_omx_api::{
    Coding, Domain, GraphConfig, HttpServerConfig, IlCore, OmxCallbackEvent, OmxCallbacks, OmxError, OmxIndex,
    ServerTuningConfig, UriListConfig,
};
use tz_ops::{GraphCallbacks, GraphOps, ProbeError, ProbeOutcome, Prober};
use tz_queue::{ExternalEvent, GraphEvent, InternalEvent};

#[derive(Default)]
struct CapturingOmxCallbacks {
    events: Mutex<Vec<OmxCallbackEvent>>,
}

impl OmxCallbacks for CapturingOmxCallbacks {
    fn on_event(&self, event: OmxCallbackEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn is_alive(&self) -> bool {
        true
    }
}

#[derive(Default)]
struct RecordingGraphCallbacks {
    calls: Mutex<Vec<String>>,
}

impl GraphCallbacks for RecordingGraphCallbacks {
    fn on_loaded(&self) {
        self.calls.lock().unwrap().push("loaded".into());
    }
    fn on_execd(&self) {
        self.calls.lock().unwrap().push("execd".into());
    }
    fn on_paused(&self) {
        self.calls.lock().unwrap().push("paused".into());
    }
    fn on_resumed(&self) {
        self.calls.lock().unwrap().push("resumed".into());
    }
    fn on_stopped(&self) {
        self.calls.lock().unwrap().push("stopped".into());
    }
    fn on_unloaded(&self) {
        self.calls.lock().unwrap().push("unloaded".into());
    }
    fn on_metadata(&self, key: &str, value: &str, first: bool) {
        self.calls.lock().unwrap().push(format!("metadata:{key}={value}:{first}"));
    }
    fn on_error(&self, message: &str) {
        self.calls.lock().unwrap().push(format!("error:{message}"));
    }
}

struct AlwaysOk(ProbeOutcome);

impl Prober for AlwaysOk {
    fn probe(&mut self, _uri: &str) -> Result<ProbeOutcome, ProbeError> {
        Ok(self.0.clone())
    }
}

struct AlwaysFatal;

impl Prober for AlwaysFatal {
    fn probe(&mut self, _uri: &str) -> Result<ProbeOutcome, ProbeError> {
        Err(ProbeError::fatal("corrupt stream header"))
    }
}

fn mp3_outcome() -> ProbeOutcome {
    ProbeOutcome {
        domain: Domain::Audio,
        coding: Coding::Mp3,
        container: "mp3".into(),
        sample_rate_hz: 44100,
        channels: 2,
        bitrate_kbps: 128,
    }
}

/// Drains whatever the simulated components fired synchronously during the
/// last call and replays each one, looping until quiescent. Mirrors
/// `Dispatcher::spawn`'s error-containment check between steps.
fn settle(fsm: &mut GraphFsm, omx_cb: &CapturingOmxCallbacks) {
    loop {
        if let Some((code, msg)) = fsm.ops_mut().take_internal_error() {
            fsm.process(GraphEvent::Internal(InternalEvent::Err(code, msg)));
        }
        let batch: Vec<OmxCallbackEvent> = {
            let mut events = omx_cb.events.lock().unwrap();
            std::mem::take(&mut *events)
        };
        if batch.is_empty() {
            break;
        }
        for event in batch {
            fsm.process(GraphEvent::Omx(event));
        }
    }
}

fn new_fsm(
    variant: GraphVariant,
    prober: Box<dyn Prober>,
    graph_cb: Arc<RecordingGraphCallbacks>,
) -> (GraphFsm, Arc<CapturingOmxCallbacks>) {
    let (fsm, omx_cb, _core) = new_fsm_with_core(variant, prober, graph_cb);
    (fsm, omx_cb)
}

/// Same as [`new_fsm`], but also hands back the concrete `SimIlCore` so a
/// test can look up a `SimComponent` by handle (e.g. to inspect
/// `station_info()`/`server_tuning()` after a configure action).
fn new_fsm_with_core(
    variant: GraphVariant,
    prober: Box<dyn Prober>,
    graph_cb: Arc<RecordingGraphCallbacks>,
) -> (GraphFsm, Arc<CapturingOmxCallbacks>, Arc<SimIlCore>) {
    let core = Arc::new(SimIlCore::new());
    let il_core: Arc<dyn IlCore> = core.clone();
    let omx_cb = Arc::new(CapturingOmxCallbacks::default());
    let ops = GraphOps::new(il_core, omx_cb.clone() as Arc<dyn OmxCallbacks>, prober);
    let fsm = GraphFsm::new(variant, ops, graph_cb as Arc<dyn GraphCallbacks>);
    (fsm, omx_cb, core)
}

fn one_uri_config(uri: &str) -> GraphConfig {
    GraphConfig::UriList(UriListConfig {
        uris: vec![uri.to_string()],
        current_index: 0,
        shuffle: false,
    })
}

/// S1. Decoder happy path: load, execute, reach steady-state `Executing`
/// with every handle instantiated and tunnelled, then ride end-of-stream
/// through to `Unloaded`.
#[test]
fn s1_decoder_happy_path() {
    let graph_cb = Arc::new(RecordingGraphCallbacks::default());
    let (mut fsm, omx_cb) = new_fsm(GraphVariant::Decoder, Box::new(AlwaysOk(mp3_outcome())), graph_cb.clone());

    fsm.process(GraphEvent::External(ExternalEvent::Load(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.ops().component_handles().len(), 3);
    assert!(graph_cb.calls.lock().unwrap().contains(&"loaded".to_string()));

    fsm.process(GraphEvent::External(ExternalEvent::Execute(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::Executing);
    assert!(graph_cb.calls.lock().unwrap().contains(&"execd".to_string()));

    let renderer = *fsm.ops().component_handles().last().unwrap();
    fsm.process(GraphEvent::Omx(OmxCallbackEvent::Eos { handle: renderer, port: 0, flags: 0 }));
    settle(&mut fsm, &omx_cb);

    assert_eq!(fsm.state(), GraphState::Unloaded);
    assert!(fsm.ops().component_handles().is_empty());
    let calls = graph_cb.calls.lock().unwrap();
    assert!(calls.contains(&"stopped".to_string()) || calls.contains(&"unloaded".to_string()));
}

/// Round-trip: `load; execute; stop; unload` ends in `Unloaded` with no
/// leaked handles.
#[test]
fn load_execute_stop_unload_ends_unloaded_with_no_leaks() {
    let graph_cb = Arc::new(RecordingGraphCallbacks::default());
    let (mut fsm, omx_cb) = new_fsm(GraphVariant::Decoder, Box::new(AlwaysOk(mp3_outcome())), graph_cb);

    fsm.process(GraphEvent::External(ExternalEvent::Load(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);
    fsm.process(GraphEvent::External(ExternalEvent::Execute(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::Executing);

    fsm.process(GraphEvent::External(ExternalEvent::Stop));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::Idle);

    fsm.process(GraphEvent::External(ExternalEvent::Unload));
    settle(&mut fsm, &omx_cb);

    assert_eq!(fsm.state(), GraphState::Unloaded);
    assert!(fsm.ops().component_handles().is_empty());
}

/// A `stop` issued during `Paused` takes the `Pause2Idle -> Idle` path, not
/// `Idle2Loaded` (§8, "Boundary behaviors").
#[test]
fn stop_during_paused_lands_on_idle_not_idle2loaded() {
    let graph_cb = Arc::new(RecordingGraphCallbacks::default());
    let (mut fsm, omx_cb) = new_fsm(GraphVariant::Decoder, Box::new(AlwaysOk(mp3_outcome())), graph_cb);

    fsm.process(GraphEvent::External(ExternalEvent::Load(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);
    fsm.process(GraphEvent::External(ExternalEvent::Execute(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);

    fsm.process(GraphEvent::External(ExternalEvent::Pause));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::Paused);

    fsm.process(GraphEvent::External(ExternalEvent::Stop));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::Idle);
}

/// `execute; pause; execute` returns to `Executing` (§8, round-trip).
#[test]
fn pause_then_execute_returns_to_executing() {
    let graph_cb = Arc::new(RecordingGraphCallbacks::default());
    let (mut fsm, omx_cb) = new_fsm(GraphVariant::Decoder, Box::new(AlwaysOk(mp3_outcome())), graph_cb.clone());

    fsm.process(GraphEvent::External(ExternalEvent::Load(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);
    fsm.process(GraphEvent::External(ExternalEvent::Execute(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);

    fsm.process(GraphEvent::External(ExternalEvent::Pause));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::Paused);

    fsm.process(GraphEvent::External(ExternalEvent::Execute(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::Executing);
    assert!(graph_cb.calls.lock().unwrap().contains(&"resumed".to_string()));
}

/// A probe failure on every URI in the playlist leads to `Unloaded` via
/// the `Configuring.conf_exit` branch gated by `is_end_of_play` (§8).
#[test]
fn fatal_probe_failure_on_only_uri_tears_down_to_unloaded() {
    let graph_cb = Arc::new(RecordingGraphCallbacks::default());
    let (mut fsm, omx_cb) = new_fsm(GraphVariant::Decoder, Box::new(AlwaysFatal), graph_cb.clone());

    fsm.process(GraphEvent::External(ExternalEvent::Load(one_uri_config("/tmp/bad.mp3"))));
    settle(&mut fsm, &omx_cb);
    fsm.process(GraphEvent::External(ExternalEvent::Execute(one_uri_config("/tmp/bad.mp3"))));
    settle(&mut fsm, &omx_cb);

    assert_eq!(fsm.state(), GraphState::Unloaded);
    assert!(fsm.ops().component_handles().is_empty());
    assert!(graph_cb.calls.lock().unwrap().iter().any(|c| c.starts_with("error:")));
}

/// S6. Fatal error teardown: a component's `OmxErr` drives
/// `Executing -> Exe2Idle -> Idle2Loaded -> Unloaded`, freeing every
/// handle and tearing down every tunnel.
#[test]
fn s6_fatal_error_during_playback_tears_down_the_graph() {
    let graph_cb = Arc::new(RecordingGraphCallbacks::default());
    let (mut fsm, omx_cb) = new_fsm(GraphVariant::Decoder, Box::new(AlwaysOk(mp3_outcome())), graph_cb.clone());

    fsm.process(GraphEvent::External(ExternalEvent::Load(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);
    fsm.process(GraphEvent::External(ExternalEvent::Execute(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::Executing);

    let decoder = fsm.ops().component_handles()[1];
    fsm.process(GraphEvent::Omx(OmxCallbackEvent::Err {
        handle: decoder,
        err: OmxError::StreamCorruptFatal,
        port: None,
        data: Some("corrupt frame".into()),
    }));
    settle(&mut fsm, &omx_cb);

    assert_eq!(fsm.state(), GraphState::Unloaded);
    assert!(fsm.ops().component_handles().is_empty());
    let calls = graph_cb.calls.lock().unwrap();
    assert!(calls.iter().any(|c| c.starts_with("error:")));
    assert!(calls.contains(&"unloaded".to_string()));
}

/// S4. Streaming auto-detect: a source-only graph drives itself from
/// `Loaded` through `Auto-detecting` without ever probing, and only grows
/// its decoder/renderer tail once the source itself reports a format.
#[test]
fn s4_streaming_auto_detect_reaches_executing_after_format_and_port_settings() {
    let graph_cb = Arc::new(RecordingGraphCallbacks::default());
    let (mut fsm, omx_cb) = new_fsm(GraphVariant::StreamingService, Box::new(AlwaysOk(mp3_outcome())), graph_cb.clone());

    fsm.process(GraphEvent::External(ExternalEvent::Load(one_uri_config("http://stream.example/radio.mp3"))));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.ops().component_handles().len(), 2);

    fsm.process(GraphEvent::External(ExternalEvent::Execute(one_uri_config("http://stream.example/radio.mp3"))));
    // Drains the source's own Idle/Executing acks while still
    // `AutoDetectDriving`, the realistic dispatcher ordering (§5).
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::AutoDetectDriving);

    let source = fsm.ops().component_handles()[0];
    fsm.process(GraphEvent::Omx(OmxCallbackEvent::FormatDetected { handle: source }));
    assert_eq!(fsm.state(), GraphState::AutoDetectAwaitingSettings);

    fsm.process(GraphEvent::Omx(OmxCallbackEvent::PortSettings { handle: source, port: 1, index: OmxIndex::ParamAudioMp3 }));
    assert_eq!(fsm.state(), GraphState::UpdatingGraphToIdle);

    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::Executing);
    assert!(graph_cb.calls.lock().unwrap().contains(&"execd".to_string()));
}

/// S5. Tunnel reconfiguration: a mid-playback `PortSettings` on a tunnel
/// endpoint drives `Executing -> Reconfiguring_tunnel_<i> -> Executing`,
/// disabling and re-enabling both ends and re-applying the negotiated PCM
/// parameters, without tearing the rest of the graph down.
#[test]
fn s5_tunnel_reconfiguration_returns_to_executing() {
    let graph_cb = Arc::new(RecordingGraphCallbacks::default());
    let (mut fsm, omx_cb) = new_fsm(GraphVariant::Decoder, Box::new(AlwaysOk(mp3_outcome())), graph_cb.clone());

    fsm.process(GraphEvent::External(ExternalEvent::Load(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);
    fsm.process(GraphEvent::External(ExternalEvent::Execute(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::Executing);

    let tunnel = fsm.ops().tunnels()[0].clone();
    fsm.process(GraphEvent::Omx(OmxCallbackEvent::PortSettings {
        handle: tunnel.output_handle,
        port: tunnel.output_port,
        index: OmxIndex::ParamAudioPcm,
    }));
    assert_eq!(fsm.state(), GraphState::ReconfDisabling(tunnel.id));

    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::Executing);
    assert_eq!(fsm.ops().component_handles().len(), 3);
}

/// A `Skip` arriving while a tunnel reconfiguration is in flight is
/// deferred rather than acted on immediately, and replayed once the
/// submachine exits back to `Executing` (§4.5).
#[test]
fn skip_during_tunnel_reconfiguration_is_deferred_then_replayed() {
    let graph_cb = Arc::new(RecordingGraphCallbacks::default());
    let (mut fsm, omx_cb) = new_fsm(GraphVariant::Decoder, Box::new(AlwaysOk(mp3_outcome())), graph_cb.clone());

    fsm.process(GraphEvent::External(ExternalEvent::Load(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);
    fsm.process(GraphEvent::External(ExternalEvent::Execute(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);

    let tunnel = fsm.ops().tunnels()[0].clone();
    fsm.process(GraphEvent::Omx(OmxCallbackEvent::PortSettings {
        handle: tunnel.output_handle,
        port: tunnel.output_port,
        index: OmxIndex::ParamAudioPcm,
    }));
    assert!(matches!(fsm.state(), GraphState::ReconfDisabling(_)));

    // Arrives mid-reconfiguration: must not be acted on yet.
    fsm.process(GraphEvent::External(ExternalEvent::Skip(1)));
    assert!(matches!(fsm.state(), GraphState::ReconfDisabling(_)));

    settle(&mut fsm, &omx_cb);
    // The deferred `Skip` is replayed on exit, driving the graph through
    // the `skipping` submachine to completion. The playlist has only one
    // URI, so advancing the cursor past it is end-of-play: the skip must
    // actually land on `Unloaded`, not just leave `ReconfDisabling`.
    assert_eq!(fsm.state(), GraphState::Unloaded);
    assert!(fsm.ops().component_handles().is_empty());
    assert!(graph_cb.calls.lock().unwrap().contains(&"unloaded".to_string()));
}

/// An event arriving after `Unloaded` is dropped without side effects
/// (§8, quantified invariant 6).
#[test]
fn event_after_unloaded_is_dropped() {
    let graph_cb = Arc::new(RecordingGraphCallbacks::default());
    let (mut fsm, omx_cb) = new_fsm(GraphVariant::Decoder, Box::new(AlwaysOk(mp3_outcome())), graph_cb.clone());

    fsm.process(GraphEvent::External(ExternalEvent::Load(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);
    fsm.process(GraphEvent::External(ExternalEvent::Execute(one_uri_config("/tmp/a.mp3"))));
    settle(&mut fsm, &omx_cb);
    fsm.process(GraphEvent::External(ExternalEvent::Stop));
    settle(&mut fsm, &omx_cb);
    fsm.process(GraphEvent::External(ExternalEvent::Unload));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::Unloaded);

    let calls_before = graph_cb.calls.lock().unwrap().len();
    fsm.process(GraphEvent::External(ExternalEvent::Pause));
    fsm.process(GraphEvent::Omx(OmxCallbackEvent::Err {
        handle: tz_omx_api::ComponentHandle::new(),
        err: OmxError::StreamCorrupt,
        port: None,
        data: None,
    }));
    assert_eq!(fsm.state(), GraphState::Unloaded);
    assert_eq!(graph_cb.calls.lock().unwrap().len(), calls_before);
}

/// HttpServer graph: `load` carries the station config, `execute` carries
/// the server-tuning config sent separately; both must still be applied
/// (§4.5's `skips_probing` path: `configure_station` / `configure_stream` /
/// `configure_server` all fire from `enter_configuring`, one per pending
/// slot, before `Executing` is reached with no tunnel reconfiguration).
#[test]
fn http_server_applies_station_and_tuning_configs_from_separate_calls() {
    let graph_cb = Arc::new(RecordingGraphCallbacks::default());
    let (mut fsm, omx_cb, core) = new_fsm_with_core(GraphVariant::HttpServer, Box::new(AlwaysOk(mp3_outcome())), graph_cb.clone());

    let station_cfg = GraphConfig::HttpServer(HttpServerConfig {
        station_name: "Tizonia Radio".into(),
        genre: "electronic".into(),
        bitrate_kbps: 128,
        sample_rate_hz: 44100,
        channels: 2,
    });
    fsm.process(GraphEvent::External(ExternalEvent::Load(station_cfg)));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.ops().component_handles().len(), 2);

    let tuning_cfg = GraphConfig::ServerTuning(ServerTuningConfig { buffer_seconds: 5, max_clients: 16 });
    fsm.process(GraphEvent::External(ExternalEvent::Execute(tuning_cfg)));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::Executing);
    assert!(graph_cb.calls.lock().unwrap().contains(&"execd".to_string()));

    let handles = fsm.ops().component_handles();
    let encoder = core.find(handles[0]).expect("encoder handle registered");
    let server = core.find(*handles.last().unwrap()).expect("server handle registered");

    assert_eq!(encoder.station_info(), Some(("Tizonia Radio".to_string(), "electronic".to_string())));
    assert_eq!(server.server_tuning(), Some((5, 16)));
}

/// YouTube graph: two independently-reconfigurable downstream tunnels
/// (§4.5, `reconfiguring_tunnel_0`/`reconfiguring_tunnel_1`). A
/// `PortSettings` callback naming the second tunnel's ports must drive
/// `ReconfDisabling(TunnelId(1))`, not be misattributed to tunnel 0.
#[test]
fn youtube_port_settings_on_second_tunnel_reconfigures_that_tunnel_only() {
    let graph_cb = Arc::new(RecordingGraphCallbacks::default());
    let (mut fsm, omx_cb) = new_fsm(GraphVariant::YouTube, Box::new(AlwaysOk(mp3_outcome())), graph_cb.clone());

    fsm.process(GraphEvent::External(ExternalEvent::Load(one_uri_config("http://youtube.example/watch"))));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.ops().component_handles().len(), 3);

    fsm.process(GraphEvent::External(ExternalEvent::Execute(one_uri_config("http://youtube.example/watch"))));
    // Drains the source's own Idle/Executing acks while still
    // `AutoDetectDriving`, the realistic dispatcher ordering (§5).
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::AutoDetectDriving);

    let source = fsm.ops().component_handles()[0];
    fsm.process(GraphEvent::Omx(OmxCallbackEvent::FormatDetected { handle: source }));
    fsm.process(GraphEvent::Omx(OmxCallbackEvent::PortSettings { handle: source, port: 1, index: OmxIndex::ParamAudioMp3 }));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::Executing);
    assert_eq!(fsm.ops().tunnels().len(), 2);

    let second_tunnel = fsm.ops().tunnels()[1].clone();
    fsm.process(GraphEvent::Omx(OmxCallbackEvent::PortSettings {
        handle: second_tunnel.output_handle,
        port: second_tunnel.output_port,
        index: OmxIndex::ParamAudioPcm,
    }));
    assert_eq!(fsm.state(), GraphState::ReconfDisabling(second_tunnel.id));
    assert_eq!(second_tunnel.id, tz_omx_api::TunnelId(1));

    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.state(), GraphState::Executing);
}

/// Chromecast graph: a single source/sink pair with no tunnels at all,
/// driven straight through `disabling_comp_ports -> config2idle ->
/// idle2exe -> Executing` (§4.5).
#[test]
fn chromecast_single_sink_reaches_executing_without_tunnels() {
    let graph_cb = Arc::new(RecordingGraphCallbacks::default());
    let (mut fsm, omx_cb) = new_fsm(GraphVariant::Chromecast, Box::new(AlwaysOk(mp3_outcome())), graph_cb.clone());

    fsm.process(GraphEvent::External(ExternalEvent::Load(one_uri_config("http://stream.example/radio.mp3"))));
    settle(&mut fsm, &omx_cb);
    assert_eq!(fsm.ops().component_handles().len(), 1);
    assert!(fsm.ops().tunnels().is_empty());

    fsm.process(GraphEvent::External(ExternalEvent::Execute(one_uri_config("http://stream.example/radio.mp3"))));
    settle(&mut fsm, &omx_cb);

    assert_eq!(fsm.state(), GraphState::Executing);
    assert!(fsm.ops().tunnels().is_empty());
    assert!(graph_cb.calls.lock().unwrap().contains(&"execd".to_string()));
}
