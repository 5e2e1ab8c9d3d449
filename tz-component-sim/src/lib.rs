//! A concrete, in-process `OmxComponent`/`IlCore` pair that simulates just
//! enough of the component-side state machine and cancellation semantics
//! the core graph engine relies on: legal `SendCommand` transitions,
//! `LoadedToIdle` cancellation via either a `Loaded` request or a port
//! disable, and `MarkBuffer`'s state/port restrictions. Real components
//! would run their own threads and fire callbacks asynchronously; this one
//! fires them synchronously, inline in `send_command`/`set_parameter`/etc,
//! which keeps tests deterministic without needing a second thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tz_omx_api::{
    ComponentHandle, ComponentIdentity, IlCore, OmxCallbackEvent, OmxCallbacks, OmxCommand,
    OmxComponent, OmxError, OmxIndex, OmxResult, ParamValue, PopulationStatus, PortDef,
    PortDirection, PortIndex, StateId,
};
use tz_omx_api::port::{Coding, Domain, SupplierSide};

fn legal_transition(from: StateId, to: StateId) -> bool {
    use StateId::*;
    matches!(
        (from, to),
        (Loaded, Idle)
            | (Idle, Loaded)
            | (Idle, Executing)
            | (Executing, Idle)
            | (Executing, Pause)
            | (Pause, Executing)
            | (Pause, Idle)
            | (Loaded, WaitForResources)
            | (WaitForResources, Loaded)
    )
}

struct Inner {
    state: StateId,
    pending: Option<StateId>,
    ports: Vec<PortDef>,
    callbacks: Option<Arc<dyn OmxCallbacks>>,
    content_uri: Option<String>,
    station_info: Option<(String, String)>,
    server_tuning: Option<(u32, u32)>,
    volume: f32,
    muted: bool,
    metadata: Vec<(String, String)>,
    metadata_cursor: usize,
}

/// A simulated OMX IL component with two audio ports (input at index 0,
/// output at index 1) unless constructed otherwise.
pub struct SimComponent {
    identity: ComponentIdentity,
    handle: ComponentHandle,
    inner: Mutex<Inner>,
    /// When `true` (the default), `StateSet` and port commands complete
    /// and fire their callback immediately. When `false`, the caller must
    /// drive completion with [`SimComponent::ack_pending_transition`] —
    /// used by tests exercising cancellation.
    auto_ack: AtomicBool,
}

impl SimComponent {
    pub fn new(identity: ComponentIdentity, handle: ComponentHandle) -> Arc<Self> {
        Arc::new(SimComponent {
            identity,
            handle,
            inner: Mutex::new(Inner {
                state: StateId::Loaded,
                pending: None,
                ports: vec![
                    PortDef::new(0, PortDirection::Input, Domain::Audio, Coding::Unused),
                    PortDef::new(1, PortDirection::Output, Domain::Audio, Coding::Pcm),
                ],
                callbacks: None,
                content_uri: None,
                station_info: None,
                server_tuning: None,
                volume: 1.0,
                muted: false,
                metadata: Vec::new(),
                metadata_cursor: 0,
            }),
            auto_ack: AtomicBool::new(true),
        })
    }

    pub fn set_auto_ack(&self, auto_ack: bool) {
        self.auto_ack.store(auto_ack, Ordering::SeqCst);
    }

    pub fn set_callbacks(&self, callbacks: Arc<dyn OmxCallbacks>) {
        self.inner.lock().unwrap().callbacks = Some(callbacks);
    }

    pub fn handle(&self) -> ComponentHandle {
        self.handle
    }

    /// Test/simulation hook: mark `buffers` worth of `port`'s buffers as
    /// allocated. Stands in for `OMX_UseBuffer`/`OMX_AllocateBuffer`, which
    /// are not part of the core's `OmxComponent` surface.
    pub fn populate_port(&self, port: PortIndex, buffers: u32) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(p) = inner.ports.iter_mut().find(|p| p.index == port) {
            p.population = if buffers >= p.buffer_count {
                PopulationStatus::FullyPopulated
            } else if buffers == 0 {
                PopulationStatus::Unpopulated
            } else {
                PopulationStatus::Partial { allocated: buffers }
            };
        }
    }

    pub fn unpopulate_port(&self, port: PortIndex) {
        self.populate_port(port, 0);
    }

    pub fn station_info(&self) -> Option<(String, String)> {
        self.inner.lock().unwrap().station_info.clone()
    }

    pub fn server_tuning(&self) -> Option<(u32, u32)> {
        self.inner.lock().unwrap().server_tuning
    }

    pub fn set_metadata(&self, items: Vec<(String, String)>) {
        let mut inner = self.inner.lock().unwrap();
        inner.metadata = items;
        inner.metadata_cursor = 0;
    }

    fn fire(&self, inner: &Inner, event: OmxCallbackEvent) {
        if let Some(cb) = &inner.callbacks {
            cb.on_event(event);
        }
    }

    fn all_ports_cancelable(inner: &Inner) -> bool {
        inner.ports.iter().all(|p| p.population.is_fully_unpopulated())
    }

    /// Drives the pending async `StateSet` to completion (fires `Trans`).
    /// No-op if nothing is pending. Only meaningful with `auto_ack(false)`.
    pub fn ack_pending_transition(&self) {
        let mut inner = self.inner.lock().unwrap();
        let Some(target) = inner.pending.take() else { return };
        let reached = match target {
            StateId::LoadedToIdle => StateId::Idle,
            StateId::IdleToLoaded => StateId::Loaded,
            StateId::IdleToExecuting => StateId::Executing,
            StateId::ExecutingToIdle => StateId::Idle,
            StateId::PauseToIdle => StateId::Idle,
            other => other,
        };
        inner.state = reached;
        let event = OmxCallbackEvent::Trans { handle: self.handle, reached_state: reached, err: None };
        self.fire(&inner, event);
    }

    /// Cancels a pending `LoadedToIdle` transition back to `Loaded`. Legal
    /// only if every port that started allocating buffers is now fully
    /// unpopulated.
    pub fn cancel_loaded_to_idle(&self) -> OmxResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.pending != Some(StateId::LoadedToIdle) {
            return Err(OmxError::IncorrectStateOperation);
        }
        if !Self::all_ports_cancelable(&inner) {
            return Err(OmxError::IncorrectStateOperation);
        }
        inner.pending = None;
        inner.state = StateId::Loaded;
        let event = OmxCallbackEvent::Trans {
            handle: self.handle,
            reached_state: StateId::Loaded,
            err: Some(OmxError::CommandCanceled),
        };
        self.fire(&inner, event);
        Ok(())
    }
}

impl OmxComponent for SimComponent {
    fn identity(&self) -> &ComponentIdentity {
        &self.identity
    }

    fn send_command(&self, cmd: OmxCommand) -> OmxResult<()> {
        match cmd {
            OmxCommand::StateSet(target) => {
                let mut inner = self.inner.lock().unwrap();
                if inner.pending == Some(StateId::LoadedToIdle) && target == StateId::Loaded {
                    drop(inner);
                    return self.cancel_loaded_to_idle();
                }
                if !legal_transition(inner.state, target) {
                    return Err(OmxError::IncorrectStateOperation);
                }
                let sub_state = inner.state.transitional(target);
                let auto = self.auto_ack.load(Ordering::SeqCst);
                if auto {
                    inner.state = target;
                    let event = OmxCallbackEvent::Trans { handle: self.handle, reached_state: target, err: None };
                    self.fire(&inner, event);
                } else {
                    inner.pending = sub_state;
                }
                Ok(())
            }
            OmxCommand::PortDisable(port) => self.disable_ports(port),
            OmxCommand::PortEnable(port) => self.enable_ports(port),
            OmxCommand::Flush(_port) => Ok(()),
            OmxCommand::MarkBuffer(port) => {
                let inner = self.inner.lock().unwrap();
                let disabled = inner.ports.iter().find(|p| p.index == port).map(|p| !p.enabled).unwrap_or(false);
                if matches!(inner.state, StateId::Executing | StateId::Pause) || disabled {
                    Ok(())
                } else {
                    Err(OmxError::IncorrectStateOperation)
                }
            }
        }
    }

    fn get_state(&self) -> StateId {
        self.inner.lock().unwrap().state
    }

    fn set_parameter(&self, index: OmxIndex, _port: Option<PortIndex>, value: ParamValue) -> OmxResult<()> {
        let mut inner = self.inner.lock().unwrap();
        match (index, value) {
            (OmxIndex::ParamContentURI, ParamValue::ContentUri(uri)) => {
                inner.content_uri = Some(uri);
                Ok(())
            }
            (OmxIndex::ParamAudioPcm, ParamValue::AudioPcm { .. }) => Ok(()),
            (OmxIndex::ParamAudioMp3, ParamValue::AudioCoded { .. })
            | (OmxIndex::ParamAudioAac, ParamValue::AudioCoded { .. })
            | (OmxIndex::ParamAudioVorbis, ParamValue::AudioCoded { .. })
            | (OmxIndex::TizoniaParamAudioOpus, ParamValue::AudioCoded { .. })
            | (OmxIndex::TizoniaParamAudioFlac, ParamValue::AudioCoded { .. })
            | (OmxIndex::TizoniaParamAudioMp2, ParamValue::AudioCoded { .. }) => Ok(()),
            (OmxIndex::TizoniaParamStationInfo, ParamValue::StationInfo { name, genre }) => {
                inner.station_info = Some((name, genre));
                Ok(())
            }
            (OmxIndex::TizoniaParamServerTuning, ParamValue::ServerTuning { buffer_seconds, max_clients }) => {
                inner.server_tuning = Some((buffer_seconds, max_clients));
                Ok(())
            }
            _ => Err(OmxError::UnsupportedIndex),
        }
    }

    fn get_parameter(&self, index: OmxIndex, _port: Option<PortIndex>) -> OmxResult<ParamValue> {
        let inner = self.inner.lock().unwrap();
        match index {
            OmxIndex::ParamContentURI => inner
                .content_uri
                .clone()
                .map(ParamValue::ContentUri)
                .ok_or(OmxError::BadParameter),
            _ => Err(OmxError::UnsupportedIndex),
        }
    }

    fn set_config(&self, index: OmxIndex, _port: Option<PortIndex>, value: ParamValue) -> OmxResult<()> {
        let mut inner = self.inner.lock().unwrap();
        match (index, value) {
            (OmxIndex::ConfigAudioVolume, ParamValue::Volume(v)) => {
                inner.volume = v;
                Ok(())
            }
            (OmxIndex::ConfigAudioMute, ParamValue::Mute(m)) => {
                inner.muted = m;
                Ok(())
            }
            _ => Err(OmxError::UnsupportedSetting),
        }
    }

    fn get_config(&self, index: OmxIndex, _port: Option<PortIndex>) -> OmxResult<ParamValue> {
        let mut inner = self.inner.lock().unwrap();
        match index {
            OmxIndex::ConfigAudioVolume => Ok(ParamValue::Volume(inner.volume)),
            OmxIndex::ConfigAudioMute => Ok(ParamValue::Mute(inner.muted)),
            OmxIndex::ConfigMetadataItemCount => Ok(ParamValue::MetadataItemCount(inner.metadata.len() as u32)),
            OmxIndex::ConfigMetadataItem => {
                let cursor = inner.metadata_cursor;
                let item = inner.metadata.get(cursor).cloned().ok_or(OmxError::BadParameter)?;
                inner.metadata_cursor += 1;
                Ok(ParamValue::MetadataItem { key: item.0, value: item.1 })
            }
            _ => Err(OmxError::UnsupportedIndex),
        }
    }

    fn get_extension_index(&self, name: &str) -> OmxResult<OmxIndex> {
        match name {
            "OMX.Aratelia.index.param.opus" => Ok(OmxIndex::TizoniaParamAudioOpus),
            "OMX.Aratelia.index.param.flac" => Ok(OmxIndex::TizoniaParamAudioFlac),
            "OMX.Aratelia.index.param.mp2" => Ok(OmxIndex::TizoniaParamAudioMp2),
            _ => Err(OmxError::UnsupportedIndex),
        }
    }
}

impl SimComponent {
    fn disable_ports(&self, port: Option<PortIndex>) -> OmxResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let indices: Vec<PortIndex> = match port {
            Some(p) => vec![p],
            None => inner.ports.iter().map(|p| p.index).collect(),
        };

        let mid_loaded_to_idle = inner.pending == Some(StateId::LoadedToIdle);

        for idx in &indices {
            let fully_unpopulated = inner
                .ports
                .iter()
                .find(|p| p.index == *idx)
                .map(|p| p.population.is_fully_unpopulated())
                .unwrap_or(true);
            if mid_loaded_to_idle && !fully_unpopulated {
                return Err(OmxError::IncorrectStateOperation);
            }
        }

        for idx in &indices {
            if let Some(p) = inner.ports.iter_mut().find(|p| p.index == *idx) {
                p.enabled = false;
            }
            let event = OmxCallbackEvent::PortDisabled { handle: self.handle, port: *idx, err: None };
            self.fire(&inner, event);
        }

        if mid_loaded_to_idle && Self::all_ports_cancelable(&inner) {
            inner.pending = None;
            inner.state = StateId::Idle;
            let event = OmxCallbackEvent::Trans { handle: self.handle, reached_state: StateId::Idle, err: None };
            self.fire(&inner, event);
        }

        Ok(())
    }

    fn enable_ports(&self, port: Option<PortIndex>) -> OmxResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let indices: Vec<PortIndex> = match port {
            Some(p) => vec![p],
            None => inner.ports.iter().map(|p| p.index).collect(),
        };
        for idx in &indices {
            if let Some(p) = inner.ports.iter_mut().find(|p| p.index == *idx) {
                p.enabled = true;
                p.transitioning_to_enabled = false;
            }
            let event = OmxCallbackEvent::PortEnabled { handle: self.handle, port: *idx, err: None };
            self.fire(&inner, event);
        }
        Ok(())
    }
}

/// The IL core counterpart: mints handles backed by [`SimComponent`]s and
/// simulates tunnel setup/teardown by checking domain/coding compatibility
/// (§3 invariant) rather than touching any real shared memory.
#[derive(Default)]
pub struct SimIlCore {
    components: Mutex<Vec<Arc<SimComponent>>>,
}

impl SimIlCore {
    pub fn new() -> Self {
        SimIlCore::default()
    }

    /// Test hook: looks up the concrete [`SimComponent`] behind a handle,
    /// e.g. to inspect `station_info()`/`server_tuning()` after a
    /// `configure_station`/`configure_server` action.
    pub fn find(&self, handle: ComponentHandle) -> Option<Arc<SimComponent>> {
        self.components.lock().unwrap().iter().find(|c| c.handle() == handle).cloned()
    }
}

impl IlCore for SimIlCore {
    fn get_handle(
        &self,
        role: &str,
        name: &str,
        callbacks: Arc<dyn OmxCallbacks>,
    ) -> OmxResult<(ComponentHandle, Arc<dyn OmxComponent>)> {
        let handle = ComponentHandle::new();
        let identity = ComponentIdentity { role: role.to_string(), name: name.to_string(), owner: 0 };
        let component = SimComponent::new(identity, handle);
        component.set_callbacks(callbacks);
        self.components.lock().unwrap().push(component.clone());
        Ok((handle, component as Arc<dyn OmxComponent>))
    }

    fn free_handle(&self, handle: ComponentHandle) -> OmxResult<()> {
        self.components.lock().unwrap().retain(|c| c.handle() != handle);
        Ok(())
    }

    fn setup_tunnel(
        &self,
        output: ComponentHandle,
        output_port: PortIndex,
        input: ComponentHandle,
        input_port: PortIndex,
    ) -> OmxResult<SupplierSide> {
        let out = self.find(output).ok_or(OmxError::BadParameter)?;
        let inp = self.find(input).ok_or(OmxError::BadParameter)?;
        let out_coding = out
            .inner
            .lock()
            .unwrap()
            .ports
            .iter()
            .find(|p| p.index == output_port)
            .map(|p| p.coding)
            .ok_or(OmxError::BadParameter)?;
        let in_coding = inp
            .inner
            .lock()
            .unwrap()
            .ports
            .iter()
            .find(|p| p.index == input_port)
            .map(|p| p.coding)
            .ok_or(OmxError::BadParameter)?;
        if !out_coding.compatible(in_coding) {
            return Err(OmxError::BadParameter);
        }
        Ok(SupplierSide::Output)
    }

    fn teardown_tunnel(
        &self,
        _output: ComponentHandle,
        _output_port: PortIndex,
        _input: ComponentHandle,
        _input_port: PortIndex,
    ) -> OmxResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tz_omx_api::OmxCallbackEvent as Evt;

    struct CapturingCallbacks {
        events: Mutex<Vec<Evt>>,
    }

    impl OmxCallbacks for CapturingCallbacks {
        fn on_event(&self, event: Evt) {
            self.events.lock().unwrap().push(event);
        }
        fn is_alive(&self) -> bool {
            true
        }
    }

    fn component_with_callbacks() -> (Arc<SimComponent>, Arc<CapturingCallbacks>) {
        let cb = Arc::new(CapturingCallbacks { events: Mutex::new(Vec::new()) });
        let identity = ComponentIdentity { role: "test".into(), name: "sim".into(), owner: 0 };
        let component = SimComponent::new(identity, ComponentHandle::new());
        component.set_callbacks(cb.clone() as Arc<dyn OmxCallbacks>);
        (component, cb)
    }

    #[test]
    fn auto_ack_state_set_fires_trans_immediately() {
        let (component, cb) = component_with_callbacks();
        component.send_command(OmxCommand::StateSet(StateId::Idle)).unwrap();
        assert_eq!(component.get_state(), StateId::Idle);
        assert_eq!(cb.events.lock().unwrap().len(), 1);
    }

    #[test]
    fn illegal_transition_is_rejected() {
        let (component, _cb) = component_with_callbacks();
        let err = component.send_command(OmxCommand::StateSet(StateId::Executing)).unwrap_err();
        assert_eq!(err, OmxError::IncorrectStateOperation);
    }

    #[test]
    fn cancel_loaded_to_idle_requires_fully_unpopulated_ports() {
        let (component, _cb) = component_with_callbacks();
        component.set_auto_ack(false);
        component.populate_port(0, 2);
        component.send_command(OmxCommand::StateSet(StateId::Idle)).unwrap();

        let err = component.send_command(OmxCommand::StateSet(StateId::Loaded)).unwrap_err();
        assert_eq!(err, OmxError::IncorrectStateOperation);

        component.unpopulate_port(0);
        component.send_command(OmxCommand::StateSet(StateId::Loaded)).unwrap();
        assert_eq!(component.get_state(), StateId::Loaded);
    }

    #[test]
    fn disabling_a_populated_port_during_loaded_to_idle_is_rejected() {
        let (component, _cb) = component_with_callbacks();
        component.set_auto_ack(false);
        component.populate_port(0, 2);
        component.send_command(OmxCommand::StateSet(StateId::Idle)).unwrap();

        let err = component.send_command(OmxCommand::PortDisable(Some(0))).unwrap_err();
        assert_eq!(err, OmxError::IncorrectStateOperation);
    }

    #[test]
    fn disabling_an_unpopulated_port_unblocks_loaded_to_idle() {
        let (component, cb) = component_with_callbacks();
        component.set_auto_ack(false);
        component.send_command(OmxCommand::StateSet(StateId::Idle)).unwrap();

        component.send_command(OmxCommand::PortDisable(Some(0))).unwrap();
        assert_eq!(component.get_state(), StateId::Idle);
        let events = cb.events.lock().unwrap();
        assert!(events.iter().any(|e| matches!(e, Evt::Trans { reached_state: StateId::Idle, err: None, .. })));
    }

    #[test]
    fn mark_buffer_rejected_outside_executing_or_disabled_port() {
        let (component, _cb) = component_with_callbacks();
        let err = component.send_command(OmxCommand::MarkBuffer(0)).unwrap_err();
        assert_eq!(err, OmxError::IncorrectStateOperation);
    }

    #[test]
    fn mark_buffer_accepted_on_disabled_port() {
        let (component, _cb) = component_with_callbacks();
        component.send_command(OmxCommand::PortDisable(Some(0))).unwrap();
        component.send_command(OmxCommand::MarkBuffer(0)).unwrap();
    }

    #[test]
    fn tunnel_setup_rejects_incompatible_coding() {
        let core = SimIlCore::new();
        struct NoCb;
        impl OmxCallbacks for NoCb {
            fn on_event(&self, _event: Evt) {}
            fn is_alive(&self) -> bool {
                true
            }
        }
        let cb: Arc<dyn OmxCallbacks> = Arc::new(NoCb);
        let (h1, _) = core.get_handle("a", "a", cb.clone()).unwrap();
        let (h2, _) = core.get_handle("b", "b", cb).unwrap();
        // port 1 (output, Pcm) on h1 vs port 1 (output, Pcm) on h2: same
        // coding is compatible regardless of direction mismatch here,
        // since this test only exercises the coding check.
        assert!(core.setup_tunnel(h1, 1, h2, 1).is_ok());
    }
}
