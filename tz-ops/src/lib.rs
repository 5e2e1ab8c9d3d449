//! Graph operations (§4.4): the stateful actions and guards a graph's FSM
//! drives, independent of the FSM's own dispatch machinery (which lives in
//! `tz-fsm`).

pub mod expected;
pub mod handles;
pub mod ops;
pub mod outbound;
pub mod probe;

pub use expected::{ExpectedPortTransitions, ExpectedTransitions, PortTransitionKind};
pub use handles::{ComponentEntry, ComponentList};
pub use ops::{GraphOps, InternalError};
pub use outbound::{GraphCallbacks, MetadataSink, NullCallbacks};
pub use probe::{ProbeError, ProbeOutcome, Prober};

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use tz_omx_api::{
        ComponentHandle, ComponentIdentity, Coding, Domain, GraphConfig, IlCore, OmxCallbackEvent,
        OmxCallbacks, OmxCommand, OmxComponent, OmxError, OmxIndex, OmxResult, ParamValue,
        PortIndex, StateId, UriListConfig,
    };

    use super::*;

    struct NoopCallbacks;
    impl OmxCallbacks for NoopCallbacks {
        fn on_event(&self, _event: OmxCallbackEvent) {}
        fn is_alive(&self) -> bool {
            true
        }
    }

    /// A component stub that accepts every command and records its state
    /// immediately, with no asynchronous callback round trip. Enough to
    /// exercise `ops` actions without needing `tz-component-sim`'s full
    /// state-machine fidelity.
    struct StubComponent {
        identity: ComponentIdentity,
        state: Mutex<StateId>,
        fail_set_parameter: bool,
    }

    impl OmxComponent for StubComponent {
        fn identity(&self) -> &ComponentIdentity {
            &self.identity
        }

        fn send_command(&self, cmd: OmxCommand) -> OmxResult<()> {
            if let OmxCommand::StateSet(target) = cmd {
                *self.state.lock().unwrap() = target;
            }
            Ok(())
        }

        fn get_state(&self) -> StateId {
            *self.state.lock().unwrap()
        }

        fn set_parameter(&self, _index: OmxIndex, _port: Option<PortIndex>, _value: ParamValue) -> OmxResult<()> {
            if self.fail_set_parameter {
                Err(OmxError::BadParameter)
            } else {
                Ok(())
            }
        }

        fn get_parameter(&self, _index: OmxIndex, _port: Option<PortIndex>) -> OmxResult<ParamValue> {
            Err(OmxError::UnsupportedIndex)
        }

        fn set_config(&self, _index: OmxIndex, _port: Option<PortIndex>, _value: ParamValue) -> OmxResult<()> {
            Ok(())
        }

        fn get_config(&self, _index: OmxIndex, _port: Option<PortIndex>) -> OmxResult<ParamValue> {
            Err(OmxError::UnsupportedIndex)
        }

        fn get_extension_index(&self, _name: &str) -> OmxResult<OmxIndex> {
            Err(OmxError::UnsupportedIndex)
        }
    }

    struct StubIlCore {
        next_id: AtomicU32,
        fail_roles: Vec<String>,
    }

    impl StubIlCore {
        fn new() -> Self {
            StubIlCore { next_id: AtomicU32::new(0), fail_roles: Vec::new() }
        }
    }

    impl IlCore for StubIlCore {
        fn get_handle(
            &self,
            role: &str,
            name: &str,
            _callbacks: Arc<dyn OmxCallbacks>,
        ) -> OmxResult<(ComponentHandle, Arc<dyn OmxComponent>)> {
            if self.fail_roles.iter().any(|r| r == role) {
                return Err(OmxError::InsufficientResources);
            }
            self.next_id.fetch_add(1, Ordering::Relaxed);
            let handle = ComponentHandle::new();
            let component = StubComponent {
                identity: ComponentIdentity { role: role.to_string(), name: name.to_string(), owner: 0 },
                state: Mutex::new(StateId::Loaded),
                fail_set_parameter: false,
            };
            Ok((handle, Arc::new(component)))
        }

        fn free_handle(&self, _handle: ComponentHandle) -> OmxResult<()> {
            Ok(())
        }

        fn setup_tunnel(
            &self,
            _output: ComponentHandle,
            _output_port: PortIndex,
            _input: ComponentHandle,
            _input_port: PortIndex,
        ) -> OmxResult<tz_omx_api::port::SupplierSide> {
            Ok(tz_omx_api::port::SupplierSide::Output)
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

    struct StubProber {
        outcome: Result<ProbeOutcome, ProbeError>,
    }

    impl Prober for StubProber {
        fn probe(&mut self, _uri: &str) -> Result<ProbeOutcome, ProbeError> {
            self.outcome.clone()
        }
    }

    fn ok_outcome() -> ProbeOutcome {
        ProbeOutcome {
            domain: Domain::Audio,
            coding: Coding::Mp3,
            container: "mp3".into(),
            sample_rate_hz: 44100,
            channels: 2,
            bitrate_kbps: 128,
        }
    }

    fn new_ops(prober_outcome: Result<ProbeOutcome, ProbeError>) -> GraphOps {
        let il_core: Arc<dyn IlCore> = Arc::new(StubIlCore::new());
        let callbacks: Arc<dyn OmxCallbacks> = Arc::new(NoopCallbacks);
        let prober: Box<dyn Prober> = Box::new(StubProber { outcome: prober_outcome });
        GraphOps::new(il_core, callbacks, prober)
    }

    #[test]
    fn load_instantiates_every_role_in_order() {
        let mut ops = new_ops(Ok(ok_outcome()));
        ops.load(&[("source".into(), "http_source".into()), ("sink".into(), "renderer".into())]);
        assert!(ops.is_last_op_succeeded());
        assert_eq!(ops.component_handles().len(), 2);
    }

    #[test]
    fn loaded2idle_expects_every_handle_before_completion() {
        let mut ops = new_ops(Ok(ok_outcome()));
        ops.load(&[("source".into(), "http_source".into())]);
        let handle = ops.component_handles()[0];
        ops.loaded2idle();
        assert!(!ops.is_trans_complete(handle, StateId::Idle));
        ops.ack_transition(handle, StateId::Idle);
        assert!(ops.is_trans_complete(handle, StateId::Idle));
    }

    #[test]
    fn probe_failure_is_recoverable_by_default() {
        let mut ops = new_ops(Err(ProbeError::recoverable("unknown container")));
        ops.store_config(GraphConfig::UriList(UriListConfig {
            uris: vec!["http://example/stream.mp3".into()],
            current_index: 0,
            shuffle: false,
        }));
        ops.probe();
        assert!(!ops.is_probing_result_ok());
        assert!(ops.is_last_op_succeeded());
        assert!(ops.internal_error().is_none());
    }

    #[test]
    fn fatal_probe_failure_is_surfaced_as_internal_error() {
        let mut ops = new_ops(Err(ProbeError::fatal("corrupt header")));
        ops.store_config(GraphConfig::UriList(UriListConfig {
            uris: vec!["http://example/stream.mp3".into()],
            current_index: 0,
            shuffle: false,
        }));
        ops.probe();
        assert!(!ops.is_last_op_succeeded());
        let (err, _) = ops.internal_error().expect("fatal probe must record an internal error");
        assert_eq!(err, OmxError::FormatNotDetected);
        assert!(ops.is_fatal_error(err));
    }

    #[test]
    fn end_of_play_tracks_playlist_bounds() {
        let mut ops = new_ops(Ok(ok_outcome()));
        ops.store_config(GraphConfig::UriList(UriListConfig {
            uris: vec!["a".into(), "b".into()],
            current_index: 1,
            shuffle: false,
        }));
        assert!(!ops.is_end_of_play());
        ops.skip();
        assert!(ops.is_end_of_play());
    }

    #[test]
    fn volume_step_clamps_to_percent_range() {
        let mut ops = new_ops(Ok(ok_outcome()));
        ops.load(&[("sink".into(), "renderer".into())]);
        ops.volume_step(-1000);
        assert_eq!(ops.volume_percent(), 0);
        ops.volume_step(1000);
        assert_eq!(ops.volume_percent(), 100);
    }

    #[test]
    fn is_last_eos_is_true_only_for_final_handle() {
        let mut ops = new_ops(Ok(ok_outcome()));
        ops.load(&[("source".into(), "a".into()), ("sink".into(), "b".into())]);
        let handles = ops.component_handles();
        assert!(!ops.is_last_eos(handles[0]));
        assert!(ops.is_last_eos(handles[1]));
    }

    #[test]
    fn retrieve_metadata_marks_only_the_first_pair_as_heading() {
        struct RecordingSink {
            pairs: Vec<(String, String, bool)>,
        }
        impl MetadataSink for RecordingSink {
            fn on_metadata(&mut self, key: &str, value: &str, first: bool) {
                self.pairs.push((key.to_string(), value.to_string(), first));
            }
        }

        let mut ops = new_ops(Ok(ok_outcome()));
        ops.load(&[("source".into(), "a".into())]);
        ops.set_metadata_sink(Box::new(RecordingSink { pairs: Vec::new() }));
        ops.retrieve_metadata();
        assert!(ops.is_last_op_succeeded());
    }
}
