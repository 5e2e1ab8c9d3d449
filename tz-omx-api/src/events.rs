use crate::error::OmxError;
use crate::handle::ComponentHandle;
use crate::index::OmxIndex;
use crate::port::PortIndex;
use crate::state::StateId;

/// The raw `EventHandler`/`EmptyBufferDone`/`FillBufferDone` callbacks
/// wrapped into the internal event variants the adapter enqueues (§4.1,
/// "OMX callback events"). Buffer-done callbacks themselves are a data-flow
/// concern the graph engine does not interpret and are therefore not
/// modeled here; only the control-flow events the FSM reacts to are.
#[derive(Debug, Clone, PartialEq)]
pub enum OmxCallbackEvent {
    /// `EventCmdComplete` for a `StateSet` command. `err` is
    /// `CommandCanceled` rather than `None`/success when the transition
    /// was a cancelled `LoadedToIdle` unblocked per §4.6.
    Trans {
        handle: ComponentHandle,
        reached_state: StateId,
        err: Option<OmxError>,
    },
    PortDisabled {
        handle: ComponentHandle,
        port: PortIndex,
        err: Option<OmxError>,
    },
    PortEnabled {
        handle: ComponentHandle,
        port: PortIndex,
        err: Option<OmxError>,
    },
    PortFlushed {
        handle: ComponentHandle,
        port: PortIndex,
        err: Option<OmxError>,
    },
    PortSettings {
        handle: ComponentHandle,
        port: PortIndex,
        index: OmxIndex,
    },
    IndexSetting {
        handle: ComponentHandle,
        port: PortIndex,
        index: OmxIndex,
    },
    FormatDetected {
        handle: ComponentHandle,
    },
    Eos {
        handle: ComponentHandle,
        port: PortIndex,
        flags: u32,
    },
    Err {
        handle: ComponentHandle,
        err: OmxError,
        port: Option<PortIndex>,
        data: Option<String>,
    },
    /// Catch-all for a raw `OMX_EVENTTYPE` the core does not special-case.
    Evt {
        handle: ComponentHandle,
        raw_event_code: u32,
        data1: u32,
        data2: u32,
        data: Option<String>,
    },
}

impl OmxCallbackEvent {
    pub fn handle(&self) -> ComponentHandle {
        match self {
            OmxCallbackEvent::Trans { handle, .. }
            | OmxCallbackEvent::PortDisabled { handle, .. }
            | OmxCallbackEvent::PortEnabled { handle, .. }
            | OmxCallbackEvent::PortFlushed { handle, .. }
            | OmxCallbackEvent::PortSettings { handle, .. }
            | OmxCallbackEvent::IndexSetting { handle, .. }
            | OmxCallbackEvent::FormatDetected { handle }
            | OmxCallbackEvent::Eos { handle, .. }
            | OmxCallbackEvent::Err { handle, .. }
            | OmxCallbackEvent::Evt { handle, .. } => *handle,
        }
    }
}
