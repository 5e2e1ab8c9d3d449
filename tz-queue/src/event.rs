use tz_omx_api::{GraphConfig, OmxCallbackEvent, OmxError};

/// External commands a caller issues against a graph's upward API (§4.1,
/// "External events" and §6, "Upward (caller -> core)"). Every call is
/// non-blocking: the public API only ever constructs one of these and
/// enqueues it.
#[derive(Debug, Clone)]
pub enum ExternalEvent {
    Load(GraphConfig),
    Execute(GraphConfig),
    Pause,
    Stop,
    Unload,
    /// Signed jump relative to the current playlist index.
    Skip(i32),
    /// Absolute seek position, in seconds.
    Seek(f64),
    /// Absolute volume in `[0.0, 1.0]`.
    Volume(f32),
    /// Signed integer percent delta, clamped to `0..=100` on application
    /// (§9, open question: "specify a single unit ... when
    /// re-implementing").
    VolumeStep(i32),
    Mute,
    /// Reports/queries the current playback position, in seconds.
    Position(f64),
}

/// Internal synthetic events (§4.1): emitted by submachine exit
/// pseudo-states, by the dispatcher's error-containment check, or by the
/// watchdog.
#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    Configured,
    Skipped,
    AutoDetected,
    GraphUpdated,
    TunnelReconfigured,
    Err(OmxError, String),
    Timer(u64),
}

/// The closed event set the FSM ever sees (§4.1). `GraphEvent` is what
/// actually flows through the command queue; `Command` wraps one with the
/// dispatcher's kill-thread flag.
#[derive(Debug, Clone)]
pub enum GraphEvent {
    External(ExternalEvent),
    Omx(OmxCallbackEvent),
    Internal(InternalEvent),
}

impl From<ExternalEvent> for GraphEvent {
    fn from(e: ExternalEvent) -> Self {
        GraphEvent::External(e)
    }
}

impl From<OmxCallbackEvent> for GraphEvent {
    fn from(e: OmxCallbackEvent) -> Self {
        GraphEvent::Omx(e)
    }
}

impl From<InternalEvent> for GraphEvent {
    fn from(e: InternalEvent) -> Self {
        GraphEvent::Internal(e)
    }
}

/// An opaque event value plus the `kill_thread` flag that signals the
/// dispatcher to exit its loop after processing (§3, "Command"). The flag
/// lives on the command itself, not as a distinguished event variant, so
/// it can accompany any event rather than requiring a separate sentinel
/// the dispatcher must special-case before looking at the payload.
#[derive(Debug, Clone)]
pub struct Command {
    pub event: GraphEvent,
    pub kill_thread: bool,
}

impl Command {
    pub fn new(event: impl Into<GraphEvent>) -> Self {
        Command {
            event: event.into(),
            kill_thread: false,
        }
    }

    /// Same event, but tells the dispatcher to exit its loop once this
    /// command has been processed (§4.2, "Cancellation": "Canceling a
    /// graph means enqueuing a `kill_thread` command").
    pub fn with_kill_thread(mut self) -> Self {
        self.kill_thread = true;
        self
    }
}
