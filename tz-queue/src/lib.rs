//! Command queue, OMX callback adapter, and worker-thread dispatcher
//! (§4.2, §4.3, §5). Serializes external commands and OMX callbacks into a
//! single typed event stream for one graph's FSM.

pub mod adapter;
pub mod dispatcher;
pub mod event;
pub mod queue;

pub use adapter::{CallbackAdapter, CallbackRegistry};
pub use dispatcher::{Dispatcher, EventProcessor, DEFAULT_WATCHDOG};
pub use event::{Command, ExternalEvent, GraphEvent, InternalEvent};
pub use queue::{CommandQueue, CommandQueueReceiver, QueueError};
