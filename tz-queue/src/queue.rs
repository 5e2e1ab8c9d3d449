use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use thiserror::Error;

use crate::event::Command;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("command queue is closed")]
    Closed,
    #[error("command queue is full")]
    Full,
}

/// A graph's bounded MPSC command queue (§4.2). External API calls and
/// OMX callback adapters both enqueue through [`CommandQueue::sender`]
/// clones; the dispatcher owns the single [`CommandQueue::receiver`] side
/// and performs the blocking dequeue described in §5.
#[derive(Clone)]
pub struct CommandQueue {
    tx: Sender<Command>,
}

pub struct CommandQueueReceiver {
    rx: Receiver<Command>,
}

impl CommandQueue {
    /// `capacity` bounds how many commands may be outstanding before a
    /// producer blocks; the dispatcher is the sole consumer so this only
    /// matters under a burst of external calls plus component callbacks.
    pub fn new(capacity: usize) -> (CommandQueue, CommandQueueReceiver) {
        let (tx, rx) = bounded(capacity);
        (CommandQueue { tx }, CommandQueueReceiver { rx })
    }

    /// Enqueues and returns immediately (§4.2: "External API entry points
    /// enqueue and return immediately; they must never call into OMX
    /// directly"). Blocks only if the queue is transiently full.
    pub fn enqueue(&self, command: Command) -> Result<(), QueueError> {
        self.tx.send(command).map_err(|_| QueueError::Closed)
    }

    /// Non-blocking variant used by the callback adapter, which must never
    /// block a component's internal thread (§4.3, "strictly wait-free").
    pub fn try_enqueue(&self, command: Command) -> Result<(), QueueError> {
        match self.tx.try_send(command) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(QueueError::Full),
            Err(TrySendError::Disconnected(_)) => Err(QueueError::Closed),
        }
    }
}

impl CommandQueueReceiver {
    /// Blocking dequeue; the dispatcher's sole suspension point (§5).
    pub fn recv(&self) -> Result<Command, QueueError> {
        self.rx.recv().map_err(|_| QueueError::Closed)
    }

    /// The watchdog's poll primitive (§5): `Ok(Some(_))` is a command,
    /// `Ok(None)` is a timeout with the queue still open, `Err(Closed)`
    /// means the dispatcher should exit rather than keep watchdogging a
    /// dead queue.
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Result<Option<Command>, QueueError> {
        match self.rx.recv_timeout(timeout) {
            Ok(command) => Ok(Some(command)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(QueueError::Closed),
        }
    }
}
