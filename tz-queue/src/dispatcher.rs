use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tz_omx_api::OmxError;

use crate::event::{GraphEvent, InternalEvent};
use crate::queue::CommandQueueReceiver;

/// Default watchdog period (§5, "Cancellation and timeouts"): the spec
/// asks for "an implementation-defined period without progress" but gives
/// no constant to copy from the original (which has no timer of its own).
/// 30s matches the kind of timeout `pmocontrol`'s SOAP/discovery clients
/// use elsewhere in the pack.
pub const DEFAULT_WATCHDOG: Duration = Duration::from_secs(30);

/// What the dispatcher drives: an FSM-like sink that consumes one
/// [`GraphEvent`] at a time and exposes whatever internal error the last
/// action recorded (§4.4, "Record and expose the last internal error").
/// Implemented by `tz-fsm`'s `GraphFsmDriver`; kept as a trait here so the
/// queue crate has no upward dependency on the FSM or `ops` crates.
pub trait EventProcessor: Send {
    fn process(&mut self, event: GraphEvent);

    /// Consumes and clears the last internal error, if any (§4.4:
    /// `is_last_op_succeeded` "is reset on `reset_internal_error`").
    fn take_internal_error(&mut self) -> Option<(OmxError, String)>;
}

/// Runs the single dedicated worker thread that owns a graph's FSM and
/// `ops` (§5). The sole suspension point is the queue's blocking dequeue;
/// every OMX IL call the processor makes happens on this thread.
pub struct Dispatcher;

impl Dispatcher {
    /// Spawns the worker thread with the library's default watchdog
    /// (§5). Returns its `JoinHandle`; the caller drives shutdown by
    /// enqueuing a command with `kill_thread` set.
    pub fn spawn<P: EventProcessor + 'static>(
        processor: P,
        receiver: CommandQueueReceiver,
    ) -> JoinHandle<()> {
        Self::spawn_with_watchdog(processor, receiver, Some(DEFAULT_WATCHDOG))
    }

    /// Spawns the worker thread with an explicit watchdog period (`None`
    /// disables it). If `receiver.recv` goes silent for the whole period
    /// with no command arriving, the dispatcher synthesizes an
    /// `Err(Timeout, ...)` event and feeds it to the FSM exactly as it
    /// would a fatal component error (§5, "Cancellation and timeouts":
    /// "the dispatcher synthesizes an `Err(Timeout, …)` event equivalent
    /// to a fatal error"), then keeps waiting — the FSM's own teardown
    /// path is what actually stops the loop, via `kill_thread` on
    /// `shutdown`/`Drop`.
    pub fn spawn_with_watchdog<P: EventProcessor + 'static>(
        mut processor: P,
        receiver: CommandQueueReceiver,
        watchdog: Option<Duration>,
    ) -> JoinHandle<()> {
        thread::spawn(move || {
            let mut last_progress = Instant::now();
            loop {
                let command = match watchdog {
                    Some(period) => match receiver.recv_timeout(period) {
                        Ok(Some(command)) => command,
                        Ok(None) => {
                            let elapsed = last_progress.elapsed();
                            tracing::warn!(?elapsed, "watchdog: no progress, synthesizing timeout");
                            processor.process(GraphEvent::Internal(InternalEvent::Err(
                                OmxError::Timeout,
                                format!("no component acknowledgment for {elapsed:?}"),
                            )));
                            last_progress = Instant::now();
                            continue;
                        }
                        Err(_) => {
                            tracing::debug!("command queue closed, dispatcher exiting");
                            break;
                        }
                    },
                    None => match receiver.recv() {
                        Ok(command) => command,
                        Err(_) => {
                            tracing::debug!("command queue closed, dispatcher exiting");
                            break;
                        }
                    },
                };

                last_progress = Instant::now();
                processor.process(command.event);

                // Error containment (§4.2): a non-OK internal error from
                // the action just run pre-empts whatever is still queued.
                if let Some((code, msg)) = processor.take_internal_error() {
                    processor.process(GraphEvent::Internal(InternalEvent::Err(code, msg)));
                }

                if command.kill_thread {
                    tracing::debug!("kill_thread observed, dispatcher exiting");
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::event::{Command, ExternalEvent};
    use crate::queue::CommandQueue;

    #[derive(Default)]
    struct RecordingProcessor {
        events: Arc<Mutex<Vec<GraphEvent>>>,
    }

    impl EventProcessor for RecordingProcessor {
        fn process(&mut self, event: GraphEvent) {
            self.events.lock().unwrap().push(event);
        }

        fn take_internal_error(&mut self) -> Option<(OmxError, String)> {
            None
        }
    }

    #[test]
    fn watchdog_synthesizes_timeout_when_queue_goes_silent() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let processor = RecordingProcessor { events: events.clone() };
        let (queue, receiver) = CommandQueue::new(4);
        let worker = Dispatcher::spawn_with_watchdog(processor, receiver, Some(Duration::from_millis(20)));

        std::thread::sleep(Duration::from_millis(80));
        queue.enqueue(Command::new(ExternalEvent::Unload).with_kill_thread()).unwrap();
        worker.join().unwrap();

        let recorded = events.lock().unwrap();
        assert!(recorded.iter().any(|e| matches!(
            e,
            GraphEvent::Internal(InternalEvent::Err(OmxError::Timeout, _))
        )));
    }

    #[test]
    fn no_watchdog_blocks_indefinitely_until_a_command_arrives() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let processor = RecordingProcessor { events: events.clone() };
        let (queue, receiver) = CommandQueue::new(4);
        let worker = Dispatcher::spawn_with_watchdog(processor, receiver, None);

        std::thread::sleep(Duration::from_millis(50));
        assert!(events.lock().unwrap().is_empty());
        queue.enqueue(Command::new(ExternalEvent::Unload).with_kill_thread()).unwrap();
        worker.join().unwrap();
        assert_eq!(events.lock().unwrap().len(), 1);
    }
}
