use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use thiserror::Error;

use tz_fsm::{GraphFsm, GraphVariant};
use tz_ops::{GraphCallbacks, GraphOps, Prober};
use tz_omx_api::{GraphConfig, IlCore};
use tz_queue::{CallbackRegistry, Command, CommandQueue, Dispatcher, ExternalEvent, QueueError, DEFAULT_WATCHDOG};

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// The bounded command queue's capacity (§4.2: external calls must never
/// block on a healthy graph; a burst this size covers the worst case of a
/// rapid volume-step/skip flurry plus in-flight OMX callbacks).
const QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("graph command queue rejected the request: {0}")]
    Queue(#[from] QueueError),
}

/// One playback graph's public handle (§6, "Upward (caller -> core)"). Every
/// method constructs an [`ExternalEvent`] and enqueues it; none of them call
/// into OMX IL directly or block on the worker thread.
pub struct Graph {
    id: u64,
    queue: CommandQueue,
    registry: CallbackRegistry,
    worker: Option<JoinHandle<()>>,
}

impl Graph {
    /// Assembles a graph: registers a fresh id with `registry`, builds the
    /// `ops`/`GraphFsm` pair, and spawns the single dedicated worker thread
    /// that owns them (§5).
    pub fn new(
        variant: GraphVariant,
        il_core: Arc<dyn IlCore>,
        registry: CallbackRegistry,
        callbacks: Arc<dyn GraphCallbacks>,
        prober: Box<dyn Prober>,
    ) -> Self {
        Self::new_with_watchdog(variant, il_core, registry, callbacks, prober, Some(DEFAULT_WATCHDOG))
    }

    /// Same as [`Graph::new`], but with an explicit watchdog period
    /// (`None` disables it) rather than the library default (§5,
    /// "Cancellation and timeouts").
    pub fn new_with_watchdog(
        variant: GraphVariant,
        il_core: Arc<dyn IlCore>,
        registry: CallbackRegistry,
        callbacks: Arc<dyn GraphCallbacks>,
        prober: Box<dyn Prober>,
        watchdog: Option<Duration>,
    ) -> Self {
        let id = NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed);
        let (queue, receiver) = CommandQueue::new(QUEUE_CAPACITY);
        let adapter = registry.register(id, queue.clone());

        let mut ops = GraphOps::new(il_core, Arc::new(adapter), prober);
        ops.set_metadata_sink(Box::new(crate::outbound::CallbacksMetadataSink {
            callbacks: callbacks.clone(),
        }));
        let fsm = GraphFsm::new(variant, ops, callbacks);
        let worker = Dispatcher::spawn_with_watchdog(fsm, receiver, watchdog);

        Graph {
            id,
            queue,
            registry,
            worker: Some(worker),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    fn enqueue(&self, event: ExternalEvent) -> Result<(), GraphError> {
        self.queue.enqueue(Command::new(event)).map_err(GraphError::from)
    }

    pub fn load(&self, config: GraphConfig) -> Result<(), GraphError> {
        self.enqueue(ExternalEvent::Load(config))
    }

    pub fn execute(&self, config: GraphConfig) -> Result<(), GraphError> {
        self.enqueue(ExternalEvent::Execute(config))
    }

    pub fn pause(&self) -> Result<(), GraphError> {
        self.enqueue(ExternalEvent::Pause)
    }

    pub fn stop(&self) -> Result<(), GraphError> {
        self.enqueue(ExternalEvent::Stop)
    }

    pub fn unload(&self) -> Result<(), GraphError> {
        self.enqueue(ExternalEvent::Unload)
    }

    /// `jump` is a signed offset relative to the current playlist index.
    pub fn skip(&self, jump: i32) -> Result<(), GraphError> {
        self.enqueue(ExternalEvent::Skip(jump))
    }

    /// Absolute seek position, in seconds.
    pub fn seek(&self, position_secs: f64) -> Result<(), GraphError> {
        self.enqueue(ExternalEvent::Seek(position_secs))
    }

    /// Absolute volume in `[0.0, 1.0]`.
    pub fn volume(&self, absolute: f32) -> Result<(), GraphError> {
        self.enqueue(ExternalEvent::Volume(absolute))
    }

    /// Signed integer percent delta, clamped to `0..=100` on application.
    pub fn volume_step(&self, delta_percent: i32) -> Result<(), GraphError> {
        self.enqueue(ExternalEvent::VolumeStep(delta_percent))
    }

    pub fn mute(&self) -> Result<(), GraphError> {
        self.enqueue(ExternalEvent::Mute)
    }

    pub fn position(&self, position_secs: f64) -> Result<(), GraphError> {
        self.enqueue(ExternalEvent::Position(position_secs))
    }

    /// Tears the graph down and terminates its worker thread (§4.2,
    /// "Cancellation": "Canceling a graph means enqueuing a `kill_thread`
    /// command"). Unregisters from the callback registry first so any
    /// in-flight component callback is dropped rather than racing the
    /// queue shutdown.
    pub fn shutdown(mut self) -> Result<(), GraphError> {
        self.registry.unregister(self.id);
        self.queue
            .enqueue(Command::new(ExternalEvent::Unload).with_kill_thread())
            .map_err(GraphError::from)?;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        Ok(())
    }
}

impl Drop for Graph {
    fn drop(&mut self) {
        self.registry.unregister(self.id);
        if self.worker.is_some() {
            let _ = self.queue.enqueue(Command::new(ExternalEvent::Unload).with_kill_thread());
        }
    }
}
