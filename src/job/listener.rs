use crate::core::{ExecutionEvent, Result};
use log::{info, warn};
use std::sync::{Arc, Mutex};

/// Side-channel observer of engine lifecycle events.
///
/// Listeners are invoked synchronously from inside the owning partition's
/// pipeline and have no control-flow authority: a listener returning an
/// error is logged and ignored, it never changes a step or job outcome.
pub trait ExecutionListener: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent) -> Result<()>;
}

/// The set of listeners wired into an executor at construction time.
///
/// There is deliberately no process-wide registry; whoever builds the job
/// decides exactly who observes it.
#[derive(Clone, Default)]
pub struct ListenerSet {
    listeners: Arc<Vec<Arc<dyn ExecutionListener>>>,
}

impl ListenerSet {
    pub fn new(listeners: Vec<Arc<dyn ExecutionListener>>) -> Self {
        Self {
            listeners: Arc::new(listeners),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Fan the event out to every listener. Listener faults are contained
    /// here: log and keep going.
    pub fn fire(&self, event: &ExecutionEvent) {
        for listener in self.listeners.iter() {
            if let Err(e) = listener.on_event(event) {
                warn!("listener failed on {}: {}", event.kind(), e);
            }
        }
    }
}

/// Default observer: one log line per lifecycle event.
pub struct LogListener;

impl ExecutionListener for LogListener {
    fn on_event(&self, event: &ExecutionEvent) -> Result<()> {
        match event {
            ExecutionEvent::JobStarted { run_id } => info!("job {} started", run_id),
            ExecutionEvent::JobFinished { run_id, status } => {
                info!("job {} finished: {:?}", run_id, status)
            }
            ExecutionEvent::StepStarted { partition } => info!("[{}] step started", partition),
            ExecutionEvent::StepFinished { partition, status } => {
                info!("[{}] step finished: {:?}", partition, status)
            }
            ExecutionEvent::ChunkStarted {
                partition,
                chunk_index,
            } => info!("[{}] chunk {} started", partition, chunk_index),
            ExecutionEvent::ChunkFinished {
                partition,
                chunk_index,
                size,
            } => info!("[{}] chunk {} committed ({} items)", partition, chunk_index, size),
            ExecutionEvent::ChunkFailed {
                partition,
                chunk_index,
            } => warn!("[{}] chunk {} failed", partition, chunk_index),
            ExecutionEvent::BeforeItem { partition, user_idx } => {
                info!("[{}] process: {}", partition, user_idx)
            }
            ExecutionEvent::AfterItem { partition, user_idx } => {
                info!("[{}] processed: {}", partition, user_idx)
            }
            ExecutionEvent::ItemFailed { partition, user_idx } => {
                warn!("[{}] item {} failed", partition, user_idx)
            }
        }
        Ok(())
    }
}

/// Buffers every event it sees. Meant for tests and callers that want to
/// assert on event ordering after a run.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<ExecutionEvent>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ExecutionEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Event kinds in arrival order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|e| e.kind())
            .collect()
    }
}

impl ExecutionListener for RecordingListener {
    fn on_event(&self, event: &ExecutionEvent) -> Result<()> {
        // Plain std mutex: the critical section never awaits, so holding it
        // from async code is fine.
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        events.push(event.clone());
        Ok(())
    }
}
