use super::listener::ListenerSet;
use super::sink::ItemSink;
use super::source::SnapshotReader;
use super::transform::ItemTransform;
use crate::core::{BatchStatus, ExecutionEvent, Result, UserRecord};
use log::debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Where one partition's pipeline currently stands.
///
/// `Committed` is re-entered once per chunk; `Completed` and `Failed` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepState {
    Init,
    Fetching,
    Transforming,
    Writing,
    Committed,
    Completed,
    Failed,
}

/// Terminal report for one partition's step.
#[derive(Debug, Clone)]
pub struct StepSummary {
    pub partition: String,
    pub state: StepState,
    pub chunks_committed: usize,
    pub items_written: usize,
    /// Error message when `state == Failed`
    pub failure: Option<String>,
}

impl StepSummary {
    pub fn status(&self) -> BatchStatus {
        match self.state {
            StepState::Completed => BatchStatus::Completed,
            _ => BatchStatus::Failed,
        }
    }

    /// Summary for a partition the scheduler could not admit: it failed
    /// before a single chunk was fetched.
    pub fn not_admitted(partition: &str, reason: &str) -> Self {
        Self {
            partition: partition.to_string(),
            state: StepState::Failed,
            chunks_committed: 0,
            items_written: 0,
            failure: Some(reason.to_string()),
        }
    }
}

/// Drives the read/transform/write loop for one partition.
///
/// The loop is strictly sequential: chunk k+1 is never fetched before
/// chunk k's write has committed, so at any failure point everything
/// committed so far stays applied and nothing from the failing chunk is
/// visible. There is no cross-chunk rollback, only per-chunk atomicity.
pub struct ChunkExecutor {
    partition: String,
    reader: Arc<SnapshotReader>,
    transform: Arc<dyn ItemTransform>,
    sink: Arc<dyn ItemSink>,
    listeners: ListenerSet,
    chunk_size: usize,
    item_delay: Duration,
    // Live phase, observable while run() is in flight. Plain std mutex:
    // the critical section never awaits.
    state: Mutex<StepState>,
}

impl ChunkExecutor {
    pub fn new(
        partition: impl Into<String>,
        reader: Arc<SnapshotReader>,
        transform: Arc<dyn ItemTransform>,
        sink: Arc<dyn ItemSink>,
        listeners: ListenerSet,
        chunk_size: usize,
    ) -> Self {
        Self {
            partition: partition.into(),
            reader,
            transform,
            sink,
            listeners,
            chunk_size,
            item_delay: Duration::ZERO,
            state: Mutex::new(StepState::Init),
        }
    }

    /// Artificial per-item latency, for concurrency demos. Zero disables it.
    pub fn with_item_delay(mut self, delay: Duration) -> Self {
        self.item_delay = delay;
        self
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Current phase of the state machine. Terminal once `run` returns.
    pub fn state(&self) -> StepState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn transition(&self, summary: &mut StepSummary, state: StepState) {
        summary.state = state;
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Run the step to its terminal state. The returned summary carries the
    /// terminal state; the error cause is also folded into it so the
    /// scheduler can aggregate without unwrapping.
    pub async fn run(&self) -> StepSummary {
        self.listeners.fire(&ExecutionEvent::StepStarted {
            partition: self.partition.clone(),
        });

        let mut summary = StepSummary {
            partition: self.partition.clone(),
            state: StepState::Init,
            chunks_committed: 0,
            items_written: 0,
            failure: None,
        };

        let mut chunk_index = 0;
        loop {
            self.transition(&mut summary, StepState::Fetching);
            let chunk = self.reader.read_chunk(self.chunk_size).await;
            if chunk.is_empty() {
                self.transition(&mut summary, StepState::Completed);
                break;
            }

            self.listeners.fire(&ExecutionEvent::ChunkStarted {
                partition: self.partition.clone(),
                chunk_index,
            });

            self.transition(&mut summary, StepState::Transforming);
            let transformed = match self.transform_chunk(chunk).await {
                Ok(transformed) => transformed,
                Err(e) => {
                    self.fail(&mut summary, chunk_index, &e.to_string());
                    break;
                }
            };

            self.transition(&mut summary, StepState::Writing);
            debug!(
                "[{}] write chunk {}: {} items",
                self.partition,
                chunk_index,
                transformed.len()
            );
            let written = transformed.len();
            if let Err(e) = self.sink.write(transformed).await {
                self.fail(&mut summary, chunk_index, &e.to_string());
                break;
            }

            self.transition(&mut summary, StepState::Committed);
            summary.chunks_committed += 1;
            summary.items_written += written;
            self.listeners.fire(&ExecutionEvent::ChunkFinished {
                partition: self.partition.clone(),
                chunk_index,
                size: written,
            });

            chunk_index += 1;
        }

        debug!(
            "[{}] step done: {:?}, {} chunks / {} items",
            self.partition, summary.state, summary.chunks_committed, summary.items_written
        );
        self.listeners.fire(&ExecutionEvent::StepFinished {
            partition: self.partition.clone(),
            status: summary.status(),
        });
        summary
    }

    fn fail(&self, summary: &mut StepSummary, chunk_index: usize, reason: &str) {
        self.transition(summary, StepState::Failed);
        summary.failure = Some(reason.to_string());
        self.listeners.fire(&ExecutionEvent::ChunkFailed {
            partition: self.partition.clone(),
            chunk_index,
        });
    }

    /// Transform every item of the chunk, firing the item events around
    /// each call.
    async fn transform_chunk(&self, chunk: Vec<UserRecord>) -> Result<Vec<UserRecord>> {
        let mut transformed = Vec::with_capacity(chunk.len());
        for user in chunk {
            let user_idx = user.idx;
            self.listeners.fire(&ExecutionEvent::BeforeItem {
                partition: self.partition.clone(),
                user_idx,
            });

            if !self.item_delay.is_zero() {
                tokio::time::sleep(self.item_delay).await;
            }

            match self.transform.apply(user) {
                Ok(out) => {
                    self.listeners.fire(&ExecutionEvent::AfterItem {
                        partition: self.partition.clone(),
                        user_idx,
                    });
                    transformed.push(out);
                }
                Err(e) => {
                    self.listeners.fire(&ExecutionEvent::ItemFailed {
                        partition: self.partition.clone(),
                        user_idx,
                    });
                    return Err(e);
                }
            }
        }
        Ok(transformed)
    }
}
