use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal status of a job or of one partition's step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    Completed,
    Failed,
}

/// Lifecycle notification emitted by the engine.
///
/// Events carry ids and sizes only; listeners get no handle on the records
/// themselves and cannot influence control flow. Only the presence and
/// ordering of event kinds is a contract, not the payload contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionEvent {
    JobStarted {
        run_id: Uuid,
    },
    JobFinished {
        run_id: Uuid,
        status: BatchStatus,
    },
    StepStarted {
        partition: String,
    },
    StepFinished {
        partition: String,
        status: BatchStatus,
    },
    ChunkStarted {
        partition: String,
        chunk_index: usize,
    },
    ChunkFinished {
        partition: String,
        chunk_index: usize,
        size: usize,
    },
    ChunkFailed {
        partition: String,
        chunk_index: usize,
    },
    BeforeItem {
        partition: String,
        user_idx: u64,
    },
    AfterItem {
        partition: String,
        user_idx: u64,
    },
    ItemFailed {
        partition: String,
        user_idx: u64,
    },
}

impl ExecutionEvent {
    /// Short tag used in log lines and ordering assertions.
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionEvent::JobStarted { .. } => "job_started",
            ExecutionEvent::JobFinished { .. } => "job_finished",
            ExecutionEvent::StepStarted { .. } => "step_started",
            ExecutionEvent::StepFinished { .. } => "step_finished",
            ExecutionEvent::ChunkStarted { .. } => "chunk_started",
            ExecutionEvent::ChunkFinished { .. } => "chunk_finished",
            ExecutionEvent::ChunkFailed { .. } => "chunk_failed",
            ExecutionEvent::BeforeItem { .. } => "before_item",
            ExecutionEvent::AfterItem { .. } => "after_item",
            ExecutionEvent::ItemFailed { .. } => "item_failed",
        }
    }
}
