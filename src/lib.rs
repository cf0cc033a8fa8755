// ============================================================================
// userbatch Library
// ============================================================================

pub mod core;
pub mod job;
pub mod storage;

// Re-export main types for convenience
pub use crate::core::{
    BatchError, BatchStatus, ExecutionEvent, Grade, Result, SocialType, UserRecord, UserStatus,
};
pub use job::{
    ChunkExecutor, ExecutionListener, GradePartitioner, Inactivate, InactiveUserJob, ItemSink,
    ItemTransform, JobConfig, JobExecution, ListenerSet, LogListener, PartitionPlan,
    PartitionScheduler, RecordingListener, SnapshotReader, StepState, StepSummary, StoreWriter,
};
pub use storage::{InMemoryUserStore, UserStore};
