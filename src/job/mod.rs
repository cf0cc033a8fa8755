pub mod config;
pub mod executor;
pub mod listener;
pub mod partitioner;
pub mod runner;
pub mod scheduler;
pub mod sink;
pub mod source;
pub mod transform;

pub use config::JobConfig;
pub use executor::{ChunkExecutor, StepState, StepSummary};
pub use listener::{ExecutionListener, ListenerSet, LogListener, RecordingListener};
pub use partitioner::{GradePartitioner, PartitionPlan};
pub use runner::{eligibility_cutoff, InactiveUserJob, JobExecution};
pub use scheduler::PartitionScheduler;
pub use sink::{ItemSink, StoreWriter};
pub use source::SnapshotReader;
pub use transform::{Inactivate, ItemTransform};
