use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Source error: {0}")]
    SourceError(String),

    #[error("Transform error: {0}")]
    TransformError(String),

    #[error("Write error: {0}")]
    WriteError(String),

    #[error("Listener error: {0}")]
    ListenerError(String),

    #[error("Duplicate run: a job for nowDate {0} already completed")]
    DuplicateRun(DateTime<Utc>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("User '{0}' not found")]
    UserNotFound(u64),

    #[error("Execution error: {0}")]
    ExecutionError(String),
}

pub type Result<T> = std::result::Result<T, BatchError>;
