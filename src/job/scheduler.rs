use super::executor::{ChunkExecutor, StepState, StepSummary};
use crate::core::BatchStatus;
use log::warn;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs partition pipelines concurrently under an admission limit.
///
/// Every executor is spawned onto the runtime, but a semaphore sized to the
/// throttle limit gates how many actually run at once: admission, not task
/// count, enforces the ceiling. A failing partition is isolated: its
/// siblings keep running to their own terminal state, and the aggregate
/// outcome is `Completed` only if every partition completed.
pub struct PartitionScheduler {
    throttle_limit: usize,
}

impl PartitionScheduler {
    pub fn new(throttle_limit: usize) -> Self {
        Self { throttle_limit }
    }

    /// Drive every executor to its terminal state and collect the
    /// summaries. Completion order between partitions is unspecified; the
    /// returned summaries are in spawn order.
    pub async fn run(&self, executors: Vec<ChunkExecutor>) -> Vec<StepSummary> {
        let semaphore = Arc::new(Semaphore::new(self.throttle_limit));
        let mut join_set = JoinSet::new();

        for (slot, executor) in executors.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                // Admission can only fail if the semaphore is closed; that
                // partition must not run unthrottled, it reports as failed.
                match semaphore.acquire_owned().await {
                    Ok(_permit) => (slot, executor.run().await),
                    Err(_) => {
                        warn!("[{}] never admitted: scheduler shut down", executor.partition());
                        (
                            slot,
                            StepSummary::not_admitted(
                                executor.partition(),
                                "scheduler shut down before admission",
                            ),
                        )
                    }
                }
            });
        }

        let mut summaries: Vec<Option<StepSummary>> = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((slot, summary)) => {
                    if summaries.len() <= slot {
                        summaries.resize(slot + 1, None);
                    }
                    summaries[slot] = Some(summary);
                }
                Err(e) => {
                    warn!("partition task panicked: {}", e);
                }
            }
        }

        summaries.into_iter().flatten().collect()
    }

    /// Fold per-partition outcomes into the job-level outcome.
    pub fn aggregate(summaries: &[StepSummary]) -> BatchStatus {
        if summaries.iter().all(|s| s.state == StepState::Completed) {
            BatchStatus::Completed
        } else {
            BatchStatus::Failed
        }
    }
}
