use super::config::JobConfig;
use super::executor::{ChunkExecutor, StepSummary};
use super::listener::ListenerSet;
use super::partitioner::{GradePartitioner, PartitionPlan};
use super::scheduler::PartitionScheduler;
use super::sink::StoreWriter;
use super::source::SnapshotReader;
use super::transform::Inactivate;
use crate::core::{BatchError, BatchStatus, ExecutionEvent, Result, UserStatus};
use crate::storage::UserStore;
use chrono::{DateTime, Months, Utc};
use futures::future::try_join_all;
use log::info;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Terminal report of one job run.
#[derive(Debug, Clone)]
pub struct JobExecution {
    pub id: Uuid,
    pub now: DateTime<Utc>,
    pub status: BatchStatus,
    pub steps: Vec<StepSummary>,
}

impl JobExecution {
    pub fn items_written(&self) -> usize {
        self.steps.iter().map(|s| s.items_written).sum()
    }
}

/// The dormant-account job.
///
/// Holds the eligibility store, the configuration and the listener set, and
/// launches runs keyed by their `nowDate` parameter. A `now` that already
/// produced a completed run is refused (the replay guard); a failed run may
/// be retried with the same `now`.
///
/// # Examples
///
/// ```
/// use userbatch::{InactiveUserJob, InMemoryUserStore, JobConfig};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let store = Arc::new(InMemoryUserStore::new());
/// let job = InactiveUserJob::new(store, JobConfig::default()).unwrap();
///
/// let execution = job.launch(chrono::Utc::now()).await.unwrap();
/// println!("{:?}: {} users deactivated", execution.status, execution.items_written());
/// # });
/// ```
pub struct InactiveUserJob {
    store: Arc<dyn UserStore>,
    config: JobConfig,
    listeners: ListenerSet,
    completed_runs: Mutex<HashSet<DateTime<Utc>>>,
}

impl std::fmt::Debug for InactiveUserJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InactiveUserJob")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl InactiveUserJob {
    pub fn new(store: Arc<dyn UserStore>, config: JobConfig) -> Result<Self> {
        Self::with_listeners(store, config, ListenerSet::empty())
    }

    pub fn with_listeners(
        store: Arc<dyn UserStore>,
        config: JobConfig,
        listeners: ListenerSet,
    ) -> Result<Self> {
        config.validate().map_err(BatchError::InvalidConfig)?;
        Ok(Self {
            store,
            config,
            listeners,
            completed_runs: Mutex::new(HashSet::new()),
        })
    }

    /// Launch the partitioned job: one pipeline per grade, scheduled under
    /// the throttle limit.
    pub async fn launch(&self, now: DateTime<Utc>) -> Result<JobExecution> {
        self.check_replay(now).await?;
        let cutoff = eligibility_cutoff(now)?;

        let run_id = Uuid::new_v4();
        info!("launching inactive-user job {} (nowDate {})", run_id, now);
        self.listeners.fire(&ExecutionEvent::JobStarted { run_id });

        let plans = GradePartitioner::partition(self.config.grid_size);
        let executors = self.build_executors(&plans, cutoff, now).await?;

        let scheduler = PartitionScheduler::new(self.config.throttle_limit);
        let steps = scheduler.run(executors).await;
        let status = PartitionScheduler::aggregate(&steps);

        self.finish(run_id, now, status, steps).await
    }

    /// Launch the single-step variant: one snapshot across all grades, one
    /// sequential pipeline, same chunk semantics.
    pub async fn launch_unpartitioned(&self, now: DateTime<Utc>) -> Result<JobExecution> {
        self.check_replay(now).await?;
        let cutoff = eligibility_cutoff(now)?;

        let run_id = Uuid::new_v4();
        info!("launching inactive-user job {} (unpartitioned)", run_id);
        self.listeners.fire(&ExecutionEvent::JobStarted { run_id });

        let reader = Arc::new(
            SnapshotReader::open(&self.store, cutoff, UserStatus::Active, None).await?,
        );
        let executor = self.executor("inactiveUserStep", reader, now);
        let summary = executor.run().await;

        let status = summary.status();
        self.finish(run_id, now, status, vec![summary]).await
    }

    /// Snapshot every partition's eligible set concurrently, then wrap each
    /// in its own executor.
    async fn build_executors(
        &self,
        plans: &[PartitionPlan],
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ChunkExecutor>> {
        let readers = try_join_all(plans.iter().map(|plan| {
            SnapshotReader::open(&self.store, cutoff, UserStatus::Active, Some(plan.grade))
        }))
        .await?;

        Ok(plans
            .iter()
            .zip(readers)
            .map(|(plan, reader)| self.executor(&plan.name, Arc::new(reader), now))
            .collect())
    }

    fn executor(
        &self,
        partition: &str,
        reader: Arc<SnapshotReader>,
        now: DateTime<Utc>,
    ) -> ChunkExecutor {
        ChunkExecutor::new(
            partition,
            reader,
            Arc::new(Inactivate::new(now)),
            Arc::new(StoreWriter::new(Arc::clone(&self.store))),
            self.listeners.clone(),
            self.config.chunk_size,
        )
        .with_item_delay(self.config.item_delay)
    }

    async fn check_replay(&self, now: DateTime<Utc>) -> Result<()> {
        let completed = self.completed_runs.lock().await;
        if completed.contains(&now) {
            return Err(BatchError::DuplicateRun(now));
        }
        Ok(())
    }

    async fn finish(
        &self,
        run_id: Uuid,
        now: DateTime<Utc>,
        status: BatchStatus,
        steps: Vec<StepSummary>,
    ) -> Result<JobExecution> {
        if status == BatchStatus::Completed {
            // Only completed runs arm the replay guard; a failed run left
            // work behind and must stay retryable under the same nowDate.
            self.completed_runs.lock().await.insert(now);
        }

        info!("job {} finished: {:?}", run_id, status);
        self.listeners
            .fire(&ExecutionEvent::JobFinished { run_id, status });

        Ok(JobExecution {
            id: run_id,
            now,
            status,
            steps,
        })
    }
}

/// `nowDate - 1 year`, calendar-aware.
pub fn eligibility_cutoff(now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    now.checked_sub_months(Months::new(12))
        .ok_or_else(|| BatchError::InvalidConfig(format!("cannot derive cutoff from {now}")))
}
