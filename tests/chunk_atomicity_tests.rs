/// Chunk atomicity tests
///
/// A chunk either commits whole or leaves no trace, and chunks committed
/// before a failure stay durably applied. Failures are injected at the
/// store's bulk write, which is where the job's sink commits.
/// Run with: cargo test --test chunk_atomicity_tests
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use userbatch::{
    BatchError, BatchStatus, Grade, InMemoryUserStore, InactiveUserJob, JobConfig, Result,
    UserRecord, UserStatus, UserStore,
};

fn user(idx: u64, grade: Grade) -> UserRecord {
    UserRecord::builder(idx)
        .email(&format!("user{idx}@example.com"))
        .grade(grade)
        .updated_at(Utc::now() - Duration::days(450))
        .build()
}

/// Store wrapper that fails the nth bulk write and delegates everything
/// else to the in-memory store.
struct FailOnNthSave {
    inner: InMemoryUserStore,
    fail_on: usize,
    saves: AtomicUsize,
}

impl FailOnNthSave {
    fn new(fail_on: usize) -> Self {
        Self {
            inner: InMemoryUserStore::new(),
            fail_on,
            saves: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl UserStore for FailOnNthSave {
    async fn find_eligible(
        &self,
        cutoff: DateTime<Utc>,
        status: UserStatus,
    ) -> Result<Vec<UserRecord>> {
        self.inner.find_eligible(cutoff, status).await
    }

    async fn find_eligible_in_grade(
        &self,
        cutoff: DateTime<Utc>,
        status: UserStatus,
        grade: Grade,
    ) -> Result<Vec<UserRecord>> {
        self.inner.find_eligible_in_grade(cutoff, status, grade).await
    }

    async fn save_all(&self, users: Vec<UserRecord>) -> Result<()> {
        let call = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(BatchError::WriteError("injected store failure".to_string()));
        }
        self.inner.save_all(users).await
    }

    async fn insert(&self, u: UserRecord) -> Result<()> {
        self.inner.insert(u).await
    }

    async fn get(&self, idx: u64) -> Result<Option<UserRecord>> {
        self.inner.get(idx).await
    }

    async fn count_by_status(&self, status: UserStatus) -> Result<usize> {
        self.inner.count_by_status(status).await
    }

    async fn len(&self) -> Result<usize> {
        self.inner.len().await
    }
}

#[tokio::test]
async fn test_failure_on_third_chunk_keeps_first_two_durable() {
    let store = Arc::new(FailOnNthSave::new(3));
    store.inner.seed((1..=15).map(|i| user(i, Grade::Gold))).await;

    let job = InactiveUserJob::new(
        store.clone(),
        JobConfig::new().chunk_size(5),
    )
    .unwrap();

    let execution = job.launch_unpartitioned(Utc::now()).await.unwrap();
    assert_eq!(execution.status, BatchStatus::Failed);

    // Chunks 1 and 2 (10 records) committed; chunk 3 left no trace.
    assert_eq!(
        store.count_by_status(UserStatus::Inactive).await.unwrap(),
        10
    );
    assert_eq!(store.count_by_status(UserStatus::Active).await.unwrap(), 5);

    let step = &execution.steps[0];
    assert_eq!(step.chunks_committed, 2);
    assert_eq!(step.items_written, 10);
    assert!(step.failure.as_deref().unwrap_or("").contains("injected"));
}

#[tokio::test]
async fn test_failing_chunk_is_invisible_even_mid_chunk() {
    // Fail on the very first write: nothing at all may be applied.
    let store = Arc::new(FailOnNthSave::new(1));
    store.inner.seed((1..=7).map(|i| user(i, Grade::Vip))).await;

    let job = InactiveUserJob::new(store.clone(), JobConfig::new().chunk_size(5)).unwrap();
    let execution = job.launch_unpartitioned(Utc::now()).await.unwrap();

    assert_eq!(execution.status, BatchStatus::Failed);
    assert_eq!(store.count_by_status(UserStatus::Inactive).await.unwrap(), 0);
    assert_eq!(store.count_by_status(UserStatus::Active).await.unwrap(), 7);
}

#[tokio::test]
async fn test_partitioned_failure_is_scoped_to_one_grade() {
    // The failing write lands in whichever partition commits third, but
    // sibling partitions still finish their own work.
    let store = Arc::new(FailOnNthSave::new(2));
    store.inner.seed((1..=4).map(|i| user(i, Grade::Vip))).await;
    store
        .inner
        .seed((11..=14).map(|i| user(i, Grade::Gold)))
        .await;
    store
        .inner
        .seed((21..=24).map(|i| user(i, Grade::Normal)))
        .await;

    let job = InactiveUserJob::new(
        store.clone(),
        // Serialize partitions so exactly one save fails deterministically.
        JobConfig::new().chunk_size(5).throttle_limit(1),
    )
    .unwrap();

    let execution = job.launch(Utc::now()).await.unwrap();
    assert_eq!(execution.status, BatchStatus::Failed);

    let failed: Vec<_> = execution
        .steps
        .iter()
        .filter(|s| s.status() == BatchStatus::Failed)
        .collect();
    assert_eq!(failed.len(), 1);

    // Two partitions of 4 records each committed, one lost its only chunk.
    assert_eq!(store.count_by_status(UserStatus::Inactive).await.unwrap(), 8);
}
