use crate::core::{BatchError, Grade, Result, UserRecord, UserStatus};
use crate::storage::UserStore;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Snapshot-then-drain item source for one partition.
///
/// The eligibility query runs exactly once, at `open` time; the result is
/// buffered and then drained strictly sequentially. The store is never
/// re-queried mid-drain, so records mutated by earlier chunks can never
/// shift later pages out from under the reader; the skip hazard of a
/// paged reader whose predicate narrows as it commits does not exist here.
///
/// `read` is safe under concurrent callers: the drain cursor sits behind a
/// mutex, so each eligible record is handed out at most once even if more
/// than one task drains the same partition.
pub struct SnapshotReader {
    items: Mutex<VecDeque<UserRecord>>,
    snapshot_len: usize,
}

impl SnapshotReader {
    /// Snapshot the eligible set for one partition.
    ///
    /// With `grade = None` the snapshot spans all grades (the unpartitioned
    /// job); otherwise it holds only that grade's records.
    pub async fn open(
        store: &Arc<dyn UserStore>,
        cutoff: DateTime<Utc>,
        status: UserStatus,
        grade: Option<Grade>,
    ) -> Result<Self> {
        let users = match grade {
            Some(grade) => store.find_eligible_in_grade(cutoff, status, grade).await,
            None => store.find_eligible(cutoff, status).await,
        }
        .map_err(|e| BatchError::SourceError(e.to_string()))?;

        Ok(Self {
            snapshot_len: users.len(),
            items: Mutex::new(users.into()),
        })
    }

    /// Build a reader over an already-materialized snapshot. Used by tests
    /// and by callers that assemble their own eligible set.
    pub fn from_snapshot(users: Vec<UserRecord>) -> Self {
        Self {
            snapshot_len: users.len(),
            items: Mutex::new(users.into()),
        }
    }

    /// Next record, or `None` once the snapshot is exhausted. Exhaustion is
    /// terminal; the reader never refills.
    pub async fn read(&self) -> Option<UserRecord> {
        let mut items = self.items.lock().await;
        items.pop_front()
    }

    /// Fetch up to `max` records in one call. Returns an empty vec on
    /// exhaustion. Holds the cursor lock for the whole fetch so two chunk
    /// fetches can never interleave their records.
    pub async fn read_chunk(&self, max: usize) -> Vec<UserRecord> {
        let mut items = self.items.lock().await;
        let take = max.min(items.len());
        items.drain(..take).collect()
    }

    /// Size of the snapshot taken at open time.
    pub fn snapshot_len(&self) -> usize {
        self.snapshot_len
    }
}
