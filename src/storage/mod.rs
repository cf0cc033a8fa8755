pub mod memory;

use crate::core::{Grade, Result, UserRecord, UserStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::InMemoryUserStore;

/// Read and bulk-write capabilities of the eligibility store.
///
/// The engine consumes this trait and nothing else: two finder queries for
/// building partition snapshots and one atomic bulk write for committing a
/// chunk. Implementations must make `save_all` all-or-nothing and safe to
/// call concurrently from several partitions.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Users whose `updated_at` is strictly before `cutoff` and whose status
    /// matches, across all grades. Ordered by `idx`.
    async fn find_eligible(
        &self,
        cutoff: DateTime<Utc>,
        status: UserStatus,
    ) -> Result<Vec<UserRecord>>;

    /// Same predicate narrowed to one grade. Ordered by `idx`.
    async fn find_eligible_in_grade(
        &self,
        cutoff: DateTime<Utc>,
        status: UserStatus,
        grade: Grade,
    ) -> Result<Vec<UserRecord>>;

    /// Persist every record in one atomic unit. Either all records become
    /// visible or none do.
    async fn save_all(&self, users: Vec<UserRecord>) -> Result<()>;

    /// Insert a new record. Fails if the idx is already taken.
    async fn insert(&self, user: UserRecord) -> Result<()>;

    /// Fetch one record by idx.
    async fn get(&self, idx: u64) -> Result<Option<UserRecord>>;

    /// Number of records currently in the given status.
    async fn count_by_status(&self, status: UserStatus) -> Result<usize>;

    /// Total number of records.
    async fn len(&self) -> Result<usize>;
}
