use super::UserStore;
use crate::core::{BatchError, Grade, Result, UserRecord, UserStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory eligibility store.
///
/// Records live in a map keyed by idx under a single `RwLock`. Finder
/// queries take the read guard, `save_all` takes the write guard for the
/// whole bulk operation, which is what makes it atomic: no reader or other
/// writer can observe a half-applied chunk.
pub struct InMemoryUserStore {
    users: RwLock<HashMap<u64, UserRecord>>,
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Seed the store from an iterator. Last write wins on duplicate idx.
    pub async fn seed<I>(&self, users: I)
    where
        I: IntoIterator<Item = UserRecord>,
    {
        let mut guard = self.users.write().await;
        for user in users {
            guard.insert(user.idx, user);
        }
    }

    fn matches(user: &UserRecord, cutoff: DateTime<Utc>, status: UserStatus) -> bool {
        user.status == status && user.updated_at < cutoff
    }

    fn sorted(mut users: Vec<UserRecord>) -> Vec<UserRecord> {
        // Deterministic snapshot order so a partition's drain sequence is stable.
        users.sort_by_key(|u| u.idx);
        users
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_eligible(
        &self,
        cutoff: DateTime<Utc>,
        status: UserStatus,
    ) -> Result<Vec<UserRecord>> {
        let guard = self.users.read().await;
        let hits = guard
            .values()
            .filter(|u| Self::matches(u, cutoff, status))
            .cloned()
            .collect();
        Ok(Self::sorted(hits))
    }

    async fn find_eligible_in_grade(
        &self,
        cutoff: DateTime<Utc>,
        status: UserStatus,
        grade: Grade,
    ) -> Result<Vec<UserRecord>> {
        let guard = self.users.read().await;
        let hits = guard
            .values()
            .filter(|u| u.grade == grade && Self::matches(u, cutoff, status))
            .cloned()
            .collect();
        Ok(Self::sorted(hits))
    }

    async fn save_all(&self, users: Vec<UserRecord>) -> Result<()> {
        let mut guard = self.users.write().await;

        // Validate the whole chunk before touching anything so a bad record
        // cannot leave a partial write behind.
        for user in &users {
            if !guard.contains_key(&user.idx) {
                return Err(BatchError::UserNotFound(user.idx));
            }
        }

        for user in users {
            guard.insert(user.idx, user);
        }
        Ok(())
    }

    async fn insert(&self, user: UserRecord) -> Result<()> {
        let mut guard = self.users.write().await;
        if guard.contains_key(&user.idx) {
            return Err(BatchError::ExecutionError(format!(
                "user '{}' already exists",
                user.idx
            )));
        }
        guard.insert(user.idx, user);
        Ok(())
    }

    async fn get(&self, idx: u64) -> Result<Option<UserRecord>> {
        let guard = self.users.read().await;
        Ok(guard.get(&idx).cloned())
    }

    async fn count_by_status(&self, status: UserStatus) -> Result<usize> {
        let guard = self.users.read().await;
        Ok(guard.values().filter(|u| u.status == status).count())
    }

    async fn len(&self) -> Result<usize> {
        let guard = self.users.read().await;
        Ok(guard.len())
    }
}
