use crate::core::{BatchError, Result, UserRecord};
use crate::storage::UserStore;
use async_trait::async_trait;
use std::sync::Arc;

/// Commits one chunk of transformed records as a single atomic unit.
#[async_trait]
pub trait ItemSink: Send + Sync {
    async fn write(&self, chunk: Vec<UserRecord>) -> Result<()>;
}

/// Production sink: one chunk becomes one `save_all` call against the
/// eligibility store. The store's bulk write is what provides the
/// all-or-nothing guarantee; this type only maps its failure into the
/// engine's error taxonomy.
pub struct StoreWriter {
    store: Arc<dyn UserStore>,
}

impl StoreWriter {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ItemSink for StoreWriter {
    async fn write(&self, chunk: Vec<UserRecord>) -> Result<()> {
        self.store
            .save_all(chunk)
            .await
            .map_err(|e| BatchError::WriteError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Grade, UserStatus};
    use crate::storage::InMemoryUserStore;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_store_writer_commits_whole_chunk() {
        let mem = InMemoryUserStore::new();
        let users: Vec<_> = (1..=3)
            .map(|i| {
                UserRecord::builder(i)
                    .email(&format!("u{i}@example.com"))
                    .grade(Grade::Gold)
                    .updated_at(Utc::now() - Duration::days(400))
                    .build()
            })
            .collect();
        mem.seed(users.clone()).await;
        let store: Arc<dyn UserStore> = Arc::new(mem);

        let now = Utc::now();
        let chunk: Vec<_> = users.into_iter().map(|u| u.into_inactive(now)).collect();

        let writer = StoreWriter::new(Arc::clone(&store));
        writer.write(chunk).await.unwrap();

        assert_eq!(store.count_by_status(UserStatus::Inactive).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_store_writer_maps_failure_to_write_error() {
        let store: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
        let orphan = UserRecord::builder(42).email("x@example.com").build();

        let writer = StoreWriter::new(store);
        let err = writer.write(vec![orphan]).await.unwrap_err();
        assert!(matches!(err, BatchError::WriteError(_)));
    }
}
