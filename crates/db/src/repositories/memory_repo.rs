//! In-memory snapshot storage, for tests and ephemeral runs.

use async_trait::async_trait;
use tokio::sync::RwLock;
use topichub_core::topic::StoreSnapshot;

use crate::{DbError, TopicRepository};

#[derive(Default)]
pub struct MemoryRepository {
    snapshot: RwLock<StoreSnapshot>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot.
    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }

    /// The last saved snapshot.
    pub async fn current(&self) -> StoreSnapshot {
        self.snapshot.read().await.clone()
    }
}

#[async_trait]
impl TopicRepository for MemoryRepository {
    async fn load_all(&self) -> Result<StoreSnapshot, DbError> {
        Ok(self.current().await)
    }

    async fn save_all(&self, snapshot: &StoreSnapshot) -> Result<(), DbError> {
        *self.snapshot.write().await = snapshot.clone();
        Ok(())
    }
}
