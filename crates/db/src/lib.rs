//! Persistence for TopicHub.
//!
//! The store is persisted as a whole: every live record plus every historical
//! version, as one [`StoreSnapshot`]. Backends implement [`TopicRepository`].

use async_trait::async_trait;
use topichub_core::topic::StoreSnapshot;

pub mod repositories;

pub use repositories::{JsonFileRepository, MemoryRepository};

/// Persistence failure.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed data file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Whole-snapshot storage backend.
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Load the last saved snapshot. An empty store loads as an empty snapshot.
    async fn load_all(&self) -> Result<StoreSnapshot, DbError>;

    /// Replace the stored snapshot.
    async fn save_all(&self, snapshot: &StoreSnapshot) -> Result<(), DbError>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> Result<(), DbError> {
        Ok(())
    }
}
