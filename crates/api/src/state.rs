use std::sync::Arc;

use tokio::sync::Mutex;
use topichub_core::{Committed, TopicStore};
use topichub_db::{DbError, TopicRepository};
use topichub_events::EventBus;

use crate::config::ServerConfig;
use crate::error::AppResult;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Live topic store.
    pub store: Arc<TopicStore>,
    /// Snapshot persistence backend.
    pub repo: Arc<dyn TopicRepository>,
    /// Serializes saves so the newest snapshot is always the last one written.
    pub save_lock: Arc<Mutex<()>>,
    /// Event bus for topic change notifications.
    pub event_bus: Arc<EventBus>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<TopicStore>,
        repo: Arc<dyn TopicRepository>,
        event_bus: Arc<EventBus>,
        config: Arc<ServerConfig>,
    ) -> Self {
        Self {
            store,
            repo,
            save_lock: Arc::new(Mutex::new(())),
            event_bus,
            config,
        }
    }

    /// Announce and persist a committed mutation, returning its value.
    ///
    /// The store already holds the change, so events go out even when the
    /// save fails. Mutations that changed nothing are neither announced nor
    /// saved.
    pub async fn commit<T>(&self, committed: Committed<T>) -> AppResult<T> {
        let (value, changes) = committed.into_parts();
        if changes.is_empty() {
            return Ok(value);
        }
        self.event_bus.publish_changes(&changes);
        self.persist().await?;
        Ok(value)
    }

    /// Write the current store snapshot to the repository.
    pub async fn persist(&self) -> Result<(), DbError> {
        let _guard = self.save_lock.lock().await;
        let snapshot = self.store.snapshot();
        self.repo.save_all(&snapshot).await
    }
}
