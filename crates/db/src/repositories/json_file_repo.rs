//! Snapshot storage in a single pretty-printed JSON file.
//!
//! Saves write a temporary sibling file and rename it into place, so a crash
//! mid-save leaves the previous snapshot intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use topichub_core::topic::StoreSnapshot;

use crate::{DbError, TopicRepository};

/// Suffix appended to the data file name while a save is in flight.
const TEMP_SUFFIX: &str = "tmp";

pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(TEMP_SUFFIX);
        self.path.with_file_name(name)
    }

    fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }
}

#[async_trait]
impl TopicRepository for JsonFileRepository {
    async fn load_all(&self) -> Result<StoreSnapshot, DbError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let snapshot: StoreSnapshot = serde_json::from_slice(&bytes)?;
                tracing::debug!(
                    path = %self.path.display(),
                    topics = snapshot.topics.len(),
                    versions = snapshot.versions.len(),
                    "Loaded topic snapshot"
                );
                Ok(snapshot)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No data file yet, starting empty");
                Ok(StoreSnapshot::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save_all(&self, snapshot: &StoreSnapshot) -> Result<(), DbError> {
        if let Some(dir) = self.parent_dir() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        tracing::debug!(
            path = %self.path.display(),
            topics = snapshot.topics.len(),
            bytes = bytes.len(),
            "Saved topic snapshot"
        );
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DbError> {
        match self.parent_dir() {
            Some(dir) => match tokio::fs::metadata(dir).await {
                Ok(_) => Ok(()),
                // The directory is created on first save.
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
            None => Ok(()),
        }
    }
}
