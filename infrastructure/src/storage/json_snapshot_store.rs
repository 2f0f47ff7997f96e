//! Analytics snapshot as a single JSON file

use super::write_atomically;
use async_trait::async_trait;
use council_application::ports::conversation_store::StoreError;
use council_application::ports::snapshot_store::SnapshotStore;
use council_domain::PerformanceSummary;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotStore for JsonSnapshotStore {
    async fn load(&self) -> Option<PerformanceSummary> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("No analytics snapshot at {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("Ignoring unreadable analytics snapshot: {}", e);
                None
            }
        }
    }

    async fn save(&self, summary: &PerformanceSummary) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(summary).map_err(|e| StoreError::Corrupt {
            id: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        write_atomically(&self.path, &json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use council_domain::{Model, ModelStats};

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("analytics").join("summary.json"));
        assert!(store.load().await.is_none());

        let mut summary = PerformanceSummary::empty(Utc::now());
        summary.total_queries = 7;
        summary.model_stats.insert(
            Model::from("test/a"),
            ModelStats {
                total_evaluations: 7,
                wins: 3,
                win_rate: Some(0.429),
                ..Default::default()
            },
        );
        store.save(&summary).await.unwrap();

        assert_eq!(store.load().await, Some(summary));
    }

    #[tokio::test]
    async fn test_unreadable_snapshot_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(JsonSnapshotStore::new(path).load().await.is_none());
    }
}
