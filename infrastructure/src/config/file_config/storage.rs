//! Storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Root of all persisted data
    pub data_dir: PathBuf,
    /// How long a computed analytics summary is reused
    pub analytics_ttl_seconds: u64,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            analytics_ttl_seconds: 300,
        }
    }
}

impl FileStorageConfig {
    pub fn conversations_dir(&self) -> PathBuf {
        self.data_dir.join("conversations")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("analytics").join("summary.json")
    }

    pub fn analytics_ttl(&self) -> Duration {
        Duration::from_secs(self.analytics_ttl_seconds)
    }
}
