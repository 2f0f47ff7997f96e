//! File-backed stores
//!
//! - [`JsonConversationStore`]: one JSON document per conversation
//! - [`JsonSnapshotStore`]: the last computed analytics summary

mod json_conversation_store;
mod json_snapshot_store;

pub use json_conversation_store::JsonConversationStore;
pub use json_snapshot_store::JsonSnapshotStore;

use std::path::Path;

/// Replace `path` with `bytes` via a sibling temporary file
async fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await
}
