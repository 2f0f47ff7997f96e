//! Analytics snapshot port
//!
//! Durable copy of the last computed [`PerformanceSummary`].

use async_trait::async_trait;
use council_domain::PerformanceSummary;

use super::conversation_store::StoreError;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Last saved summary; `None` when absent or unreadable
    async fn load(&self) -> Option<PerformanceSummary>;

    async fn save(&self, summary: &PerformanceSummary) -> Result<(), StoreError>;
}
