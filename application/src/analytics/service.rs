//! Analytics service
//!
//! Read chain for [`AnalyticsService::summary`]:
//!
//! 1. the in-memory summary, while younger than the TTL
//! 2. the saved snapshot, while its `last_computed_at` is within the TTL
//! 3. a full scan of the conversation store, which refreshes both tiers
//!
//! [`AnalyticsService::invalidate`] drops the memory tier and makes the next
//! read skip the snapshot, so fresh feedback is always picked up.

use crate::ports::conversation_store::{ConversationStore, StoreError};
use crate::ports::snapshot_store::SnapshotStore;
use crate::strategies::PerformanceSource;
use async_trait::async_trait;
use chrono::Utc;
use council_domain::{
    LeaderboardEntry, Model, ModelStats, PerformanceAccumulator, PerformanceSummary,
    StrategyStats,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Default lifetime of a cached summary
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Failed to scan conversation history: {0}")]
    Store(#[from] StoreError),
}

struct CachedSummary {
    summary: PerformanceSummary,
    cached_at: Instant,
}

/// Per-model and per-strategy statistics with caching
pub struct AnalyticsService {
    conversations: Arc<dyn ConversationStore>,
    snapshots: Arc<dyn SnapshotStore>,
    ttl: Duration,
    cache: RwLock<Option<CachedSummary>>,
    snapshot_stale: AtomicBool,
}

impl AnalyticsService {
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            conversations,
            snapshots,
            ttl: DEFAULT_CACHE_TTL,
            cache: RwLock::new(None),
            snapshot_stale: AtomicBool::new(false),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Full summary through the cache
    pub async fn summary(&self) -> Result<PerformanceSummary, AnalyticsError> {
        if let Some(cached) = self.cache.read().await.as_ref()
            && cached.cached_at.elapsed() < self.ttl
        {
            debug!("Analytics served from memory");
            return Ok(cached.summary.clone());
        }

        if !self.snapshot_stale.load(Ordering::Acquire)
            && let Some(snapshot) = self.snapshots.load().await
            && self.is_fresh(&snapshot)
        {
            debug!("Analytics served from snapshot");
            self.remember(snapshot.clone()).await;
            return Ok(snapshot);
        }

        self.recompute().await
    }

    /// Scan every stored conversation, bypassing both cache tiers
    pub async fn recompute(&self) -> Result<PerformanceSummary, AnalyticsError> {
        let (conversations, unreadable) = self.conversations.load_all().await?;
        if unreadable > 0 {
            warn!("Skipped {} unreadable conversation(s)", unreadable);
        }

        let mut accumulator = PerformanceAccumulator::new();
        for conversation in &conversations {
            accumulator.add_conversation(conversation);
        }
        for _ in 0..unreadable {
            accumulator.add_unreadable();
        }
        let summary = accumulator.finish(Utc::now());
        info!(
            "Analytics recomputed: {} conversations, {} queries",
            summary.total_conversations, summary.total_queries
        );

        match self.snapshots.save(&summary).await {
            Ok(()) => self.snapshot_stale.store(false, Ordering::Release),
            Err(e) => warn!("Failed to save analytics snapshot: {}", e),
        }
        self.remember(summary.clone()).await;
        Ok(summary)
    }

    /// Forget the cached summary; the next read rescans the history
    pub async fn invalidate(&self) {
        self.snapshot_stale.store(true, Ordering::Release);
        *self.cache.write().await = None;
        debug!("Analytics cache invalidated");
    }

    pub async fn model_performance(
        &self,
        model: &Model,
    ) -> Result<Option<ModelStats>, AnalyticsError> {
        Ok(self.summary().await?.model(model).cloned())
    }

    pub async fn strategy_performance(
        &self,
        strategy: &str,
    ) -> Result<Option<StrategyStats>, AnalyticsError> {
        Ok(self.summary().await?.strategy(strategy).cloned())
    }

    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, AnalyticsError> {
        Ok(self.summary().await?.leaderboard(limit))
    }

    /// Strategy with the best average feedback so far
    pub async fn best_strategy(&self) -> Result<String, AnalyticsError> {
        Ok(self.summary().await?.best_strategy().to_string())
    }

    fn is_fresh(&self, snapshot: &PerformanceSummary) -> bool {
        (Utc::now() - snapshot.last_computed_at)
            .to_std()
            .is_ok_and(|age| age < self.ttl)
    }

    async fn remember(&self, summary: PerformanceSummary) {
        *self.cache.write().await = Some(CachedSummary {
            summary,
            cached_at: Instant::now(),
        });
    }
}

#[async_trait]
impl PerformanceSource for AnalyticsService {
    async fn performance_summary(&self) -> Option<PerformanceSummary> {
        match self.summary().await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("Analytics unavailable: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryConversations, MemorySnapshots, answered_conversation};
    use chrono::Duration as ChronoDuration;
    use council_domain::{Feedback, StrategyKind};

    fn service(
        conversations: Arc<MemoryConversations>,
        snapshots: Arc<MemorySnapshots>,
    ) -> AnalyticsService {
        AnalyticsService::new(conversations, snapshots)
    }

    #[tokio::test]
    async fn test_recompute_scans_history_and_saves_snapshot() {
        let conversations = Arc::new(MemoryConversations::default());
        conversations.insert(answered_conversation(
            "c1",
            StrategyKind::Simple,
            &["test/a", "test/b"],
            Some(Feedback::Like),
        ));
        conversations.insert(answered_conversation(
            "c2",
            StrategyKind::MultiRound,
            &["test/b", "test/a"],
            None,
        ));
        let snapshots = Arc::new(MemorySnapshots::default());
        let analytics = service(conversations, snapshots.clone());

        let summary = analytics.summary().await.unwrap();
        assert_eq!(summary.total_conversations, 2);
        assert_eq!(summary.total_queries, 2);
        assert_eq!(snapshots.saves(), 1);

        let a = analytics
            .model_performance(&Model::from("test/a"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(a.wins, 1);
        assert_eq!(a.win_rate, Some(0.5));
        assert_eq!(analytics.best_strategy().await.unwrap(), "simple");
        assert!(
            analytics
                .strategy_performance("weighted_voting")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_memory_tier_serves_repeated_reads() {
        let conversations = Arc::new(MemoryConversations::default());
        let analytics = service(conversations.clone(), Arc::new(MemorySnapshots::default()));

        analytics.summary().await.unwrap();
        analytics.leaderboard(10).await.unwrap();
        analytics.summary().await.unwrap();
        assert_eq!(conversations.scans(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_tier_expires() {
        let conversations = Arc::new(MemoryConversations::default());
        let snapshots = Arc::new(MemorySnapshots::default());
        let analytics = service(conversations.clone(), snapshots.clone())
            .with_ttl(Duration::from_secs(60));

        analytics.summary().await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        snapshots.clear();
        analytics.summary().await.unwrap();
        assert_eq!(conversations.scans(), 2);
    }

    #[tokio::test]
    async fn test_fresh_snapshot_avoids_scan() {
        let conversations = Arc::new(MemoryConversations::default());
        let mut snapshot = PerformanceSummary::empty(Utc::now());
        snapshot.total_queries = 42;
        let snapshots = Arc::new(MemorySnapshots::with(snapshot));
        let analytics = service(conversations.clone(), snapshots);

        assert_eq!(analytics.summary().await.unwrap().total_queries, 42);
        assert_eq!(conversations.scans(), 0);
    }

    #[tokio::test]
    async fn test_stale_snapshot_is_recomputed() {
        let conversations = Arc::new(MemoryConversations::default());
        let mut snapshot = PerformanceSummary::empty(Utc::now() - ChronoDuration::hours(1));
        snapshot.total_queries = 42;
        let analytics = service(conversations.clone(), Arc::new(MemorySnapshots::with(snapshot)));

        assert_eq!(analytics.summary().await.unwrap().total_queries, 0);
        assert_eq!(conversations.scans(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_rescan() {
        let conversations = Arc::new(MemoryConversations::default());
        let snapshots = Arc::new(MemorySnapshots::default());
        let analytics = service(conversations.clone(), snapshots);

        assert_eq!(analytics.summary().await.unwrap().total_queries, 0);
        conversations.insert(answered_conversation(
            "c1",
            StrategyKind::Simple,
            &["test/a"],
            Some(Feedback::Dislike),
        ));
        analytics.invalidate().await;

        let summary = analytics.summary().await.unwrap();
        assert_eq!(summary.total_queries, 1);
        assert_eq!(summary.strategy("simple").unwrap().avg_feedback, Some(-1.0));
        assert_eq!(conversations.scans(), 2);
    }

    #[tokio::test]
    async fn test_unreadable_conversations_are_counted() {
        let conversations = Arc::new(MemoryConversations::default());
        conversations.set_unreadable(2);
        let analytics = service(conversations, Arc::new(MemorySnapshots::default()));

        let summary = analytics.recompute().await.unwrap();
        assert_eq!(summary.total_conversations, 2);
        assert_eq!(summary.total_queries, 0);
    }

    #[tokio::test]
    async fn test_snapshot_failure_still_returns_summary() {
        let snapshots = Arc::new(MemorySnapshots::default());
        snapshots.fail_saves();
        let analytics = service(Arc::new(MemoryConversations::default()), snapshots);

        assert!(analytics.summary().await.is_ok());
        assert!(analytics.performance_summary().await.is_some());
    }
}
