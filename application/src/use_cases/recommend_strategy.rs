//! Recommend Strategy use case

use crate::analytics::AnalyticsService;
use council_domain::{QueryClassifier, Recommendation, StrategyRecommender};
use std::sync::Arc;
use tracing::warn;

/// Suggest a strategy for a query from its category and past performance
pub struct RecommendStrategyUseCase {
    recommender: StrategyRecommender,
    analytics: Option<Arc<AnalyticsService>>,
}

impl RecommendStrategyUseCase {
    pub fn new() -> Self {
        Self {
            recommender: StrategyRecommender::new(QueryClassifier::new()),
            analytics: None,
        }
    }

    pub fn with_analytics(mut self, analytics: Arc<AnalyticsService>) -> Self {
        self.analytics = Some(analytics);
        self
    }

    /// Recommendation for `query`; history is skipped when unavailable
    pub async fn execute(&self, query: &str) -> Recommendation {
        let history = match &self.analytics {
            Some(analytics) => analytics
                .summary()
                .await
                .inspect_err(|e| warn!("Recommending without history: {}", e))
                .ok(),
            None => None,
        };
        self.recommender.recommend(query, history.as_ref())
    }
}

impl Default for RecommendStrategyUseCase {
    fn default() -> Self {
        Self::new()
    }
}
