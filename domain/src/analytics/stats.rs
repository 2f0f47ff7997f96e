//! Performance statistics records
//!
//! These are the finalized, serializable outputs of a history scan. Derived
//! averages stay `None` until at least one sample exists.

use crate::core::model::Model;
use crate::core::string::round_to;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strategy key used for answers with no recorded strategy.
pub const UNKNOWN_STRATEGY: &str = "unknown";

/// Usage and feedback of one strategy
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrategyStats {
    pub count: usize,
    #[serde(default)]
    pub feedback_scores: Vec<i64>,
    /// Mean feedback, 2 decimals
    #[serde(default)]
    pub avg_feedback: Option<f64>,
}

/// One model's record under one strategy
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrategyBreakdown {
    pub evaluations: usize,
    pub wins: usize,
    #[serde(default)]
    pub positions: Vec<f64>,
    #[serde(default)]
    pub avg_rank: Option<f64>,
    #[serde(default)]
    pub win_rate: Option<f64>,
}

/// Ranking record of one model across all stored answers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelStats {
    pub total_evaluations: usize,
    /// Times placed first in an aggregate
    pub wins: usize,
    /// Times placed in the top three
    pub top_3: usize,
    /// Recorded mean ranks, one per evaluation
    #[serde(default)]
    pub positions: Vec<f64>,
    #[serde(default)]
    pub avg_rank: Option<f64>,
    /// 3 decimals
    #[serde(default)]
    pub win_rate: Option<f64>,
    #[serde(default)]
    pub by_strategy: BTreeMap<String, StrategyBreakdown>,
}

impl ModelStats {
    /// Share of evaluations spent in the top three, 3 decimals
    pub fn top_3_rate(&self) -> f64 {
        if self.total_evaluations == 0 {
            0.0
        } else {
            round_to(self.top_3 as f64 / self.total_evaluations as f64, 3)
        }
    }
}

/// Everything known about past council runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_conversations: usize,
    pub total_queries: usize,
    pub last_computed_at: DateTime<Utc>,
    #[serde(default)]
    pub strategy_stats: BTreeMap<String, StrategyStats>,
    #[serde(default)]
    pub model_stats: BTreeMap<Model, ModelStats>,
}

impl PerformanceSummary {
    pub fn empty(at: DateTime<Utc>) -> Self {
        Self {
            total_conversations: 0,
            total_queries: 0,
            last_computed_at: at,
            strategy_stats: BTreeMap::new(),
            model_stats: BTreeMap::new(),
        }
    }

    pub fn model(&self, model: &Model) -> Option<&ModelStats> {
        self.model_stats.get(model)
    }

    pub fn strategy(&self, strategy: &str) -> Option<&StrategyStats> {
        self.strategy_stats.get(strategy)
    }

    /// Top `limit` models by win rate, then by evaluation count
    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = self
            .model_stats
            .iter()
            .map(|(model, stats)| LeaderboardEntry {
                model: model.clone(),
                win_rate: stats.win_rate.unwrap_or(0.0),
                wins: stats.wins,
                total_evaluations: stats.total_evaluations,
                avg_rank: stats.avg_rank,
                top_3_rate: stats.top_3_rate(),
            })
            .collect();

        entries.sort_by(|a, b| {
            b.win_rate
                .total_cmp(&a.win_rate)
                .then_with(|| b.total_evaluations.cmp(&a.total_evaluations))
        });
        entries.truncate(limit);
        entries
    }

    /// Strategy with the highest average feedback (`simple` without data)
    pub fn best_strategy(&self) -> &str {
        self.strategy_stats
            .iter()
            .filter_map(|(name, stats)| stats.avg_feedback.map(|fb| (name.as_str(), fb)))
            .fold(None, |best: Option<(&str, f64)>, (name, fb)| match best {
                Some((_, best_fb)) if best_fb >= fb => best,
                _ => Some((name, fb)),
            })
            .map(|(name, _)| name)
            .unwrap_or("simple")
    }
}

/// One row of the model leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub model: Model,
    pub win_rate: f64,
    pub wins: usize,
    pub total_evaluations: usize,
    pub avg_rank: Option<f64>,
    pub top_3_rate: f64,
}
