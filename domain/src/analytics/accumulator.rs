//! History scan producing a [`PerformanceSummary`].
//!
//! The accumulator is fed one conversation at a time and keeps plain running
//! tallies; [`PerformanceAccumulator::finish`] derives the averages and rates
//! once at the end.

use super::stats::{
    ModelStats, PerformanceSummary, StrategyBreakdown, StrategyStats, UNKNOWN_STRATEGY,
};
use crate::conversation::entities::Conversation;
use crate::core::model::Model;
use crate::core::string::round_to;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct PerformanceAccumulator {
    conversations: usize,
    queries: usize,
    strategies: BTreeMap<String, StrategyStats>,
    models: BTreeMap<Model, ModelStats>,
}

impl PerformanceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally every assistant message of one conversation.
    pub fn add_conversation(&mut self, conversation: &Conversation) {
        self.conversations += 1;

        for message in conversation.assistant_messages() {
            self.queries += 1;

            let strategy = message
                .strategy()
                .map(|s| s.as_str())
                .unwrap_or(UNKNOWN_STRATEGY);

            let strategy_stats = self.strategies.entry(strategy.to_string()).or_default();
            strategy_stats.count += 1;
            if let Some(feedback) = message.feedback {
                strategy_stats.feedback_scores.push(feedback.score());
            }

            let Some(metadata) = &message.metadata else {
                continue;
            };

            for (idx, score) in metadata.aggregate.iter().enumerate() {
                let position = idx + 1;
                let stats = self.models.entry(score.model.clone()).or_default();
                let breakdown = stats.by_strategy.entry(strategy.to_string()).or_default();

                stats.total_evaluations += 1;
                stats.positions.push(score.mean_rank);
                breakdown.evaluations += 1;
                breakdown.positions.push(score.mean_rank);

                if position == 1 {
                    stats.wins += 1;
                    breakdown.wins += 1;
                }
                if position <= 3 {
                    stats.top_3 += 1;
                }
            }
        }
    }

    /// Count a conversation that could not be loaded.
    pub fn add_unreadable(&mut self) {
        self.conversations += 1;
    }

    pub fn finish(self, at: DateTime<Utc>) -> PerformanceSummary {
        let strategy_stats = self
            .strategies
            .into_iter()
            .map(|(name, mut stats)| {
                stats.avg_feedback = mean(stats.feedback_scores.iter().map(|s| *s as f64))
                    .map(|m| round_to(m, 2));
                (name, stats)
            })
            .collect();

        let model_stats = self
            .models
            .into_iter()
            .map(|(model, mut stats)| {
                stats.avg_rank = mean(stats.positions.iter().copied()).map(|m| round_to(m, 2));
                stats.win_rate = rate(stats.wins, stats.total_evaluations);
                for breakdown in stats.by_strategy.values_mut() {
                    breakdown.avg_rank =
                        mean(breakdown.positions.iter().copied()).map(|m| round_to(m, 2));
                    breakdown.win_rate = rate(breakdown.wins, breakdown.evaluations);
                }
                (model, stats)
            })
            .collect();

        PerformanceSummary {
            total_conversations: self.conversations,
            total_queries: self.queries,
            last_computed_at: at,
            strategy_stats,
            model_stats,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn rate(hits: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| round_to(hits as f64 / total as f64, 3))
}
