//! Strategy recommendation
//!
//! Combines the query's category (a fixed per-category preference order)
//! with historical feedback for each strategy:
//!
//! ```text
//! preference = 1.0 - 0.1 × position in the category's list
//! combined   = 0.7 × (avg_feedback + 1) / 2 + 0.3 × preference   (≥3 uses with feedback)
//!            = preference                                          (otherwise)
//! final      = combined × (0.5 + 0.5 × classification confidence)
//! ```

use crate::analytics::stats::{PerformanceSummary, StrategyStats};
use crate::classification::{QueryCategory, QueryClassifier};
use crate::core::string::round_to;
use crate::orchestration::strategy::StrategyKind;
use serde::{Deserialize, Serialize};

/// Uses needed before feedback influences the score.
const MIN_USES_FOR_FEEDBACK: usize = 3;

/// Uses needed for the larger confidence boost and the performance sentence.
const MIN_USES_FOR_STRONG: usize = 5;

const FALLBACK_COUNT: usize = 3;

/// Recommended strategy for a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub strategy: StrategyKind,
    pub confidence: f64,
    pub explanation: String,
    pub fallback_options: Vec<StrategyKind>,
    pub query_category: QueryCategory,
    /// History of the recommended strategy, when any exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<StrategyStats>,
}

/// Preference order of strategies for a category
pub fn category_preferences(category: QueryCategory) -> [StrategyKind; 4] {
    use StrategyKind::*;
    match category {
        QueryCategory::Reasoning => [ReasoningAware, MultiRound, WeightedVoting, Simple],
        QueryCategory::Technical => [MultiRound, WeightedVoting, ReasoningAware, Simple],
        QueryCategory::Analytical => [WeightedVoting, MultiRound, Simple, ReasoningAware],
        QueryCategory::Creative => [Simple, MultiRound, WeightedVoting, ReasoningAware],
        QueryCategory::Factual => [Simple, WeightedVoting, MultiRound, ReasoningAware],
    }
}

fn category_context(category: QueryCategory) -> &'static str {
    match category {
        QueryCategory::Reasoning => "This appears to be a logical or mathematical problem",
        QueryCategory::Technical => "This looks like a technical or programming question",
        QueryCategory::Analytical => "This seems to require comparative analysis or evaluation",
        QueryCategory::Creative => "This appears to be a creative or open-ended task",
        QueryCategory::Factual => "This looks like a factual information request",
    }
}

fn strategy_reason(strategy: StrategyKind) -> &'static str {
    match strategy {
        StrategyKind::ReasoningAware => {
            "handles complex logical reasoning with explicit step-by-step analysis"
        }
        StrategyKind::MultiRound => "allows iterative refinement through multiple deliberation rounds",
        StrategyKind::WeightedVoting => "leverages high-performing models with weighted influence",
        StrategyKind::Simple => "provides efficient consensus through direct peer ranking",
    }
}

/// Feedback average that counts, if the strategy has any
fn known_feedback(stats: Option<&StrategyStats>) -> Option<(usize, f64)> {
    stats.and_then(|s| s.avg_feedback.map(|fb| (s.count, fb)))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyRecommender {
    classifier: QueryClassifier,
}

impl StrategyRecommender {
    pub fn new(classifier: QueryClassifier) -> Self {
        Self { classifier }
    }

    /// Recommend a strategy; `history` is `None` when no analytics exist yet.
    pub fn recommend(&self, query: &str, history: Option<&PerformanceSummary>) -> Recommendation {
        let classification = self.classifier.classify(query);
        let stats_for = |kind: StrategyKind| history.and_then(|h| h.strategy(kind.as_str()));

        let ranked = score_strategies(
            category_preferences(classification.category),
            classification.confidence,
            stats_for,
        );

        let best = ranked.first().copied().unwrap_or(StrategyKind::Simple);
        let best_stats = stats_for(best);

        Recommendation {
            strategy: best,
            confidence: round_to(boost_confidence(classification.confidence, best_stats), 2),
            explanation: explain(classification.category, best, best_stats),
            fallback_options: ranked.iter().skip(1).take(FALLBACK_COUNT).copied().collect(),
            query_category: classification.category,
            performance: best_stats.cloned(),
        }
    }
}

/// Order strategies by dampened combined score, best first.
fn score_strategies<'a>(
    preferences: [StrategyKind; 4],
    confidence: f64,
    stats_for: impl Fn(StrategyKind) -> Option<&'a StrategyStats>,
) -> Vec<StrategyKind> {
    let mut scored: Vec<(StrategyKind, f64)> = preferences
        .iter()
        .enumerate()
        .map(|(idx, &kind)| {
            let preference = 1.0 - 0.1 * idx as f64;
            let combined = match known_feedback(stats_for(kind)) {
                Some((count, fb)) if count >= MIN_USES_FOR_FEEDBACK => {
                    0.7 * ((fb + 1.0) / 2.0) + 0.3 * preference
                }
                _ => preference,
            };
            (kind, combined * (0.5 + 0.5 * confidence))
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.into_iter().map(|(kind, _)| kind).collect()
}

fn boost_confidence(confidence: f64, stats: Option<&StrategyStats>) -> f64 {
    match known_feedback(stats) {
        Some((count, fb)) if count >= MIN_USES_FOR_STRONG && fb > 0.5 => {
            (confidence + 0.2).min(1.0)
        }
        Some((count, fb)) if count >= MIN_USES_FOR_FEEDBACK && fb > 0.0 => {
            (confidence + 0.1).min(1.0)
        }
        _ => confidence,
    }
}

fn explain(
    category: QueryCategory,
    strategy: StrategyKind,
    stats: Option<&StrategyStats>,
) -> String {
    let mut explanation = format!(
        "{}, so the **{}** strategy is recommended. This strategy {}.",
        category_context(category),
        strategy.title(),
        strategy_reason(strategy)
    );

    if let Some((count, fb)) =
        known_feedback(stats).filter(|(count, _)| *count >= MIN_USES_FOR_STRONG)
    {
        let quality = if fb > 0.5 {
            Some("strong")
        } else if fb > 0.0 {
            Some("decent")
        } else {
            None
        };
        if let Some(quality) = quality {
            explanation.push_str(&format!(
                " It has {} historical performance ({} uses, avg rating: {:.1}).",
                quality, count, fb
            ));
        }
    }

    explanation
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn history(entries: &[(StrategyKind, usize, Option<f64>)]) -> PerformanceSummary {
        let mut summary = PerformanceSummary::empty(Utc::now());
        for (kind, count, avg_feedback) in entries {
            summary.strategy_stats.insert(
                kind.as_str().to_string(),
                StrategyStats {
                    count: *count,
                    feedback_scores: Vec::new(),
                    avg_feedback: *avg_feedback,
                },
            );
        }
        summary
    }

    fn recommender() -> StrategyRecommender {
        StrategyRecommender::new(QueryClassifier::new())
    }

    #[test]
    fn test_no_matches_uses_factual_preferences() {
        let rec = recommender().recommend("hello there friend", None);
        assert_eq!(rec.query_category, QueryCategory::Factual);
        assert_eq!(rec.strategy, StrategyKind::Simple);
        assert_eq!(
            rec.fallback_options,
            vec![
                StrategyKind::WeightedVoting,
                StrategyKind::MultiRound,
                StrategyKind::ReasoningAware
            ]
        );
        assert_eq!(rec.confidence, 0.3);
        assert!(rec.performance.is_none());
    }

    #[test]
    fn test_dampening_preserves_preference_order() {
        // Uniform dampening never reorders when no feedback is known
        let ranked = score_strategies(
            category_preferences(QueryCategory::Technical),
            0.3,
            |_| None,
        );
        assert_eq!(ranked, category_preferences(QueryCategory::Technical).to_vec());
    }

    #[test]
    fn test_feedback_can_overtake_preference() {
        // Factual prefers simple, but weighted voting has a strong record
        let h = history(&[
            (StrategyKind::WeightedVoting, 6, Some(1.0)),
            (StrategyKind::Simple, 6, Some(-1.0)),
        ]);
        let rec = recommender().recommend("What is the capital of France?", Some(&h));
        assert_eq!(rec.query_category, QueryCategory::Factual);
        assert_eq!(rec.strategy, StrategyKind::WeightedVoting);
        assert_eq!(rec.fallback_options[0], StrategyKind::MultiRound);
        assert_eq!(rec.fallback_options.last(), Some(&StrategyKind::Simple));
        assert!(rec.explanation.contains("strong historical performance (6 uses, avg rating: 1.0)"));
    }

    #[test]
    fn test_feedback_ignored_below_three_uses() {
        let h = history(&[(StrategyKind::ReasoningAware, 2, Some(1.0))]);
        let rec = recommender().recommend("What is the capital of France?", Some(&h));
        assert_eq!(rec.strategy, StrategyKind::Simple);
    }

    #[test]
    fn test_confidence_boosts() {
        let strong = StrategyStats {
            count: 5,
            feedback_scores: Vec::new(),
            avg_feedback: Some(0.8),
        };
        assert!((boost_confidence(0.5, Some(&strong)) - 0.7).abs() < 1e-9);
        assert_eq!(boost_confidence(0.95, Some(&strong)), 1.0);

        let decent = StrategyStats {
            count: 3,
            avg_feedback: Some(0.2),
            ..strong.clone()
        };
        assert!((boost_confidence(0.5, Some(&decent)) - 0.6).abs() < 1e-9);

        let poor = StrategyStats {
            count: 10,
            avg_feedback: Some(-0.5),
            ..strong
        };
        assert_eq!(boost_confidence(0.5, Some(&poor)), 0.5);
        assert_eq!(boost_confidence(0.5, None), 0.5);
    }

    #[test]
    fn test_explanation_format() {
        let text = explain(QueryCategory::Technical, StrategyKind::MultiRound, None);
        assert_eq!(
            text,
            "This looks like a technical or programming question, so the **Multi Round** strategy \
             is recommended. This strategy allows iterative refinement through multiple deliberation rounds."
        );

        let decent = StrategyStats {
            count: 7,
            feedback_scores: Vec::new(),
            avg_feedback: Some(0.3),
        };
        let text = explain(QueryCategory::Technical, StrategyKind::MultiRound, Some(&decent));
        assert!(text.ends_with(" It has decent historical performance (7 uses, avg rating: 0.3)."));
    }
}
