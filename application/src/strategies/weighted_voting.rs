//! Weighted voting strategy
//!
//! Same stages as the simple strategy, but each critic's ballot counts in
//! proportion to its track record:
//!
//! | history of the critic | weight |
//! |-----------------------|--------|
//! | no analytics at all | 1.0 |
//! | fewer than 3 evaluations | 0.5 |
//! | otherwise, `use_win_rate` | max(win_rate, min_weight) |
//! | otherwise | max(1 / avg_rank, min_weight) |
//!
//! A configured `min_weight` of 0 is raised to a small positive floor so that
//! every critic keeps some say in the aggregate.

use super::pipeline::{Pipeline, check_council};
use super::{RunContext, Strategy, StrategyError};
use crate::client::ResilientClient;
use async_trait::async_trait;
use council_domain::ranking::NEUTRAL_WEIGHT;
use council_domain::{
    CritiqueRecord, Model, PerformanceSummary, PromptTemplate, Question, Stage1, StrategyExtras,
    StrategyKind, StrategyMetadata, StrategyResult, StrategyTunables, WeightedVotingConfig,
    aggregate_weighted,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Evaluations needed before a critic's history sets its weight
const MIN_EVALUATIONS: usize = 3;

/// Average rank assumed when a history has no rank samples
const FALLBACK_AVG_RANK: f64 = 3.0;

/// Lowest weight any critic can carry
const WEIGHT_FLOOR: f64 = 0.01;

/// Source of historical performance for critic weights
#[async_trait]
pub trait PerformanceSource: Send + Sync {
    /// Current summary; `None` when it cannot be produced
    async fn performance_summary(&self) -> Option<PerformanceSummary>;
}

pub struct WeightedVotingStrategy {
    client: ResilientClient,
    config: WeightedVotingConfig,
    performance: Option<Arc<dyn PerformanceSource>>,
}

impl WeightedVotingStrategy {
    pub fn new(
        client: ResilientClient,
        config: WeightedVotingConfig,
        performance: Option<Arc<dyn PerformanceSource>>,
    ) -> Self {
        Self {
            client,
            config,
            performance,
        }
    }

    async fn weights_for(&self, models: &[Model]) -> BTreeMap<Model, f64> {
        let summary = match &self.performance {
            Some(source) => {
                let summary = source.performance_summary().await;
                if summary.is_none() {
                    warn!("Performance history unavailable, using equal weights");
                }
                summary
            }
            None => None,
        };
        model_weights(models, summary.as_ref(), &self.config)
    }
}

/// Critic weights for a council given its history
pub fn model_weights(
    models: &[Model],
    history: Option<&PerformanceSummary>,
    config: &WeightedVotingConfig,
) -> BTreeMap<Model, f64> {
    let min_weight = config.min_weight.max(WEIGHT_FLOOR);
    models
        .iter()
        .map(|model| {
            let weight = match history {
                None => 1.0,
                Some(summary) => match summary.model(model) {
                    Some(stats) if stats.total_evaluations >= MIN_EVALUATIONS => {
                        if config.use_win_rate {
                            stats.win_rate.unwrap_or(0.0).max(min_weight)
                        } else {
                            let avg_rank = stats.avg_rank.unwrap_or(FALLBACK_AVG_RANK);
                            (1.0 / avg_rank).max(min_weight)
                        }
                    }
                    _ => NEUTRAL_WEIGHT,
                },
            };
            (model.clone(), weight)
        })
        .collect()
}

#[async_trait]
impl Strategy for WeightedVotingStrategy {
    fn tunables(&self) -> StrategyTunables {
        StrategyTunables::WeightedVoting(self.config)
    }

    async fn execute(
        &self,
        question: &Question,
        models: &[Model],
        chairman: &Model,
        ctx: RunContext<'_>,
    ) -> Result<StrategyResult, StrategyError> {
        check_council(models)?;
        info!("Running weighted-voting strategy with {} models", models.len());

        let pipeline = Pipeline::new(&self.client, ctx);
        let Some(round) = pipeline.first_round(question, models).await? else {
            return Ok(StrategyResult::all_models_failed(StrategyKind::WeightedVoting));
        };

        let weights = self.weights_for(models).await;
        debug!("Critic weights: {:?}", weights);
        let lookup: HashMap<Model, f64> = weights.iter().map(|(m, w)| (m.clone(), *w)).collect();
        let scores = aggregate_weighted(
            round.critiques.iter().map(CritiqueRecord::ballot),
            &round.labels,
            &lookup,
        );

        let prompt = PromptTemplate::synthesis_prompt(
            question.content(),
            &round.responses,
            &round.critiques,
        );
        let stage3 = pipeline.synthesize(chairman, &prompt).await?;

        Ok(StrategyResult {
            stage1: Stage1::Responses(round.responses),
            stage2: round.critiques,
            stage3,
            metadata: StrategyMetadata::new(StrategyKind::WeightedVoting, round.labels, scores)
                .with_extras(StrategyExtras::WeightedVoting {
                    model_weights: weights,
                }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::test_support::{ScriptedGateway, council_responder};
    use chrono::Utc;
    use council_domain::{Ballot, Label, LabelMap, ModelStats};
    use std::time::Duration;

    fn stats(total_evaluations: usize, win_rate: f64, avg_rank: f64) -> ModelStats {
        ModelStats {
            total_evaluations,
            win_rate: Some(win_rate),
            avg_rank: Some(avg_rank),
            ..Default::default()
        }
    }

    fn history(entries: &[(&str, ModelStats)]) -> PerformanceSummary {
        let mut summary = PerformanceSummary::empty(Utc::now());
        for (model, s) in entries {
            summary.model_stats.insert(Model::from(*model), s.clone());
        }
        summary
    }

    struct FixedHistory(Option<PerformanceSummary>);

    #[async_trait]
    impl PerformanceSource for FixedHistory {
        async fn performance_summary(&self) -> Option<PerformanceSummary> {
            self.0.clone()
        }
    }

    fn models() -> Vec<Model> {
        vec![
            Model::from("test/a"),
            Model::from("test/b"),
            Model::from("test/c"),
        ]
    }

    #[test]
    fn test_weights_without_analytics_are_equal() {
        let weights = model_weights(&models(), None, &WeightedVotingConfig::default());
        assert!(weights.values().all(|w| *w == 1.0));
    }

    #[test]
    fn test_weights_from_history() {
        let h = history(&[
            ("test/a", stats(10, 0.6, 1.5)),
            ("test/b", stats(10, 0.0, 4.0)),
            ("test/c", stats(2, 1.0, 1.0)),
        ]);
        let config = WeightedVotingConfig::default();
        let weights = model_weights(&models(), Some(&h), &config);
        assert_eq!(weights[&Model::from("test/a")], 0.6);
        assert_eq!(weights[&Model::from("test/b")], 0.1);
        assert_eq!(weights[&Model::from("test/c")], 0.5);

        let by_rank = WeightedVotingConfig {
            use_win_rate: false,
            ..config
        };
        let weights = model_weights(&models(), Some(&h), &by_rank);
        assert_eq!(weights[&Model::from("test/b")], 0.25);
    }

    #[test]
    fn test_zero_min_weight_keeps_every_critic_positive() {
        let h = history(&[
            ("test/a", stats(10, 1.0, 1.0)),
            ("test/b", stats(10, 0.0, 4.0)),
        ]);
        let config = WeightedVotingConfig {
            min_weight: 0.0,
            ..WeightedVotingConfig::default()
        };
        let weights = model_weights(&models(), Some(&h), &config);
        assert_eq!(weights[&Model::from("test/b")], WEIGHT_FLOOR);
        assert!(weights.values().all(|w| *w > 0.0));

        let labels = LabelMap::assign([&Model::from("test/a"), &Model::from("test/b")]).unwrap();
        let order = vec![
            Label::from_letter('B').unwrap(),
            Label::from_letter('A').unwrap(),
        ];
        let critic = Model::from("test/b");
        let table: HashMap<Model, f64> = weights.into_iter().collect();
        let scores = aggregate_weighted([Ballot::new(&critic, &order)], &labels, &table);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].model.as_str(), "test/b");
    }

    #[tokio::test]
    async fn test_reliable_critic_outweighs_others() {
        // Unweighted, A would win with mean (3 + 1 + 1) / 3
        let gateway = ScriptedGateway::new().with_responder(council_responder(&[
            ("test/a", "CBA"),
            ("test/b", "ABC"),
            ("test/c", "ABC"),
        ]));
        let policy = RetryPolicy::default().with_base_delay(Duration::ZERO);
        let source: Arc<dyn PerformanceSource> = Arc::new(FixedHistory(Some(history(&[
            ("test/a", stats(20, 1.0, 1.0)),
            ("test/c", stats(20, 0.0, 3.5)),
        ]))));
        let strategy = WeightedVotingStrategy::new(
            ResilientClient::new(Arc::new(gateway), policy),
            WeightedVotingConfig::default(),
            Some(source),
        );

        let result = strategy
            .execute_simple(
                &Question::try_new("Compare the options").unwrap(),
                &models(),
                &Model::from("test/chair"),
            )
            .await
            .unwrap();

        // weights a = 1.0, b = 0.5 (no history), c = 0.1 (floor)
        let ranked: Vec<(&str, f64)> = result
            .metadata
            .aggregate
            .iter()
            .map(|s| (s.model.as_str(), s.mean_rank))
            .collect();
        assert_eq!(
            ranked,
            vec![("test/c", 1.75), ("test/b", 2.0), ("test/a", 2.25)]
        );
        assert_eq!(result.metadata.aggregate[0].total_weight, Some(1.6));

        let StrategyExtras::WeightedVoting { model_weights } = &result.metadata.extras else {
            panic!("expected weighted-voting extras");
        };
        assert_eq!(model_weights[&Model::from("test/a")], 1.0);
        assert_eq!(model_weights[&Model::from("test/b")], 0.5);
        assert_eq!(model_weights[&Model::from("test/c")], 0.1);
    }

    #[tokio::test]
    async fn test_unavailable_history_falls_back_to_equal_weights() {
        let gateway = ScriptedGateway::new().with_responder(council_responder(&[]));
        let policy = RetryPolicy::default().with_base_delay(Duration::ZERO);
        let strategy = WeightedVotingStrategy::new(
            ResilientClient::new(Arc::new(gateway), policy),
            WeightedVotingConfig::default(),
            Some(Arc::new(FixedHistory(None))),
        );

        let result = strategy
            .execute_simple(
                &Question::try_new("Anything").unwrap(),
                &models(),
                &Model::from("test/chair"),
            )
            .await
            .unwrap();
        let StrategyExtras::WeightedVoting { model_weights } = &result.metadata.extras else {
            panic!("expected weighted-voting extras");
        };
        assert!(model_weights.values().all(|w| *w == 1.0));
    }
}
