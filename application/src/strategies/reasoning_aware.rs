//! Reasoning-aware strategy
//!
//! When any member returns a reasoning trace, critics rank the answers twice
//! (once on reasoning quality, once on answer quality) and both orderings are
//! kept side by side per critic. The aggregate comes from the reasoning pass;
//! the two passes are never blended numerically. Without traces this reduces
//! to a single answer-quality pass.

use super::pipeline::{Pipeline, anonymize, check_council, labelled};
use super::{RunContext, Strategy, StrategyError};
use crate::client::ResilientClient;
use async_trait::async_trait;
use council_domain::{
    CritiqueRecord, DualOrder, Model, ModelResponse, ParseTier, PromptTemplate, Question,
    ReasoningAwareConfig, Stage, Stage1, StrategyExtras, StrategyKind, StrategyMetadata,
    StrategyResult, StrategyTunables, aggregate,
};
use tracing::{debug, info};

const NO_EVALUATION: &str = "(no evaluation returned)";

pub struct ReasoningAwareStrategy {
    client: ResilientClient,
    config: ReasoningAwareConfig,
}

impl ReasoningAwareStrategy {
    pub fn new(client: ResilientClient, config: ReasoningAwareConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Strategy for ReasoningAwareStrategy {
    fn tunables(&self) -> StrategyTunables {
        StrategyTunables::ReasoningAware(self.config)
    }

    async fn execute(
        &self,
        question: &Question,
        models: &[Model],
        chairman: &Model,
        ctx: RunContext<'_>,
    ) -> Result<StrategyResult, StrategyError> {
        check_council(models)?;
        info!("Running reasoning-aware strategy with {} models", models.len());

        let pipeline = Pipeline::new(&self.client, ctx);
        let responses = pipeline
            .collect(Stage::Collect, models, question.content())
            .await?;
        if responses.is_empty() {
            return Ok(StrategyResult::all_models_failed(StrategyKind::ReasoningAware));
        }

        let labels = anonymize(&responses)?;
        let has_reasoning = responses.iter().any(ModelResponse::has_reasoning);
        let answer_prompt = PromptTemplate::answer_ranking_prompt(
            question.content(),
            &labelled(&labels, &responses),
        );

        let (critiques, reasoning_critiques) = if has_reasoning {
            let traced: Vec<_> = labels
                .iter()
                .zip(&responses)
                .map(|((label, _), r)| (label, r.reasoning_text(), r.content.as_str()))
                .collect();
            let reasoning_prompt =
                PromptTemplate::reasoning_ranking_prompt(question.content(), &traced);

            let (reasoning, answers) = pipeline
                .rank_twice(models, &reasoning_prompt, &answer_prompt)
                .await?;
            (pair_by_critic(models, &reasoning, &answers), reasoning)
        } else {
            debug!("No reasoning traces, ranking answers only");
            (pipeline.rank(models, &answer_prompt).await?, Vec::new())
        };

        let scores = aggregate(critiques.iter().map(CritiqueRecord::ballot), &labels);

        let prompt = PromptTemplate::reasoning_synthesis_prompt(
            question.content(),
            &responses,
            &critiques,
            has_reasoning,
        );
        let stage3 = pipeline.synthesize(chairman, &prompt).await?;

        let extras = StrategyExtras::ReasoningAware {
            reasoning_weight: self.config.reasoning_weight,
            answer_weight: self.config.answer_weight,
            has_reasoning,
            reasoning_critiques,
        };

        Ok(StrategyResult {
            stage1: Stage1::Responses(responses),
            stage2: critiques,
            stage3,
            metadata: StrategyMetadata::new(StrategyKind::ReasoningAware, labels, scores)
                .with_extras(extras),
        })
    }
}

/// Merge the two passes into one critique per critic, in council order.
///
/// The reasoning ordering drives aggregation; a critic missing from the
/// reasoning pass contributes no ballot.
fn pair_by_critic(
    critics: &[Model],
    reasoning: &[CritiqueRecord],
    answers: &[CritiqueRecord],
) -> Vec<CritiqueRecord> {
    critics
        .iter()
        .filter_map(|critic| {
            let r = reasoning.iter().find(|c| &c.critic == critic);
            let a = answers.iter().find(|c| &c.critic == critic);
            if r.is_none() && a.is_none() {
                return None;
            }

            let raw_text = format!(
                "REASONING EVALUATION:\n{}\n\nANSWER EVALUATION:\n{}",
                r.map_or(NO_EVALUATION, |c| c.raw_text.as_str()),
                a.map_or(NO_EVALUATION, |c| c.raw_text.as_str())
            );
            let reasoning_order = r.map(|c| c.parsed_order.clone()).unwrap_or_default();

            Some(CritiqueRecord {
                critic: critic.clone(),
                raw_text,
                parsed_order: reasoning_order.clone(),
                parse_tier: r.map_or(ParseTier::Empty, |c| c.parse_tier),
                dual: Some(DualOrder {
                    reasoning_order,
                    answer_order: a.map(|c| c.parsed_order.clone()).unwrap_or_default(),
                }),
            })
        })
        .collect()
}
