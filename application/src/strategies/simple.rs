//! Simple ranking strategy
//!
//! Collect → Rank → Synthesize, with an unweighted aggregate.

use super::pipeline::{Pipeline, check_council};
use super::{RunContext, Strategy, StrategyError};
use crate::client::ResilientClient;
use async_trait::async_trait;
use council_domain::{
    CritiqueRecord, Model, PromptTemplate, Question, Stage1, StrategyKind, StrategyMetadata,
    StrategyResult, StrategyTunables, aggregate,
};
use tracing::info;

pub struct SimpleStrategy {
    client: ResilientClient,
}

impl SimpleStrategy {
    pub fn new(client: ResilientClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Strategy for SimpleStrategy {
    fn tunables(&self) -> StrategyTunables {
        StrategyTunables::Simple
    }

    async fn execute(
        &self,
        question: &Question,
        models: &[Model],
        chairman: &Model,
        ctx: RunContext<'_>,
    ) -> Result<StrategyResult, StrategyError> {
        check_council(models)?;
        info!("Running simple strategy with {} models", models.len());

        let pipeline = Pipeline::new(&self.client, ctx);
        let Some(round) = pipeline.first_round(question, models).await? else {
            return Ok(StrategyResult::all_models_failed(StrategyKind::Simple));
        };

        let scores = aggregate(round.critiques.iter().map(CritiqueRecord::ballot), &round.labels);

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
            metadata: StrategyMetadata::new(StrategyKind::Simple, round.labels, scores),
        })
    }
}
