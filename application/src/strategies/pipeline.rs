//! Stage steps shared by every strategy.

use super::{RunContext, StrategyError};
use crate::client::ResilientClient;
use crate::ports::llm_gateway::ModelReply;
use council_domain::ranking::label::MAX_LABELS;
use council_domain::{
    ChatMessage, CritiqueRecord, DomainError, FinalAnswer, Label, LabelMap, Model, ModelResponse,
    PromptTemplate, Question, Stage, parse_ranking,
};
use tracing::{info, warn};

/// Answers of one collection stage with their labels and critiques
pub(super) struct RankedRound {
    pub responses: Vec<ModelResponse>,
    pub labels: LabelMap,
    pub critiques: Vec<CritiqueRecord>,
}

/// One strategy run's access to the client, progress and cancellation
pub(super) struct Pipeline<'a> {
    client: &'a ResilientClient,
    ctx: RunContext<'a>,
}

impl<'a> Pipeline<'a> {
    pub(super) fn new(client: &'a ResilientClient, ctx: RunContext<'a>) -> Self {
        Self { client, ctx }
    }

    /// Ask every model `prompt`; successful answers in request order
    pub(super) async fn collect(
        &self,
        stage: Stage,
        models: &[Model],
        prompt: &str,
    ) -> Result<Vec<ModelResponse>, StrategyError> {
        info!("Stage {}: {}", stage.number(), stage.display_name());
        self.ctx.progress.on_stage_start(&stage, models.len());

        let replies = self.call(stage, models, prompt).await?;
        let responses: Vec<ModelResponse> = replies
            .into_iter()
            .map(|(model, reply)| {
                ModelResponse::new(model, reply.content).with_reasoning(reply.reasoning)
            })
            .collect();

        info!("{}/{} models responded", responses.len(), models.len());
        self.ctx.progress.on_stage_complete(&stage);
        Ok(responses)
    }

    /// Collect → Rank with the plain ranking prompt.
    ///
    /// `None` when no council member answered.
    pub(super) async fn first_round(
        &self,
        question: &Question,
        models: &[Model],
    ) -> Result<Option<RankedRound>, StrategyError> {
        let responses = self.collect(Stage::Collect, models, question.content()).await?;
        if responses.is_empty() {
            warn!("All {} models failed to respond", models.len());
            return Ok(None);
        }

        let labels = anonymize(&responses)?;
        let prompt =
            PromptTemplate::ranking_prompt(question.content(), &labelled(&labels, &responses));
        let critiques = self.rank(models, &prompt).await?;

        Ok(Some(RankedRound {
            responses,
            labels,
            critiques,
        }))
    }

    /// One ranking pass over anonymized answers
    pub(super) async fn rank(
        &self,
        critics: &[Model],
        prompt: &str,
    ) -> Result<Vec<CritiqueRecord>, StrategyError> {
        let stage = Stage::Rank;
        info!("Stage {}: {}", stage.number(), stage.display_name());
        self.ctx.progress.on_stage_start(&stage, critics.len());
        let critiques = self.rank_pass(critics, prompt).await?;
        self.ctx.progress.on_stage_complete(&stage);
        Ok(critiques)
    }

    /// Two ranking passes over the same answers, run concurrently
    pub(super) async fn rank_twice(
        &self,
        critics: &[Model],
        first_prompt: &str,
        second_prompt: &str,
    ) -> Result<(Vec<CritiqueRecord>, Vec<CritiqueRecord>), StrategyError> {
        let stage = Stage::Rank;
        info!("Stage {}: {} (two passes)", stage.number(), stage.display_name());
        self.ctx.progress.on_stage_start(&stage, critics.len() * 2);
        let passes = tokio::try_join!(
            self.rank_pass(critics, first_prompt),
            self.rank_pass(critics, second_prompt)
        )?;
        self.ctx.progress.on_stage_complete(&stage);
        Ok(passes)
    }

    /// Ranking pass without stage start/complete events
    pub(super) async fn rank_pass(
        &self,
        critics: &[Model],
        prompt: &str,
    ) -> Result<Vec<CritiqueRecord>, StrategyError> {
        let replies = self.call(Stage::Rank, critics, prompt).await?;
        Ok(replies
            .into_iter()
            .map(|(critic, reply)| {
                let parsed = parse_ranking(&reply.content);
                if parsed.tier.is_degraded() {
                    warn!(
                        "Ranking from {} parsed with fallback ({}): {}",
                        critic,
                        parsed.tier,
                        parsed.letters()
                    );
                }
                CritiqueRecord::new(critic, reply.content, parsed)
            })
            .collect())
    }

    /// Chairman synthesis; never fails on a backend error
    pub(super) async fn synthesize(
        &self,
        chairman: &Model,
        prompt: &str,
    ) -> Result<FinalAnswer, StrategyError> {
        let stage = Stage::Synthesize;
        info!("Stage {}: {}", stage.number(), stage.display_name());
        self.ctx.progress.on_stage_start(&stage, 1);

        let reply = self
            .call(stage, std::slice::from_ref(chairman), prompt)
            .await?
            .into_iter()
            .next();

        self.ctx.progress.on_stage_complete(&stage);
        Ok(match reply {
            Some((_, reply)) => FinalAnswer::new(chairman, reply.content),
            None => {
                warn!("Chairman {} failed to synthesize", chairman);
                FinalAnswer::synthesis_failed(chairman)
            }
        })
    }

    /// Run `prompt` against every model, keeping only the answers
    pub(super) async fn call(
        &self,
        stage: Stage,
        models: &[Model],
        prompt: &str,
    ) -> Result<Vec<(Model, ModelReply)>, StrategyError> {
        self.ctx.ensure_active()?;

        let messages = vec![ChatMessage::user(prompt)];
        let requests = models.iter().map(|m| (m.clone(), messages.clone())).collect();
        let replies = self
            .client
            .query_batch(requests, Some((&stage, self.ctx.progress)), self.ctx.cancel)
            .await?;

        Ok(replies
            .into_iter()
            .filter_map(|(model, reply)| reply.map(|r| (model, r)))
            .collect())
    }
}

/// Reject a council that cannot be run before any call is made
pub(super) fn check_council(models: &[Model]) -> Result<(), DomainError> {
    if models.is_empty() {
        return Err(DomainError::NoModels);
    }
    if models.len() > MAX_LABELS {
        return Err(DomainError::TooManyModels(models.len()));
    }
    if let Some(model) = Model::first_duplicate(models) {
        return Err(DomainError::DuplicateModel(model.to_string()));
    }
    Ok(())
}

/// Labels for one round's answers, in collection order
pub(super) fn anonymize(responses: &[ModelResponse]) -> Result<LabelMap, DomainError> {
    LabelMap::assign(responses.iter().map(|r| &r.model))
}

/// `(label, content)` pairs for a ranking prompt
pub(super) fn labelled<'r>(
    labels: &LabelMap,
    responses: &'r [ModelResponse],
) -> Vec<(Label, &'r str)> {
    labels
        .iter()
        .zip(responses)
        .map(|((label, _), response)| (label, response.content.as_str()))
        .collect()
}
