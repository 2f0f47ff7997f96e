//! Multi-round deliberation strategy
//!
//! Round 1 is a plain Collect → Rank. Each later round shows every member
//! the previous round's top answers (with their mean rank and a short peer
//! critique), collects revised answers, relabels them and ranks again. The
//! chairman synthesizes over the whole history.

use super::pipeline::{Pipeline, anonymize, check_council, labelled};
use super::{RunContext, Strategy, StrategyError};
use crate::client::ResilientClient;
use async_trait::async_trait;
use council_domain::core::string::excerpt;
use council_domain::{
    CarriedResponse, CritiqueRecord, EvolutionMetrics, LabelMap, Model, ModelResponse,
    MultiRoundConfig, PromptTemplate, Question, RoundRecord, Stage, Stage1, StrategyExtras,
    StrategyKind, StrategyMetadata, StrategyResult, StrategyTunables, aggregate,
};
use tracing::{info, warn};

/// Longest critique excerpt shown in a revision prompt, in characters
const CRITIQUE_EXCERPT_CHARS: usize = 200;

const NO_CRITIQUE: &str = "No specific critique available.";

pub struct MultiRoundStrategy {
    client: ResilientClient,
    config: MultiRoundConfig,
}

impl MultiRoundStrategy {
    pub fn new(client: ResilientClient, config: MultiRoundConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Strategy for MultiRoundStrategy {
    fn tunables(&self) -> StrategyTunables {
        StrategyTunables::MultiRound(self.config)
    }

    async fn execute(
        &self,
        question: &Question,
        models: &[Model],
        chairman: &Model,
        ctx: RunContext<'_>,
    ) -> Result<StrategyResult, StrategyError> {
        check_council(models)?;
        info!(
            "Running multi-round strategy: {} rounds, top {} carried",
            self.config.rounds, self.config.show_top_n
        );

        let pipeline = Pipeline::new(&self.client, ctx);
        let Some(first) = pipeline.first_round(question, models).await? else {
            return Ok(StrategyResult::all_models_failed(StrategyKind::MultiRound));
        };

        let mut latest = record(1, first.responses, first.labels, first.critiques, Vec::new());
        let mut history: Vec<RoundRecord> = Vec::new();

        for round_number in 2..=self.config.rounds {
            let carried = carry_forward(&latest, self.config.show_top_n);
            let prompt =
                PromptTemplate::revision_prompt(question.content(), &carried, round_number);

            let responses = pipeline
                .collect(Stage::Revise { round: round_number }, models, &prompt)
                .await?;
            if responses.is_empty() {
                warn!(
                    "No revisions in round {}, synthesizing over {} round(s)",
                    round_number,
                    history.len() + 1
                );
                break;
            }

            let labels = anonymize(&responses)?;
            let rank_prompt =
                PromptTemplate::ranking_prompt(question.content(), &labelled(&labels, &responses));
            let critiques = pipeline.rank(models, &rank_prompt).await?;

            let next = record(round_number, responses, labels, critiques, carried);
            history.push(std::mem::replace(&mut latest, next));
        }

        let stage2 = latest.critiques.clone();
        let metadata = StrategyMetadata::new(
            StrategyKind::MultiRound,
            latest.label_map.clone(),
            latest.aggregate.clone(),
        );
        history.push(latest);

        let prompt = PromptTemplate::multi_round_synthesis_prompt(question.content(), &history);
        let stage3 = pipeline.synthesize(chairman, &prompt).await?;

        let evolution = EvolutionMetrics::from_rounds(&history);
        if evolution.evolution_detected {
            info!("Rankings moved across rounds");
        }

        Ok(StrategyResult {
            stage2,
            stage3,
            metadata: metadata.with_extras(StrategyExtras::MultiRound {
                rounds: history.len(),
                evolution,
            }),
            stage1: Stage1::Rounds(history),
        })
    }
}

fn record(
    round_number: usize,
    responses: Vec<ModelResponse>,
    label_map: LabelMap,
    critiques: Vec<CritiqueRecord>,
    carried_forward: Vec<CarriedResponse>,
) -> RoundRecord {
    let aggregate = aggregate(critiques.iter().map(CritiqueRecord::ballot), &label_map);
    RoundRecord {
        round_number,
        responses,
        critiques,
        label_map,
        aggregate,
        carried_forward,
    }
}

/// Top `n` answers of a round with their mean rank and a critique excerpt
fn carry_forward(round: &RoundRecord, n: usize) -> Vec<CarriedResponse> {
    round
        .aggregate
        .iter()
        .take(n)
        .filter_map(|score| {
            let response = round.responses.iter().find(|r| r.model == score.model)?;
            Some(CarriedResponse {
                model: score.model.clone(),
                content: response.content.clone(),
                mean_rank: score.mean_rank,
                critique_excerpt: representative_critique(round, &score.model),
            })
        })
        .collect()
}

/// Opening of the first critique that ranked `model`
fn representative_critique(round: &RoundRecord, model: &Model) -> String {
    let label = round.label_map.label_for(model);
    round
        .critiques
        .iter()
        .find(|c| label.is_some_and(|l| c.mentions(l)))
        .or_else(|| round.critiques.first())
        .map(|c| excerpt(&c.raw_text, CRITIQUE_EXCERPT_CHARS).to_string())
        .unwrap_or_else(|| NO_CRITIQUE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::ports::llm_gateway::{GatewayError, ModelReply};
    use crate::test_support::{RecordingProgress, ScriptedGateway, council_responder, ranking_text};
    use council_domain::{Direction, parse_ranking};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    const MEMBERS: [&str; 3] = ["test/a", "test/b", "test/c"];

    fn models() -> Vec<Model> {
        MEMBERS.iter().map(|m| Model::from(*m)).collect()
    }

    fn question() -> Question {
        Question::try_new("Explain borrowing").unwrap()
    }

    fn strategy(gateway: ScriptedGateway, config: MultiRoundConfig) -> MultiRoundStrategy {
        let policy = RetryPolicy::default().with_base_delay(Duration::ZERO);
        MultiRoundStrategy::new(ResilientClient::new(Arc::new(gateway), policy), config)
    }

    /// Each member answers, ranks `first`, revises, then ranks `second`
    fn scripted_two_rounds(first: &str, second: &str) -> ScriptedGateway {
        let mut gateway = ScriptedGateway::new();
        for member in MEMBERS {
            gateway = gateway
                .push(member, Ok(ModelReply::new(format!("Answer from {}", member))))
                .push(member, Ok(ModelReply::new(ranking_text(first))))
                .push(member, Ok(ModelReply::new(format!("Revision from {}", member))))
                .push(member, Ok(ModelReply::new(ranking_text(second))));
        }
        gateway.with_responder(council_responder(&[]))
    }

    #[tokio::test]
    async fn test_two_rounds_with_evolution() {
        let gateway = Arc::new(scripted_two_rounds("ABC", "CBA"));
        let policy = RetryPolicy::default().with_base_delay(Duration::ZERO);
        let strategy = MultiRoundStrategy::new(
            ResilientClient::new(gateway.clone(), policy),
            MultiRoundConfig::default(),
        );
        let progress = RecordingProgress::default();
        let cancel = CancellationToken::new();

        let result = strategy
            .execute(
                &question(),
                &models(),
                &Model::from("test/chair"),
                RunContext::new(&progress, &cancel),
            )
            .await
            .unwrap();

        let Stage1::Rounds(rounds) = &result.stage1 else {
            panic!("expected round history");
        };
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[1].round_number, 2);
        assert_eq!(rounds[1].responses[0].content, "Revision from test/a");
        assert_eq!(rounds[1].carried_forward.len(), 2);
        assert_eq!(rounds[1].carried_forward[0].model.as_str(), "test/a");
        assert_eq!(rounds[1].carried_forward[0].mean_rank, 1.0);

        // Final-round data drives stage 2 and the metadata
        assert_eq!(result.stage2, rounds[1].critiques);
        assert_eq!(result.metadata.aggregate[0].model.as_str(), "test/c");

        let StrategyExtras::MultiRound { rounds: n, evolution } = &result.metadata.extras else {
            panic!("expected multi-round extras");
        };
        assert_eq!(*n, 2);
        assert!(evolution.evolution_detected);
        let changes = &evolution.rank_changes[0];
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].model.as_str(), "test/c");
        assert_eq!(changes[0].change, 2.0);
        assert_eq!(changes[0].direction, Direction::Improved);
        assert_eq!(changes[1].direction, Direction::Worsened);

        // The revision prompt carries the leader's rank and critique
        let revision = &gateway.prompts_for("test/b")[2];
        assert!(revision.contains("This is Round 2"));
        assert!(revision.contains("Response from test/a (Avg Rank: 1):\nAnswer from test/a"));
        assert!(revision.contains("Peer critique excerpt: Evaluation of each response"));

        assert_eq!(
            progress.started(),
            vec![
                "start:collect:3",
                "start:rank:3",
                "start:revise:3",
                "start:rank:3",
                "start:synthesize:1"
            ]
        );
        assert!(gateway.prompts_for("test/chair")[0].contains("=== ROUND 2 ==="));
    }

    #[tokio::test]
    async fn test_stable_rankings_report_no_evolution() {
        let result = strategy(scripted_two_rounds("BAC", "BAC"), MultiRoundConfig::default())
            .execute_simple(&question(), &models(), &Model::from("test/chair"))
            .await
            .unwrap();

        let StrategyExtras::MultiRound { evolution, .. } = &result.metadata.extras else {
            panic!("expected multi-round extras");
        };
        assert!(!evolution.evolution_detected);
        assert!(evolution.rank_changes[0].is_empty());
    }

    #[tokio::test]
    async fn test_empty_revision_round_stops_early() {
        let rejected = || {
            Err(GatewayError::ClientRejected {
                status: 400,
                message: "refused".into(),
            })
        };
        let mut gateway = ScriptedGateway::new();
        for member in MEMBERS {
            gateway = gateway
                .push(member, Ok(ModelReply::new("first answer")))
                .push(member, Ok(ModelReply::new(ranking_text("ABC"))))
                .push(member, rejected());
        }
        let gateway = gateway.with_responder(council_responder(&[]));
        let config = MultiRoundConfig {
            rounds: 3,
            show_top_n: 1,
        };

        let result = strategy(gateway, config)
            .execute_simple(&question(), &models(), &Model::from("test/chair"))
            .await
            .unwrap();

        assert!(matches!(&result.stage1, Stage1::Rounds(r) if r.len() == 1));
        assert!(matches!(
            result.metadata.extras,
            StrategyExtras::MultiRound { rounds: 1, .. }
        ));
        assert!(!result.is_error());
    }

    #[test]
    fn test_representative_critique_prefers_mentioning_critic() {
        let responses = vec![
            ModelResponse::new(Model::from("test/a"), "a"),
            ModelResponse::new(Model::from("test/b"), "b"),
        ];
        let labels = anonymize(&responses).unwrap();
        let only_a = "Response A is solid.\nFINAL RANKING:\n1. Response A";
        let long = format!("{}\nFINAL RANKING:\n1. Response B", "x".repeat(300));
        let critiques = vec![
            CritiqueRecord::new(Model::from("test/a"), only_a, parse_ranking(only_a)),
            CritiqueRecord::new(Model::from("test/b"), long.as_str(), parse_ranking(&long)),
        ];
        let round = record(1, responses, labels, critiques, Vec::new());

        assert_eq!(representative_critique(&round, &Model::from("test/a")), only_a);
        let excerpt_b = representative_critique(&round, &Model::from("test/b"));
        assert_eq!(excerpt_b.chars().count(), 200);

        let empty = record(1, Vec::new(), LabelMap::default(), Vec::new(), Vec::new());
        assert_eq!(
            representative_critique(&empty, &Model::from("test/a")),
            NO_CRITIQUE
        );
    }
}
