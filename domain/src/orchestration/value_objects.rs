//! Orchestration value objects - immutable result types for council runs.
//!
//! These types represent the outputs of each stage:
//! - [`ModelResponse`] - one council member's answer (stage 1)
//! - [`CritiqueRecord`] - one critic's evaluation and parsed ordering (stage 2)
//! - [`FinalAnswer`] - the chairman's synthesis (stage 3)
//! - [`RoundRecord`] - one full round of a multi-round run
//! - [`StrategyResult`] - complete result of a strategy run

use super::evolution::EvolutionMetrics;
use super::strategy::StrategyKind;
use crate::core::model::Model;
use crate::ranking::{AggregateScore, Ballot, Label, LabelMap, ParseTier, ParsedRanking};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stage 3 content when no council member answered.
pub const ALL_MODELS_FAILED: &str = "All models failed to respond. Please try again.";

/// Stage 3 content when the chairman could not be reached.
pub const SYNTHESIS_FAILED: &str = "Error: Unable to generate final synthesis.";

/// Attribution used for the total-failure answer.
pub const ERROR_ATTRIBUTION: &str = "error";

/// Answer from one council member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub model: Model,
    pub content: String,
    /// Backend reasoning trace (`reasoning_details`), kept verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<serde_json::Value>,
}

impl ModelResponse {
    pub fn new(model: Model, content: impl Into<String>) -> Self {
        Self {
            model,
            content: content.into(),
            reasoning: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: Option<serde_json::Value>) -> Self {
        self.reasoning = reasoning.filter(|r| !r.is_null());
        self
    }

    /// Whether a non-empty reasoning trace was supplied
    pub fn has_reasoning(&self) -> bool {
        match &self.reasoning {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::String(s)) => !s.trim().is_empty(),
            Some(serde_json::Value::Array(items)) => !items.is_empty(),
            Some(serde_json::Value::Object(map)) => !map.is_empty(),
            Some(_) => true,
        }
    }

    /// Reasoning trace rendered for a prompt
    pub fn reasoning_text(&self) -> Option<String> {
        if !self.has_reasoning() {
            return None;
        }
        self.reasoning.as_ref().map(|r| match r {
            serde_json::Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        })
    }
}

/// Orderings from the two reasoning-aware ranking passes, side by side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualOrder {
    pub reasoning_order: Vec<Label>,
    pub answer_order: Vec<Label>,
}

/// One critic's evaluation of the anonymized answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritiqueRecord {
    pub critic: Model,
    pub raw_text: String,
    /// Ordering used for aggregation
    pub parsed_order: Vec<Label>,
    pub parse_tier: ParseTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dual: Option<DualOrder>,
}

impl CritiqueRecord {
    pub fn new(critic: Model, raw_text: impl Into<String>, parsed: ParsedRanking) -> Self {
        Self {
            critic,
            raw_text: raw_text.into(),
            parsed_order: parsed.order,
            parse_tier: parsed.tier,
            dual: None,
        }
    }

    pub fn with_dual(mut self, dual: DualOrder) -> Self {
        self.dual = Some(dual);
        self
    }

    /// This critique as an aggregation ballot
    pub fn ballot(&self) -> Ballot<'_> {
        Ballot::new(&self.critic, &self.parsed_order)
    }

    /// Whether the parsed ordering mentions the given label
    pub fn mentions(&self, label: Label) -> bool {
        self.parsed_order.contains(&label)
    }
}

/// The chairman's final answer (always present)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalAnswer {
    /// Chairman identifier, or `"error"` when nobody answered
    pub model: String,
    pub content: String,
    #[serde(default)]
    pub is_error: bool,
}

impl FinalAnswer {
    pub fn new(chairman: &Model, content: impl Into<String>) -> Self {
        Self {
            model: chairman.to_string(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Every council member failed
    pub fn all_models_failed() -> Self {
        Self {
            model: ERROR_ATTRIBUTION.to_string(),
            content: ALL_MODELS_FAILED.to_string(),
            is_error: true,
        }
    }

    /// The chairman could not produce a synthesis
    pub fn synthesis_failed(chairman: &Model) -> Self {
        Self {
            model: chairman.to_string(),
            content: SYNTHESIS_FAILED.to_string(),
            is_error: true,
        }
    }
}

/// Previous-round answer shown to members in a revision prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarriedResponse {
    pub model: Model,
    pub content: String,
    pub mean_rank: f64,
    pub critique_excerpt: String,
}

/// One round of a multi-round run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round_number: usize,
    pub responses: Vec<ModelResponse>,
    pub critiques: Vec<CritiqueRecord>,
    pub label_map: LabelMap,
    pub aggregate: Vec<AggregateScore>,
    /// Top answers of the previous round that this round revised against
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub carried_forward: Vec<CarriedResponse>,
}

/// Stage 1 payload: plain responses, or the full round history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stage1 {
    Rounds(Vec<RoundRecord>),
    Responses(Vec<ModelResponse>),
}

impl Stage1 {
    /// Responses of the final collection stage
    pub fn final_responses(&self) -> &[ModelResponse] {
        match self {
            Stage1::Responses(responses) => responses,
            Stage1::Rounds(rounds) => rounds.last().map(|r| r.responses.as_slice()).unwrap_or(&[]),
        }
    }
}

/// Strategy-specific metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyExtras {
    #[default]
    None,
    MultiRound {
        rounds: usize,
        evolution: EvolutionMetrics,
    },
    ReasoningAware {
        reasoning_weight: f64,
        answer_weight: f64,
        has_reasoning: bool,
        /// Reasoning-pass critiques (only when a trace was present)
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        reasoning_critiques: Vec<CritiqueRecord>,
    },
    WeightedVoting {
        model_weights: BTreeMap<Model, f64>,
    },
}

/// Metadata attached to every strategy result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyMetadata {
    pub strategy: StrategyKind,
    #[serde(default)]
    pub label_map: LabelMap,
    #[serde(default)]
    pub aggregate: Vec<AggregateScore>,
    #[serde(default)]
    pub extras: StrategyExtras,
}

impl StrategyMetadata {
    pub fn new(
        strategy: StrategyKind,
        label_map: LabelMap,
        aggregate: Vec<AggregateScore>,
    ) -> Self {
        Self {
            strategy,
            label_map,
            aggregate,
            extras: StrategyExtras::None,
        }
    }

    pub fn with_extras(mut self, extras: StrategyExtras) -> Self {
        self.extras = extras;
        self
    }
}

/// Complete result of a strategy run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub stage1: Stage1,
    pub stage2: Vec<CritiqueRecord>,
    pub stage3: FinalAnswer,
    pub metadata: StrategyMetadata,
}

impl StrategyResult {
    /// Well-formed result for a run in which no council member answered
    pub fn all_models_failed(strategy: StrategyKind) -> Self {
        Self {
            stage1: Stage1::Responses(Vec::new()),
            stage2: Vec::new(),
            stage3: FinalAnswer::all_models_failed(),
            metadata: StrategyMetadata::new(strategy, LabelMap::default(), Vec::new()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.stage3.is_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::parse_ranking;
    use serde_json::json;

    #[test]
    fn test_has_reasoning() {
        let plain = ModelResponse::new(Model::Gpt51, "4");
        assert!(!plain.has_reasoning());

        let empty = ModelResponse::new(Model::Gpt51, "4").with_reasoning(Some(json!([])));
        assert!(!empty.has_reasoning());

        let traced = ModelResponse::new(Model::DeepSeekR1, "4")
            .with_reasoning(Some(json!([{"type": "reasoning.text", "text": "2+2"}])));
        assert!(traced.has_reasoning());
        assert!(traced.reasoning_text().unwrap().contains("2+2"));
    }

    #[test]
    fn test_all_models_failed_shape() {
        let result = StrategyResult::all_models_failed(StrategyKind::Simple);
        assert!(result.is_error());
        assert_eq!(result.stage3.model, "error");
        assert_eq!(result.stage3.content, ALL_MODELS_FAILED);
        assert!(result.stage1.final_responses().is_empty());
        assert!(result.metadata.aggregate.is_empty());
    }

    #[test]
    fn test_synthesis_failed_attributed_to_chairman() {
        let answer = FinalAnswer::synthesis_failed(&Model::ClaudeSonnet45);
        assert_eq!(answer.model, "anthropic/claude-sonnet-4.5");
        assert_eq!(answer.content, SYNTHESIS_FAILED);
        assert!(answer.is_error);
    }

    #[test]
    fn test_critique_mentions() {
        let critique = CritiqueRecord::new(
            Model::Gpt51,
            "FINAL RANKING:\n1. Response B",
            parse_ranking("FINAL RANKING:\n1. Response B"),
        );
        assert!(critique.mentions(Label::from_letter('B').unwrap()));
        assert!(!critique.mentions(Label::from_letter('A').unwrap()));
    }

    #[test]
    fn test_result_json_roundtrip() {
        let responses = vec![ModelResponse::new(Model::Gpt51, "answer")];
        let labels = LabelMap::assign(responses.iter().map(|r| &r.model)).unwrap();
        let result = StrategyResult {
            stage1: Stage1::Responses(responses),
            stage2: Vec::new(),
            stage3: FinalAnswer::new(&Model::ClaudeSonnet45, "final"),
            metadata: StrategyMetadata::new(StrategyKind::WeightedVoting, labels, Vec::new())
                .with_extras(
                StrategyExtras::WeightedVoting {
                    model_weights: BTreeMap::from([(Model::Gpt51, 0.5)]),
                },
            ),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["metadata"]["strategy"], "weighted_voting");
        assert_eq!(json["metadata"]["extras"]["kind"], "weighted_voting");
        assert_eq!(json["stage1"][0]["model"], "openai/gpt-5.1");

        let back: StrategyResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
