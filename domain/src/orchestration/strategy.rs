//! Strategy descriptors and tunables
//!
//! [`StrategyKind`] is the closed registry of orchestration variants. Each
//! kind declares its tunable parameters as a [`ConfigSchema`]; user-supplied
//! JSON is checked against that schema before being turned into a typed
//! [`StrategyTunables`] value, so out-of-range settings are rejected before
//! any model is queried.

use crate::core::error::DomainError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Orchestration strategy identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Collect → Rank → Synthesize
    Simple,
    /// Iterative revision rounds with fresh rankings each round
    MultiRound,
    /// Separate rankings of reasoning traces and final answers
    ReasoningAware,
    /// Rankings weighted by each critic's track record
    WeightedVoting,
}

impl StrategyKind {
    /// Every registered strategy, in listing order
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Simple,
        StrategyKind::MultiRound,
        StrategyKind::ReasoningAware,
        StrategyKind::WeightedVoting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Simple => "simple",
            StrategyKind::MultiRound => "multi_round",
            StrategyKind::ReasoningAware => "reasoning_aware",
            StrategyKind::WeightedVoting => "weighted_voting",
        }
    }

    /// Identifier in title case (`multi_round` → `Multi Round`)
    pub fn title(&self) -> &'static str {
        match self {
            StrategyKind::Simple => "Simple",
            StrategyKind::MultiRound => "Multi Round",
            StrategyKind::ReasoningAware => "Reasoning Aware",
            StrategyKind::WeightedVoting => "Weighted Voting",
        }
    }

    /// Comma-separated list of identifiers, for error messages
    pub fn available() -> String {
        Self::ALL
            .iter()
            .map(StrategyKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Declared tunable parameters
    pub fn config_schema(&self) -> ConfigSchema {
        match self {
            StrategyKind::Simple => ConfigSchema::default(),
            StrategyKind::MultiRound => ConfigSchema::new(vec![
                ParamSpec::integer("rounds", 2, 5, 2, "Number of deliberation rounds"),
                ParamSpec::integer(
                    "show_top_n",
                    1,
                    5,
                    2,
                    "Number of top responses to show in revision prompts",
                ),
            ]),
            StrategyKind::ReasoningAware => ConfigSchema::new(vec![
                ParamSpec::number(
                    "reasoning_weight",
                    0.0,
                    1.0,
                    0.4,
                    "Weight for reasoning quality (0-1)",
                ),
                ParamSpec::number(
                    "answer_weight",
                    0.0,
                    1.0,
                    0.6,
                    "Weight for answer quality (0-1)",
                ),
            ]),
            StrategyKind::WeightedVoting => ConfigSchema::new(vec![
                ParamSpec::number(
                    "min_weight",
                    0.0,
                    1.0,
                    0.1,
                    "Minimum weight for any model (prevents zero influence)",
                ),
                ParamSpec::boolean(
                    "use_win_rate",
                    true,
                    "Use win rate for weighting (otherwise use inverse average rank)",
                ),
            ]),
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| DomainError::UnknownStrategy {
                name: s.to_string(),
                available: StrategyKind::available(),
            })
    }
}

/// Type and bounds of one tunable parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamKind {
    Integer { min: i64, max: i64, default: i64 },
    Number { min: f64, max: f64, default: f64 },
    Boolean { default: bool },
}

/// One declared tunable parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    #[serde(skip)]
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: ParamKind,
    pub description: &'static str,
}

impl ParamSpec {
    pub fn integer(
        name: &'static str,
        min: i64,
        max: i64,
        default: i64,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind: ParamKind::Integer { min, max, default },
            description,
        }
    }

    pub fn number(
        name: &'static str,
        min: f64,
        max: f64,
        default: f64,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind: ParamKind::Number { min, max, default },
            description,
        }
    }

    pub fn boolean(name: &'static str, default: bool, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Boolean { default },
            description,
        }
    }

    /// Check one supplied value against this parameter's type and bounds
    pub fn check(&self, value: &Value) -> Result<(), DomainError> {
        let invalid = |reason: String| DomainError::InvalidParameter {
            name: self.name.to_string(),
            reason,
        };

        match &self.kind {
            ParamKind::Integer { min, max, .. } => {
                let n = value
                    .as_i64()
                    .ok_or_else(|| invalid(format!("expected an integer, got {}", value)))?;
                if n < *min || n > *max {
                    return Err(invalid(format!("{} is outside {}..={}", n, min, max)));
                }
            }
            ParamKind::Number { min, max, .. } => {
                let n = value
                    .as_f64()
                    .ok_or_else(|| invalid(format!("expected a number, got {}", value)))?;
                if n < *min || n > *max {
                    return Err(invalid(format!("{} is outside {}..={}", n, min, max)));
                }
            }
            ParamKind::Boolean { .. } => {
                if !value.is_boolean() {
                    return Err(invalid(format!("expected a boolean, got {}", value)));
                }
            }
        }
        Ok(())
    }
}

/// Declared parameters of a strategy, serialized as
/// `{"rounds": {"type": "integer", "min": 2, ...}, ...}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSchema {
    params: Vec<ParamSpec>,
}

impl ConfigSchema {
    pub fn new(params: Vec<ParamSpec>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Validate a JSON object of overrides; unknown keys are ignored.
    pub fn validate(&self, overrides: &Value) -> Result<(), DomainError> {
        let Some(object) = overrides.as_object() else {
            return Err(DomainError::InvalidParameter {
                name: "strategy_config".to_string(),
                reason: "expected a JSON object".to_string(),
            });
        };

        for param in &self.params {
            if let Some(value) = object.get(param.name) {
                param.check(value)?;
            }
        }
        Ok(())
    }
}

impl Serialize for ConfigSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.params.len()))?;
        for param in &self.params {
            map.serialize_entry(param.name, param)?;
        }
        map.end()
    }
}

/// Multi-round tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiRoundConfig {
    pub rounds: usize,
    pub show_top_n: usize,
}

impl Default for MultiRoundConfig {
    fn default() -> Self {
        Self {
            rounds: 2,
            show_top_n: 2,
        }
    }
}

/// Reasoning-aware tunables
///
/// The weights are descriptive: both rankings are handed to the chairman
/// side by side and never blended numerically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningAwareConfig {
    pub reasoning_weight: f64,
    pub answer_weight: f64,
}

impl Default for ReasoningAwareConfig {
    fn default() -> Self {
        Self {
            reasoning_weight: 0.4,
            answer_weight: 0.6,
        }
    }
}

/// Weighted-voting tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightedVotingConfig {
    /// Floor applied to every critic weight
    pub min_weight: f64,
    /// Weight by win rate; otherwise by inverse average rank
    pub use_win_rate: bool,
}

impl Default for WeightedVotingConfig {
    fn default() -> Self {
        Self {
            min_weight: 0.1,
            use_win_rate: true,
        }
    }
}

/// A strategy together with its validated tunables
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrategyTunables {
    Simple,
    MultiRound(MultiRoundConfig),
    ReasoningAware(ReasoningAwareConfig),
    WeightedVoting(WeightedVotingConfig),
}

impl StrategyTunables {
    /// Default tunables for a strategy
    pub fn defaults(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Simple => StrategyTunables::Simple,
            StrategyKind::MultiRound => StrategyTunables::MultiRound(MultiRoundConfig::default()),
            StrategyKind::ReasoningAware => {
                StrategyTunables::ReasoningAware(ReasoningAwareConfig::default())
            }
            StrategyKind::WeightedVoting => {
                StrategyTunables::WeightedVoting(WeightedVotingConfig::default())
            }
        }
    }

    /// Build tunables from optional JSON overrides, validated against the schema.
    pub fn from_json(kind: StrategyKind, overrides: Option<&Value>) -> Result<Self, DomainError> {
        let Some(overrides) = overrides.filter(|v| !v.is_null()) else {
            return Ok(Self::defaults(kind));
        };

        kind.config_schema().validate(overrides)?;

        let parse_err = |e: serde_json::Error| DomainError::InvalidParameter {
            name: "strategy_config".to_string(),
            reason: e.to_string(),
        };

        Ok(match kind {
            StrategyKind::Simple => StrategyTunables::Simple,
            StrategyKind::MultiRound => StrategyTunables::MultiRound(
                serde_json::from_value(overrides.clone()).map_err(parse_err)?,
            ),
            StrategyKind::ReasoningAware => StrategyTunables::ReasoningAware(
                serde_json::from_value(overrides.clone()).map_err(parse_err)?,
            ),
            StrategyKind::WeightedVoting => StrategyTunables::WeightedVoting(
                serde_json::from_value(overrides.clone()).map_err(parse_err)?,
            ),
        })
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyTunables::Simple => StrategyKind::Simple,
            StrategyTunables::MultiRound(_) => StrategyKind::MultiRound,
            StrategyTunables::ReasoningAware(_) => StrategyKind::ReasoningAware,
            StrategyTunables::WeightedVoting(_) => StrategyKind::WeightedVoting,
        }
    }

    /// Human-readable name, reflecting the tunables where relevant
    pub fn name(&self) -> String {
        match self {
            StrategyTunables::Simple => "Simple Ranking".to_string(),
            StrategyTunables::MultiRound(c) => format!("Multi-Round ({} rounds)", c.rounds),
            StrategyTunables::ReasoningAware(_) => "Reasoning-Aware".to_string(),
            StrategyTunables::WeightedVoting(_) => "Weighted Voting".to_string(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            StrategyTunables::Simple => {
                "3-stage process: individual responses → anonymous peer ranking → chairman synthesis"
                    .to_string()
            }
            StrategyTunables::MultiRound(c) => format!(
                "Iterative deliberation with {} rounds of refinement based on peer feedback",
                c.rounds
            ),
            StrategyTunables::ReasoningAware(c) => format!(
                "Dual ranking: reasoning quality ({:.0}%) + answer quality ({:.0}%)",
                c.reasoning_weight * 100.0,
                c.answer_weight * 100.0
            ),
            StrategyTunables::WeightedVoting(_) => {
                "Rankings weighted by model performance (higher-performing models have more influence)"
                    .to_string()
            }
        }
    }
}
