//! Orchestration domain entities

use serde::{Deserialize, Serialize};

/// Stage of a council run
///
/// Every strategy walks `Collect → Rank → (Revise → Rank)* → Synthesize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Every council member answers the question independently
    Collect,
    /// Members critique and rank the anonymized answers
    Rank,
    /// Members revise their answers after seeing the previous round
    Revise { round: usize },
    /// The chairman writes the final answer
    Synthesize,
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Collect => "collect",
            Stage::Rank => "rank",
            Stage::Revise { .. } => "revise",
            Stage::Synthesize => "synthesize",
        }
    }

    /// Stage number as shown to users (revision counts as collection)
    pub fn number(&self) -> u8 {
        match self {
            Stage::Collect | Stage::Revise { .. } => 1,
            Stage::Rank => 2,
            Stage::Synthesize => 3,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Stage::Collect => "Collecting Responses".to_string(),
            Stage::Rank => "Peer Ranking".to_string(),
            Stage::Revise { round } => format!("Revision Round {}", round),
            Stage::Synthesize => "Chairman Synthesis".to_string(),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
