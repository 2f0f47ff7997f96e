//! Query categories

use serde::{Deserialize, Serialize};

/// Kind of question being asked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    /// Programming, debugging, code-related queries
    Technical,
    /// Logic, mathematics, multi-step problems
    Reasoning,
    /// Comparison, evaluation, trade-offs
    Analytical,
    /// Writing, brainstorming, open-ended questions
    Creative,
    /// Lookups, definitions, facts
    Factual,
}

impl QueryCategory {
    pub const ALL: [QueryCategory; 5] = [
        QueryCategory::Technical,
        QueryCategory::Reasoning,
        QueryCategory::Analytical,
        QueryCategory::Creative,
        QueryCategory::Factual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryCategory::Technical => "technical",
            QueryCategory::Reasoning => "reasoning",
            QueryCategory::Analytical => "analytical",
            QueryCategory::Creative => "creative",
            QueryCategory::Factual => "factual",
        }
    }
}

impl std::fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
