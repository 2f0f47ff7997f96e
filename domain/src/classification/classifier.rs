//! Rule-based query classifier.
//!
//! Each category owns a weighted set of regex indicators. A query's score for
//! a category is the category weight times the number of indicators that
//! match the lowercased query; the highest-scoring category wins.

use super::category::QueryCategory;
use crate::core::string::round_to;
use crate::orchestration::strategy::StrategyKind;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Queries shorter than this (after trimming) are not classified.
const MIN_QUERY_CHARS: usize = 3;

/// Confidence reported when no indicator matched at all.
const NO_MATCH_CONFIDENCE: f64 = 0.3;

struct CategoryRules {
    category: QueryCategory,
    weight: f64,
    patterns: Vec<(&'static str, Regex)>,
}

impl CategoryRules {
    fn new(category: QueryCategory, weight: f64, patterns: &[&'static str]) -> Self {
        Self {
            category,
            weight,
            patterns: patterns
                .iter()
                .map(|p| (*p, Regex::new(p).expect("classifier pattern")))
                .collect(),
        }
    }
}

// Declaration order decides ties.
static RULES: LazyLock<Vec<CategoryRules>> = LazyLock::new(|| {
    vec![
        CategoryRules::new(
            QueryCategory::Technical,
            1.0,
            &[
                r"\bcode\b",
                r"\bprogram(ming)?\b",
                r"\bdebug\b",
                r"\bfunction\b",
                r"\bapi\b",
                r"\balgorithm\b",
                r"\bsyntax\b",
                r"\berror\b",
                r"\bbug\b",
                r"\bframework\b",
                r"\blibrary\b",
                r"\bclass\b",
                r"\bmethod\b",
                r"\bvariable\b",
                r"\bloop\b",
                r"\barray\b",
                r"\bpython\b",
                r"\bjavascript\b",
                r"\breact\b",
                r"\bnode\b",
                r"\bgit\b",
                r"\bdocker\b",
                r"\bsql\b",
                r"\bdatabase\b",
            ],
        ),
        CategoryRules::new(
            QueryCategory::Reasoning,
            1.2,
            &[
                r"\bcalculate\b",
                r"\bprove\b",
                r"\bderive\b",
                r"\bsolve\b",
                r"\btheorem\b",
                r"\bequation\b",
                r"\bsteps?\b",
                r"\blogic\b",
                r"\bif.*then\b",
                r"\bgiven.*find\b",
                r"\bproof\b",
                r"\bassume\b",
                r"\bconclude\b",
                r"\binfer\b",
                r"\bdeduce\b",
                r"\bmathematics\b",
                r"\bcalculus\b",
                r"\balgebra\b",
                r"\bstrategy\b",
                r"\bplan\b",
                r"\bapproach\b",
                r"\bmethod\b",
                r"why\s+is\b",
                r"how\s+does\b",
                r"explain.*process",
            ],
        ),
        CategoryRules::new(
            QueryCategory::Analytical,
            1.0,
            &[
                r"\bcompare\b",
                r"\bcontrast\b",
                r"\banalyze\b",
                r"\bevaluate\b",
                r"\bassess\b",
                r"\btradeoff\b",
                r"\bpros\s+and\s+cons\b",
                r"\bdifference\b",
                r"\bsimilarity\b",
                r"\bbetter\b",
                r"\bworse\b",
                r"\badvantage\b",
                r"\bdisadvantage\b",
                r"\bmetric\b",
                r"\bperformance\b",
                r"\bbenchmark\b",
                r"\bstatistic\b",
                r"\btrend\b",
                r"\bpattern\b",
                r"\bcorrelation\b",
            ],
        ),
        CategoryRules::new(
            QueryCategory::Creative,
            0.9,
            &[
                r"\bwrite\b",
                r"\bstory\b",
                r"\bpoem\b",
                r"\bessay\b",
                r"\bbrainstorm\b",
                r"\bidea\b",
                r"\bimaginative\b",
                r"\bcreative\b",
                r"\binvent\b",
                r"\bdesign\b",
                r"\bnovel\b",
                r"\boriginal\b",
                r"\bnarrative\b",
                r"\bcharacter\b",
                r"\bplot\b",
                r"\bscenario\b",
                r"\bslogan\b",
                r"\bmarketing\b",
                r"\bcampaign\b",
                r"\bmetaphor\b",
                r"\banalogy\b",
            ],
        ),
        CategoryRules::new(
            QueryCategory::Factual,
            0.8,
            &[
                r"\bwhat\s+is\b",
                r"\bwhen\s+did\b",
                r"\bwho\s+is\b",
                r"\bwhere\s+is\b",
                r"\bdefine\b",
                r"\bdefinition\b",
                r"\bexplain\b",
                r"\bdescribe\b",
                r"\blist\b",
                r"\bname\b",
                r"\bhistory\b",
                r"\bfact\b",
                r"\binformation\b",
                r"\bcapital\b",
                r"\bpopulation\b",
                r"\bdate\b",
                r"\bmean\b",
                r"\brefer\b",
                r"\bstand for\b",
            ],
        ),
    ]
});

/// Result of classifying one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: QueryCategory,
    /// Share of the total score held by the winning category, 2 decimals
    pub confidence: f64,
    /// Patterns of the winning category that matched
    pub indicators: Vec<String>,
}

impl Classification {
    fn unclassified(confidence: f64) -> Self {
        Self {
            category: QueryCategory::Factual,
            confidence,
            indicators: Vec::new(),
        }
    }
}

/// The classifier's own category → strategy suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySuggestion {
    pub strategy: StrategyKind,
    pub explanation: String,
    pub query_category: QueryCategory,
    pub confidence: f64,
    pub indicators: Vec<String>,
}

/// Weighted keyword/pattern scorer over five query categories
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryClassifier;

impl QueryClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Assign a query to its best-matching category.
    ///
    /// # Examples
    ///
    /// ```
    /// use council_domain::classification::{QueryCategory, QueryClassifier};
    ///
    /// let c = QueryClassifier::new().classify("Debug this Python function");
    /// assert_eq!(c.category, QueryCategory::Technical);
    /// ```
    pub fn classify(&self, query: &str) -> Classification {
        if query.trim().chars().count() < MIN_QUERY_CHARS {
            return Classification::unclassified(0.0);
        }

        let query = query.to_lowercase();
        let scored: Vec<(QueryCategory, f64, Vec<String>)> = RULES
            .iter()
            .map(|rules| {
                let matched: Vec<String> = rules
                    .patterns
                    .iter()
                    .filter(|(_, re)| re.is_match(&query))
                    .map(|(src, _)| src.to_string())
                    .collect();
                let score = rules.weight * matched.len() as f64;
                (rules.category, score, matched)
            })
            .collect();

        let total: f64 = scored.iter().map(|(_, score, _)| score).sum();
        if total <= 0.0 {
            return Classification::unclassified(NO_MATCH_CONFIDENCE);
        }

        // First category with the top score wins
        let mut best = &scored[0];
        for entry in &scored[1..] {
            if entry.1 > best.1 {
                best = entry;
            }
        }

        let (category, best_score, indicators) = best;
        Classification {
            category: *category,
            confidence: round_to((best_score / (total + 1e-6)).clamp(0.0, 1.0), 2),
            indicators: indicators.clone(),
        }
    }

    /// Static category → strategy mapping with a one-sentence rationale.
    pub fn recommended_strategy(&self, query: &str) -> StrategySuggestion {
        let classification = self.classify(query);
        let (strategy, explanation) = match classification.category {
            QueryCategory::Reasoning => (
                StrategyKind::ReasoningAware,
                "This query requires logical reasoning. The Reasoning-Aware strategy is optimized for complex multi-step problems.",
            ),
            QueryCategory::Technical => (
                StrategyKind::MultiRound,
                "Technical queries benefit from iterative refinement. Multi-Round allows models to improve their solutions.",
            ),
            QueryCategory::Analytical => (
                StrategyKind::WeightedVoting,
                "Analytical questions benefit from expert opinions. Weighted Voting gives more influence to high-performing models.",
            ),
            QueryCategory::Creative => (
                StrategyKind::Simple,
                "Creative queries benefit from diverse perspectives. Simple Ranking captures varied creative approaches.",
            ),
            QueryCategory::Factual => (
                StrategyKind::Simple,
                "Factual queries have clear correct answers. Simple Ranking is efficient for straightforward questions.",
            ),
        };

        StrategySuggestion {
            strategy,
            explanation: explanation.to_string(),
            query_category: classification.category,
            confidence: classification.confidence,
            indicators: classification.indicators,
        }
    }
}
