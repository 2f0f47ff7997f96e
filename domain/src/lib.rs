//! Domain layer for llm-council
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A council is a set of model backends that answer a question
//! independently. Members then critique each other's answers under
//! anonymized labels (`Response A`, `Response B`, ...) and a chairman model
//! synthesizes the final answer.
//!
//! ## Strategies
//!
//! - **Simple**: one collection, one ranking, one synthesis
//! - **Multi-Round**: members revise their answers against the previous
//!   round's best, with fresh rankings each round
//! - **Reasoning-Aware**: reasoning traces and answers ranked separately
//! - **Weighted Voting**: critic votes weighted by historical reliability
//!
//! ## Analytics & Recommendation
//!
//! Stored answers feed per-model and per-strategy statistics, which combine
//! with a rule-based query classifier to recommend a strategy.

pub mod analytics;
pub mod chat;
pub mod classification;
pub mod conversation;
pub mod core;
pub mod orchestration;
pub mod prompt;
pub mod ranking;
pub mod recommendation;

// Re-export commonly used types
pub use analytics::{
    LeaderboardEntry, ModelStats, PerformanceAccumulator, PerformanceSummary, StrategyStats,
};
pub use chat::{ChatMessage, Role};
pub use classification::{Classification, QueryCategory, QueryClassifier, StrategySuggestion};
pub use conversation::{
    AssistantMessage, Conversation, ConversationMeta, Feedback, FeedbackTargetError, Message,
};
pub use core::{error::DomainError, model::Model, question::Question};
pub use orchestration::{
    entities::Stage,
    evolution::{Direction, EvolutionMetrics, RankChange},
    strategy::{
        ConfigSchema, MultiRoundConfig, ParamKind, ParamSpec, ReasoningAwareConfig, StrategyKind,
        StrategyTunables, WeightedVotingConfig,
    },
    value_objects::{
        CarriedResponse, CritiqueRecord, DualOrder, FinalAnswer, ModelResponse, RoundRecord,
        Stage1, StrategyExtras, StrategyMetadata, StrategyResult,
    },
};
pub use prompt::PromptTemplate;
pub use ranking::{
    AggregateScore, Ballot, Label, LabelMap, ParseTier, ParsedRanking, aggregate,
    aggregate_weighted, parse_ranking,
};
pub use recommendation::{Recommendation, StrategyRecommender};
