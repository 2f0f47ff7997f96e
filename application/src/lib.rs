//! Application layer for llm-council
//!
//! This crate contains the strategies, use cases, and port definitions.
//! It depends only on the domain layer.

pub mod analytics;
pub mod client;
pub mod config;
pub mod ports;
pub mod strategies;
pub mod use_cases;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use analytics::{AnalyticsError, AnalyticsService};
pub use client::ResilientClient;
pub use config::{CouncilParams, RetryPolicy};
pub use ports::{
    conversation_store::{ConversationStore, StoreError},
    llm_gateway::{GatewayError, LlmGateway, ModelReply, RetryClass},
    progress::{NoProgress, ProgressNotifier},
    snapshot_store::SnapshotStore,
};
pub use strategies::{
    PerformanceSource, RunContext, Strategy, StrategyError, StrategyInfo, build_strategy,
    list_strategies,
};
pub use use_cases::compare_strategies::{CompareStrategiesUseCase, StrategyRun};
pub use use_cases::record_feedback::{FeedbackError, RecordFeedbackUseCase};
pub use use_cases::recommend_strategy::RecommendStrategyUseCase;
pub use use_cases::run_council::{
    RunCouncilError, RunCouncilInput, RunCouncilOutput, RunCouncilUseCase,
};
