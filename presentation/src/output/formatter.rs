//! Output formatter trait

use council_application::{StrategyInfo, StrategyRun};
use council_domain::{
    Conversation, ConversationMeta, Feedback, LeaderboardEntry, Model, ModelStats,
    PerformanceSummary, Recommendation, StrategyResult, StrategyStats,
};

/// Trait for rendering command results
pub trait OutputFormatter {
    /// A council answer, with the title given to a new conversation
    fn format_result(&self, result: &StrategyResult, title: Option<&str>) -> String;

    /// Several strategies run on the same question
    fn format_comparison(&self, question: &str, runs: &[StrategyRun]) -> String;

    fn format_strategies(&self, strategies: &[StrategyInfo]) -> String;

    fn format_recommendation(&self, recommendation: &Recommendation) -> String;

    fn format_conversation_list(&self, conversations: &[ConversationMeta]) -> String;

    fn format_conversation(&self, conversation: &Conversation) -> String;

    fn format_summary(&self, summary: &PerformanceSummary) -> String;

    fn format_leaderboard(&self, entries: &[LeaderboardEntry]) -> String;

    fn format_model_stats(&self, model: &Model, stats: Option<&ModelStats>) -> String;

    fn format_strategy_stats(&self, strategy: &str, stats: Option<&StrategyStats>) -> String;

    /// Confirmation of a recorded rating
    fn format_feedback(&self, conversation_id: &str, index: usize, feedback: Feedback) -> String;
}
