//! JSON output formatter
//!
//! Every command prints one pretty-printed JSON document, so output can be
//! piped into `jq` or stored as-is.

use crate::output::formatter::OutputFormatter;
use council_application::{StrategyInfo, StrategyRun};
use council_domain::{
    Conversation, ConversationMeta, Feedback, LeaderboardEntry, Model, ModelStats,
    PerformanceSummary, Recommendation, StrategyResult, StrategyStats,
};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    fn pretty(value: &impl Serialize) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_result(&self, result: &StrategyResult, title: Option<&str>) -> String {
        Self::pretty(&json!({ "title": title, "result": result }))
    }

    fn format_comparison(&self, question: &str, runs: &[StrategyRun]) -> String {
        let runs: Vec<_> = runs
            .iter()
            .map(|run| match &run.outcome {
                Ok(result) => json!({ "strategy": run.strategy, "result": result }),
                Err(e) => json!({ "strategy": run.strategy, "error": e.to_string() }),
            })
            .collect();
        Self::pretty(&json!({ "question": question, "runs": runs }))
    }

    fn format_strategies(&self, strategies: &[StrategyInfo]) -> String {
        Self::pretty(&strategies)
    }

    fn format_recommendation(&self, recommendation: &Recommendation) -> String {
        Self::pretty(recommendation)
    }

    fn format_conversation_list(&self, conversations: &[ConversationMeta]) -> String {
        Self::pretty(&conversations)
    }

    fn format_conversation(&self, conversation: &Conversation) -> String {
        Self::pretty(conversation)
    }

    fn format_summary(&self, summary: &PerformanceSummary) -> String {
        Self::pretty(summary)
    }

    fn format_leaderboard(&self, entries: &[LeaderboardEntry]) -> String {
        Self::pretty(&entries)
    }

    fn format_model_stats(&self, model: &Model, stats: Option<&ModelStats>) -> String {
        Self::pretty(&json!({ "model": model, "stats": stats }))
    }

    fn format_strategy_stats(&self, strategy: &str, stats: Option<&StrategyStats>) -> String {
        Self::pretty(&json!({ "strategy": strategy, "stats": stats }))
    }

    fn format_feedback(&self, conversation_id: &str, index: usize, feedback: Feedback) -> String {
        Self::pretty(&json!({
            "conversation_id": conversation_id,
            "message_index": index,
            "feedback": feedback,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_application::{StrategyError, list_strategies};
    use council_domain::StrategyKind;
    use serde_json::Value;

    #[test]
    fn test_comparison_reports_failures_inline() {
        let runs = vec![StrategyRun {
            strategy: StrategyKind::MultiRound,
            outcome: Err(StrategyError::Cancelled),
        }];
        let value: Value =
            serde_json::from_str(&JsonFormatter.format_comparison("q", &runs)).unwrap();
        assert_eq!(value["runs"][0]["strategy"], "multi_round");
        assert_eq!(value["runs"][0]["error"], "Strategy run cancelled");
    }

    #[test]
    fn test_strategies_include_schema() {
        let value: Value =
            serde_json::from_str(&JsonFormatter.format_strategies(&list_strategies())).unwrap();
        assert_eq!(value[1]["id"], "multi_round");
        assert_eq!(value[1]["config_schema"]["rounds"]["type"], "integer");
        assert_eq!(value[1]["config_schema"]["rounds"]["max"], 5);
    }

    #[test]
    fn test_feedback_is_numeric() {
        let value: Value =
            serde_json::from_str(&JsonFormatter.format_feedback("c1", 1, Feedback::Dislike))
                .unwrap();
        assert_eq!(value["feedback"], -1);
        assert_eq!(value["message_index"], 1);
    }
}
