//! Console output formatter

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use council_application::{StrategyInfo, StrategyRun};
use council_domain::{
    AggregateScore, Conversation, ConversationMeta, CritiqueRecord, Direction, Feedback,
    FinalAnswer, Label, LabelMap, LeaderboardEntry, Message, Model, ModelResponse, ModelStats,
    ParamKind, PerformanceSummary, Recommendation, Stage1, StrategyExtras, StrategyKind,
    StrategyMetadata, StrategyResult, StrategyStats,
};

/// Formats results for terminal display
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleFormatter {
    /// Show every stage instead of only the synthesis
    full: bool,
}

impl ConsoleFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn full() -> Self {
        Self { full: true }
    }

    // ==================== Council Results ====================

    fn responses(output: &mut String, responses: &[ModelResponse]) {
        for response in responses {
            output.push_str(&format!(
                "\n{}\n{}\n",
                format!("── {} ──", response.model).yellow().bold(),
                response.content
            ));
            if let Some(reasoning) = response.reasoning_text() {
                output.push_str(&format!(
                    "{}\n{}\n",
                    "Reasoning:".dimmed(),
                    Self::indent(&reasoning, "  │ ").dimmed()
                ));
            }
        }
    }

    fn critiques(output: &mut String, critiques: &[CritiqueRecord], labels: &LabelMap) {
        for critique in critiques {
            let order = Self::label_order(&critique.parsed_order, labels);
            output.push_str(&format!(
                "\n{}\n",
                format!("── {} ranked: {} ──", critique.critic, order)
                    .yellow()
                    .bold()
            ));
            if critique.parse_tier.is_degraded() {
                output.push_str(&format!(
                    "{}\n",
                    format!("(ranking recovered from {} text)", critique.parse_tier).dimmed()
                ));
            }
            if let Some(dual) = &critique.dual {
                output.push_str(&format!(
                    "{} {}\n{} {}\n",
                    "Reasoning:".cyan(),
                    Self::label_order(&dual.reasoning_order, labels),
                    "Answer:   ".cyan(),
                    Self::label_order(&dual.answer_order, labels)
                ));
            }
            output.push_str(&critique.raw_text);
            output.push('\n');
        }
    }

    fn label_order(order: &[Label], labels: &LabelMap) -> String {
        if order.is_empty() {
            return "(no ranking)".to_string();
        }
        order
            .iter()
            .map(|label| match labels.model_for(*label) {
                Some(model) => format!("{} ({})", label, model.short_name()),
                None => label.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" > ")
    }

    fn aggregate(output: &mut String, aggregate: &[AggregateScore]) {
        if aggregate.is_empty() {
            output.push_str(&format!("{}\n", "No rankings were parsed.".dimmed()));
            return;
        }
        for (i, score) in aggregate.iter().enumerate() {
            let mut line = format!(
                "  {}. {:<36} mean rank {:.2} ({} votes",
                i + 1,
                score.model.to_string(),
                score.mean_rank,
                score.sample_count
            );
            if let Some(weight) = score.total_weight {
                line.push_str(&format!(", weight {:.2}", weight));
            }
            line.push(')');
            if i == 0 {
                output.push_str(&format!("{}\n", line.green()));
            } else {
                output.push_str(&format!("{}\n", line));
            }
        }
    }

    fn extras(output: &mut String, extras: &StrategyExtras) {
        match extras {
            StrategyExtras::None => {}
            StrategyExtras::MultiRound { rounds, evolution } => {
                output.push_str(&Self::section_header(&format!(
                    "Evolution over {} rounds",
                    rounds
                )));
                if !evolution.evolution_detected {
                    output.push_str("No significant rank changes.\n");
                }
                for (i, changes) in evolution.rank_changes.iter().enumerate() {
                    for change in changes {
                        let line = format!(
                            "  Round {} → {}: {} {:+.2}",
                            i + 1,
                            i + 2,
                            change.model,
                            change.change
                        );
                        match change.direction {
                            Direction::Improved => {
                                output.push_str(&format!("{}\n", line.green()))
                            }
                            Direction::Worsened => {
                                output.push_str(&format!("{}\n", line.red()))
                            }
                        }
                    }
                }
            }
            StrategyExtras::ReasoningAware {
                reasoning_weight,
                answer_weight,
                has_reasoning,
                ..
            } => {
                output.push_str(&Self::section_header("Reasoning-Aware Ranking"));
                output.push_str(&format!(
                    "Weights: reasoning {:.0}%, answer {:.0}%\n",
                    reasoning_weight * 100.0,
                    answer_weight * 100.0
                ));
                if !has_reasoning {
                    output.push_str(&format!(
                        "{}\n",
                        "No member returned a reasoning trace; answers were ranked once.".dimmed()
                    ));
                }
            }
            StrategyExtras::WeightedVoting { model_weights } => {
                output.push_str(&Self::section_header("Critic Weights"));
                for (model, weight) in model_weights {
                    output.push_str(&format!("  {:<36} {:.3}\n", model.to_string(), weight));
                }
            }
        }
    }

    fn final_answer(output: &mut String, answer: &FinalAnswer) {
        if answer.is_error {
            output.push_str(&format!(
                "\n{}\n{}\n",
                format!("Chairman: {}", answer.model).red().bold(),
                answer.content.red()
            ));
        } else {
            output.push_str(&format!(
                "\n{}\n\n{}\n",
                format!("Chairman: {}", answer.model).yellow().bold(),
                answer.content
            ));
        }
    }

    fn format_full(result: &StrategyResult, title: Option<&str>) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("LLM Council Results"));
        output.push('\n');
        if let Some(title) = title {
            output.push_str(&format!("{} {}\n", "Conversation:".cyan().bold(), title));
        }
        output.push_str(&format!(
            "{} {}\n",
            "Strategy:".cyan().bold(),
            result.metadata.strategy.title()
        ));

        match &result.stage1 {
            Stage1::Responses(responses) => {
                output.push_str(&Self::section_header("Stage 1: Individual Responses"));
                Self::responses(&mut output, responses);

                output.push_str(&Self::section_header("Stage 2: Peer Rankings"));
                Self::critiques(&mut output, &result.stage2, &result.metadata.label_map);
            }
            Stage1::Rounds(rounds) => {
                for round in rounds {
                    output.push_str(&Self::section_header(&format!(
                        "Round {}: Responses",
                        round.round_number
                    )));
                    Self::responses(&mut output, &round.responses);

                    output.push_str(&Self::section_header(&format!(
                        "Round {}: Peer Rankings",
                        round.round_number
                    )));
                    Self::critiques(&mut output, &round.critiques, &round.label_map);
                    output.push('\n');
                    Self::aggregate(&mut output, &round.aggregate);
                }
            }
        }

        if let StrategyExtras::ReasoningAware {
            reasoning_critiques,
            ..
        } = &result.metadata.extras
            && !reasoning_critiques.is_empty()
        {
            output.push_str(&Self::section_header("Stage 2: Reasoning Rankings"));
            Self::critiques(&mut output, reasoning_critiques, &result.metadata.label_map);
        }

        Self::extras(&mut output, &result.metadata.extras);

        output.push_str(&Self::section_header("Aggregate Ranking"));
        Self::aggregate(&mut output, &result.metadata.aggregate);

        output.push_str(&Self::section_header("Stage 3: Final Synthesis"));
        Self::final_answer(&mut output, &result.stage3);

        output.push_str(&Self::footer());
        output
    }

    fn format_synthesis_only(result: &StrategyResult, title: Option<&str>) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== LLM Council Conclusion ===".cyan().bold()
        ));
        if let Some(title) = title {
            output.push_str(&format!("{} {}\n", "Conversation:".dimmed(), title));
        }
        output.push_str(&format!(
            "{} {}\n\n",
            "Strategy:".dimmed(),
            result.metadata.strategy.title()
        ));

        if !result.metadata.aggregate.is_empty() {
            output.push_str(&format!("{}\n", "Ranking:".bold()));
            Self::aggregate(&mut output, &result.metadata.aggregate);
        }

        Self::final_answer(&mut output, &result.stage3);
        output
    }

    // ==================== Helpers ====================

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn percent(value: f64) -> String {
        format!("{:.1}%", value * 100.0)
    }

    fn or_dash(value: Option<f64>) -> String {
        value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
    }

    fn feedback_label(feedback: Feedback) -> colored::ColoredString {
        match feedback {
            Feedback::Like => "like".green(),
            Feedback::Neutral => "neutral".normal(),
            Feedback::Dislike => "dislike".red(),
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_result(&self, result: &StrategyResult, title: Option<&str>) -> String {
        if self.full {
            Self::format_full(result, title)
        } else {
            Self::format_synthesis_only(result, title)
        }
    }

    fn format_comparison(&self, question: &str, runs: &[StrategyRun]) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Strategy Comparison"));
        output.push_str(&format!("\n{} {}\n", "Question:".cyan().bold(), question));

        for run in runs {
            output.push_str(&Self::section_header(run.strategy.title()));
            match &run.outcome {
                Ok(result) if self.full => {
                    output.push_str(&Self::format_full(result, None));
                }
                Ok(result) => {
                    Self::aggregate(&mut output, &result.metadata.aggregate);
                    Self::final_answer(&mut output, &result.stage3);
                }
                Err(e) => {
                    output.push_str(&format!("{} {}\n", "Failed:".red().bold(), e));
                }
            }
        }

        output.push_str(&Self::footer());
        output
    }

    fn format_strategies(&self, strategies: &[StrategyInfo]) -> String {
        let mut output = String::new();
        for info in strategies {
            output.push_str(&format!(
                "{} {}\n  {}\n",
                info.id.as_str().bold(),
                format!("({})", info.name).dimmed(),
                info.description
            ));
            for param in info.config_schema.params() {
                let bounds = match &param.kind {
                    ParamKind::Integer { min, max, default } => {
                        format!("integer {}..={}, default {}", min, max, default)
                    }
                    ParamKind::Number { min, max, default } => {
                        format!("number {}..={}, default {}", min, max, default)
                    }
                    ParamKind::Boolean { default } => format!("boolean, default {}", default),
                };
                output.push_str(&format!(
                    "    {} ({}): {}\n",
                    param.name.cyan(),
                    bounds,
                    param.description
                ));
            }
            output.push('\n');
        }
        output
    }

    fn format_recommendation(&self, recommendation: &Recommendation) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} {} ({})\n",
            "Recommended:".cyan().bold(),
            recommendation.strategy.title().bold(),
            recommendation.strategy
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Confidence: ".dimmed(),
            Self::percent(recommendation.confidence)
        ));
        output.push_str(&format!(
            "{} {}\n\n",
            "Query type: ".dimmed(),
            recommendation.query_category
        ));
        output.push_str(&recommendation.explanation);
        output.push('\n');

        if !recommendation.fallback_options.is_empty() {
            let fallbacks: Vec<&str> = recommendation
                .fallback_options
                .iter()
                .map(|kind| kind.as_str())
                .collect();
            output.push_str(&format!(
                "\n{} {}\n",
                "Alternatives:".dimmed(),
                fallbacks.join(", ")
            ));
        }
        if let Some(stats) = &recommendation.performance {
            output.push_str(&format!(
                "{} {} uses, average feedback {}\n",
                "History:     ".dimmed(),
                stats.count,
                Self::or_dash(stats.avg_feedback)
            ));
        }
        output
    }

    fn format_conversation_list(&self, conversations: &[ConversationMeta]) -> String {
        if conversations.is_empty() {
            return format!("{}\n", "No conversations yet.".dimmed());
        }
        let mut output = String::new();
        for meta in conversations {
            output.push_str(&format!(
                "{}  {}  {:>3} msgs  {}\n",
                meta.id.yellow(),
                meta.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
                meta.message_count,
                meta.title
            ));
        }
        output
    }

    fn format_conversation(&self, conversation: &Conversation) -> String {
        let mut output = String::new();
        output.push_str(&Self::header(&conversation.title));
        output.push_str(&format!(
            "\n{} {}  {} {}\n",
            "Id:".dimmed(),
            conversation.id,
            "Created:".dimmed(),
            conversation.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        for (index, message) in conversation.messages.iter().enumerate() {
            match message {
                Message::User { content } => {
                    output.push_str(&format!(
                        "\n{} {}\n{}\n",
                        format!("[{}]", index).dimmed(),
                        "You".cyan().bold(),
                        content
                    ));
                }
                Message::Assistant(answer) => {
                    let strategy = answer
                        .strategy()
                        .map(|kind| kind.title())
                        .unwrap_or("unknown strategy");
                    let mut heading = format!(
                        "{} {} {}",
                        format!("[{}]", index).dimmed(),
                        "Council".yellow().bold(),
                        format!("({})", strategy).dimmed()
                    );
                    if let Some(feedback) = answer.feedback {
                        heading.push_str(&format!(" [{}]", Self::feedback_label(feedback)));
                    }
                    output.push_str(&format!("\n{}\n", heading));

                    if self.full {
                        let result = StrategyResult {
                            stage1: answer.stage1.clone(),
                            stage2: answer.stage2.clone(),
                            stage3: answer.stage3.clone(),
                            metadata: answer.metadata.clone().unwrap_or_else(|| {
                                StrategyMetadata::new(
                                    StrategyKind::Simple,
                                    LabelMap::default(),
                                    Vec::new(),
                                )
                            }),
                        };
                        output.push_str(&Self::format_full(&result, None));
                    } else if answer.stage3.is_error {
                        output.push_str(&format!("{}\n", answer.stage3.content.red()));
                    } else {
                        output.push_str(&answer.stage3.content);
                        output.push('\n');
                    }
                }
            }
        }

        output.push_str(&Self::footer());
        output
    }

    fn format_summary(&self, summary: &PerformanceSummary) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Council Analytics"));
        output.push_str(&format!(
            "\n{} {} conversations, {} answers (computed {})\n",
            "Totals:".cyan().bold(),
            summary.total_conversations,
            summary.total_queries,
            summary.last_computed_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        output.push_str(&Self::section_header("Strategies"));
        if summary.strategy_stats.is_empty() {
            output.push_str(&format!("{}\n", "No answers recorded yet.".dimmed()));
        }
        for (name, stats) in &summary.strategy_stats {
            output.push_str(&format!(
                "  {:<20} {:>5} uses  avg feedback {:>5}  ({} rated)\n",
                name,
                stats.count,
                Self::or_dash(stats.avg_feedback),
                stats.feedback_scores.len()
            ));
        }

        output.push_str(&Self::section_header("Models"));
        if summary.model_stats.is_empty() {
            output.push_str(&format!("{}\n", "No rankings recorded yet.".dimmed()));
        }
        for (model, stats) in &summary.model_stats {
            output.push_str(&format!(
                "  {:<36} {:>4} evals  {:>4} wins  win rate {:>6}  avg rank {:>5}\n",
                model.to_string(),
                stats.total_evaluations,
                stats.wins,
                stats.win_rate.map_or_else(|| "-".to_string(), Self::percent),
                Self::or_dash(stats.avg_rank)
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    fn format_leaderboard(&self, entries: &[LeaderboardEntry]) -> String {
        if entries.is_empty() {
            return format!("{}\n", "No rankings recorded yet.".dimmed());
        }
        let mut output = String::new();
        for (i, entry) in entries.iter().enumerate() {
            let line = format!(
                "{:>3}. {:<36} win rate {:>6}  ({}/{})  avg rank {}",
                i + 1,
                entry.model.to_string(),
                Self::percent(entry.win_rate),
                entry.wins,
                entry.total_evaluations,
                Self::or_dash(entry.avg_rank)
            );
            if i == 0 {
                output.push_str(&format!("{}\n", line.green().bold()));
            } else {
                output.push_str(&format!("{}\n", line));
            }
        }
        output
    }

    fn format_model_stats(&self, model: &Model, stats: Option<&ModelStats>) -> String {
        let Some(stats) = stats else {
            return format!("{} {}\n", "No data for model".dimmed(), model);
        };
        let mut output = String::new();
        output.push_str(&format!("{}\n", model.to_string().bold()));
        output.push_str(&format!(
            "  evaluations {}  wins {}  top-3 {} ({})\n  win rate {}  avg rank {}\n",
            stats.total_evaluations,
            stats.wins,
            stats.top_3,
            Self::percent(stats.top_3_rate()),
            stats.win_rate.map_or_else(|| "-".to_string(), Self::percent),
            Self::or_dash(stats.avg_rank)
        ));
        if !stats.by_strategy.is_empty() {
            output.push_str(&format!("{}\n", "By strategy:".cyan()));
            for (strategy, breakdown) in &stats.by_strategy {
                output.push_str(&format!(
                    "  {:<20} {:>4} evals  {:>4} wins  avg rank {}\n",
                    strategy,
                    breakdown.evaluations,
                    breakdown.wins,
                    Self::or_dash(breakdown.avg_rank)
                ));
            }
        }
        output
    }

    fn format_strategy_stats(&self, strategy: &str, stats: Option<&StrategyStats>) -> String {
        let Some(stats) = stats else {
            return format!("{} {}\n", "No data for strategy".dimmed(), strategy);
        };
        format!(
            "{}\n  uses {}  rated {}  avg feedback {}\n",
            strategy.bold(),
            stats.count,
            stats.feedback_scores.len(),
            Self::or_dash(stats.avg_feedback)
        )
    }

    fn format_feedback(&self, conversation_id: &str, index: usize, feedback: Feedback) -> String {
        format!(
            "Recorded {} for message {} of conversation {}\n",
            Self::feedback_label(feedback),
            index,
            conversation_id
        )
    }
}
