//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Full formatted output with every stage
    Full,
    /// Only the final answer and the aggregate ranking
    #[default]
    Synthesis,
    /// JSON output
    Json,
}

/// CLI arguments for llm-council
#[derive(Parser, Debug)]
#[command(name = "llm-council")]
#[command(
    author,
    version,
    about = "LLM Council - several models answer, rank each other, and a chairman synthesizes"
)]
#[command(long_about = r#"
LLM Council sends your question to a council of models through OpenRouter.

Every strategy has three stages:
1. Collect: all members answer independently (in parallel)
2. Rank: members critique and rank the anonymized answers
3. Synthesize: a chairman model writes the final answer

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables (e.g. COUNCIL_PROVIDER__TIMEOUT_SECONDS=30)
2. --config <path>     Explicit config file
3. ./council.toml      Project-level config
4. ~/.config/llm-council/config.toml   Global config

Example:
  llm-council ask "What's the best way to handle errors in Rust?"
  llm-council ask --strategy multi_round --strategy-config '{"rounds": 3}' "Prove that √2 is irrational"
  llm-council compare -s simple -s weighted_voting "Compare Raft and Paxos"
  llm-council feedback 2b9c0e6e-... 1 1
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(short, long, value_enum, default_value = "synthesis", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Also write logs to daily-rotated files in this directory
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the available strategies and their tunables
    Strategies,

    /// Recommend a strategy for a question
    Recommend {
        /// The question to classify
        query: String,
    },

    /// Run several strategies on the same question side by side
    Compare {
        /// The question to ask the council
        query: String,

        /// Strategies to compare (can be specified multiple times)
        #[arg(short, long = "strategy", value_name = "STRATEGY", required = true)]
        strategies: Vec<String>,
    },

    /// Ask the council a question inside a conversation
    Ask {
        /// The question to ask the council
        query: String,

        /// Conversation to continue (a new one is created when omitted)
        #[arg(short, long, value_name = "ID")]
        conversation: Option<String>,

        /// Strategy to run (defaults to `strategies.default` from config)
        #[arg(short, long, value_name = "STRATEGY")]
        strategy: Option<String>,

        /// Tunable overrides as a JSON object, e.g. '{"rounds": 3}'
        #[arg(long, value_name = "JSON")]
        strategy_config: Option<String>,
    },

    /// Manage stored conversations
    #[command(subcommand)]
    Conversations(ConversationsCommand),

    /// Inspect performance analytics
    #[command(subcommand)]
    Analytics(AnalyticsCommand),

    /// Rate an answer: -1 (dislike), 0 (neutral) or 1 (like)
    Feedback {
        /// Conversation id
        conversation: String,

        /// Index of the assistant message within the conversation
        index: usize,

        /// Feedback value
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },

    /// Show configuration file locations and the effective configuration
    Config,
}

#[derive(Subcommand, Debug)]
pub enum ConversationsCommand {
    /// List conversations, newest first
    List,
    /// Show every message of a conversation
    Show {
        /// Conversation id
        id: String,
    },
    /// Create an empty conversation
    New,
}

#[derive(Subcommand, Debug)]
pub enum AnalyticsCommand {
    /// Totals plus per-strategy and per-model statistics
    Summary {
        /// Ignore cached results and rescan every conversation
        #[arg(long)]
        refresh: bool,
    },
    /// Models ordered by win rate
    Leaderboard {
        /// Number of entries
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
    /// Statistics for one model
    Model {
        /// OpenRouter model identifier, e.g. openai/gpt-5.1
        model: String,
    },
    /// Statistics for one strategy
    Strategy {
        /// Strategy identifier, e.g. multi_round
        strategy: String,
    },
}
