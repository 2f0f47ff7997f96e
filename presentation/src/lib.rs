//! Presentation layer for llm-council
//!
//! This crate contains CLI definitions, output formatters
//! and progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::{AnalyticsCommand, Cli, Command, ConversationsCommand, OutputFormat};
pub use output::{ConsoleFormatter, JsonFormatter, OutputFormatter, formatter_for};
pub use progress::{ProgressReporter, SimpleProgress};
