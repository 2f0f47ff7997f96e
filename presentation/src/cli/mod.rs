//! Command-line interface definitions

pub mod commands;

pub use commands::{AnalyticsCommand, Cli, Command, ConversationsCommand, OutputFormat};
