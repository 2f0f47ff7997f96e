//! Output formatting
//!
//! - [`ConsoleFormatter`]: colored text, synthesis-only or full
//! - [`JsonFormatter`]: one JSON document per command

pub mod console;
pub mod formatter;
pub mod json;

pub use console::ConsoleFormatter;
pub use formatter::OutputFormatter;
pub use json::JsonFormatter;

use crate::cli::OutputFormat;

/// Formatter for the selected output format
pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Full => Box::new(ConsoleFormatter::full()),
        OutputFormat::Synthesis => Box::new(ConsoleFormatter::new()),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
