//! CLI entrypoint for llm-council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod app;

use anyhow::{Result, anyhow, bail};
use app::App;
use clap::Parser;
use council_infrastructure::{ConfigLoader, FileConfig};
use council_presentation::{Cli, Command};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref())?;

    info!("Starting llm-council");

    let config = load_config(&cli)?;

    if matches!(cli.command, Command::Config) {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        println!();
        println!("{}", app::effective_config(&config)?);
        return Ok(());
    }

    let issues = config.validate();
    if !issues.is_empty() {
        let lines: Vec<String> = issues.iter().map(|i| format!("  - {}", i)).collect();
        bail!("Invalid configuration:\n{}", lines.join("\n"));
    }

    // Ctrl-C stops in-flight model calls; a cancelled run persists nothing
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Received Ctrl+C, cancelling");
                on_signal.cancel();
            }
            Err(e) => warn!("Could not listen for Ctrl+C: {}", e),
        }
    });

    let app = App::new(config, cli.output, cli.quiet);
    app.run(cli.command, &cancel).await
}

/// Initialize logging based on verbosity level, optionally mirrored to daily files
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "llm-council.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(guard)
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_deref())
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))
}
