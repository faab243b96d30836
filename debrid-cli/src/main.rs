//! Debrid CLI - Command-line interface
//!
//! Operator access to tracker enrichment and the debrid provider.

mod commands;

use std::path::PathBuf;

use clap::Parser;
use debrid_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "debrid")]
#[command(about = "Tracker enrichment and debrid provider tooling")]
struct Cli {
    /// Console log level (RUST_LOG takes precedence)
    #[arg(long, value_enum, default_value_t = CliLogLevel::Warn, global = true)]
    log_level: CliLogLevel,

    /// Directory for the full trace log
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    if let Err(e) = commands::run_command(cli.command).await {
        tracing::error!("Command failed: {}", e);
        anyhow::bail!(e.user_message());
    }

    Ok(())
}
