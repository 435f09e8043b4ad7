//! Ottwatch CLI - Command-line interface
//!
//! Lists regional-language movies and series recently added to a streaming
//! platform, and manages the stored lookback and platform settings.

mod commands;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ottwatch_core::OttwatchConfig;
use ottwatch_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "ottwatch")]
#[command(about = "Track new regional releases on streaming platforms")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Console log level
    #[arg(long, value_enum, default_value_t = CliLogLevel::Warn, global = true)]
    log_level: CliLogLevel,

    /// Directory for the full debug log of the last run
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    /// Settings file, overrides OTTWATCH_SETTINGS_PATH
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref())?;

    let mut config = OttwatchConfig::from_env();
    if let Some(path) = cli.settings {
        config.storage.settings_path = path;
    }

    let status = commands::handle_command(cli.command, config).await?;
    Ok(status.into())
}
