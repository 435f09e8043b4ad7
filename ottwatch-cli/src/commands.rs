//! CLI command implementations

use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use ottwatch_core::OttwatchConfig;
use ottwatch_core::settings::{
    JsonFileStore, Settings, SettingsRequest, SettingsResponse, SettingsStore, handle_request,
    initialize_defaults,
};
use ottwatch_search::{AggregationOrchestrator, ReleaseRenderer};
use serde_json::Value;

use crate::render::{JsonRenderer, TerminalRenderer};

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show releases newly available on a streaming platform
    Releases {
        /// Days to look back (max 365); defaults to the stored value
        #[arg(short, long, allow_negative_numbers = true)]
        days: Option<i64>,
        /// Platform: Netflix, "Prime Video" or Hotstar; defaults to the stored value
        #[arg(short, long)]
        platform: Option<String>,
        /// Do not persist the days and platform used for this run
        #[arg(long)]
        no_save: bool,
        /// Print one JSON document instead of text
        #[arg(long)]
        json: bool,
    },
    /// Read or write persisted settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

/// Settings subcommands
#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Print the stored value of a key
    Get {
        /// Key such as lookbackDays or platformId
        key: String,
    },
    /// Store a value; parsed as JSON when possible, else kept as text
    Set {
        /// Key such as lookbackDays or platformId
        key: String,
        /// New value
        value: String,
    },
    /// Seed default values that are not set yet
    Init,
}

/// How a command ended once its output has been rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every section was rendered, possibly with section-scoped errors
    Completed,
    /// A global error was rendered in place of the sections
    Aborted,
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Completed => ExitCode::SUCCESS,
            RunStatus::Aborted => ExitCode::FAILURE,
        }
    }
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands, config: OttwatchConfig) -> Result<RunStatus> {
    let store = JsonFileStore::new(&config.storage.settings_path);

    match command {
        Commands::Releases {
            days,
            platform,
            no_save,
            json,
        } => show_releases(&config, &store, days, platform, !no_save, json).await,
        Commands::Settings { action } => {
            manage_settings(&store, action).await?;
            Ok(RunStatus::Completed)
        }
    }
}

/// Resolve the run settings from arguments and storage, then fetch and render.
///
/// Configuration problems are rendered as a global error and reported through
/// [`RunStatus::Aborted`] rather than as an `Err`.
///
/// # Errors
/// - Settings could not be read or written
pub async fn show_releases(
    config: &OttwatchConfig,
    store: &dyn SettingsStore,
    days: Option<i64>,
    platform: Option<String>,
    save: bool,
    json: bool,
) -> Result<RunStatus> {
    let stored = Settings::load(store)
        .await
        .context("Failed to load settings")?;

    let settings = Settings::for_request(
        days.or(Some(i64::from(stored.lookback_days))),
        platform.unwrap_or(stored.platform_id),
    );

    if save {
        settings
            .save(store)
            .await
            .context("Failed to save settings")?;
    }

    tracing::info!(
        days = settings.lookback_days,
        platform = %settings.platform_id,
        "Fetching releases"
    );

    if json {
        let mut renderer = JsonRenderer::new();
        let status = render_run(config, &settings, &mut renderer).await;
        println!("{}", serde_json::to_string_pretty(&renderer.into_value())?);
        Ok(status)
    } else {
        let stdout = std::io::stdout();
        let mut renderer = TerminalRenderer::new(stdout.lock(), config.display.imdb_base_url.clone());
        Ok(render_run(config, &settings, &mut renderer).await)
    }
}

/// Build the pipeline from `config` and run it into `renderer`.
async fn render_run(
    config: &OttwatchConfig,
    settings: &Settings,
    renderer: &mut dyn ReleaseRenderer,
) -> RunStatus {
    let orchestrator = match AggregationOrchestrator::from_config(config) {
        Ok(orchestrator) => orchestrator,
        Err(error) => {
            tracing::error!(error = %error, "Catalog client could not be configured");
            renderer.render_global_error(&error.to_string());
            return RunStatus::Aborted;
        }
    };

    match orchestrator
        .run(
            i64::from(settings.lookback_days),
            &settings.platform_id,
            renderer,
        )
        .await
    {
        Ok(summary) => {
            let failed = summary.failed_sections();
            if failed > 0 {
                tracing::warn!(failed, "Some sections could not be fetched");
            }
            RunStatus::Completed
        }
        // Already rendered as the global error
        Err(_) => RunStatus::Aborted,
    }
}

/// Serve a settings subcommand through the settings request protocol.
///
/// # Errors
/// - Settings storage could not be read or written
pub async fn manage_settings(store: &dyn SettingsStore, action: SettingsAction) -> Result<()> {
    let request = match action {
        SettingsAction::Init => {
            if initialize_defaults(store).await? {
                println!("Default settings initialized");
            } else {
                println!("Settings already initialized");
            }
            return Ok(());
        }
        SettingsAction::Get { key } => SettingsRequest::GetKey { key },
        SettingsAction::Set { key, value } => SettingsRequest::SetKey {
            key,
            value: parse_value(&value),
        },
    };

    match handle_request(store, request).await? {
        SettingsResponse::Value { value: Some(value) } => println!("{value}"),
        SettingsResponse::Value { value: None } => println!("(not set)"),
        SettingsResponse::Ack { success: true } => println!("Saved"),
        SettingsResponse::Ack { success: false } => bail!("Settings store rejected the update"),
    }
    Ok(())
}

/// `30` becomes a number, `Hotstar` stays text.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
