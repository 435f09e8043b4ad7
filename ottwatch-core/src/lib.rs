//! Ottwatch Core - Configuration, settings and diagnostics
//!
//! This crate provides the pieces every Ottwatch component shares: the
//! explicit configuration object handed to each release pipeline run, the
//! persisted key-value settings store, and tracing setup.

pub mod config;
pub mod settings;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::{DEFAULT_LOOKBACK_DAYS, DEFAULT_PLATFORM, MAX_LOOKBACK_DAYS, OttwatchConfig};
pub use settings::{JsonFileStore, MemoryStore, Settings, SettingsStore};

/// Core errors that can bubble up from any Ottwatch subsystem.
///
/// High-level error types representing failures outside the release pipeline
/// itself: configuration problems and settings persistence.
#[derive(Debug, thiserror::Error)]
pub enum OttwatchError {
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("Settings error: {reason}")]
    Settings { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OttwatchError>;
