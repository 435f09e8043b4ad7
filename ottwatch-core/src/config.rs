//! Centralized configuration for Ottwatch.
//!
//! All tunable parameters are defined here and passed explicitly into each
//! pipeline run. Nothing in the crate keeps a process-wide API key.

use std::path::PathBuf;

/// Upper bound on the lookback window, in days.
pub const MAX_LOOKBACK_DAYS: u32 = 365;

/// Lookback used when nothing has been stored yet.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;

/// Upper bound on discovery pages fetched per language and media type.
pub const MAX_DISCOVERY_PAGES: u32 = 20;

/// Platform selected when nothing has been stored yet.
pub const DEFAULT_PLATFORM: &str = "Netflix";

/// Central configuration for all Ottwatch components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct OttwatchConfig {
    pub tmdb: TmdbConfig,
    pub display: DisplayConfig,
    pub storage: StorageConfig,
}

/// Catalog API configuration.
///
/// Controls where discovery and cross-reference requests go and which fixed
/// query parameters they carry.
#[derive(Clone)]
pub struct TmdbConfig {
    /// API key sent as `api_key` on every request
    pub api_key: Option<String>,
    /// Base URL of the v3 API, without trailing slash
    pub base_url: String,
    /// Market the watch-provider filter applies to
    pub watch_region: String,
    /// Monetization filter, subscription-included content only
    pub monetization_type: &'static str,
    /// Maximum discovery pages fetched per language and media type
    pub max_pages: u32,
    /// User agent for HTTP requests
    pub user_agent: &'static str,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.themoviedb.org/3".to_string(),
            watch_region: "IN".to_string(),
            monetization_type: "flatrate",
            max_pages: MAX_DISCOVERY_PAGES,
            user_agent: "ottwatch/0.1.0",
        }
    }
}

// Keeps the key out of debug logs.
impl std::fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("watch_region", &self.watch_region)
            .field("monetization_type", &self.monetization_type)
            .field("max_pages", &self.max_pages)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Presentation configuration.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Prefix joined with a cross-reference id to build a title link
    pub imdb_base_url: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            imdb_base_url: "https://www.imdb.com/title/".to_string(),
        }
    }
}

/// Settings persistence configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// JSON file holding the persisted key-value settings
    pub settings_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            settings_path: base.join(".config").join("ottwatch").join("settings.json"),
        }
    }
}

impl OttwatchConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(api_key) = std::env::var("OTTWATCH_TMDB_API_KEY") {
            config.tmdb.api_key = Some(api_key);
        }

        if let Ok(base_url) = std::env::var("OTTWATCH_TMDB_BASE_URL") {
            config.tmdb.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Ok(region) = std::env::var("OTTWATCH_WATCH_REGION") {
            config.tmdb.watch_region = region;
        }

        if let Ok(max_pages) = std::env::var("OTTWATCH_MAX_PAGES") {
            if let Ok(pages) = max_pages.parse::<u32>() {
                config.tmdb.max_pages = pages.clamp(1, MAX_DISCOVERY_PAGES);
            }
        }

        if let Ok(path) = std::env::var("OTTWATCH_SETTINGS_PATH") {
            config.storage.settings_path = PathBuf::from(path);
        }

        config
    }

    /// Creates a configuration pointed at a local test server.
    pub fn for_testing(base_url: impl Into<String>) -> Self {
        Self {
            tmdb: TmdbConfig {
                api_key: Some("test-key".to_string()),
                base_url: base_url.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
