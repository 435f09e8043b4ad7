//! Persisted key-value settings.
//!
//! Settings live outside the release pipeline: the pipeline receives the
//! lookback and platform as plain inputs and never writes them back. Callers
//! load them through a [`SettingsStore`], and the small request/response
//! protocol in this module lets other components read or write single keys.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::{DEFAULT_LOOKBACK_DAYS, DEFAULT_PLATFORM, MAX_LOOKBACK_DAYS};
use crate::{OttwatchError, Result};

/// Storage key for the lookback window length.
pub const LOOKBACK_DAYS_KEY: &str = "lookbackDays";

/// Storage key for the selected streaming platform.
pub const PLATFORM_ID_KEY: &str = "platformId";

/// Key-value backend for persisted settings.
#[async_trait]
pub trait SettingsStore: Send + Sync + std::fmt::Debug {
    /// Reads a single key, `None` when it has never been set.
    ///
    /// # Errors
    /// - `OttwatchError::Io` - Backing storage could not be read
    /// - `OttwatchError::Json` - Backing storage is corrupt
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Writes a single key, replacing any previous value.
    ///
    /// # Errors
    /// - `OttwatchError::Io` - Backing storage could not be written
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// User-selected settings for a release run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub lookback_days: u32,
    pub platform_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            platform_id: DEFAULT_PLATFORM.to_string(),
        }
    }
}

impl Settings {
    /// Loads settings, falling back to the default for each missing or
    /// malformed key.
    ///
    /// # Errors
    /// - Any error from the underlying store
    pub async fn load(store: &dyn SettingsStore) -> Result<Self> {
        let defaults = Self::default();

        let lookback_days = store
            .get(LOOKBACK_DAYS_KEY)
            .await?
            .and_then(|value| value.as_u64())
            .filter(|days| *days > 0)
            .map(|days| days.min(u64::from(u32::MAX)) as u32)
            .unwrap_or(defaults.lookback_days);

        let platform_id = store
            .get(PLATFORM_ID_KEY)
            .await?
            .and_then(|value| value.as_str().map(str::to_string))
            .filter(|platform| !platform.trim().is_empty())
            .unwrap_or(defaults.platform_id);

        Ok(Self {
            lookback_days,
            platform_id,
        })
    }

    /// Persists both keys.
    ///
    /// # Errors
    /// - Any error from the underlying store
    pub async fn save(&self, store: &dyn SettingsStore) -> Result<()> {
        store
            .set(LOOKBACK_DAYS_KEY, Value::from(self.lookback_days))
            .await?;
        store
            .set(PLATFORM_ID_KEY, Value::from(self.platform_id.clone()))
            .await?;

        tracing::debug!(
            lookback_days = self.lookback_days,
            platform = %self.platform_id,
            "Settings saved"
        );
        Ok(())
    }

    /// Builds the settings for a user-triggered run.
    ///
    /// Missing or non-positive day counts fall back to the default; anything
    /// above the maximum lookback is clamped down to it.
    pub fn for_request(days: Option<i64>, platform_id: impl Into<String>) -> Self {
        let lookback_days = match days {
            Some(days) if days > 0 => days.min(i64::from(MAX_LOOKBACK_DAYS)) as u32,
            _ => DEFAULT_LOOKBACK_DAYS,
        };

        Self {
            lookback_days,
            platform_id: platform_id.into(),
        }
    }
}

/// First-run hook: seeds the lookback default without touching existing values.
///
/// # Errors
/// - Any error from the underlying store
pub async fn initialize_defaults(store: &dyn SettingsStore) -> Result<bool> {
    let existing = store
        .get(LOOKBACK_DAYS_KEY)
        .await?
        .filter(|value| value.as_u64().is_some_and(|days| days > 0));

    if existing.is_some() {
        return Ok(false);
    }

    store
        .set(LOOKBACK_DAYS_KEY, Value::from(DEFAULT_LOOKBACK_DAYS))
        .await?;
    tracing::info!("Default lookback days value initialized");
    Ok(true)
}

/// Message asking the settings owner to read or write one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum SettingsRequest {
    GetKey { key: String },
    SetKey { key: String, value: Value },
}

/// Reply to a [`SettingsRequest`].
///
/// Variants decode in order and `Value` accepts any object, so `Ack` stays first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingsResponse {
    Ack { success: bool },
    Value { value: Option<Value> },
}

/// Serves one settings request against the store.
///
/// # Errors
/// - Any error from the underlying store
pub async fn handle_request(
    store: &dyn SettingsStore,
    request: SettingsRequest,
) -> Result<SettingsResponse> {
    match request {
        SettingsRequest::GetKey { key } => {
            let value = store.get(&key).await?;
            Ok(SettingsResponse::Value { value })
        }
        SettingsRequest::SetKey { key, value } => {
            if key.trim().is_empty() {
                return Err(OttwatchError::Settings {
                    reason: "key must not be empty".to_string(),
                });
            }
            store.set(&key, value).await?;
            Ok(SettingsResponse::Ack { success: true })
        }
    }
}

/// Settings stored as a single JSON object on disk.
///
/// Writes go to a sibling temporary file first and are renamed into place, so
/// a crash mid-write never leaves a truncated settings file behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFileStore {
    /// Creates a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    async fn read_all(&self) -> Result<BTreeMap<String, Value>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, entries: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&temp_path, bytes).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.read().await;
        let mut entries = self.read_all().await?;
        Ok(entries.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.lock.write().await;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries).await
    }
}

/// In-memory settings, used by tests and one-off runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}
