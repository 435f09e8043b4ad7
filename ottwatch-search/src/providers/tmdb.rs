//! TMDb catalog provider.

use async_trait::async_trait;
use ottwatch_core::config::TmdbConfig;
use serde::de::DeserializeOwned;
use url::Url;

use super::CatalogProvider;
use crate::errors::{ConfigurationError, FetchError};
use crate::types::{DiscoverPage, DiscoverQuery, ExternalIds, MediaType};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Catalog provider backed by the TMDb v3 REST API.
///
/// Discovery requests always sort by release date descending and restrict
/// results to subscription-included titles in the configured market.
pub struct TmdbProvider {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    watch_region: String,
    monetization_type: &'static str,
}

impl std::fmt::Debug for TmdbProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbProvider")
            .field("base_url", &self.base_url.as_str())
            .field("watch_region", &self.watch_region)
            .finish_non_exhaustive()
    }
}

impl TmdbProvider {
    /// Create provider from configuration.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::MissingApiKey` - No API key configured
    /// - `ConfigurationError::InvalidBaseUrl` - Base URL does not parse
    pub fn from_config(config: &TmdbConfig) -> Result<Self, ConfigurationError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigurationError::MissingApiKey)?;

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| ConfigurationError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: format!("HTTP client setup failed: {e}"),
            })?;

        Self::with_client(client, config, api_key)
    }

    /// Create provider around an existing HTTP client.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::InvalidBaseUrl` - Base URL does not parse
    pub fn with_client(
        client: reqwest::Client,
        config: &TmdbConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        // Url::join drops the last segment unless the base ends with a slash
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');

        let base_url = Url::parse(&base).map_err(|e| ConfigurationError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
            watch_region: config.watch_region.clone(),
            monetization_type: config.monetization_type,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url.join(path).map_err(|e| FetchError::Network {
            reason: format!("Invalid endpoint '{path}': {e}"),
        })
    }

    /// Query parameters of a discovery request, in the order they are sent.
    fn discover_params(&self, query: &DiscoverQuery) -> Vec<(String, String)> {
        let date_field = query.media_type.date_filter_field();

        vec![
            ("api_key".to_string(), self.api_key.clone()),
            (
                "with_watch_providers".to_string(),
                query.provider_id.to_string(),
            ),
            ("watch_region".to_string(), self.watch_region.clone()),
            ("sort_by".to_string(), "release_date.desc".to_string()),
            ("page".to_string(), query.page.to_string()),
            (
                "with_watch_monetization_types".to_string(),
                self.monetization_type.to_string(),
            ),
            (
                format!("{date_field}.gte"),
                query.start.format(DATE_FORMAT).to_string(),
            ),
            (
                format!("{date_field}.lte"),
                query.end.format(DATE_FORMAT).to_string(),
            ),
        ]
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(String, String)],
    ) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                reason: format!("TMDb request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| FetchError::Parse {
            reason: format!("TMDb JSON parsing failed: {e}"),
        })
    }
}

#[async_trait]
impl CatalogProvider for TmdbProvider {
    async fn discover(&self, query: &DiscoverQuery) -> Result<DiscoverPage, FetchError> {
        let url = self.endpoint(&format!("discover/{}", query.media_type.as_path_segment()))?;
        let params = self.discover_params(query);

        tracing::trace!(media_type = %query.media_type, page = query.page, "TMDb discover request");
        self.get_json(url, &params).await
    }

    async fn external_ids(
        &self,
        media_type: MediaType,
        catalog_id: u64,
    ) -> Result<ExternalIds, FetchError> {
        let url = self.endpoint(&format!(
            "{}/{catalog_id}/external_ids",
            media_type.as_path_segment()
        ))?;
        let params = [("api_key".to_string(), self.api_key.clone())];

        self.get_json(url, &params).await
    }
}
