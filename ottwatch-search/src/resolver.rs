//! Cross-reference id lookup.

use std::sync::Arc;

use crate::errors::ResolutionFailure;
use crate::providers::CatalogProvider;
use crate::types::MediaType;

/// Resolves a catalog id to its IMDb id.
///
/// One request per call, no retries. Failures are logged and reported as an
/// absent id so a single bad lookup never aborts the batch it belongs to.
#[derive(Debug, Clone)]
pub struct SecondaryIdResolver {
    provider: Arc<dyn CatalogProvider>,
}

impl SecondaryIdResolver {
    /// Resolver issuing lookups through `provider`.
    pub fn new(provider: Arc<dyn CatalogProvider>) -> Self {
        Self { provider }
    }

    /// Cross-reference id for `catalog_id`, `None` when the catalog has none
    /// or the lookup failed.
    pub async fn resolve(&self, catalog_id: u64, media_type: MediaType) -> Option<String> {
        match self.try_resolve(catalog_id, media_type).await {
            Ok(imdb_id) => imdb_id,
            Err(failure) => {
                tracing::warn!(
                    catalog_id,
                    media_type = %media_type,
                    error = %failure.source,
                    "Error fetching IMDb ID"
                );
                None
            }
        }
    }

    async fn try_resolve(
        &self,
        catalog_id: u64,
        media_type: MediaType,
    ) -> Result<Option<String>, ResolutionFailure> {
        let ids = self
            .provider
            .external_ids(media_type, catalog_id)
            .await
            .map_err(|source| ResolutionFailure { catalog_id, source })?;

        Ok(ids.imdb_id.filter(|id| !id.trim().is_empty()))
    }
}
