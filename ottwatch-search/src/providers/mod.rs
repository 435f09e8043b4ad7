//! Catalog provider implementations.

use async_trait::async_trait;

use crate::errors::FetchError;
use crate::types::{DiscoverPage, DiscoverQuery, ExternalIds, MediaType};

#[cfg(test)]
pub mod mock;
pub mod tmdb;

#[cfg(test)]
pub use mock::MockCatalogProvider;
pub use tmdb::TmdbProvider;

/// Trait for movie/TV catalog backends.
///
/// Implementations answer discovery page queries and per-item external id
/// lookups. Each call is a single attempt; callers decide how failures
/// propagate.
#[async_trait]
pub trait CatalogProvider: Send + Sync + std::fmt::Debug {
    /// Fetch one page of releases matching `query`.
    ///
    /// # Errors
    /// - `FetchError::HttpStatus` - Server answered with a non-success status
    /// - `FetchError::Network` - Request could not be completed
    /// - `FetchError::Parse` - Response body was malformed
    async fn discover(&self, query: &DiscoverQuery) -> Result<DiscoverPage, FetchError>;

    /// Look up external identifiers for one catalog item.
    ///
    /// # Errors
    /// - `FetchError::HttpStatus` - Server answered with a non-success status
    /// - `FetchError::Network` - Request could not be completed
    /// - `FetchError::Parse` - Response body was malformed
    async fn external_ids(
        &self,
        media_type: MediaType,
        catalog_id: u64,
    ) -> Result<ExternalIds, FetchError>;
}
