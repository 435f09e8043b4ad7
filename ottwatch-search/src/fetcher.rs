//! Paginated release discovery for one language and media type.

use std::sync::Arc;

use futures::future::join_all;
use ottwatch_core::config::MAX_DISCOVERY_PAGES;

use crate::date_window::{DateWindow, compute_window};
use crate::errors::FetchError;
use crate::providers::CatalogProvider;
use crate::resolver::SecondaryIdResolver;
use crate::types::{DiscoverQuery, MediaType, ReleaseItem};

/// Default cap on discovery pages per request.
pub const DEFAULT_MAX_PAGES: u32 = MAX_DISCOVERY_PAGES;

/// Everything that determines one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Original-language code results must match, e.g. `hi`
    pub language_code: String,
    /// Movie or series discovery
    pub media_type: MediaType,
    /// Days to look back from today
    pub lookback_days: i64,
    /// Watch-provider id of the streaming platform
    pub provider_id: u32,
}

/// Drives discovery pages and enriches matching records.
///
/// Pages are requested one after another. Within a page, the cross-reference
/// lookups of all matching records run concurrently and each writes only into
/// its own record, so nothing is shared between them.
#[derive(Debug, Clone)]
pub struct ReleaseFetcher {
    provider: Arc<dyn CatalogProvider>,
    resolver: SecondaryIdResolver,
    max_pages: u32,
}

impl ReleaseFetcher {
    /// Fetcher with the default page cap.
    pub fn new(provider: Arc<dyn CatalogProvider>) -> Self {
        Self::with_max_pages(provider, DEFAULT_MAX_PAGES)
    }

    /// Fetcher that stops after `max_pages` pages (at least one).
    pub fn with_max_pages(provider: Arc<dyn CatalogProvider>, max_pages: u32) -> Self {
        Self {
            resolver: SecondaryIdResolver::new(Arc::clone(&provider)),
            provider,
            max_pages: max_pages.max(1),
        }
    }

    /// Page cap in effect.
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Fetch releases for the window ending today.
    ///
    /// # Errors
    ///
    /// - `FetchError` - A discovery page failed; no partial results are returned
    pub async fn fetch_releases(&self, request: &FetchRequest) -> Result<Vec<ReleaseItem>, FetchError> {
        let window = compute_window(request.lookback_days);
        self.fetch_in_window(request, window).await
    }

    /// Fetch releases for an already computed window.
    ///
    /// # Errors
    ///
    /// - `FetchError` - A discovery page failed; no partial results are returned
    pub async fn fetch_in_window(
        &self,
        request: &FetchRequest,
        window: DateWindow,
    ) -> Result<Vec<ReleaseItem>, FetchError> {
        let media_type = request.media_type;
        let mut releases = Vec::new();

        for page in 1..=self.max_pages {
            let query = DiscoverQuery {
                media_type,
                provider_id: request.provider_id,
                start: window.start(),
                end: window.end(),
                page,
            };

            let response = self.provider.discover(&query).await.inspect_err(|e| {
                tracing::error!(
                    language = %request.language_code,
                    media_type = %media_type,
                    page,
                    error = %e,
                    "Discovery page failed"
                );
            })?;

            let total_pages = response.total_pages;
            let candidates: Vec<_> = response
                .results
                .into_iter()
                .filter(|record| record.original_language == request.language_code)
                .collect();

            tracing::debug!(
                language = %request.language_code,
                media_type = %media_type,
                page,
                total_pages,
                matching = candidates.len(),
                "Fetched discovery page"
            );

            let resolver = &self.resolver;
            let enriched = join_all(candidates.into_iter().map(|record| async move {
                let imdb_id = resolver.resolve(record.id, media_type).await;
                ReleaseItem::from_record(record, imdb_id)
            }))
            .await;
            releases.extend(enriched);

            if page >= total_pages {
                break;
            }
            if page == self.max_pages {
                tracing::debug!(
                    total_pages,
                    max_pages = self.max_pages,
                    "Page cap reached, remaining pages skipped"
                );
            }
        }

        tracing::info!(
            language = %request.language_code,
            media_type = %media_type,
            total = releases.len(),
            "Total results fetched"
        );

        Ok(releases)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::date_window::compute_window_from;
    use crate::providers::MockCatalogProvider;
    use crate::providers::mock::{movie, page, series};

    fn request(language: &str, media_type: MediaType) -> FetchRequest {
        FetchRequest {
            language_code: language.to_string(),
            media_type,
            lookback_days: 30,
            provider_id: 8,
        }
    }

    fn window() -> DateWindow {
        compute_window_from(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(), 30)
    }

    #[tokio::test]
    async fn test_filters_by_original_language() {
        let provider = Arc::new(MockCatalogProvider::new().with_page(
            MediaType::Movie,
            page(
                1,
                1,
                vec![
                    movie(1, "hi", "2024-03-20"),
                    movie(2, "en", "2024-03-19"),
                    movie(3, "hi", "2024-03-18"),
                    movie(4, "te", "2024-03-17"),
                ],
            ),
        ));
        let fetcher = ReleaseFetcher::new(provider.clone());

        let releases = fetcher
            .fetch_in_window(&request("hi", MediaType::Movie), window())
            .await
            .unwrap();

        assert_eq!(releases.len(), 2);
        assert!(releases.iter().all(|item| item.original_language == "hi"));
        assert_eq!(releases[0].imdb_id.as_deref(), Some("tt1"));
        // Only matching candidates are looked up
        assert_eq!(
            provider.external_id_calls(),
            vec![(MediaType::Movie, 1), (MediaType::Movie, 3)]
        );
    }

    #[tokio::test]
    async fn test_query_carries_window_and_provider() {
        let provider = Arc::new(MockCatalogProvider::new());
        let fetcher = ReleaseFetcher::new(provider.clone());
        let mut req = request("te", MediaType::Series);
        req.provider_id = 119;

        fetcher.fetch_in_window(&req, window()).await.unwrap();

        let calls = provider.discover_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].provider_id, 119);
        assert_eq!(calls[0].media_type, MediaType::Series);
        assert_eq!(calls[0].start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(calls[0].end, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(calls[0].page, 1);
    }

    #[tokio::test]
    async fn test_accumulates_until_last_page() {
        let provider = Arc::new(
            MockCatalogProvider::new()
                .with_page(MediaType::Series, page(1, 3, vec![series(10, "te", "2024-03-30")]))
                .with_page(MediaType::Series, page(2, 3, vec![series(11, "en", "2024-03-20")]))
                .with_page(MediaType::Series, page(3, 3, vec![series(12, "te", "2024-03-10")])),
        );
        let fetcher = ReleaseFetcher::new(provider.clone());

        let releases = fetcher
            .fetch_in_window(&request("te", MediaType::Series), window())
            .await
            .unwrap();

        let ids: Vec<u64> = releases.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![10, 12]);
        let pages: Vec<u32> = provider.discover_calls().iter().map(|q| q.page).collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_truncates_at_max_pages() {
        let mut mock = MockCatalogProvider::new();
        for number in 1..=25 {
            mock = mock.with_page(
                MediaType::Movie,
                page(number, 500, vec![movie(u64::from(number), "en", "2024-03-15")]),
            );
        }
        let provider = Arc::new(mock);
        let fetcher = ReleaseFetcher::new(provider.clone());

        let releases = fetcher
            .fetch_in_window(&request("en", MediaType::Movie), window())
            .await
            .unwrap();

        assert_eq!(provider.discover_calls().len(), 20);
        assert_eq!(releases.len(), 20);
    }

    #[tokio::test]
    async fn test_custom_page_cap() {
        let provider = Arc::new(
            MockCatalogProvider::new()
                .with_page(MediaType::Movie, page(1, 9, Vec::new()))
                .with_page(MediaType::Movie, page(2, 9, Vec::new())),
        );
        let fetcher = ReleaseFetcher::with_max_pages(provider.clone(), 2);

        fetcher
            .fetch_in_window(&request("en", MediaType::Movie), window())
            .await
            .unwrap();

        assert_eq!(provider.discover_calls().len(), 2);
        assert_eq!(ReleaseFetcher::with_max_pages(provider, 0).max_pages(), 1);
    }

    #[tokio::test]
    async fn test_empty_pages_are_not_errors() {
        let provider = Arc::new(
            MockCatalogProvider::new()
                .with_page(MediaType::Movie, page(1, 2, Vec::new()))
                .with_page(MediaType::Movie, page(2, 2, vec![movie(5, "hi", "2024-03-02")])),
        );
        let fetcher = ReleaseFetcher::new(provider);

        let releases = fetcher
            .fetch_in_window(&request("hi", MediaType::Movie), window())
            .await
            .unwrap();

        assert_eq!(releases.len(), 1);
    }

    #[tokio::test]
    async fn test_page_failure_discards_partial_results() {
        let provider = Arc::new(
            MockCatalogProvider::new()
                .with_page(MediaType::Movie, page(1, 3, vec![movie(1, "hi", "2024-03-20")]))
                .with_discover_failure(1, FetchError::HttpStatus { status: 503 }),
        );
        let fetcher = ReleaseFetcher::new(provider.clone());

        let error = fetcher
            .fetch_in_window(&request("hi", MediaType::Movie), window())
            .await
            .unwrap_err();

        assert_eq!(error, FetchError::HttpStatus { status: 503 });
        // Page 3 is never requested
        assert_eq!(provider.discover_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_lookup_keeps_item() {
        let provider = Arc::new(
            MockCatalogProvider::new()
                .with_page(
                    MediaType::Movie,
                    page(
                        1,
                        1,
                        vec![movie(1, "hi", "2024-03-20"), movie(2, "hi", "2024-03-21")],
                    ),
                )
                .with_external_ids(2, Err(FetchError::HttpStatus { status: 500 })),
        );
        let fetcher = ReleaseFetcher::new(provider);

        let releases = fetcher
            .fetch_in_window(&request("hi", MediaType::Movie), window())
            .await
            .unwrap();

        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].imdb_id.as_deref(), Some("tt1"));
        assert_eq!(releases[1].imdb_id, None);
    }

    #[tokio::test]
    async fn test_lookups_within_page_run_concurrently() {
        let records = (1..=5).map(|id| movie(id, "en", "2024-03-20")).collect();
        let provider = Arc::new(
            MockCatalogProvider::new().with_page(MediaType::Movie, page(1, 1, records)),
        );
        let fetcher = ReleaseFetcher::new(provider.clone());

        let releases = fetcher
            .fetch_in_window(&request("en", MediaType::Movie), window())
            .await
            .unwrap();

        assert_eq!(releases.len(), 5);
        assert_eq!(provider.max_concurrent_lookups(), 5);
        // Enrichment keeps page order
        let ids: Vec<u64> = releases.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }
}
