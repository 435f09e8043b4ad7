//! Scripted provider implementation for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::CatalogProvider;
use crate::errors::FetchError;
use crate::types::{CatalogRecord, DiscoverPage, DiscoverQuery, ExternalIds, MediaType};

/// Scripted catalog for tests.
///
/// Unscripted discovery pages come back empty with a single total page;
/// unscripted external id lookups succeed with `tt{id}`.
#[derive(Debug, Default)]
pub struct MockCatalogProvider {
    pages: HashMap<(MediaType, u32), DiscoverPage>,
    discover_failures: HashMap<usize, FetchError>,
    external_ids: HashMap<u64, Result<ExternalIds, FetchError>>,
    discover_calls: Mutex<Vec<DiscoverQuery>>,
    external_id_calls: Mutex<Vec<(MediaType, u64)>>,
    in_flight_lookups: AtomicUsize,
    max_in_flight_lookups: AtomicUsize,
}

impl MockCatalogProvider {
    /// Provider with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `page` for every discovery query on `media_type` with that page number.
    pub fn with_page(mut self, media_type: MediaType, page: DiscoverPage) -> Self {
        self.pages.insert((media_type, page.page), page);
        self
    }

    /// Fail the `call_index`-th discovery call (0-based, across all queries).
    pub fn with_discover_failure(mut self, call_index: usize, error: FetchError) -> Self {
        self.discover_failures.insert(call_index, error);
        self
    }

    /// Answer lookups for `catalog_id` with `result`.
    pub fn with_external_ids(
        mut self,
        catalog_id: u64,
        result: Result<ExternalIds, FetchError>,
    ) -> Self {
        self.external_ids.insert(catalog_id, result);
        self
    }

    /// Discovery queries received so far, in order.
    ///
    /// # Panics
    /// Panics if a recording thread panicked while holding the log.
    pub fn discover_calls(&self) -> Vec<DiscoverQuery> {
        self.discover_calls.lock().unwrap().clone()
    }

    /// External id lookups received so far, in order.
    ///
    /// # Panics
    /// Panics if a recording thread panicked while holding the log.
    pub fn external_id_calls(&self) -> Vec<(MediaType, u64)> {
        self.external_id_calls.lock().unwrap().clone()
    }

    /// Highest number of lookups that were awaiting at the same time.
    pub fn max_concurrent_lookups(&self) -> usize {
        self.max_in_flight_lookups.load(Ordering::SeqCst)
    }
}

/// Builds a discovery page of `total_pages` holding `results`.
pub fn page(number: u32, total_pages: u32, results: Vec<CatalogRecord>) -> DiscoverPage {
    DiscoverPage {
        page: number,
        total_results: results.len() as u32,
        results,
        total_pages,
    }
}

/// Builds a movie record released on `date` (`YYYY-MM-DD`).
pub fn movie(id: u64, language: &str, date: &str) -> CatalogRecord {
    CatalogRecord {
        id,
        title: Some(format!("Movie {id}")),
        name: None,
        original_language: language.to_string(),
        release_date: chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
        first_air_date: None,
        vote_average: 7.0,
    }
}

/// Builds a series record first aired on `date` (`YYYY-MM-DD`).
pub fn series(id: u64, language: &str, date: &str) -> CatalogRecord {
    CatalogRecord {
        id,
        title: None,
        name: Some(format!("Series {id}")),
        original_language: language.to_string(),
        release_date: None,
        first_air_date: chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
        vote_average: 8.0,
    }
}

#[async_trait]
impl CatalogProvider for MockCatalogProvider {
    async fn discover(&self, query: &DiscoverQuery) -> Result<DiscoverPage, FetchError> {
        let call_index = {
            let mut calls = self.discover_calls.lock().unwrap();
            calls.push(query.clone());
            calls.len() - 1
        };

        if let Some(error) = self.discover_failures.get(&call_index) {
            return Err(error.clone());
        }

        Ok(self
            .pages
            .get(&(query.media_type, query.page))
            .cloned()
            .unwrap_or_else(|| page(query.page, 1, Vec::new())))
    }

    async fn external_ids(
        &self,
        media_type: MediaType,
        catalog_id: u64,
    ) -> Result<ExternalIds, FetchError> {
        self.external_id_calls
            .lock()
            .unwrap()
            .push((media_type, catalog_id));

        let now = self.in_flight_lookups.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight_lookups.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight_lookups.fetch_sub(1, Ordering::SeqCst);

        match self.external_ids.get(&catalog_id) {
            Some(result) => result.clone(),
            None => Ok(ExternalIds {
                imdb_id: Some(format!("tt{catalog_id}")),
            }),
        }
    }
}
