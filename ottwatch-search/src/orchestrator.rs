//! Release aggregation across languages and media types.
//!
//! A run walks every language and media type pair in a fixed order, fetches
//! each independently, and hands the result (or a scoped error) to a
//! [`ReleaseRenderer`]. A failure in one pair never stops the others.

use std::sync::Arc;

use ottwatch_core::OttwatchConfig;
use serde::Serialize;

use crate::date_window::{DateWindow, compute_window};
use crate::display::prepare_listing;
use crate::errors::ConfigurationError;
use crate::fetcher::{FetchRequest, ReleaseFetcher};
use crate::providers::{CatalogProvider, TmdbProvider};
use crate::types::{Language, MediaType, Platform, ReleaseItem};

/// One language and media type region of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Original language of the listed titles
    pub language: Language,
    /// Movies or series
    pub media_type: MediaType,
    /// Platform the titles stream on
    pub platform: Platform,
}

impl Section {
    /// Stable identifier such as `hindi-movie`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.language.name(), self.media_type.as_path_segment())
    }
}

/// Receives the output of a run.
pub trait ReleaseRenderer {
    /// Sorted releases inside the window for one section, possibly empty.
    fn render_releases(&mut self, section: &Section, window: &DateWindow, releases: &[ReleaseItem]);

    /// Fetch failure scoped to one section.
    fn render_section_error(&mut self, section: &Section, message: &str);

    /// Failure of the whole run; no sections are rendered.
    fn render_global_error(&mut self, message: &str);
}

/// What happened to one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SectionOutcome {
    /// Listing rendered
    Rendered {
        /// Titles shown after filtering
        count: usize,
    },
    /// Fetch failed and the error was rendered instead
    Failed {
        /// Message shown for the section
        message: String,
    },
}

/// Per-section outcomes of a run, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Platform the run targeted
    pub platform: Platform,
    /// Outcome of every section
    pub sections: Vec<(Section, SectionOutcome)>,
}

impl RunSummary {
    /// Number of sections that failed.
    pub fn failed_sections(&self) -> usize {
        self.sections
            .iter()
            .filter(|(_, outcome)| matches!(outcome, SectionOutcome::Failed { .. }))
            .count()
    }
}

/// Runs the release pipeline for every tracked language and media type.
#[derive(Debug, Clone)]
pub struct AggregationOrchestrator {
    fetcher: ReleaseFetcher,
    languages: Vec<Language>,
    media_types: Vec<MediaType>,
}

impl AggregationOrchestrator {
    /// Orchestrator over `provider` with the default page cap.
    pub fn new(provider: Arc<dyn CatalogProvider>) -> Self {
        Self::with_fetcher(ReleaseFetcher::new(provider))
    }

    /// Orchestrator driving an existing fetcher.
    pub fn with_fetcher(fetcher: ReleaseFetcher) -> Self {
        Self {
            fetcher,
            languages: Language::ALL.to_vec(),
            media_types: MediaType::ALL.to_vec(),
        }
    }

    /// Orchestrator talking to the configured TMDb endpoint.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::MissingApiKey` - No API key configured
    /// - `ConfigurationError::InvalidBaseUrl` - Base URL does not parse
    pub fn from_config(config: &OttwatchConfig) -> Result<Self, ConfigurationError> {
        let provider = TmdbProvider::from_config(&config.tmdb)?;
        let fetcher = ReleaseFetcher::with_max_pages(Arc::new(provider), config.tmdb.max_pages);
        Ok(Self::with_fetcher(fetcher))
    }

    /// Sections in processing order: language outer, media type inner.
    pub fn sections(&self, platform: Platform) -> Vec<Section> {
        self.languages
            .iter()
            .flat_map(|&language| {
                self.media_types.iter().map(move |&media_type| Section {
                    language,
                    media_type,
                    platform,
                })
            })
            .collect()
    }

    /// Fetch and render every section for `platform_id`.
    ///
    /// Sections run one after another. A fetch failure is rendered in place of
    /// that section's list and the run continues.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::UnknownPlatform` - `platform_id` is not a known
    ///   platform; reported as a global error before any request is sent
    pub async fn run(
        &self,
        lookback_days: i64,
        platform_id: &str,
        renderer: &mut dyn ReleaseRenderer,
    ) -> Result<RunSummary, ConfigurationError> {
        let platform = match platform_id.parse::<Platform>() {
            Ok(platform) => platform,
            Err(error) => {
                tracing::error!(platform = platform_id, error = %error, "Run aborted");
                renderer.render_global_error(&error.to_string());
                return Err(error);
            }
        };

        tracing::info!(
            lookback_days,
            platform = %platform,
            provider_id = platform.provider_id(),
            "Fetching releases"
        );

        let mut summary = RunSummary {
            platform,
            sections: Vec::new(),
        };

        for section in self.sections(platform) {
            let outcome = self.run_section(&section, lookback_days, renderer).await;
            summary.sections.push((section, outcome));
        }

        Ok(summary)
    }

    async fn run_section(
        &self,
        section: &Section,
        lookback_days: i64,
        renderer: &mut dyn ReleaseRenderer,
    ) -> SectionOutcome {
        let request = FetchRequest {
            language_code: section.language.code().to_string(),
            media_type: section.media_type,
            lookback_days,
            provider_id: section.platform.provider_id(),
        };
        let window = compute_window(lookback_days);

        match self.fetcher.fetch_in_window(&request, window).await {
            Ok(releases) => {
                let listing = prepare_listing(releases, &window);
                renderer.render_releases(section, &window, &listing);
                SectionOutcome::Rendered {
                    count: listing.len(),
                }
            }
            Err(error) => {
                let message = format!(
                    "Failed to fetch {} {} releases from {}. {error}",
                    section.language, section.media_type, section.platform
                );
                tracing::error!(section = %section.key(), error = %error, "Section failed");
                renderer.render_section_error(section, &message);
                SectionOutcome::Failed { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Days, Utc};

    use super::*;
    use crate::errors::FetchError;
    use crate::providers::MockCatalogProvider;
    use crate::providers::mock::{movie, page, series};

    #[derive(Debug, Default)]
    struct RecordingRenderer {
        lists: Vec<(Section, Vec<ReleaseItem>)>,
        section_errors: Vec<(Section, String)>,
        global_errors: Vec<String>,
    }

    impl ReleaseRenderer for RecordingRenderer {
        fn render_releases(
            &mut self,
            section: &Section,
            _window: &DateWindow,
            releases: &[ReleaseItem],
        ) {
            self.lists.push((*section, releases.to_vec()));
        }

        fn render_section_error(&mut self, section: &Section, message: &str) {
            self.section_errors.push((*section, message.to_string()));
        }

        fn render_global_error(&mut self, message: &str) {
            self.global_errors.push(message.to_string());
        }
    }

    fn days_ago(days: u64) -> String {
        Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(days))
            .unwrap()
            .format("%Y-%m-%d")
            .to_string()
    }

    #[tokio::test]
    async fn test_runs_six_sections_in_order() {
        let provider = Arc::new(MockCatalogProvider::new());
        let orchestrator = AggregationOrchestrator::new(provider.clone());
        let mut renderer = RecordingRenderer::default();

        let summary = orchestrator.run(30, "Netflix", &mut renderer).await.unwrap();

        let calls = provider.discover_calls();
        assert_eq!(calls.len(), 6);
        assert!(calls.iter().all(|q| q.provider_id == 8 && q.page <= 20));

        let keys: Vec<String> = summary.sections.iter().map(|(s, _)| s.key()).collect();
        assert_eq!(
            keys,
            vec![
                "hindi-movie",
                "hindi-tv",
                "telugu-movie",
                "telugu-tv",
                "english-movie",
                "english-tv"
            ]
        );
        assert_eq!(renderer.lists.len(), 6);
        assert!(renderer.global_errors.is_empty());
        assert_eq!(summary.failed_sections(), 0);
    }

    #[tokio::test]
    async fn test_unknown_platform_aborts_before_fetching() {
        let provider = Arc::new(MockCatalogProvider::new());
        let orchestrator = AggregationOrchestrator::new(provider.clone());
        let mut renderer = RecordingRenderer::default();

        let error = orchestrator
            .run(30, "InvalidPlatform", &mut renderer)
            .await
            .unwrap_err();

        assert!(matches!(error, ConfigurationError::UnknownPlatform { .. }));
        assert!(provider.discover_calls().is_empty());
        assert_eq!(renderer.global_errors.len(), 1);
        assert!(renderer.lists.is_empty());
        assert!(renderer.section_errors.is_empty());
    }

    #[tokio::test]
    async fn test_section_failure_is_isolated() {
        let provider = Arc::new(
            MockCatalogProvider::new().with_discover_failure(0, FetchError::HttpStatus { status: 500 }),
        );
        let orchestrator = AggregationOrchestrator::new(provider.clone());
        let mut renderer = RecordingRenderer::default();

        let summary = orchestrator.run(30, "Prime Video", &mut renderer).await.unwrap();

        assert_eq!(renderer.section_errors.len(), 1);
        let (section, message) = &renderer.section_errors[0];
        assert_eq!(section.key(), "hindi-movie");
        assert!(message.contains("500"));
        assert_eq!(
            message,
            "Failed to fetch hindi movie releases from Prime Video. HTTP error! status: 500"
        );
        assert_eq!(renderer.lists.len(), 5);
        assert_eq!(provider.discover_calls().len(), 6);
        assert!(provider.discover_calls().iter().all(|q| q.provider_id == 119));
        assert_eq!(summary.failed_sections(), 1);
    }

    #[tokio::test]
    async fn test_sections_receive_sorted_window_filtered_lists() {
        let provider = Arc::new(
            MockCatalogProvider::new()
                .with_page(
                    MediaType::Movie,
                    page(
                        1,
                        1,
                        vec![
                            movie(1, "hi", &days_ago(20)),
                            movie(2, "hi", &days_ago(400)),
                            movie(3, "hi", &days_ago(2)),
                            movie(4, "en", &days_ago(1)),
                        ],
                    ),
                )
                .with_page(MediaType::Series, page(1, 1, vec![series(9, "te", &days_ago(5))]))
                .with_external_ids(3, Err(FetchError::HttpStatus { status: 404 })),
        );
        let orchestrator = AggregationOrchestrator::new(provider);
        let mut renderer = RecordingRenderer::default();

        orchestrator.run(30, "Hotstar", &mut renderer).await.unwrap();

        let hindi_movies = &renderer.lists[0];
        assert_eq!(hindi_movies.0.key(), "hindi-movie");
        let ids: Vec<u64> = hindi_movies.1.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(hindi_movies.1[0].imdb_id, None);
        assert_eq!(hindi_movies.1[1].imdb_id.as_deref(), Some("tt1"));

        let telugu_series = &renderer.lists[3];
        assert_eq!(telugu_series.0.key(), "telugu-tv");
        assert_eq!(telugu_series.1.len(), 1);

        let english_movies = &renderer.lists[4];
        assert!(english_movies.1.iter().all(|r| r.original_language == "en"));
    }
}
