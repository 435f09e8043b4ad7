//! End-to-end release runs against a mock catalog.

use std::sync::Arc;

use ottwatch_search::{
    AggregationOrchestrator, ConfigurationError, FetchRequest, MediaType, ReleaseFetcher,
    TmdbProvider,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::{
    RecordingRenderer, Rendered, config_for, days_ago, discover_body, movie_json, series_json,
};

async fn mount_external_id(server: &MockServer, media: &str, id: u64, imdb_id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/3/{media}/{id}/external_ids")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": id, "imdb_id": imdb_id })))
        .mount(server)
        .await;
}

async fn discover_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path().starts_with("/3/discover/"))
        .count()
}

#[tokio::test]
async fn test_full_run_renders_every_section() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/3/discover/movie"))
        .and(query_param("with_watch_providers", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discover_body(
            1,
            1,
            vec![
                movie_json(1, "hi", &days_ago(3)),
                movie_json(2, "en", &days_ago(10)),
                movie_json(3, "hi", &days_ago(100)),
                movie_json(5, "hi", &days_ago(1)),
            ],
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/3/discover/tv"))
        .and(query_param("with_watch_providers", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discover_body(
            1,
            1,
            vec![series_json(4, "te", &days_ago(7))],
        )))
        .mount(&server)
        .await;

    mount_external_id(&server, "movie", 1, "tt0000001").await;
    mount_external_id(&server, "movie", 3, "tt0000003").await;
    mount_external_id(&server, "movie", 5, "tt0000005").await;
    mount_external_id(&server, "tv", 4, "tt0000004").await;
    Mock::given(method("GET"))
        .and(path("/3/movie/2/external_ids"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let orchestrator = AggregationOrchestrator::from_config(&config_for(&server)).unwrap();
    let mut renderer = RecordingRenderer::default();

    let summary = orchestrator.run(30, "Netflix", &mut renderer).await.unwrap();

    assert_eq!(summary.failed_sections(), 0);
    assert_eq!(discover_requests(&server).await, 6);

    let lists = renderer.lists();
    let keys: Vec<&str> = lists.iter().map(|(key, _)| *key).collect();
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

    // Newest first, out-of-window title dropped
    let hindi_movies = lists[0].1;
    let ids: Vec<u64> = hindi_movies.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![5, 1]);
    assert_eq!(hindi_movies[1].imdb_id.as_deref(), Some("tt0000001"));

    let telugu_series = lists[3].1;
    assert_eq!(telugu_series.len(), 1);
    assert_eq!(telugu_series[0].display_title(), "Series 4");
    assert_eq!(telugu_series[0].imdb_id.as_deref(), Some("tt0000004"));

    // Failed cross-reference lookup keeps the title without an id
    let english_movies = lists[4].1;
    assert_eq!(english_movies.len(), 1);
    assert_eq!(english_movies[0].id, 2);
    assert_eq!(english_movies[0].imdb_id, None);

    assert!(lists[1].1.is_empty());
    assert!(lists[5].1.is_empty());
}

#[tokio::test]
async fn test_failed_section_does_not_stop_the_run() {
    let server = MockServer::start().await;

    // Only the very first discovery request fails
    Mock::given(method("GET"))
        .and(path("/3/discover/movie"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/3/discover/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discover_body(1, 1, Vec::new())))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/3/discover/tv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discover_body(1, 1, Vec::new())))
        .mount(&server)
        .await;

    let orchestrator = AggregationOrchestrator::from_config(&config_for(&server)).unwrap();
    let mut renderer = RecordingRenderer::default();

    let summary = orchestrator.run(30, "Hotstar", &mut renderer).await.unwrap();

    assert_eq!(summary.failed_sections(), 1);
    assert_eq!(discover_requests(&server).await, 6);

    let errors = renderer.section_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "hindi-movie");
    assert!(errors[0].1.contains("500"));
    assert!(errors[0].1.contains("Hotstar"));

    assert_eq!(renderer.lists().len(), 5);
    assert!(matches!(renderer.events[0], Rendered::SectionError(..)));
}

#[tokio::test]
async fn test_unknown_platform_sends_no_requests() {
    let server = MockServer::start().await;

    let orchestrator = AggregationOrchestrator::from_config(&config_for(&server)).unwrap();
    let mut renderer = RecordingRenderer::default();

    let error = orchestrator
        .run(30, "InvalidPlatform", &mut renderer)
        .await
        .unwrap_err();

    assert_eq!(
        error,
        ConfigurationError::UnknownPlatform {
            platform: "InvalidPlatform".to_string()
        }
    );
    assert_eq!(
        renderer.events,
        vec![Rendered::GlobalError(
            "Invalid OTT platform selected: 'InvalidPlatform'".to_string()
        )]
    );
    assert!(
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .is_empty()
    );
}

#[tokio::test]
async fn test_fetch_stops_at_page_cap() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/3/discover/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discover_body(1, 50, Vec::new())))
        .expect(20)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let provider = TmdbProvider::from_config(&config.tmdb).unwrap();
    let fetcher = ReleaseFetcher::with_max_pages(Arc::new(provider), config.tmdb.max_pages);

    let releases = fetcher
        .fetch_releases(&FetchRequest {
            language_code: "hi".to_string(),
            media_type: MediaType::Movie,
            lookback_days: 30,
            provider_id: 8,
        })
        .await
        .unwrap();

    assert!(releases.is_empty());
    server.verify().await;
}
