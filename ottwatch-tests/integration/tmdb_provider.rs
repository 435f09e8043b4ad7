//! TMDb provider request and response handling.

use chrono::NaiveDate;
use ottwatch_search::types::DiscoverQuery;
use ottwatch_search::{CatalogProvider, FetchError, MediaType, TmdbProvider};
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::{config_for, discover_body, movie_json, series_json};

fn query(media_type: MediaType, provider_id: u32, page: u32) -> DiscoverQuery {
    DiscoverQuery {
        media_type,
        provider_id,
        start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        page,
    }
}

#[tokio::test]
async fn test_movie_discovery_sends_expected_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/3/discover/movie"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("with_watch_providers", "8"))
        .and(query_param("watch_region", "IN"))
        .and(query_param("sort_by", "release_date.desc"))
        .and(query_param("page", "2"))
        .and(query_param("with_watch_monetization_types", "flatrate"))
        .and(query_param("primary_release_date.gte", "2024-03-01"))
        .and(query_param("primary_release_date.lte", "2024-03-31"))
        .and(query_param_is_missing("first_air_date.gte"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discover_body(
            2,
            4,
            vec![movie_json(101, "hi", "2024-03-12")],
        )))
        .expect(1)
        .mount(&server)
        .await;

    let provider = TmdbProvider::from_config(&config_for(&server).tmdb).unwrap();
    let page = provider.discover(&query(MediaType::Movie, 8, 2)).await.unwrap();

    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 4);
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].id, 101);
    assert_eq!(page.results[0].original_language, "hi");
    assert_eq!(
        page.results[0].release_date,
        NaiveDate::from_ymd_opt(2024, 3, 12)
    );
}

#[tokio::test]
async fn test_series_discovery_filters_on_first_air_date() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/3/discover/tv"))
        .and(query_param("with_watch_providers", "122"))
        .and(query_param("first_air_date.gte", "2024-03-01"))
        .and(query_param("first_air_date.lte", "2024-03-31"))
        .and(query_param_is_missing("primary_release_date.gte"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discover_body(
            1,
            1,
            vec![series_json(7, "te", "2024-03-05")],
        )))
        .expect(1)
        .mount(&server)
        .await;

    let provider = TmdbProvider::from_config(&config_for(&server).tmdb).unwrap();
    let page = provider
        .discover(&query(MediaType::Series, 122, 1))
        .await
        .unwrap();

    assert_eq!(page.results[0].name.as_deref(), Some("Series 7"));
    assert_eq!(page.results[0].release_date, None);
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/3/discover/movie"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let provider = TmdbProvider::from_config(&config_for(&server).tmdb).unwrap();
    let error = provider
        .discover(&query(MediaType::Movie, 8, 1))
        .await
        .unwrap_err();

    assert_eq!(error, FetchError::HttpStatus { status: 500 });
    assert!(error.to_string().contains("500"));
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/3/discover/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let provider = TmdbProvider::from_config(&config_for(&server).tmdb).unwrap();
    let error = provider
        .discover(&query(MediaType::Movie, 8, 1))
        .await
        .unwrap_err();

    assert!(matches!(error, FetchError::Parse { .. }));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Bind then release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let config = ottwatch_core::OttwatchConfig::for_testing(format!("http://127.0.0.1:{port}/3"));

    let provider = TmdbProvider::from_config(&config.tmdb).unwrap();
    let error = provider
        .discover(&query(MediaType::Movie, 8, 1))
        .await
        .unwrap_err();

    assert!(matches!(error, FetchError::Network { .. }));
}

#[tokio::test]
async fn test_external_ids_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/3/tv/1399/external_ids"))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1399,
            "imdb_id": "tt0944947",
            "tvdb_id": 121361,
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/3/movie/5/external_ids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5,
            "imdb_id": null,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = TmdbProvider::from_config(&config_for(&server).tmdb).unwrap();

    let ids = provider.external_ids(MediaType::Series, 1399).await.unwrap();
    assert_eq!(ids.imdb_id.as_deref(), Some("tt0944947"));

    let ids = provider.external_ids(MediaType::Movie, 5).await.unwrap();
    assert_eq!(ids.imdb_id, None);
}
