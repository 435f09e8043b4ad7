//! Shared fixtures for integration tests.

use ottwatch_core::OttwatchConfig;
use ottwatch_search::{DateWindow, ReleaseItem, ReleaseRenderer, Section};
use serde_json::{Value, json};
use wiremock::MockServer;

/// Configuration pointed at the mock server's `/3` prefix.
pub fn config_for(server: &MockServer) -> OttwatchConfig {
    OttwatchConfig::for_testing(format!("{}/3", server.uri()))
}

/// One discovery page body.
pub fn discover_body(page: u32, total_pages: u32, results: Vec<Value>) -> Value {
    let total_results = results.len();
    json!({
        "page": page,
        "results": results,
        "total_pages": total_pages,
        "total_results": total_results,
    })
}

pub fn movie_json(id: u64, language: &str, release_date: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Movie {id}"),
        "original_language": language,
        "release_date": release_date,
        "vote_average": 6.5,
        "popularity": 12.0,
        "adult": false,
    })
}

pub fn series_json(id: u64, language: &str, first_air_date: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Series {id}"),
        "original_language": language,
        "first_air_date": first_air_date,
        "vote_average": 8.1,
        "origin_country": ["IN"],
    })
}

/// `YYYY-MM-DD` for `days` days before today (UTC).
pub fn days_ago(days: u64) -> String {
    chrono::Utc::now()
        .date_naive()
        .checked_sub_days(chrono::Days::new(days))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// What a renderer received, in order.
#[derive(Debug, PartialEq)]
pub enum Rendered {
    List(String, Vec<ReleaseItem>),
    SectionError(String, String),
    GlobalError(String),
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub events: Vec<Rendered>,
}

impl RecordingRenderer {
    pub fn lists(&self) -> Vec<(&str, &[ReleaseItem])> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Rendered::List(key, items) => Some((key.as_str(), items.as_slice())),
                _ => None,
            })
            .collect()
    }

    pub fn section_errors(&self) -> Vec<(&str, &str)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Rendered::SectionError(key, message) => Some((key.as_str(), message.as_str())),
                _ => None,
            })
            .collect()
    }
}

impl ReleaseRenderer for RecordingRenderer {
    fn render_releases(&mut self, section: &Section, _window: &DateWindow, releases: &[ReleaseItem]) {
        self.events
            .push(Rendered::List(section.key(), releases.to_vec()));
    }

    fn render_section_error(&mut self, section: &Section, message: &str) {
        self.events
            .push(Rendered::SectionError(section.key(), message.to_string()));
    }

    fn render_global_error(&mut self, message: &str) {
        self.events.push(Rendered::GlobalError(message.to_string()));
    }
}
