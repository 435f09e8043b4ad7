//! Data types for release discovery.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ConfigurationError;

/// Catalog media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Feature film
    Movie,
    /// Television series
    #[serde(rename = "tv")]
    Series,
}

impl MediaType {
    /// All media types in display order.
    pub const ALL: [MediaType; 2] = [MediaType::Movie, MediaType::Series];

    /// Path segment the catalog API uses for this media type.
    pub fn as_path_segment(self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "tv",
        }
    }

    /// Query parameter prefix for the date-range filter.
    pub fn date_filter_field(self) -> &'static str {
        match self {
            MediaType::Movie => "primary_release_date",
            MediaType::Series => "first_air_date",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path_segment())
    }
}

/// Regional languages tracked by a run, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// Hindi (`hi`)
    Hindi,
    /// Telugu (`te`)
    Telugu,
    /// English (`en`)
    English,
}

impl Language {
    /// All tracked languages in display order.
    pub const ALL: [Language; 3] = [Language::Hindi, Language::Telugu, Language::English];

    /// ISO 639-1 code as used in `original_language`.
    pub fn code(self) -> &'static str {
        match self {
            Language::Hindi => "hi",
            Language::Telugu => "te",
            Language::English => "en",
        }
    }

    /// Lowercase name used in messages and section keys.
    pub fn name(self) -> &'static str {
        match self {
            Language::Hindi => "hindi",
            Language::Telugu => "telugu",
            Language::English => "english",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Streaming platforms with their catalog watch-provider ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Netflix (provider 8)
    Netflix,
    /// Amazon Prime Video (provider 119)
    PrimeVideo,
    /// Disney+ Hotstar (provider 122)
    Hotstar,
}

impl Platform {
    /// Watch-provider id used by the discovery filter.
    pub fn provider_id(self) -> u32 {
        match self {
            Platform::Netflix => 8,
            Platform::PrimeVideo => 119,
            Platform::Hotstar => 122,
        }
    }

    /// Name shown to users.
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Netflix => "Netflix",
            Platform::PrimeVideo => "Prime Video",
            Platform::Hotstar => "Hotstar",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Platform {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "netflix" => Ok(Platform::Netflix),
            "primevideo" => Ok(Platform::PrimeVideo),
            "hotstar" => Ok(Platform::Hotstar),
            _ => Err(ConfigurationError::UnknownPlatform {
                platform: s.to_string(),
            }),
        }
    }
}

/// Parameters of one discovery page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverQuery {
    /// Movie or series discovery endpoint
    pub media_type: MediaType,
    /// Watch-provider id to filter on
    pub provider_id: u32,
    /// First date of the window, inclusive
    pub start: NaiveDate,
    /// Last date of the window, inclusive
    pub end: NaiveDate,
    /// 1-based page number
    pub page: u32,
}

/// One page of discovery results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoverPage {
    /// Page number this response answers
    #[serde(default)]
    pub page: u32,
    /// Records on this page
    #[serde(default)]
    pub results: Vec<CatalogRecord>,
    /// Pages available for the query
    #[serde(default)]
    pub total_pages: u32,
    /// Records available for the query
    #[serde(default)]
    pub total_results: u32,
}

/// Release record as the catalog returns it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogRecord {
    /// Catalog id
    pub id: u64,
    /// Movie title
    #[serde(default)]
    pub title: Option<String>,
    /// Series name
    #[serde(default)]
    pub name: Option<String>,
    /// ISO 639-1 code of the original language
    #[serde(default)]
    pub original_language: String,
    /// Movie release date
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub release_date: Option<NaiveDate>,
    /// Series first air date
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub first_air_date: Option<NaiveDate>,
    /// Average user rating out of 10
    #[serde(default)]
    pub vote_average: f64,
}

/// External identifiers attached to a catalog item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExternalIds {
    /// IMDb id such as `tt0944947`
    #[serde(default)]
    pub imdb_id: Option<String>,
}

/// Catalog record enriched with its cross-reference id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseItem {
    /// Catalog id
    pub id: u64,
    /// Movie title
    pub title: Option<String>,
    /// Series name
    pub name: Option<String>,
    /// ISO 639-1 code of the original language
    pub original_language: String,
    /// Movie release date
    pub release_date: Option<NaiveDate>,
    /// Series first air date
    pub first_air_date: Option<NaiveDate>,
    /// Average user rating out of 10
    pub vote_average: f64,
    /// IMDb id, absent when the lookup failed or found nothing
    pub imdb_id: Option<String>,
}

impl ReleaseItem {
    /// Attaches a resolved IMDb id to a catalog record.
    pub fn from_record(record: CatalogRecord, imdb_id: Option<String>) -> Self {
        Self {
            id: record.id,
            title: record.title,
            name: record.name,
            original_language: record.original_language,
            release_date: record.release_date,
            first_air_date: record.first_air_date,
            vote_average: record.vote_average,
            imdb_id,
        }
    }

    /// Release date if present, else first air date.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.release_date.or(self.first_air_date)
    }

    /// Movie title, else series name.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Untitled")
    }
}

/// The catalog sends `""` for unknown dates.
fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
}
