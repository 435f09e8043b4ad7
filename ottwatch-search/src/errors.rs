//! Error types for release discovery.

use thiserror::Error;

/// Invalid run configuration, detected before any request is sent.
///
/// Fatal to the whole run and surfaced as a single global error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Platform selection does not map to a known watch provider.
    #[error("Invalid OTT platform selected: '{platform}'")]
    UnknownPlatform {
        /// The platform identifier as given
        platform: String,
    },

    /// No API key was supplied for the catalog API.
    #[error("Catalog API key is not configured")]
    MissingApiKey,

    /// Base URL of the catalog API could not be parsed.
    #[error("Invalid catalog base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The configured URL
        url: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Failure of a catalog request.
///
/// For discovery requests this is fatal to one language and media type
/// combination only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Server answered with a non-success status.
    #[error("HTTP error! status: {status}")]
    HttpStatus {
        /// Numeric HTTP status code
        status: u16,
    },

    /// Request never produced a response.
    #[error("Network error: {reason}")]
    Network {
        /// The reason for the network error
        reason: String,
    },

    /// Response body was not the expected JSON.
    #[error("Parse error: {reason}")]
    Parse {
        /// The reason for the parse error
        reason: String,
    },
}

/// Cross-reference lookup that did not produce an id.
///
/// Never leaves the resolver: it is logged and replaced by an absent id.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Cross-reference lookup failed for catalog id {catalog_id}: {source}")]
pub struct ResolutionFailure {
    /// Catalog id whose lookup failed
    pub catalog_id: u64,
    /// Underlying request failure
    #[source]
    pub source: FetchError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_message_contains_status() {
        let error = FetchError::HttpStatus { status: 500 };
        assert_eq!(error.to_string(), "HTTP error! status: 500");
    }

    #[test]
    fn test_resolution_failure_keeps_source() {
        let failure = ResolutionFailure {
            catalog_id: 42,
            source: FetchError::HttpStatus { status: 404 },
        };

        assert!(failure.to_string().contains("42"));
        assert!(failure.to_string().contains("404"));
        assert!(std::error::Error::source(&failure).is_some());
    }

    #[test]
    fn test_unknown_platform_message() {
        let error = ConfigurationError::UnknownPlatform {
            platform: "InvalidPlatform".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Invalid OTT platform selected: 'InvalidPlatform'"
        );
    }
}
