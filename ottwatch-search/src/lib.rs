//! Ottwatch Search - Streaming release discovery

#![deny(missing_docs)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Finds regional-language titles newly available on a streaming platform by
//! paging through catalog discovery queries, keeping titles in the requested
//! original language, and attaching each title's IMDb id.

pub mod date_window;
pub mod display;
pub mod errors;
pub mod fetcher;
pub mod orchestrator;
pub mod providers;
pub mod resolver;
pub mod types;

// Re-export main types
pub use date_window::{DateWindow, compute_window};
pub use errors::{ConfigurationError, FetchError, ResolutionFailure};
pub use fetcher::{FetchRequest, ReleaseFetcher};
pub use orchestrator::{AggregationOrchestrator, ReleaseRenderer, RunSummary, Section, SectionOutcome};
pub use providers::{CatalogProvider, TmdbProvider};
pub use resolver::SecondaryIdResolver;
pub use types::{Language, MediaType, Platform, ReleaseItem};
