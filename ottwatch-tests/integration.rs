//! Integration tests for Ottwatch
//!
//! These tests drive the real TMDb provider and the release pipeline against
//! a local mock HTTP server, checking the exact requests sent and how each
//! failure class surfaces.

#[path = "integration/support.rs"]
mod support;

#[path = "integration/tmdb_provider.rs"]
mod tmdb_provider;

#[path = "integration/release_pipeline.rs"]
mod release_pipeline;
