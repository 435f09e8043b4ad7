//! Integration tests for Ottwatch live under `integration/`.
