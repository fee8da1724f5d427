//! Integration tests for the prober
//!
//! These tests use wiremock to create mock HTTP servers and drive the whole
//! pipeline: input lines, worker pool, redirects, output and persistence.

mod common;
mod probe_tests;
