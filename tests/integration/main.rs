//! Integration tests for Sumi-Sift
//!
//! These tests run the full pipeline against wiremock servers.

mod pipeline_tests;
