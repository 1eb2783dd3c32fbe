//! Integration tests for Route-Trawler
//!
//! These tests use wiremock to serve small mock sites and drive the HTTP
//! renderer and filesystem sink end-to-end.

mod crawl_tests;
mod fan_out_tests;
