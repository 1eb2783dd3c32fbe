//! Crawler module for walking a site and capturing its pages
//!
//! This module contains the core crawling logic, including:
//! - Frontier and visited-set bookkeeping
//! - Depth-first crawl coordination over a single renderer
//! - Pacing between visits and per-navigation deadlines
//! - Profile-search and feed fan-out drivers

mod coordinator;
mod fan_out;
mod frontier;
mod pacing;

#[cfg(test)]
mod testing;

pub use coordinator::{Coordinator, CrawlSession, CrawlSettings};
pub use fan_out::{feed_target, profile_targets, FanOutDriver, FanOutTarget};
pub use frontier::{CompletionRule, Frontier};
pub use pacing::{load_with_deadline, Pacer};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::render::HttpRenderer;
use crate::storage::FsSink;
use crate::TrawlerError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for crawling a site. It will:
/// 1. Validate the seed
/// 2. Open an HTTP renderer built from the configuration
/// 3. Visit every same-origin route once, depth-first
/// 4. Store captures below the configured capture directory
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - Absolute URL the crawl starts from
/// * `cancel` - Token that stops the crawl between two visits
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed or was cancelled
/// * `Err(TrawlerError)` - Invalid seed or the renderer could not start
pub async fn crawl(
    config: &Config,
    seed: &str,
    cancel: CancellationToken,
) -> Result<CrawlReport, TrawlerError> {
    let renderer = HttpRenderer::from_config(config);
    let sink = FsSink::new(&config.output.capture_dir);
    let mut coordinator = Coordinator::from_config(renderer, sink, config).with_cancellation(cancel);
    coordinator.run(seed).await
}

/// Captures every configured profile page of a username
pub async fn search(
    config: &Config,
    username: &str,
    cancel: CancellationToken,
) -> Result<CrawlReport, TrawlerError> {
    let renderer = HttpRenderer::from_config(config);
    let sink = FsSink::new(&config.output.capture_dir);
    let mut driver = FanOutDriver::from_config(renderer, sink, config).with_cancellation(cancel);
    driver.search_profiles(username, &config.profiles).await
}

/// Captures a feed page and the media it references
pub async fn feed(
    config: &Config,
    url: &str,
    cancel: CancellationToken,
) -> Result<CrawlReport, TrawlerError> {
    let renderer = HttpRenderer::from_config(config);
    let sink = FsSink::new(&config.output.capture_dir);
    let mut driver = FanOutDriver::from_config(renderer, sink, config).with_cancellation(cancel);
    driver.extract_feed(url).await
}
