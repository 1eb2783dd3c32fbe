//! Pacing and navigation deadlines shared by every driver
//!
//! This module handles:
//! - The fixed cooldown inserted between two sequential visits
//! - Cancellation while a cooldown is in progress
//! - Bounding a single navigation with a deadline

use crate::config::CrawlerConfig;
use crate::render::{RenderError, RenderResult, RenderedPage, Renderer};
use crate::url::Route;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Fixed cooldown between sequential visits
///
/// The first visit of a run is never delayed; every later one waits the
/// full delay first. This is not a retry backoff.
#[derive(Debug, Clone)]
pub struct Pacer {
    delay: Duration,
    started: bool,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: false,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.pacing())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits before the next visit
    ///
    /// Returns `false` if the token was cancelled before or during the wait,
    /// in which case the visit must not start.
    pub async fn pace(&mut self, cancel: &CancellationToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }

        if !self.started {
            self.started = true;
            return true;
        }

        if self.delay.is_zero() {
            return true;
        }

        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(self.delay) => true,
        }
    }
}

/// Loads a route, failing with `RenderError::Timeout` past the deadline
///
/// With no deadline the navigation may take as long as the renderer needs.
pub async fn load_with_deadline<R>(
    renderer: &mut R,
    route: &Route,
    deadline: Option<Duration>,
) -> RenderResult<RenderedPage>
where
    R: Renderer + ?Sized,
{
    match deadline {
        Some(after) => match tokio::time::timeout(after, renderer.load(route)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout {
                url: route.to_string(),
                after,
            }),
        },
        None => renderer.load(route).await,
    }
}
