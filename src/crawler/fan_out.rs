//! Bounded single-level drivers for profile search and feed extraction
//!
//! These entry points visit a fixed list of pages once each. They share the
//! renderer lifecycle, pacing, deadlines and failure containment of the full
//! crawl but never follow links, so there is no frontier involved.

use crate::config::{Config, ProfileEntry};
use crate::crawler::coordinator::CrawlSettings;
use crate::crawler::pacing::{load_with_deadline, Pacer};
use crate::output::{CrawlReport, RunMode, VisitRecord};
use crate::render::{RenderError, Renderer};
use crate::state::{SessionState, VisitOutcome};
use crate::storage::{key_path, ArtifactSink};
use crate::url::{host_label, normalize_route, route_key, validate_seed, Route};
use crate::TrawlerError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Folder used for feeds whose host has no usable label
const FEED_FOLDER: &str = "feed";

/// One page visited by a fan-out run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutTarget {
    /// Capture name inside the run's folder
    pub key: String,

    pub route: Route,
}

/// Builds the profile pages to visit for a username
///
/// # Errors
///
/// Returns `TrawlerError::InvalidSeed` when the username cannot be used as a
/// folder name or produces an invalid profile URL.
///
/// # Example
///
/// ```
/// use route_trawler::config::default_profiles;
/// use route_trawler::crawler::profile_targets;
///
/// let targets = profile_targets("jane", &default_profiles()).unwrap();
/// assert_eq!(targets[0].key, "twitter");
/// assert_eq!(targets[0].route.as_str(), "https://twitter.com/jane");
/// assert!(profile_targets("../etc", &default_profiles()).is_err());
/// ```
pub fn profile_targets(
    username: &str,
    profiles: &[ProfileEntry],
) -> Result<Vec<FanOutTarget>, TrawlerError> {
    check_username(username)?;

    profiles
        .iter()
        .map(|profile| {
            let url = profile.profile_url(username);
            let route = normalize_route(&url).map_err(|e| TrawlerError::InvalidSeed {
                seed: username.to_string(),
                reason: format!("{} profile URL {} is invalid: {}", profile.key, url, e),
            })?;
            Ok(FanOutTarget {
                key: profile.key.clone(),
                route,
            })
        })
        .collect()
}

/// Builds the single page visited in feed mode and the folder it goes in
pub fn feed_target(url: &str) -> Result<(String, FanOutTarget), TrawlerError> {
    let route = validate_seed(url)?;
    let folder = Url::parse(route.as_str())
        .ok()
        .and_then(|parsed| host_label(&parsed))
        .unwrap_or_else(|| FEED_FOLDER.to_string());
    let target = FanOutTarget {
        key: route_key(&route),
        route,
    };
    Ok((folder, target))
}

fn check_username(username: &str) -> Result<(), TrawlerError> {
    let reason = if username.trim().is_empty() {
        Some("username is empty")
    } else if username == "." || username == ".." {
        Some("username is a relative path")
    } else if username
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control())
    {
        Some("username contains path separators or whitespace")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(TrawlerError::InvalidSeed {
            seed: username.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Visits a fixed list of pages, once each, in order
pub struct FanOutDriver<R, S> {
    renderer: R,
    sink: S,
    pacing: Duration,
    navigation_timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl<R, S> FanOutDriver<R, S>
where
    R: Renderer,
    S: ArtifactSink,
{
    pub fn new(renderer: R, sink: S, settings: &CrawlSettings) -> Self {
        Self {
            renderer,
            sink,
            pacing: settings.pacing,
            navigation_timeout: settings.navigation_timeout,
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_config(renderer: R, sink: S, config: &Config) -> Self {
        Self::new(renderer, sink, &CrawlSettings::from_config(config))
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (R, S) {
        (self.renderer, self.sink)
    }

    /// Captures every configured profile page of a username
    ///
    /// Captures land in `<username>/<profile key>`.
    pub async fn search_profiles(
        &mut self,
        username: &str,
        profiles: &[ProfileEntry],
    ) -> Result<CrawlReport, TrawlerError> {
        let targets = profile_targets(username, profiles)?;
        self.run(RunMode::ProfileSearch, username, username, targets)
            .await
    }

    /// Captures one aggregator page together with its media references
    pub async fn extract_feed(&mut self, url: &str) -> Result<CrawlReport, TrawlerError> {
        let (folder, target) = feed_target(url)?;
        let label = target.route.to_string();
        self.run(RunMode::Feed, &label, &folder, vec![target]).await
    }

    /// Visits each target once under a single renderer session
    ///
    /// # Errors
    ///
    /// Only `TrawlerError::Session` when the renderer cannot be opened;
    /// failures of individual targets are recorded in the report.
    pub async fn run(
        &mut self,
        mode: RunMode,
        target: &str,
        folder: &str,
        targets: Vec<FanOutTarget>,
    ) -> Result<CrawlReport, TrawlerError> {
        let mut report = CrawlReport::new(mode, target);
        report.discovered = targets.iter().map(|t| t.route.to_string()).collect();
        let mut state = SessionState::Idle;

        if self.cancel.is_cancelled() {
            report.finish(state.transition(SessionState::Cancelled)?);
            return Ok(report);
        }

        if let Err(e) = self.renderer.open().await {
            tracing::error!("Renderer failed to start: {}", e);
            state.transition(SessionState::Failed)?;
            self.renderer.close().await;
            return Err(TrawlerError::Session { source: e });
        }
        state = state.transition(SessionState::Running)?;

        tracing::info!("Starting {} of {} ({} pages)", mode, target, targets.len());
        if let Err(e) = self.sink.ensure_path(folder).await {
            tracing::warn!("Could not prepare folder '{}': {}", folder, e);
        }

        let mut pacer = Pacer::new(self.pacing);
        let total = targets.len();
        let mut cancelled = false;

        for (index, target) in targets.into_iter().enumerate() {
            if !pacer.pace(&self.cancel).await {
                cancelled = true;
                break;
            }

            tracing::info!(
                route = %target.route,
                position = index + 1,
                total,
                "{}/{} - VISITING {} ({})",
                index + 1,
                total,
                target.route,
                target.key
            );
            let record = self.visit(folder, target).await;
            report.record(record);
        }

        self.renderer.close().await;

        let end = if cancelled {
            SessionState::Cancelled
        } else {
            SessionState::Complete
        };
        report.finish(state.transition(end)?);
        tracing::info!(
            "{} finished: {}/{} pages captured",
            mode,
            report.captured_count(),
            total
        );
        Ok(report)
    }

    async fn visit(&mut self, folder: &str, target: FanOutTarget) -> VisitRecord {
        let FanOutTarget { key, route } = target;

        let page = match load_with_deadline(&mut self.renderer, &route, self.navigation_timeout)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(route = %route, "Failed to render {}: {}", route, e);
                let outcome = match e {
                    RenderError::Timeout { .. } => VisitOutcome::TimedOut,
                    other => VisitOutcome::RenderFailed(other.to_string()),
                };
                return VisitRecord {
                    route: route.into_string(),
                    key_path: None,
                    title: None,
                    links_found: 0,
                    outcome,
                };
            }
        };

        let key = key_path(folder, &key);
        let (key_path, outcome) = match self.sink.store(&key, &page.capture).await {
            Ok(()) => {
                tracing::info!(
                    route = %route,
                    "Captured {} as {} ({} media)",
                    route,
                    key,
                    page.capture.media.len()
                );
                (Some(key), VisitOutcome::Captured)
            }
            Err(e) => {
                tracing::warn!(route = %route, "Failed to store captures for {}: {}", route, e);
                (None, VisitOutcome::CaptureFailed(e.to_string()))
            }
        };

        VisitRecord {
            route: route.into_string(),
            key_path,
            title: page.title,
            links_found: 0,
            outcome,
        }
    }
}
