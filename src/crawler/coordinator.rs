//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! one crawl session, including:
//! - Opening and releasing the single renderer
//! - Walking the frontier depth-first with an explicit work list
//! - Pacing sequential visits and bounding each navigation
//! - Containing per-route render and sink failures
//! - Honoring external cancellation
//! - Building the final report

use crate::config::Config;
use crate::crawler::frontier::{CompletionRule, Frontier};
use crate::crawler::pacing::{load_with_deadline, Pacer};
use crate::output::{CrawlReport, RunMode, VisitRecord};
use crate::render::{RenderError, Renderer};
use crate::state::{SessionState, VisitOutcome};
use crate::storage::{key_path, ArtifactSink};
use crate::url::{digest_route_key, host_label, route_key, Denylist, Route};
use crate::TrawlerError;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Folder used when the seed host has no usable label
const FALLBACK_FOLDER: &str = "site";

/// Tunables of the crawl loop
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Cooldown between two sequential visits
    pub pacing: Duration,

    /// Deadline for one navigation, `None` waits indefinitely
    pub navigation_timeout: Option<Duration>,

    /// Routes that are discovered but never visited
    pub denylist: Denylist,

    pub completion_rule: CompletionRule,
}

impl CrawlSettings {
    pub fn from_config(config: &Config) -> Self {
        let completion_rule = if config.crawler.count_seed_toward_completion {
            CompletionRule::IncludeSeed
        } else {
            CompletionRule::ExcludeSeed
        };

        Self {
            pacing: config.crawler.pacing(),
            navigation_timeout: config.crawler.navigation_timeout(),
            denylist: Denylist::new(&config.crawler.deny_patterns),
            completion_rule,
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// State of one crawl from seed to termination
///
/// Owns the frontier, the session state machine and the report being built.
/// Created once per `run` and consumed when it ends.
#[derive(Debug)]
pub struct CrawlSession {
    frontier: Frontier,
    state: SessionState,
    folder: String,
    report: CrawlReport,
    /// Capture keys handed out so far and the route owning each
    keys: HashMap<String, Route>,
}

impl CrawlSession {
    /// Validates the seed and prepares an idle session
    pub fn start(seed: &str, rule: CompletionRule) -> Result<Self, TrawlerError> {
        let frontier = Frontier::seed(seed)?.with_completion_rule(rule);
        let folder = host_label(frontier.origin()).unwrap_or_else(|| FALLBACK_FOLDER.to_string());
        let report = CrawlReport::new(RunMode::Crawl, frontier.seed_route().as_str());

        Ok(Self {
            frontier,
            state: SessionState::Idle,
            folder,
            report,
            keys: HashMap::new(),
        })
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Folder every capture of this session is stored under
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Picks the sink key for a route's captures
    ///
    /// Falls back to [`digest_route_key`] when another route of this session
    /// already encoded to the same key, so no capture overwrites another.
    fn capture_key(&mut self, route: &Route) -> String {
        let plain = route_key(route);
        let key = match self.keys.get(&plain) {
            Some(owner) if owner != route => {
                let unique = digest_route_key(route);
                tracing::warn!(
                    "{} and {} share the capture key {}, storing the latter as {}",
                    owner,
                    route,
                    plain,
                    unique
                );
                unique
            }
            _ => plain,
        };
        self.keys.insert(key.clone(), route.clone());
        key_path(&self.folder, &key)
    }

    fn transition(&mut self, next: SessionState) -> Result<(), TrawlerError> {
        self.state = self.state.transition(next)?;
        tracing::debug!("Session now {}", self.state);
        Ok(())
    }

    fn into_report(mut self) -> CrawlReport {
        self.report.discovered = self
            .frontier
            .routes()
            .iter()
            .map(|r| r.to_string())
            .collect();
        self.report.excluded = self
            .frontier
            .excluded()
            .into_iter()
            .map(|r| r.to_string())
            .collect();
        self.report.finish(self.state);
        self.report
    }
}

/// Main crawler coordinator structure
///
/// Drives a single renderer and a single artifact sink. Only the coordinator
/// touches either of them while a run is in progress.
pub struct Coordinator<R, S> {
    renderer: R,
    sink: S,
    settings: CrawlSettings,
    cancel: CancellationToken,
    config_hash: Option<String>,
}

impl<R, S> Coordinator<R, S>
where
    R: Renderer,
    S: ArtifactSink,
{
    pub fn new(renderer: R, sink: S, settings: CrawlSettings) -> Self {
        Self {
            renderer,
            sink,
            settings,
            cancel: CancellationToken::new(),
            config_hash: None,
        }
    }

    pub fn from_config(renderer: R, sink: S, config: &Config) -> Self {
        Self::new(renderer, sink, CrawlSettings::from_config(config))
    }

    /// Uses an external token to stop the run between two visits
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Stamps reports with the hash of the configuration that produced them
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
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

    /// Crawls every same-origin route reachable from the seed
    ///
    /// Routes are visited depth-first, one at a time, each visit separated
    /// by the pacing delay. A route that fails to render or store is recorded
    /// in the report and the walk carries on.
    ///
    /// # Errors
    ///
    /// * `TrawlerError::InvalidSeed` - the seed is not an absolute URL
    /// * `TrawlerError::Session` - the renderer could not be opened
    pub async fn run(&mut self, seed: &str) -> Result<CrawlReport, TrawlerError> {
        let mut session = CrawlSession::start(seed, self.settings.completion_rule)?;
        if let Some(hash) = &self.config_hash {
            session.report.config_hash = Some(hash.clone());
        }

        if self.cancel.is_cancelled() {
            tracing::info!("Crawl of {} cancelled before start", seed);
            session.transition(SessionState::Cancelled)?;
            return Ok(session.into_report());
        }

        if let Err(e) = self.renderer.open().await {
            tracing::error!("Renderer failed to start: {}", e);
            session.transition(SessionState::Failed)?;
            self.renderer.close().await;
            return Err(TrawlerError::Session { source: e });
        }

        session.transition(SessionState::Running)?;
        tracing::info!(
            "Starting crawl of {} into folder '{}'",
            session.frontier.seed_route(),
            session.folder
        );

        if let Err(e) = self.sink.ensure_path(&session.folder).await {
            tracing::warn!("Could not prepare folder '{}': {}", session.folder, e);
        }

        let cancelled = self.walk(&mut session).await;

        self.renderer.close().await;

        if cancelled {
            tracing::info!(
                "Crawl cancelled after {} of {} routes",
                session.frontier.visited_count(),
                session.frontier.len()
            );
            session.transition(SessionState::Cancelled)?;
        } else {
            if !session.frontier.is_complete() {
                tracing::warn!(
                    "Work list drained with {} routes still pending",
                    session.frontier.pending().count()
                );
            }
            tracing::info!(
                "Crawl complete: {} routes visited, {} excluded",
                session.frontier.visited_count(),
                session.frontier.excluded().len()
            );
            session.transition(SessionState::Complete)?;
        }

        Ok(session.into_report())
    }

    /// Runs the work list until completion or cancellation
    ///
    /// Returns `true` when the walk stopped because of cancellation.
    async fn walk(&mut self, session: &mut CrawlSession) -> bool {
        let mut pacer = Pacer::new(self.settings.pacing);
        let mut stack = vec![session.frontier.seed_route().clone()];

        while let Some(route) = stack.pop() {
            if self.cancel.is_cancelled() {
                return true;
            }

            if session.frontier.is_visited(&route) {
                continue;
            }

            if !pacer.pace(&self.cancel).await {
                return true;
            }

            let added = self.visit(session, &route).await;

            // Reversed so the first discovered child is expanded first
            for child in added.into_iter().rev() {
                if self.settings.denylist.matches(&child) {
                    tracing::info!("Skipping denylisted route {}", child);
                    session.frontier.exclude(&child);
                } else {
                    stack.push(child);
                }
            }

            if session.frontier.is_complete() {
                break;
            }
        }

        false
    }

    /// Visits a single route and returns the routes it newly discovered
    async fn visit(&mut self, session: &mut CrawlSession, route: &Route) -> Vec<Route> {
        session.frontier.mark_visited(route);

        let position = session.frontier.position(route).map_or(0, |p| p + 1);
        let total = session.frontier.len();
        tracing::info!(
            route = %route,
            position,
            total,
            "{}/{} - VISITING {}",
            position,
            total,
            route
        );

        let page =
            match load_with_deadline(&mut self.renderer, route, self.settings.navigation_timeout)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(route = %route, "Failed to render {}: {}", route, e);
                    let outcome = match e {
                        RenderError::Timeout { .. } => VisitOutcome::TimedOut,
                        other => VisitOutcome::RenderFailed(other.to_string()),
                    };
                    session.report.record(VisitRecord {
                        route: route.to_string(),
                        key_path: None,
                        title: None,
                        links_found: 0,
                        outcome,
                    });
                    return Vec::new();
                }
            };

        let mut stored_at = None;
        let mut outcome = VisitOutcome::Captured;
        if !page.capture.is_empty() {
            let key = session.capture_key(route);
            match self.sink.store(&key, &page.capture).await {
                Ok(()) => {
                    tracing::info!(route = %route, "Captured {} as {}", route, key);
                    stored_at = Some(key);
                }
                Err(e) => {
                    tracing::warn!(route = %route, "Failed to store captures for {}: {}", route, e);
                    outcome = VisitOutcome::CaptureFailed(e.to_string());
                }
            }
        }

        let added = session.frontier.discover(&page.link_candidates);
        tracing::info!(
            route = %route,
            "Found {} new links on {} ({} candidates)",
            added.len(),
            route,
            page.link_candidates.len()
        );

        session.report.record(VisitRecord {
            route: route.to_string(),
            key_path: stored_at,
            title: page.title,
            links_found: added.len(),
            outcome,
        });

        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::testing::ScriptedRenderer;
    use crate::storage::MemorySink;
    use std::time::Instant;

    fn settings() -> CrawlSettings {
        CrawlSettings {
            pacing: Duration::ZERO,
            navigation_timeout: None,
            denylist: Denylist::default(),
            completion_rule: CompletionRule::IncludeSeed,
        }
    }

    fn coordinator(renderer: ScriptedRenderer) -> Coordinator<ScriptedRenderer, MemorySink> {
        Coordinator::new(renderer, MemorySink::new(), settings())
    }

    fn site() -> ScriptedRenderer {
        ScriptedRenderer::new()
            .page("https://x.test/", &["/a", "/b"])
            .page("https://x.test/a", &["/c"])
            .page("https://x.test/b", &[])
            .page("https://x.test/c", &[])
    }

    #[tokio::test]
    async fn test_colliding_route_keys_keep_both_captures() {
        let renderer = ScriptedRenderer::new()
            .page("https://x.test/", &["/a-b", "/a/b"])
            .page("https://x.test/a-b", &[])
            .page("https://x.test/a/b", &[]);
        let mut coordinator = coordinator(renderer);

        let report = coordinator.run("https://x.test/").await.unwrap();

        let keys: Vec<_> = report
            .visits
            .iter()
            .map(|v| v.key_path.clone().unwrap())
            .collect();
        assert_eq!(keys[1], "x/x.test-a-b");
        assert!(keys[2].starts_with("x/x.test-a-b~"));

        let sink = coordinator.sink();
        assert_eq!(sink.len(), 3);
        assert!(sink.get(&keys[1]).unwrap().html.as_deref().unwrap().contains("/a-b"));
        assert!(sink.get(&keys[2]).unwrap().html.as_deref().unwrap().contains("/a/b"));
    }

    #[tokio::test]
    async fn test_depth_first_order() {
        let mut coordinator = coordinator(site());

        let report = coordinator.run("https://x.test/").await.unwrap();

        assert_eq!(
            coordinator.renderer().loads,
            vec![
                "https://x.test/",
                "https://x.test/a",
                "https://x.test/c",
                "https://x.test/b"
            ]
        );
        assert_eq!(report.visit_order(), coordinator.renderer().loads);
        assert_eq!(report.state, SessionState::Complete);
        assert_eq!(
            report.discovered,
            vec![
                "https://x.test/",
                "https://x.test/a",
                "https://x.test/b",
                "https://x.test/c"
            ]
        );
    }

    #[tokio::test]
    async fn test_cycles_never_double_visit() {
        let renderer = ScriptedRenderer::new()
            .page("https://x.test/", &["/a", "/b", "/a"])
            .page("https://x.test/a", &["/b", "/", "/a"])
            .page("https://x.test/b", &["/a", "/b"]);
        let mut coordinator = coordinator(renderer);

        let report = coordinator.run("https://x.test/").await.unwrap();

        let renderer = coordinator.renderer();
        assert_eq!(renderer.loads.len(), 3);
        for url in ["https://x.test/", "https://x.test/a", "https://x.test/b"] {
            assert_eq!(renderer.load_count(url), 1, "{} loaded more than once", url);
        }
        assert_eq!(report.state, SessionState::Complete);
    }

    #[tokio::test]
    async fn test_failed_child_is_contained() {
        let renderer = ScriptedRenderer::new()
            .page("https://x.test/", &["/a"])
            .page("https://x.test/a", &["/b", "/d"])
            .fail("https://x.test/b")
            .page("https://x.test/d", &[]);
        let mut coordinator = coordinator(renderer);

        let report = coordinator.run("https://x.test/").await.unwrap();

        assert_eq!(report.state, SessionState::Complete);
        assert_eq!(coordinator.renderer().load_count("https://x.test/d"), 1);
        assert_eq!(coordinator.renderer().load_count("https://x.test/b"), 1);

        let failed: Vec<_> = report.failures().map(|v| v.route.as_str()).collect();
        assert_eq!(failed, vec!["https://x.test/b"]);
        assert!(matches!(
            report.visits[2].outcome,
            VisitOutcome::RenderFailed(_)
        ));
        assert_eq!(report.captured_count(), 3);
    }

    #[tokio::test]
    async fn test_missing_page_is_contained() {
        let renderer = ScriptedRenderer::new().page("https://x.test/", &["/gone", "/here"]).page(
            "https://x.test/here",
            &[],
        );
        let mut coordinator = coordinator(renderer);

        let report = coordinator.run("https://x.test/").await.unwrap();

        assert_eq!(report.state, SessionState::Complete);
        assert_eq!(report.visits.len(), 3);
        assert_eq!(report.failed_count(), 1);
    }

    #[tokio::test]
    async fn test_denylisted_route_is_never_loaded() {
        let renderer = ScriptedRenderer::new()
            .page("https://x.test/", &["/login", "/about", "/Sign-Up"])
            .page("https://x.test/about", &[]);
        let mut coordinator = coordinator(renderer);

        let report = coordinator.run("https://x.test/").await.unwrap();

        let renderer = coordinator.renderer();
        assert_eq!(renderer.load_count("https://x.test/login"), 0);
        assert_eq!(renderer.load_count("https://x.test/Sign-Up"), 0);
        assert_eq!(renderer.load_count("https://x.test/about"), 1);
        assert!(report.discovered.contains(&"https://x.test/login".to_string()));
        assert_eq!(
            report.excluded,
            vec!["https://x.test/login", "https://x.test/Sign-Up"]
        );
        assert_eq!(report.state, SessionState::Complete);
    }

    #[tokio::test]
    async fn test_empty_denylist_visits_everything() {
        let renderer = ScriptedRenderer::new()
            .page("https://x.test/", &["/login"])
            .page("https://x.test/login", &[]);
        let mut settings = settings();
        settings.denylist = Denylist::none();
        let mut coordinator = Coordinator::new(renderer, MemorySink::new(), settings);

        coordinator.run("https://x.test/").await.unwrap();

        assert_eq!(coordinator.renderer().load_count("https://x.test/login"), 1);
    }

    #[tokio::test]
    async fn test_routes_are_requalified_against_seed() {
        let renderer = ScriptedRenderer::new()
            .page("https://x.test/", &["/pricing"])
            .page("https://x.test/pricing", &[]);
        let mut coordinator = coordinator(renderer);

        coordinator.run("https://x.test/").await.unwrap();

        assert_eq!(coordinator.renderer().loads[1], "https://x.test/pricing");
        assert!(!coordinator.renderer().loads.iter().any(|l| l == "/pricing"));
    }

    #[tokio::test]
    async fn test_unreadable_links_are_dropped() {
        let renderer = ScriptedRenderer::new()
            .page("https://x.test/", &["/a"])
            .null_link("https://x.test/")
            .page("https://x.test/a", &[]);
        let mut coordinator = coordinator(renderer);

        let report = coordinator.run("https://x.test/").await.unwrap();

        assert_eq!(report.discovered.len(), 2);
        assert_eq!(report.visits[0].links_found, 1);
    }

    #[tokio::test]
    async fn test_captures_are_stored_under_host_folder() {
        let mut coordinator = coordinator(site());
        let report = coordinator.run("https://x.test/").await.unwrap();

        let sink = coordinator.sink();
        assert!(sink.has_folder("x"));
        assert_eq!(sink.len(), 4);
        assert!(sink.get("x/x.test-").is_some());
        assert!(sink.get("x/x.test-a").is_some());
        assert_eq!(report.visits[1].key_path.as_deref(), Some("x/x.test-a"));
        assert_eq!(report.visits[1].title.as_deref(), Some("Page /a"));
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_block_expansion() {
        let sink = MemorySink::new().fail_on("x/x.test-a");
        let mut coordinator = Coordinator::new(site(), sink, settings());

        let report = coordinator.run("https://x.test/").await.unwrap();

        assert_eq!(coordinator.renderer().load_count("https://x.test/c"), 1);
        assert!(matches!(
            report.visits[1].outcome,
            VisitOutcome::CaptureFailed(_)
        ));
        assert_eq!(coordinator.sink().store_calls().len(), 4);
        assert_eq!(report.state, SessionState::Complete);
    }

    #[tokio::test]
    async fn test_session_fails_when_renderer_cannot_start() {
        let mut coordinator = coordinator(site().fail_open());

        let err = coordinator.run("https://x.test/").await.unwrap_err();

        assert!(matches!(err, TrawlerError::Session { .. }));
        assert!(coordinator.renderer().loads.is_empty());
        assert_eq!(coordinator.renderer().closed, 1);
    }

    #[tokio::test]
    async fn test_invalid_seed_is_rejected_before_opening() {
        let mut coordinator = coordinator(site());

        let err = coordinator.run("/relative").await.unwrap_err();

        assert!(matches!(err, TrawlerError::InvalidSeed { .. }));
        assert_eq!(coordinator.renderer().opened, 0);
    }

    #[tokio::test]
    async fn test_renderer_is_opened_and_closed_once() {
        let mut coordinator = coordinator(site());

        coordinator.run("https://x.test/").await.unwrap();

        assert_eq!(coordinator.renderer().opened, 1);
        assert_eq!(coordinator.renderer().closed, 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut coordinator = coordinator(site()).with_cancellation(cancel);

        let report = coordinator.run("https://x.test/").await.unwrap();

        assert_eq!(report.state, SessionState::Cancelled);
        assert_eq!(coordinator.renderer().opened, 0);
        assert!(report.visits.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_mid_run_keeps_depth_first_prefix() {
        let cancel = CancellationToken::new();
        let renderer = site().cancel_when_loading("https://x.test/a", cancel.clone());
        let mut coordinator = coordinator(renderer).with_cancellation(cancel);

        let report = coordinator.run("https://x.test/").await.unwrap();

        assert_eq!(report.state, SessionState::Cancelled);
        assert_eq!(
            coordinator.renderer().loads,
            vec!["https://x.test/", "https://x.test/a"]
        );
        assert_eq!(coordinator.renderer().closed, 1);
    }

    #[tokio::test]
    async fn test_navigation_timeout_is_contained() {
        let renderer = site().slow("https://x.test/a", Duration::from_millis(500));
        let mut settings = settings();
        settings.navigation_timeout = Some(Duration::from_millis(20));
        let mut coordinator = Coordinator::new(renderer, MemorySink::new(), settings);

        let report = coordinator.run("https://x.test/").await.unwrap();

        assert_eq!(report.visits[1].outcome, VisitOutcome::TimedOut);
        // /c was only linked from the page that timed out
        assert_eq!(coordinator.renderer().load_count("https://x.test/c"), 0);
        assert_eq!(coordinator.renderer().load_count("https://x.test/b"), 1);
        assert_eq!(report.state, SessionState::Complete);
    }

    #[tokio::test]
    async fn test_visits_are_paced() {
        let mut settings = settings();
        settings.pacing = Duration::from_millis(25);
        let mut coordinator = Coordinator::new(site(), MemorySink::new(), settings);

        let start = Instant::now();
        coordinator.run("https://x.test/").await.unwrap();

        // Four visits, three cooldowns
        assert!(start.elapsed() >= Duration::from_millis(75));
    }

    #[tokio::test]
    async fn test_exclude_seed_rule_still_visits_seed() {
        let mut settings = settings();
        settings.completion_rule = CompletionRule::ExcludeSeed;
        let mut coordinator = Coordinator::new(site(), MemorySink::new(), settings);

        let report = coordinator.run("https://x.test/").await.unwrap();

        assert_eq!(report.visits.len(), 4);
        assert_eq!(report.state, SessionState::Complete);
    }

    #[tokio::test]
    async fn test_report_carries_config_hash() {
        let mut coordinator = coordinator(site()).with_config_hash("abc123");

        let report = coordinator.run("https://x.test/").await.unwrap();

        assert_eq!(report.config_hash.as_deref(), Some("abc123"));
        assert_eq!(report.mode, RunMode::Crawl);
        assert!(report.finished_at.is_some());
    }
}
