//! Run report types
//!
//! A `CrawlReport` is built up by a driver while it runs and describes, once
//! the run ends, what was discovered, what was visited in which order and
//! how each visit ended.

use crate::state::{SessionState, VisitOutcome};
use chrono::{DateTime, Utc};
use std::fmt;

/// Which entry point produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunMode {
    /// Full same-domain walk from a seed
    Crawl,
    /// Fixed list of profile pages for one username
    ProfileSearch,
    /// Single aggregator page with media harvesting
    Feed,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crawl => "crawl",
            Self::ProfileSearch => "profile-search",
            Self::Feed => "feed",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attempted visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitRecord {
    /// The route handed to the renderer
    pub route: String,

    /// Sink key the captures were stored under, if the page rendered
    pub key_path: Option<String>,

    /// Page title, if the page rendered and had one
    pub title: Option<String>,

    /// Number of new routes this page added to the frontier
    pub links_found: usize,

    /// How the visit ended
    pub outcome: VisitOutcome,
}

/// Summary of one run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub mode: RunMode,

    /// Seed URL, username or feed URL
    pub target: String,

    pub state: SessionState,
    pub config_hash: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Every discovered route in discovery order
    pub discovered: Vec<String>,

    /// Discovered routes that were deliberately never visited
    pub excluded: Vec<String>,

    /// Visits in the order they happened
    pub visits: Vec<VisitRecord>,
}

impl CrawlReport {
    /// Creates a report for a run that starts now
    pub fn new(mode: RunMode, target: impl Into<String>) -> Self {
        Self {
            mode,
            target: target.into(),
            state: SessionState::Idle,
            config_hash: None,
            started_at: Utc::now(),
            finished_at: None,
            discovered: Vec::new(),
            excluded: Vec::new(),
            visits: Vec::new(),
        }
    }

    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn record(&mut self, visit: VisitRecord) {
        self.visits.push(visit);
    }

    /// Stamps the end of the run and its final session state
    pub fn finish(&mut self, state: SessionState) {
        self.state = state;
        self.finished_at = Some(Utc::now());
    }

    /// Routes in the order they were handed to the renderer
    pub fn visit_order(&self) -> Vec<&str> {
        self.visits.iter().map(|v| v.route.as_str()).collect()
    }

    pub fn captured_count(&self) -> usize {
        self.visits.iter().filter(|v| v.outcome.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.visits.len() - self.captured_count()
    }

    /// Visits whose outcome was not a full capture
    pub fn failures(&self) -> impl Iterator<Item = &VisitRecord> {
        self.visits.iter().filter(|v| !v.outcome.is_success())
    }

    /// Returns the capture rate as a percentage of visits
    pub fn success_rate(&self) -> f64 {
        if self.visits.is_empty() {
            return 0.0;
        }
        (self.captured_count() as f64 / self.visits.len() as f64) * 100.0
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds() as f64 / 1000.0)
    }
}
