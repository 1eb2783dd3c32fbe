//! Frontier and visited-set bookkeeping for one crawl session
//!
//! The frontier records every route ever discovered, seed first, in
//! insertion order and without duplicates. Alongside it the tracker keeps the
//! set of visited routes (rendering attempted, successfully or not) and the
//! set of excluded routes (discovered but deliberately never visited).
//!
//! Invariants:
//! - visited ⊆ frontier and excluded ⊆ frontier
//! - a route enters the frontier at most once
//! - the frontier only ever grows

use crate::url::{qualify, validate_seed, Route};
use crate::TrawlerError;
use std::collections::{HashMap, HashSet};
use url::Url;

/// Which routes must be settled for the crawl to count as complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionRule {
    /// Every frontier route, the seed included
    #[default]
    IncludeSeed,

    /// Every frontier route except the seed
    ExcludeSeed,
}

/// Discovered and visited routes of one crawl session
#[derive(Debug, Clone)]
pub struct Frontier {
    origin: Url,
    origin_prefix: String,
    routes: Vec<Route>,
    /// Position of every route in `routes`
    index: HashMap<Route, usize>,
    visited: HashSet<Route>,
    excluded: HashSet<Route>,
    /// Routes that are neither visited nor excluded
    unsettled: usize,
    rule: CompletionRule,
}

impl Frontier {
    /// Starts a frontier holding only the seed route
    ///
    /// # Errors
    ///
    /// Returns `TrawlerError::InvalidSeed` when the seed is not an absolute
    /// http(s) URL with a dotted host or an IP address.
    ///
    /// # Example
    ///
    /// ```
    /// use route_trawler::crawler::Frontier;
    ///
    /// let frontier = Frontier::seed("https://x.test/").unwrap();
    /// assert_eq!(frontier.len(), 1);
    /// assert!(Frontier::seed("not a url").is_err());
    /// ```
    pub fn seed(seed: &str) -> Result<Self, TrawlerError> {
        let seed = validate_seed(seed)?;
        let origin = Url::parse(seed.as_str()).map_err(|e| TrawlerError::InvalidSeed {
            seed: seed.to_string(),
            reason: e.to_string(),
        })?;
        let origin_prefix = format!("{}/", origin.origin().ascii_serialization());

        let mut index = HashMap::new();
        index.insert(seed.clone(), 0);

        Ok(Self {
            origin,
            origin_prefix,
            routes: vec![seed],
            index,
            visited: HashSet::new(),
            excluded: HashSet::new(),
            unsettled: 1,
            rule: CompletionRule::default(),
        })
    }

    pub fn with_completion_rule(mut self, rule: CompletionRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn completion_rule(&self) -> CompletionRule {
        self.rule
    }

    /// The seed route, always the first frontier entry
    pub fn seed_route(&self) -> &Route {
        &self.routes[0]
    }

    /// The seed URL every root-relative candidate is qualified against
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Folds link candidates found on a page into the frontier
    ///
    /// Candidates are dropped when they are `None`, the bare root path `/`,
    /// not a valid URL once qualified against the seed origin, on another
    /// origin, or already known. The rest are appended in encounter order and
    /// returned as absolute routes.
    ///
    /// # Example
    ///
    /// ```
    /// use route_trawler::crawler::Frontier;
    ///
    /// let mut frontier = Frontier::seed("https://x.test/").unwrap();
    /// let candidates = vec![Some("/a".to_string()), None, Some("/".to_string()), Some("/a".to_string())];
    /// let added = frontier.discover(&candidates);
    /// assert_eq!(added.len(), 1);
    /// assert_eq!(added[0].as_str(), "https://x.test/a");
    /// ```
    pub fn discover(&mut self, candidates: &[Option<String>]) -> Vec<Route> {
        let mut added = Vec::new();

        for candidate in candidates.iter().flatten() {
            let candidate = candidate.trim();
            if candidate.is_empty() || candidate == "/" {
                continue;
            }

            let route = match qualify(&self.origin, candidate) {
                Ok(route) => route,
                Err(e) => {
                    tracing::debug!("Dropping link candidate {}: {}", candidate, e);
                    continue;
                }
            };

            if !route.as_str().starts_with(&self.origin_prefix) {
                tracing::debug!("Dropping cross-origin link candidate {}", route);
                continue;
            }

            if self.append(&route) {
                added.push(route);
            }
        }

        added
    }

    /// Records that a visit to the route has been attempted
    ///
    /// Idempotent. Returns `true` the first time a route is marked. A route
    /// that was never discovered is appended to the frontier first so the
    /// visited set stays a subset of it.
    pub fn mark_visited(&mut self, route: &Route) -> bool {
        self.append(route);
        let first = self.visited.insert(route.clone());
        if first && !self.excluded.contains(route) {
            self.unsettled -= 1;
        }
        first
    }

    pub fn is_visited(&self, route: &Route) -> bool {
        self.visited.contains(route)
    }

    /// Records that a discovered route will deliberately never be visited
    pub fn exclude(&mut self, route: &Route) -> bool {
        self.append(route);
        let first = self.excluded.insert(route.clone());
        if first && !self.visited.contains(route) {
            self.unsettled -= 1;
        }
        first
    }

    pub fn is_excluded(&self, route: &Route) -> bool {
        self.excluded.contains(route)
    }

    fn is_settled(&self, route: &Route) -> bool {
        self.visited.contains(route) || self.excluded.contains(route)
    }

    /// Appends an unknown route as unsettled; returns `false` if it was known
    fn append(&mut self, route: &Route) -> bool {
        if self.index.contains_key(route) {
            return false;
        }
        self.index.insert(route.clone(), self.routes.len());
        self.routes.push(route.clone());
        self.unsettled += 1;
        true
    }

    /// True when every route the completion rule covers has been settled
    ///
    /// A route is settled once it is visited or excluded.
    pub fn is_complete(&self) -> bool {
        match self.rule {
            CompletionRule::IncludeSeed => self.unsettled == 0,
            CompletionRule::ExcludeSeed => {
                self.unsettled == 0
                    || (self.unsettled == 1 && !self.is_settled(self.seed_route()))
            }
        }
    }

    pub fn contains(&self, route: &Route) -> bool {
        self.index.contains_key(route)
    }

    /// Zero-based discovery position of a route
    pub fn position(&self, route: &Route) -> Option<usize> {
        self.index.get(route).copied()
    }

    /// All discovered routes in discovery order
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Discovered routes that are neither visited nor excluded
    pub fn pending(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().filter(|route| !self.is_settled(route))
    }

    pub fn pending_count(&self) -> usize {
        self.unsettled
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Excluded routes in discovery order
    pub fn excluded(&self) -> Vec<&Route> {
        self.routes
            .iter()
            .filter(|route| self.excluded.contains(*route))
            .collect()
    }
}
