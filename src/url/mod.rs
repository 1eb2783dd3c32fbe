//! URL handling module for Route-Trawler
//!
//! This module provides the `Route` type, route normalization and
//! re-qualification, seed validation, filesystem-safe route keys, host label
//! extraction and the authentication-flow denylist.

mod domain;
mod matcher;
mod normalize;

use std::fmt;

// Re-export main functions
pub use domain::host_label;
pub use matcher::{Denylist, DEFAULT_DENY_PATTERNS};
pub use normalize::{digest_route_key, normalize_route, qualify, route_key, validate_seed};

/// A normalized, absolute http(s) URL identifying one page to visit
///
/// Routes are only built through [`normalize_route`], [`qualify`] or
/// [`validate_seed`], so two routes are equal exactly when their normalized
/// string forms are byte-equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Route(String);

impl Route {
    pub(crate) fn from_normalized(url: ::url::Url) -> Self {
        Self(url.into())
    }

    /// Parses and normalizes a route from an absolute URL string
    pub fn parse(raw: &str) -> crate::UrlResult<Self> {
        normalize_route(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns the path, query included, with the scheme and authority removed
    ///
    /// ```
    /// use route_trawler::url::Route;
    ///
    /// let route = Route::parse("https://x.test/pricing?plan=pro").unwrap();
    /// assert_eq!(route.path_and_query(), "/pricing?plan=pro");
    /// ```
    pub fn path_and_query(&self) -> &str {
        let after_scheme = self
            .0
            .find("://")
            .map(|idx| &self.0[idx + 3..])
            .unwrap_or(&self.0);

        match after_scheme.find('/') {
            Some(idx) => &after_scheme[idx..],
            None => "/",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Route {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
