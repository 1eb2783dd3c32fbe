use crate::url::Route;

/// Authentication-flow patterns that are discovered but never visited
pub const DEFAULT_DENY_PATTERNS: &[&str] = &["login", "sign-in", "sign-up", "register"];

/// A predicate deciding which discovered routes must not be expanded
///
/// A pattern is split into words at hyphens, underscores, spaces and plus
/// signs. It matches a route when those words appear in order, joined by at
/// most one such separator (or an encoded space), and the whole match sits
/// between word boundaries. So `sign-in` matches `/signin`, `/Sign_In` and
/// `/sign%20in`, but not `/designing` or `/sign-inventory`. Matching is
/// case-insensitive, and only the path and query of a route are inspected,
/// never its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denylist {
    patterns: Vec<Vec<String>>,
}

impl Denylist {
    /// Builds a denylist from raw patterns; blank patterns are dropped
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| words(p.as_ref()))
            .filter(|words| !words.is_empty())
            .collect();
        Self { patterns }
    }

    /// A denylist that lets every route through
    pub fn none() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Checks whether a route must be kept out of the visit order
    ///
    /// # Examples
    ///
    /// ```
    /// use route_trawler::url::{Denylist, Route};
    ///
    /// let denylist = Denylist::default();
    /// assert!(denylist.matches(&Route::parse("https://x.test/Sign-In").unwrap()));
    /// assert!(!denylist.matches(&Route::parse("https://x.test/about").unwrap()));
    /// assert!(!denylist.matches(&Route::parse("https://x.test/blog-insights").unwrap()));
    /// ```
    pub fn matches(&self, route: &Route) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let target = route.path_and_query().to_lowercase().replace("%20", " ");
        self.patterns
            .iter()
            .any(|words| matches_words(words, target.as_bytes()))
    }
}

impl Default for Denylist {
    fn default() -> Self {
        Self::new(DEFAULT_DENY_PATTERNS)
    }
}

fn is_separator(b: u8) -> bool {
    matches!(b, b'-' | b'_' | b' ' | b'+')
}

fn words(raw: &str) -> Vec<String> {
    raw.to_lowercase()
        .replace("%20", " ")
        .split(|c: char| c.is_ascii() && is_separator(c as u8))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Finds the pattern anywhere in `target` with word boundaries on both ends
fn matches_words(words: &[String], target: &[u8]) -> bool {
    (0..target.len()).any(|start| {
        if start > 0 && target[start - 1].is_ascii_alphanumeric() {
            return false;
        }
        match match_len(words, &target[start..]) {
            Some(len) => target
                .get(start + len)
                .map_or(true, |b| !b.is_ascii_alphanumeric()),
            None => false,
        }
    })
}

/// Length of the pattern match at the very start of `input`, if any
fn match_len(words: &[String], input: &[u8]) -> Option<usize> {
    let mut pos = 0;
    for (i, word) in words.iter().enumerate() {
        if i > 0 && input.get(pos).copied().map_or(false, is_separator) {
            pos += 1;
        }
        if !input.get(pos..)?.starts_with(word.as_bytes()) {
            return None;
        }
        pos += word.len();
    }
    Some(pos)
}
