use crate::render::DEFAULT_MEDIA_SELECTORS;
use crate::url::DEFAULT_DENY_PATTERNS;
use serde::Deserialize;
use std::time::Duration;

/// Placeholder a profile href may use for the searched username
pub const USERNAME_PLACEHOLDER: &str = "{username}";

/// Main configuration structure for Route-Trawler
///
/// Every section is optional in the TOML file; missing keys fall back to
/// the defaults below.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(rename = "profile", default = "default_profiles")]
    pub profiles: Vec<ProfileEntry>,
    #[serde(default)]
    pub feed: FeedConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            user_agent: UserAgentConfig::default(),
            output: OutputConfig::default(),
            profiles: default_profiles(),
            feed: FeedConfig::default(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Pause between two sequential visits (milliseconds)
    #[serde(rename = "pacing-ms")]
    pub pacing_ms: u64,

    /// Deadline for a single navigation (seconds, 0 disables it)
    #[serde(rename = "navigation-timeout-secs")]
    pub navigation_timeout_secs: u64,

    /// Whether the seed must be visited for the crawl to count as complete
    #[serde(rename = "count-seed-toward-completion")]
    pub count_seed_toward_completion: bool,

    /// Route fragments that are discovered but never visited
    #[serde(rename = "deny-patterns")]
    pub deny_patterns: Vec<String>,
}

impl CrawlerConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn navigation_timeout(&self) -> Option<Duration> {
        (self.navigation_timeout_secs > 0).then(|| Duration::from_secs(self.navigation_timeout_secs))
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            pacing_ms: 1024,
            navigation_timeout_secs: 30,
            count_seed_toward_completion: true,
            deny_patterns: DEFAULT_DENY_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// Present as a phone browser
    pub mobile: bool,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "route-trawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            mobile: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for captures
    #[serde(rename = "capture-dir")]
    pub capture_dir: String,

    /// Where to write the markdown run report, if anywhere
    #[serde(rename = "report-path")]
    pub report_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            capture_dir: "./screenshots".to_string(),
            report_path: None,
        }
    }
}

/// One profile page template searched in profile-search mode
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProfileEntry {
    /// Short platform name, also the capture name (e.g. "twitter")
    pub key: String,

    /// URL prefix, or a template containing `{username}`
    pub href: String,
}

impl ProfileEntry {
    pub fn new(key: &str, href: &str) -> Self {
        Self {
            key: key.to_string(),
            href: href.to_string(),
        }
    }

    /// Builds the profile URL for a username
    ///
    /// ```
    /// use route_trawler::config::ProfileEntry;
    ///
    /// let plain = ProfileEntry::new("twitter", "https://twitter.com/");
    /// assert_eq!(plain.profile_url("jane"), "https://twitter.com/jane");
    ///
    /// let templated = ProfileEntry::new("mastodon", "https://mastodon.social/@{username}/media");
    /// assert_eq!(templated.profile_url("jane"), "https://mastodon.social/@jane/media");
    /// ```
    pub fn profile_url(&self, username: &str) -> String {
        if self.href.contains(USERNAME_PLACEHOLDER) {
            self.href.replace(USERNAME_PLACEHOLDER, username)
        } else {
            format!("{}{}", self.href, username)
        }
    }
}

/// Profile templates searched when the configuration lists none
pub fn default_profiles() -> Vec<ProfileEntry> {
    vec![
        ProfileEntry::new("twitter", "https://twitter.com/"),
        ProfileEntry::new("instagram", "https://instagram.com/"),
        ProfileEntry::new("facebook", "https://facebook.com/"),
        ProfileEntry::new("linkedin", "https://linkedin.com/in/"),
    ]
}

/// Feed extraction configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// CSS selectors matching media elements whose targets are harvested
    #[serde(rename = "media-selectors")]
    pub media_selectors: Vec<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            media_selectors: DEFAULT_MEDIA_SELECTORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
