use crate::config::types::{Config, CrawlerConfig, FeedConfig, OutputConfig, ProfileEntry, UserAgentConfig};
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Longest pause allowed between two visits
const MAX_PACING_MS: u64 = 60_000;

/// Longest navigation deadline allowed
const MAX_NAVIGATION_TIMEOUT_SECS: u64 = 600;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_profiles(&config.profiles)?;
    validate_feed_config(&config.feed)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.pacing_ms > MAX_PACING_MS {
        return Err(ConfigError::Validation(format!(
            "pacing_ms must be <= {}ms, got {}ms",
            MAX_PACING_MS, config.pacing_ms
        )));
    }

    if config.navigation_timeout_secs > MAX_NAVIGATION_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout_secs must be <= {}, got {}",
            MAX_NAVIGATION_TIMEOUT_SECS, config.navigation_timeout_secs
        )));
    }

    if config.deny_patterns.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "deny_patterns cannot contain blank patterns".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.capture_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "capture_dir cannot be empty".to_string(),
        ));
    }

    if matches!(&config.report_path, Some(path) if path.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "report_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates profile-search templates
fn validate_profiles(profiles: &[ProfileEntry]) -> Result<(), ConfigError> {
    let mut keys = HashSet::new();

    for entry in profiles {
        if entry.key.is_empty()
            || !entry
                .key
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Validation(format!(
                "Profile key '{}' must be non-empty and contain only alphanumerics, '-' or '_'",
                entry.key
            )));
        }

        if !keys.insert(entry.key.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Profile key '{}' is listed more than once",
                entry.key
            )));
        }

        // A sample username must yield an absolute http(s) URL
        let sample = entry.profile_url("username");
        let url = Url::parse(&sample).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid profile href '{}': {}", entry.href, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Profile href '{}' must use http or https",
                entry.href
            )));
        }
    }

    Ok(())
}

/// Validates feed extraction configuration
fn validate_feed_config(config: &FeedConfig) -> Result<(), ConfigError> {
    if config.media_selectors.is_empty() {
        return Err(ConfigError::Validation(
            "media_selectors must list at least one selector".to_string(),
        ));
    }

    for raw in &config.media_selectors {
        Selector::parse(raw)
            .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", raw, e)))?;
    }

    Ok(())
}
