//! Configuration module for Route-Trawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a configuration file is fine.
//!
//! # Example
//!
//! ```no_run
//! use route_trawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trawler.toml")).unwrap();
//! println!("Pacing between visits: {}ms", config.crawler.pacing_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_profiles, Config, CrawlerConfig, FeedConfig, OutputConfig, ProfileEntry,
    UserAgentConfig, USERNAME_PLACEHOLDER,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_or_default, load_config_with_hash, parse_config,
};
pub use validation::validate;
