//! Storage module for persisting capture artifacts
//!
//! This module handles everything the crawler hands off for persistence:
//! - The `ArtifactSink` capability interface and its errors
//! - A filesystem sink writing screenshots, HTML and media listings
//! - An in-memory sink for dry runs and inspection

mod filesystem;
mod memory;
mod traits;

pub use filesystem::FsSink;
pub use memory::MemorySink;
pub use traits::{validate_key_path, ArtifactSink, SinkError, SinkResult};

/// Joins a folder and a capture name into a sink key path
///
/// ```
/// use route_trawler::storage::key_path;
///
/// assert_eq!(key_path("example", "x.test-about"), "example/x.test-about");
/// ```
pub fn key_path(folder: &str, name: &str) -> String {
    format!("{}/{}", folder, name)
}
