//! Artifact sink traits and error types
//!
//! This module defines the trait interface for capture persistence backends
//! and associated error types.

use crate::render::CaptureBundle;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during artifact persistence
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid key path: {0}")]
    InvalidKey(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Trait for capture persistence backends
///
/// Key paths are relative, `/`-separated and already filesystem-safe; the
/// last segment names the capture, the segments before it name its folder.
#[async_trait]
pub trait ArtifactSink: Send {
    /// Makes sure the folder for a key path exists
    ///
    /// Idempotent: calling it for an existing folder succeeds.
    async fn ensure_path(&mut self, key_path: &str) -> SinkResult<()>;

    /// Persists every capture in the bundle under the key path
    async fn store(&mut self, key_path: &str, bundle: &CaptureBundle) -> SinkResult<()>;
}

/// Rejects absolute keys, empty segments and parent references
pub fn validate_key_path(key_path: &str) -> SinkResult<()> {
    let bad = key_path.is_empty()
        || key_path.starts_with('/')
        || key_path.contains('\\')
        || key_path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if bad {
        return Err(SinkError::InvalidKey(key_path.to_string()));
    }
    Ok(())
}
