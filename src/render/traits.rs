//! Renderer traits and error types
//!
//! This module defines the capability interface the crawler drives to load
//! pages, together with the data a rendered page hands back.

use crate::url::Route;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading or extracting a page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Renderer failed to launch: {0}")]
    Launch(String),

    #[error("Renderer is not open")]
    NotOpen,

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML from {url}, got {content_type}")]
    ContentMismatch { url: String, content_type: String },

    #[error("Navigation to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },
}

/// Result type for renderer operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Opaque captures produced from one rendered page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureBundle {
    /// Full-page image bytes (PNG), if the renderer can take screenshots
    pub screenshot: Option<Vec<u8>>,

    /// Serialized page HTML
    pub html: Option<String>,

    /// Absolute URLs harvested from media elements
    pub media: Vec<String>,
}

impl CaptureBundle {
    pub fn is_empty(&self) -> bool {
        self.screenshot.is_none() && self.html.is_none() && self.media.is_empty()
    }
}

/// Everything a renderer learned from one navigation
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    /// URL the browsing context ended up on
    pub final_url: String,

    /// Document title, if any
    pub title: Option<String>,

    /// Same-origin link targets in document order
    ///
    /// Targets are root-relative (`/about`). `None` stands for an anchor
    /// whose target could not be read; the frontier drops those.
    pub link_candidates: Vec<Option<String>>,

    /// Captures to hand to the artifact sink
    pub capture: CaptureBundle,
}

/// A single browsing context that loads pages one at a time
///
/// Every method takes `&mut self`: a renderer is a shared mutable resource
/// and cannot serve two navigations at once.
#[async_trait]
pub trait Renderer: Send {
    /// Acquires the browsing context; called once per session
    async fn open(&mut self) -> RenderResult<()>;

    /// Navigates to a route and extracts links and captures
    async fn load(&mut self, route: &Route) -> RenderResult<RenderedPage>;

    /// Releases the browsing context; called once per session
    async fn close(&mut self);
}
