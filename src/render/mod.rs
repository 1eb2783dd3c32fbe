//! Rendering module: the browsing-context capability the crawler drives
//!
//! - `traits`: the `Renderer` interface, rendered page data and `RenderError`
//! - `fetcher`: `HttpRenderer`, a reqwest-backed renderer
//! - `parser`: HTML extraction of same-origin links, media and title

mod fetcher;
mod parser;
mod traits;

pub use fetcher::{build_http_client, user_agent_string, HttpRenderer};
pub use parser::{compile_selectors, parse_page, ParsedPage, DEFAULT_MEDIA_SELECTORS};
pub use traits::{CaptureBundle, RenderError, RenderResult, RenderedPage, Renderer};
