//! HTTP-backed renderer implementation
//!
//! This module loads pages over plain HTTP, including:
//! - Building HTTP clients with proper user agent strings
//! - Optional phone emulation through the user agent
//! - Classifying non-success responses and non-HTML content
//! - Handing the body to the HTML parser for links, media and title
//!
//! It does not execute scripts, so it never produces screenshots; the HTML
//! text and harvested media are its captures.

use crate::config::{Config, UserAgentConfig};
use crate::render::parser::{compile_selectors, parse_page};
use crate::render::traits::{CaptureBundle, RenderError, RenderResult, RenderedPage, Renderer};
use crate::url::Route;
use async_trait::async_trait;
use reqwest::Client;
use scraper::Selector;
use std::time::Duration;
use url::Url;

/// User agent prefix used when phone emulation is enabled
const MOBILE_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) \
AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1";

/// Builds the user agent string for a configuration
///
/// Format: `CrawlerName/Version`, prefixed by a phone browser signature when
/// `mobile` is enabled.
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    let own = format!("{}/{}", config.crawler_name, config.crawler_version);
    if config.mobile {
        format!("{} {}", MOBILE_AGENT, own)
    } else {
        own
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use route_trawler::config::UserAgentConfig;
/// use route_trawler::render::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Renderer that fetches pages with `reqwest` and parses them with `scraper`
pub struct HttpRenderer {
    user_agent: UserAgentConfig,
    media_selectors: Vec<Selector>,
    client: Option<Client>,
}

impl HttpRenderer {
    /// Creates a closed renderer; `open` builds the HTTP client
    pub fn new<S: AsRef<str>>(user_agent: UserAgentConfig, media_selectors: &[S]) -> Self {
        Self {
            user_agent,
            media_selectors: compile_selectors(media_selectors),
            client: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.user_agent.clone(), &config.feed.media_selectors)
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn open(&mut self) -> RenderResult<()> {
        if self.client.is_none() {
            let client = build_http_client(&self.user_agent)
                .map_err(|e| RenderError::Launch(e.to_string()))?;
            tracing::debug!("HTTP renderer opened ({})", user_agent_string(&self.user_agent));
            self.client = Some(client);
        }
        Ok(())
    }

    async fn load(&mut self, route: &Route) -> RenderResult<RenderedPage> {
        let client = self.client.as_ref().ok_or(RenderError::NotOpen)?;
        let url = route.as_str();

        let response = client.get(url).send().await.map_err(|e| RenderError::Http {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("text/html") {
            return Err(RenderError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| RenderError::Http {
            url: url.to_string(),
            source: e,
        })?;

        let leaves_origin = !same_origin(url, &final_url);
        let mut page = render_body(final_url, body, &self.media_selectors);
        if leaves_origin {
            // Root-relative links on a foreign page would be re-qualified against our origin
            tracing::warn!(
                "{} redirected off-origin to {}, its links are not followed",
                url,
                page.final_url
            );
            page.link_candidates.clear();
        }

        Ok(page)
    }

    async fn close(&mut self) {
        if self.client.take().is_some() {
            tracing::debug!("HTTP renderer closed");
        }
    }
}

/// Whether a response landed on the origin that was requested
fn same_origin(requested: &str, landed: &Url) -> bool {
    Url::parse(requested).map_or(false, |requested| requested.origin() == landed.origin())
}

fn render_body(final_url: Url, body: String, media_selectors: &[Selector]) -> RenderedPage {
    let parsed = parse_page(&body, &final_url, media_selectors);

    RenderedPage {
        final_url: final_url.to_string(),
        title: parsed.title,
        link_candidates: parsed.links.into_iter().map(Some).collect(),
        capture: CaptureBundle {
            screenshot: None,
            html: Some(body),
            media: parsed.media,
        },
    }
}
