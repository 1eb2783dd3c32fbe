//! Scripted renderer used by the crawler unit tests

use crate::render::{CaptureBundle, RenderError, RenderResult, RenderedPage, Renderer};
use crate::url::Route;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A renderer serving a fixed link graph and recording every call
#[derive(Default)]
pub(crate) struct ScriptedRenderer {
    pages: HashMap<String, Vec<Option<String>>>,
    media: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    slow: HashMap<String, Duration>,
    fail_open: bool,
    cancel_on: Option<(String, CancellationToken)>,
    is_open: bool,
    pub loads: Vec<String>,
    pub opened: usize,
    pub closed: usize,
}

impl ScriptedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            links.iter().map(|l| Some(l.to_string())).collect(),
        );
        self
    }

    pub fn null_link(mut self, url: &str) -> Self {
        self.pages.entry(url.to_string()).or_default().push(None);
        self
    }

    pub fn media(mut self, url: &str, media: &[&str]) -> Self {
        self.media
            .insert(url.to_string(), media.iter().map(|m| m.to_string()).collect());
        self
    }

    pub fn fail(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn slow(mut self, url: &str, delay: Duration) -> Self {
        self.slow.insert(url.to_string(), delay);
        self
    }

    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn cancel_when_loading(mut self, url: &str, token: CancellationToken) -> Self {
        self.cancel_on = Some((url.to_string(), token));
        self
    }

    pub fn load_count(&self, url: &str) -> usize {
        self.loads.iter().filter(|l| l.as_str() == url).count()
    }
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn open(&mut self) -> RenderResult<()> {
        if self.fail_open {
            return Err(RenderError::Launch("no browser available".to_string()));
        }
        self.opened += 1;
        self.is_open = true;
        Ok(())
    }

    async fn load(&mut self, route: &Route) -> RenderResult<RenderedPage> {
        if !self.is_open {
            return Err(RenderError::NotOpen);
        }

        let url = route.to_string();
        self.loads.push(url.clone());

        if let Some((target, token)) = &self.cancel_on {
            if *target == url {
                token.cancel();
            }
        }

        if let Some(delay) = self.slow.get(&url) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.contains(&url) {
            return Err(RenderError::Navigation {
                url,
                message: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }

        let Some(links) = self.pages.get(&url) else {
            return Err(RenderError::Status { url, status: 404 });
        };

        Ok(RenderedPage {
            final_url: url.clone(),
            title: Some(format!("Page {}", route.path_and_query())),
            link_candidates: links.clone(),
            capture: CaptureBundle {
                screenshot: Some(url.as_bytes().to_vec()),
                html: Some(format!("<html>{}</html>", url)),
                media: self.media.get(&url).cloned().unwrap_or_default(),
            },
        })
    }

    async fn close(&mut self) {
        self.closed += 1;
        self.is_open = false;
    }
}
