//! HTML parser for extracting same-origin links, media and metadata
//!
//! This module handles parsing rendered HTML to extract:
//! - Root-relative link targets (the only links a crawl follows)
//! - Media element URLs (images, video, audio sources)
//! - Page title

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Attributes that carry a media element's target, in lookup order
const MEDIA_ATTRIBUTES: &[&str] = &["src", "data-src", "poster"];

/// Media selectors used when none are configured
pub const DEFAULT_MEDIA_SELECTORS: &[&str] = &["img[src]", "video[src]", "source[src]"];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Root-relative link targets, in document order
    pub links: Vec<String>,

    /// Absolute media URLs, in document order without duplicates
    pub media: Vec<String>,
}

/// Parses every selector, skipping the ones that are not valid CSS
pub fn compile_selectors<S: AsRef<str>>(selectors: &[S]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|raw| match Selector::parse(raw.as_ref()) {
            Ok(selector) => Some(selector),
            Err(e) => {
                tracing::warn!("Ignoring invalid media selector '{}': {:?}", raw.as_ref(), e);
                None
            }
        })
        .collect()
}

/// Parses HTML content and extracts links, media and the title
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="/...">` anchors whose target is root-relative
///
/// **Exclude:**
/// - absolute and protocol-relative (`//host/...`) targets
/// - relative targets without a leading slash
/// - `<a href="..." download>`
///
/// # Example
///
/// ```
/// use route_trawler::render::{compile_selectors, parse_page, DEFAULT_MEDIA_SELECTORS};
/// use url::Url;
///
/// let html = r#"<html><head><title>Home</title></head><body>
///     <a href="/about">About</a><img src="/logo.png"></body></html>"#;
/// let base = Url::parse("https://x.test/").unwrap();
/// let parsed = parse_page(html, &base, &compile_selectors(DEFAULT_MEDIA_SELECTORS));
/// assert_eq!(parsed.links, vec!["/about".to_string()]);
/// assert_eq!(parsed.media, vec!["https://x.test/logo.png".to_string()]);
/// ```
pub fn parse_page(html: &str, base_url: &Url, media_selectors: &[Selector]) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_same_origin_links(&document),
        media: extract_media(&document, base_url, media_selectors),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_same_origin_links(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href^='/']") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| href.starts_with('/') && !href.starts_with("//"))
        .map(str::to_string)
        .collect()
}

fn extract_media(document: &Html, base_url: &Url, selectors: &[Selector]) -> Vec<String> {
    let mut media: Vec<String> = Vec::new();

    for selector in selectors {
        for element in document.select(selector) {
            let Some(target) = media_target(&element) else {
                continue;
            };

            if let Some(absolute) = resolve_media(target, base_url) {
                if !media.contains(&absolute) {
                    media.push(absolute);
                }
            }
        }
    }

    media
}

fn media_target<'a>(element: &ElementRef<'a>) -> Option<&'a str> {
    MEDIA_ATTRIBUTES
        .iter()
        .find_map(|attr| element.value().attr(attr))
        .map(str::trim)
        .filter(|target| !target.is_empty())
}

/// Resolves a media target to an absolute http(s) URL
///
/// `data:` URIs and other schemes are dropped.
fn resolve_media(target: &str, base_url: &Url) -> Option<String> {
    let absolute = base_url.join(target).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute.to_string()),
        _ => None,
    }
}
