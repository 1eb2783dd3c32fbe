use crate::url::Route;
use crate::{TrawlerError, UrlError};
use sha2::{Digest, Sha256};
use url::{Host, Url};

/// Hex characters of the route digest used to tell colliding keys apart
const KEY_DIGEST_LEN: usize = 8;

/// Characters that may not appear in a file name on common filesystems
const UNSAFE_KEY_CHARS: &[char] = &['\\', ':', '*', '?', '"', '<', '>', '|'];

/// Normalizes an absolute URL into a [`Route`]
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an HTTP or HTTPS scheme
/// 3. Require a host
/// 4. Lowercase scheme and host, drop the default port and resolve dot
///    segments (all done by the parser)
/// 5. Remove the fragment
///
/// Trailing slashes and query strings are kept exactly as given.
///
/// # Examples
///
/// ```
/// use route_trawler::url::normalize_route;
///
/// let route = normalize_route("HTTPS://Example.COM:443/a/../Page/?q=1#top").unwrap();
/// assert_eq!(route.as_str(), "https://example.com/Page/?q=1");
/// ```
pub fn normalize_route(raw: &str) -> Result<Route, UrlError> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    finish(url)
}

/// Re-qualifies a discovered link candidate against the crawl origin
///
/// Root-relative candidates are prefixed with the origin; candidates that are
/// already absolute are normalized as they are.
///
/// # Examples
///
/// ```
/// use route_trawler::url::qualify;
/// use url::Url;
///
/// let origin = Url::parse("https://x.test").unwrap();
/// assert_eq!(qualify(&origin, "/pricing").unwrap().as_str(), "https://x.test/pricing");
/// ```
pub fn qualify(origin: &Url, candidate: &str) -> Result<Route, UrlError> {
    let url = origin
        .join(candidate.trim())
        .map_err(|e| UrlError::Parse(e.to_string()))?;
    finish(url)
}

fn finish(mut url: Url) -> Result<Route, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(Route::from_normalized(url))
}

/// Validates a crawl seed and returns it as a normalized route
///
/// A seed must be an absolute http(s) URL whose host is either an IP address
/// or a dotted domain name (`scheme://host.tld[/path]`).
pub fn validate_seed(seed: &str) -> Result<Route, TrawlerError> {
    let invalid = |reason: &str| TrawlerError::InvalidSeed {
        seed: seed.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(seed.trim()).map_err(|e| invalid(&e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid("scheme must be http or https"));
    }

    match url.host() {
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {}
        Some(Host::Domain(domain)) => {
            let labels: Vec<&str> = domain.split('.').collect();
            if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
                return Err(invalid("host must be a dotted domain name"));
            }
        }
        None => return Err(invalid("missing host")),
    }

    finish(url).map_err(|e| invalid(&e.to_string()))
}

/// Encodes a route as a filesystem-safe key
///
/// The scheme is stripped, every `/` becomes `-` and characters that are not
/// allowed in file names become `_`.
///
/// ```
/// use route_trawler::url::{route_key, Route};
///
/// let route = Route::parse("https://x.test/blog/post").unwrap();
/// assert_eq!(route_key(&route), "x.test-blog-post");
/// ```
pub fn route_key(route: &Route) -> String {
    let raw = route.as_str();
    let without_scheme = ["https://", "http://"]
        .iter()
        .find_map(|scheme| raw.strip_prefix(scheme))
        .unwrap_or(raw);

    without_scheme
        .chars()
        .map(|c| match c {
            '/' => '-',
            c if UNSAFE_KEY_CHARS.contains(&c) => '_',
            c => c,
        })
        .collect()
}

/// Route key with a short digest of the full route appended
///
/// Used when two routes of one session encode to the same [`route_key`],
/// e.g. `/a-b` and `/a/b`.
///
/// ```
/// use route_trawler::url::{digest_route_key, route_key, Route};
///
/// let dashed = Route::parse("https://x.test/a-b").unwrap();
/// let nested = Route::parse("https://x.test/a/b").unwrap();
/// assert_eq!(route_key(&dashed), route_key(&nested));
/// assert_ne!(digest_route_key(&dashed), digest_route_key(&nested));
/// ```
pub fn digest_route_key(route: &Route) -> String {
    let mut hasher = Sha256::new();
    hasher.update(route.as_str().as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}~{}", route_key(route), &digest[..KEY_DIGEST_LEN])
}
