use url::{Host, Url};

/// Extracts the short host label used to group captures for one site
///
/// The host is lowercased, a leading `www.` is removed and the first label
/// is kept. IP hosts are returned whole since their first octet says nothing
/// about the site.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use route_trawler::url::host_label;
///
/// let url = Url::parse("https://www.Example.com/path").unwrap();
/// assert_eq!(host_label(&url), Some("example".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(host_label(&url), Some("127.0.0.1".to_string()));
/// ```
pub fn host_label(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(domain) => {
            let domain = domain.to_lowercase();
            let domain = domain.strip_prefix("www.").unwrap_or(&domain);
            domain
                .split('.')
                .next()
                .filter(|label| !label.is_empty())
                .map(str::to_string)
        }
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string().replace(':', "_")),
    }
}
