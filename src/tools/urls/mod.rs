//! Url Tools
//!
//! Splits raw link strings into their components without requiring them to be
//! absolute. Hrefs found in news pages are often host-relative (`/path`),
//! scheme-relative (`//host/path`) or bare fragments (`#top`), which a full
//! WHATWG parser refuses without a base, so the split here is a plain
//! RFC 3986 reference decomposition that accepts any string.

mod utils;

use utils::*;

/// Components of a URL string as found in a document.
///
/// `scheme` and `hostname` are lower-cased; every other field is kept verbatim.
/// Absent components are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    pub scheme: String,
    pub netloc: String,
    pub path: String,
    pub params: String,
    pub query: String,
    pub fragment: String,
}

impl UrlParts {
    /// Host without userinfo or port, lower-cased. `None` when there is no host.
    pub fn hostname(&self) -> Option<String> {
        netloc_hostname(&self.netloc)
    }
}

/// Split a URL string into `(scheme, netloc, path, params, query, fragment)`.
///
/// Never fails: unrecognized input simply ends up in `path`.
///
/// # Examples
/// ```
/// use linktag::tools::urls::split_url;
///
/// let parts = split_url("//blog.lesoir.be/post;v=2?p=1#c");
/// assert_eq!(parts.scheme, "");
/// assert_eq!(parts.netloc, "blog.lesoir.be");
/// assert_eq!(parts.path, "/post");
/// assert_eq!(parts.params, "v=2");
/// assert_eq!(parts.query, "p=1");
/// assert_eq!(parts.fragment, "c");
/// ```
pub fn split_url(url: &str) -> UrlParts {
    let cleaned = sanitize(url);
    let mut rest: &str = &cleaned;

    let mut scheme = String::new();
    if let Some((s, after)) = split_scheme(rest) {
        scheme = s.to_ascii_lowercase();
        rest = after;
    }

    let mut netloc = String::new();
    if let Some(after_slashes) = rest.strip_prefix("//") {
        let end = after_slashes
            .find(|c| matches!(c, '/' | '?' | '#'))
            .unwrap_or(after_slashes.len());
        netloc = after_slashes[..end].to_string();
        rest = &after_slashes[end..];
    }

    let mut fragment = String::new();
    if let Some((before, frag)) = rest.split_once('#') {
        fragment = frag.to_string();
        rest = before;
    }

    let mut query = String::new();
    if let Some((before, q)) = rest.split_once('?') {
        query = q.to_string();
        rest = before;
    }

    let (path, params) = if USES_PARAMS.contains(&scheme.as_str()) {
        split_params(rest)
    } else {
        (rest, "")
    };

    UrlParts {
        scheme,
        netloc,
        path: path.to_string(),
        params: params.to_string(),
        query,
        fragment,
    }
}

/// Lower-cased host of `url`, if it has one.
pub fn hostname(url: &str) -> Option<String> {
    split_url(url).hostname()
}

/// Registrable domain approximated by the last two dot-separated labels.
///
/// A single-label host comes back unchanged; no validation is performed.
///
/// # Examples
/// ```
/// use linktag::tools::urls::get_domain;
///
/// assert_eq!(get_domain("blog.politics.cnn.com"), "cnn.com");
/// assert_eq!(get_domain("localhost"), "localhost");
/// ```
pub fn get_domain(hostname: &str) -> String {
    let labels: Vec<&str> = hostname.split('.').collect();
    let start = labels.len().saturating_sub(2);
    labels[start..].join(".")
}

/// Whether the host of `url` has the two-label domain `domain`.
///
/// Relative URLs have no host and are never on a non-empty domain.
pub fn is_on_same_domain(url: &str, domain: &str) -> bool {
    let host = hostname(url).unwrap_or_default();
    get_domain(&host) == domain
}
