use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use url::Url;

/// Unordered set of classification labels attached to a link.
pub type TagSet = BTreeSet<String>;

/// Placeholder title for links whose anchor carries no text.
pub const NO_TITLE: &str = "__NO_TITLE__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain(pub String);

impl Domain {
    /// Canonicalize host to a stable key: lowercase + IDNA/Punycode
    fn canonicalize(host: &str) -> String {
        let lower = host.trim().to_ascii_lowercase();
        idna::domain_to_ascii(&lower).unwrap_or(lower)
    }

    /// Lookup key for a host typed by a user or found in a link.
    pub fn from_raw(host: &str) -> Self {
        Domain(Self::canonicalize(host))
    }
}

/// A link found in a page, with its display title and classification tags.
///
/// Serialized as a 3-element array `[url, title, [tags...]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaggedUrlRepr", into = "TaggedUrlRepr")]
pub struct TaggedUrl {
    pub url: String,
    pub title: String,
    pub tags: TagSet,
}

#[derive(Serialize, Deserialize)]
struct TaggedUrlRepr(String, String, Vec<String>);

impl From<TaggedUrlRepr> for TaggedUrl {
    fn from(TaggedUrlRepr(url, title, tags): TaggedUrlRepr) -> Self {
        TaggedUrl {
            url,
            title,
            tags: tags.into_iter().collect(),
        }
    }
}

impl From<TaggedUrl> for TaggedUrlRepr {
    fn from(t: TaggedUrl) -> Self {
        TaggedUrlRepr(t.url, t.title, t.tags.into_iter().collect())
    }
}

impl From<(String, String, TagSet)> for TaggedUrl {
    fn from((url, title, tags): (String, String, TagSet)) -> Self {
        TaggedUrl { url, title, tags }
    }
}

impl From<(&str, &str, TagSet)> for TaggedUrl {
    fn from((url, title, tags): (&str, &str, TagSet)) -> Self {
        TaggedUrl {
            url: url.to_string(),
            title: title.to_string(),
            tags,
        }
    }
}

impl From<&TaggedUrl> for TaggedUrl {
    fn from(t: &TaggedUrl) -> Self {
        t.clone()
    }
}

impl TaggedUrl {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Copy with the url joined against `base`; kept verbatim when joining fails.
    pub fn resolved(&self, base: &Url) -> TaggedUrl {
        let url = base
            .join(&self.url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| self.url.clone());
        TaggedUrl {
            url,
            title: self.title.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// A CSS region of a page and the context tags its links receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRegion {
    pub selector: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl LinkRegion {
    pub fn new(selector: &str, tags: &[&str]) -> Self {
        Self {
            selector: selector.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

fn default_regions() -> Vec<LinkRegion> {
    vec![LinkRegion::new("body", &[])]
}

/// Per-portal configuration read by the classifier and the extractors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub own_netloc: String,
    #[serde(default)]
    pub associated_sites: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub same_owner: Vec<String>,
    #[serde(default)]
    pub front_page: Option<String>,
    #[serde(default = "default_regions")]
    pub article_regions: Vec<LinkRegion>,
    #[serde(default = "default_regions")]
    pub toc_regions: Vec<LinkRegion>,
}

impl SiteConfig {
    pub fn new(name: &str, own_netloc: &str) -> Self {
        Self {
            name: name.to_string(),
            own_netloc: own_netloc.to_string(),
            associated_sites: BTreeMap::new(),
            same_owner: Vec::new(),
            front_page: None,
            article_regions: default_regions(),
            toc_regions: default_regions(),
        }
    }

    pub fn with_associated(mut self, host: &str, tags: &[&str]) -> Self {
        self.associated_sites.insert(
            host.to_string(),
            tags.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub fn with_same_owner(mut self, suffixes: &[&str]) -> Self {
        self.same_owner
            .extend(suffixes.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_front_page(mut self, url: &str) -> Self {
        self.front_page = Some(url.to_string());
        self
    }

    pub fn with_article_regions(mut self, regions: Vec<LinkRegion>) -> Self {
        self.article_regions = regions;
        self
    }

    pub fn with_toc_regions(mut self, regions: Vec<LinkRegion>) -> Self {
        self.toc_regions = regions;
        self
    }
}

/// Where a page's HTML comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
    Html(String),
}

impl Source {
    /// Interpret CLI text: http(s) URLs are fetched, anything else is a file path.
    pub fn from_arg(arg: &str) -> Self {
        let lower = arg.trim().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(arg.trim().to_string())
        } else {
            Source::File(PathBuf::from(arg))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    #[default]
    Article,
    FrontPage,
}

impl PageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageKind::Article => "article",
            PageKind::FrontPage => "front_page",
        }
    }
}

/// All links tagged on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagBatch {
    pub source: String,
    pub page_url: String,
    pub kind: PageKind,
    pub fetched_at: DateTime<Utc>,
    pub links: Vec<TaggedUrl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub page_url: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BatchStats {
    pub date: String,
    pub batches: usize,
    pub links: usize,
    pub tag_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CrawlSummary {
    pub stored: usize,
    pub failed: usize,
    pub links: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}
impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> TagSet {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_tagged_url_serializes_as_array() {
        let t = TaggedUrl::from(("http://a.be/x", "X", tags(&["internal"])));
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"["http://a.be/x","X",["internal"]]"#);
    }

    #[test]
    fn test_tagged_url_deserialize_collapses_duplicate_tags() {
        let t: TaggedUrl =
            serde_json::from_str(r#"["/a","A",["external","in text","external"]]"#).unwrap();
        assert_eq!(t.url, "/a");
        assert_eq!(t.title, "A");
        assert_eq!(t.tags, tags(&["external", "in text"]));
    }

    #[test]
    fn test_resolved_joins_relative_urls() {
        let base = Url::parse("http://www.lesoir.be/actualite/").unwrap();
        let t = TaggedUrl::from(("../sports/1.html", "S", tags(&["internal"])));
        let r = t.resolved(&base);
        assert_eq!(r.url, "http://www.lesoir.be/sports/1.html");
        assert_eq!(r.tags, t.tags);
        assert_eq!(t.url, "../sports/1.html");
    }

    #[test]
    fn test_domain_canonicalization() {
        assert_eq!(Domain::from_raw(" WWW.LeSoir.BE ").0, "www.lesoir.be");
        assert_eq!(Domain::from_raw("bücher.be").0, "xn--bcher-kva.be");
    }

    #[test]
    fn test_source_from_arg() {
        assert_eq!(
            Source::from_arg("https://www.dhnet.be/"),
            Source::Url("https://www.dhnet.be/".into())
        );
        assert_eq!(
            Source::from_arg("pages/a.html"),
            Source::File(PathBuf::from("pages/a.html"))
        );
    }

    #[test]
    fn test_site_config_defaults_from_json() {
        let site: SiteConfig =
            serde_json::from_str(r#"{"name":"x","own_netloc":"www.x.be"}"#).unwrap();
        assert!(site.associated_sites.is_empty());
        assert!(site.same_owner.is_empty());
        assert_eq!(site.article_regions, vec![LinkRegion::new("body", &[])]);
        assert_eq!(site.toc_regions.len(), 1);
    }
}
