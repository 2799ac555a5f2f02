//! Tag Tools
//!
//! The link classification engine. Every function here is pure: configuration
//! comes in as arguments and a fresh tag set comes out.


pub mod types;

pub use types::*;

use crate::tools::urls::{get_domain, is_on_same_domain, split_url};
use crate::types::{SiteConfig, TagSet, TaggedUrl};
use std::collections::BTreeMap;

fn tag_set(tags: &[&str]) -> TagSet {
    tags.iter().map(|t| t.to_string()).collect()
}

/// Classify a link relative to the site it was found on.
///
/// Decision order, first match wins:
/// 1. host equals `own_netloc` → `internal`
/// 2. host is a key of `associated_sites` → the declared tags, nothing added
/// 3. host shares the two-label domain of `own_netloc` → `internal site` + `internal`
/// 4. any other host → `external`
/// 5. no host, only a query or fragment: `#...` → `internal` + `anchor`, otherwise no tags
/// 6. no host, non-empty text: `/...` → `internal`, otherwise `external`
/// 7. empty string → no tags
///
/// # Examples
/// ```
/// use linktag::tools::tag::classify_and_tag;
/// use std::collections::BTreeMap;
///
/// let tags = classify_and_tag("http://www.foo.org", "foo.org", &BTreeMap::new());
/// assert!(tags.contains("internal") && tags.contains("internal site"));
/// ```
pub fn classify_and_tag(
    url: &str,
    own_netloc: &str,
    associated_sites: &BTreeMap<String, Vec<String>>,
) -> TagSet {
    let parts = split_url(url);

    if !parts.netloc.is_empty() {
        if parts.netloc == own_netloc {
            tag_set(&[INTERNAL])
        } else if let Some(declared) = associated_sites.get(&parts.netloc) {
            declared.iter().cloned().collect()
        } else if is_on_same_domain(url, &get_domain(own_netloc)) {
            tag_set(&[INTERNAL_SITE, INTERNAL])
        } else {
            tag_set(&[EXTERNAL])
        }
    } else if parts.scheme.is_empty()
        && parts.path.is_empty()
        && parts.params.is_empty()
        && (!parts.query.is_empty() || !parts.fragment.is_empty())
    {
        // a bare query such as "?page=2" is left untagged
        if url.starts_with('#') {
            tag_set(&[INTERNAL, ANCHOR])
        } else {
            TagSet::new()
        }
    } else if !url.is_empty() {
        if url.starts_with('/') {
            tag_set(&[INTERNAL])
        } else {
            tag_set(&[EXTERNAL])
        }
    } else {
        TagSet::new()
    }
}

/// `same owner` when the link's host ends with one of `same_owner_suffixes`.
///
/// Only the host is lower-cased; suffixes are compared as given. Links without
/// a host and empty suffixes never match.
pub fn tag_same_owner<S: AsRef<str>>(url: &str, same_owner_suffixes: &[S]) -> TagSet {
    let Some(host) = split_url(url).hostname() else {
        return TagSet::new();
    };
    let owned = same_owner_suffixes
        .iter()
        .map(AsRef::as_ref)
        .any(|suffix| !suffix.is_empty() && host.ends_with(suffix));
    if owned {
        tag_set(&[SAME_OWNER])
    } else {
        TagSet::new()
    }
}

/// Add same-owner tags to a batch of tagged links.
///
/// Accepts owned `(url, title, tags)` triples, `TaggedUrl`s or `&TaggedUrl`s.
/// Returns new records in input order; inputs are never modified and
/// duplicate urls are kept.
pub fn update_tagged_urls<I, T, S>(tagged_urls: I, same_owner_suffixes: &[S]) -> Vec<TaggedUrl>
where
    I: IntoIterator<Item = T>,
    T: Into<TaggedUrl>,
    S: AsRef<str>,
{
    tagged_urls
        .into_iter()
        .map(Into::into)
        .map(|TaggedUrl { url, title, tags }| {
            let additional = tag_same_owner(&url, same_owner_suffixes);
            let merged: TagSet = tags.union(&additional).cloned().collect();
            TaggedUrl {
                url,
                title,
                tags: merged,
            }
        })
        .collect()
}

/// Build a tagged link.
pub fn make_tagged_url(
    url: impl Into<String>,
    title: impl Into<String>,
    tags: TagSet,
) -> TaggedUrl {
    TaggedUrl {
        url: url.into(),
        title: title.into(),
        tags,
    }
}

/// Classify `url` for `site` and add the caller's context tags.
///
/// Same-owner tagging is left to [`update_tagged_urls`].
pub fn tag_url<S: AsRef<str>>(
    url: &str,
    title: &str,
    site: &SiteConfig,
    context_tags: &[S],
) -> TaggedUrl {
    let mut tags = site.classify(url);
    tags.extend(context_tags.iter().map(|t| t.as_ref().to_string()));
    make_tagged_url(url, title, tags)
}

impl SiteConfig {
    /// [`classify_and_tag`] with this site's netloc and associated hosts.
    pub fn classify(&self, url: &str) -> TagSet {
        classify_and_tag(url, &self.own_netloc, &self.associated_sites)
    }
}
