//! Link Tools
//!
//! Turns a page into tagged links. Each configured region contributes its
//! anchors, embedded frames and plain-text URLs, classified for the site and
//! carrying the region's context tags.

mod utils;

use utils::*;

use crate::error::{Result, TaggerError};
use crate::selectors::{EMBED_SELECTOR, LINK_SELECTOR};
use crate::tools::tag::{tag_url, update_tagged_urls, EMBEDDED, KEYWORD, PLAINTEXT};
use crate::types::{LinkRegion, SiteConfig, TaggedUrl, NO_TITLE};
use scraper::{Html, Selector};
use tracing::debug;

/// Extract and tag every link inside `regions` of `html`.
///
/// Links come out region by region in document order. Same-owner tags are
/// applied last; nothing is de-duplicated.
pub fn extract_links(
    html: &str,
    site: &SiteConfig,
    regions: &[LinkRegion],
) -> Result<Vec<TaggedUrl>> {
    let doc = Html::parse_document(html);
    let mut links = Vec::new();

    for region in regions {
        let selector = Selector::parse(&region.selector).map_err(|e| TaggerError::Selector {
            selector: region.selector.clone(),
            reason: e.to_string(),
        })?;

        for root in doc.select(&selector) {
            for anchor in root.select(&LINK_SELECTOR) {
                let Some(href) = anchor.value().attr("href") else {
                    continue;
                };
                let text = clean_title(&anchor.text().collect::<String>());
                let title = anchor_title(&text, anchor.value().attr("title"));
                let mut link = tag_url(&clean_href(href), &title, site, &region.tags);
                if is_keyword_link(&anchor) {
                    link.tags.insert(KEYWORD.to_string());
                }
                links.push(link);
            }

            for embed in root.select(&EMBED_SELECTOR) {
                let el = embed.value();
                let Some(src) = el.attr("src").or_else(|| el.attr("data")) else {
                    continue;
                };
                let title = anchor_title("", el.attr("title"));
                let mut link = tag_url(&clean_href(src), &title, site, &region.tags);
                link.tags.insert(EMBEDDED.to_string());
                links.push(link);
            }

            for url in plaintext_urls(&root) {
                let mut link = tag_url(&url, NO_TITLE, site, &region.tags);
                link.tags.insert(PLAINTEXT.to_string());
                links.push(link);
            }
        }
    }

    debug!(site = %site.name, count = links.len(), "Extracted links");
    Ok(update_tagged_urls(links, &site.same_owner))
}

/// Extract links from an article page using the site's article regions.
pub fn extract_article_links(html: &str, site: &SiteConfig) -> Result<Vec<TaggedUrl>> {
    extract_links(html, site, &site.article_regions)
}

/// Extract the table of contents of a front page using the site's TOC regions.
pub fn extract_toc_links(html: &str, site: &SiteConfig) -> Result<Vec<TaggedUrl>> {
    extract_links(html, site, &site.toc_regions)
}

fn anchor_title(text: &str, title_attr: Option<&str>) -> String {
    if !text.is_empty() {
        return text.to_string();
    }
    title_attr
        .map(clean_title)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string())
}
