use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Node};

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static PLAINTEXT_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bhttps?://[^\s<>"'()\[\]{}]+"#).expect("valid regex")
});

/// Collapse whitespace and drop zero-width characters.
pub(super) fn clean_title(text: &str) -> String {
    let visible: String = text
        .chars()
        .filter(|c| !matches!(*c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}'))
        .collect();
    WHITESPACE_REGEX
        .replace_all(&visible, " ")
        .trim()
        .to_string()
}

/// Trimmed href with stray quotes removed; hrefs are otherwise kept verbatim.
pub(super) fn clean_href(href: &str) -> String {
    href.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_string()
}

/// Whether an anchor declares `rel="tag"`.
pub(super) fn is_keyword_link(anchor: &ElementRef) -> bool {
    anchor
        .value()
        .attr("rel")
        .map(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("tag")))
        .unwrap_or(false)
}

/// Elements whose text is never read as plain-text links.
const SKIPPED_TEXT_PARENTS: &[&str] = &["a", "script", "style", "noscript"];

/// Http(s) URLs written as visible text inside `region`, outside of any anchor.
pub(super) fn plaintext_urls(region: &ElementRef) -> Vec<String> {
    let mut found = Vec::new();
    for node in region.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let skipped = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != region.id())
            .filter_map(ElementRef::wrap)
            .any(|el| SKIPPED_TEXT_PARENTS.contains(&el.value().name()));
        if skipped {
            continue;
        }
        for m in PLAINTEXT_URL_REGEX.find_iter(text) {
            let url = m
                .as_str()
                .trim_end_matches(|c| matches!(c, '.' | ',' | ';' | ':' | '!' | '?'));
            found.push(url.to_string());
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("  Le\n  Soir \u{200B}plus "), "Le Soir plus");
        assert_eq!(clean_title("\n\t "), "");
    }

    #[test]
    fn test_clean_href() {
        assert_eq!(clean_href("  \"/a/b\" "), "/a/b");
        assert_eq!(clean_href("'#top'"), "#top");
        assert_eq!(clean_href("http://x.be/?a=1"), "http://x.be/?a=1");
    }

    #[test]
    fn test_plaintext_urls_skip_anchor_text() {
        let html = Html::parse_fragment(
            r#"<div id="r">See http://www.rtbf.be/info. and
            <a href="http://x.be">http://x.be</a>, or https://jobat.be/offers</div>"#,
        );
        let sel = Selector::parse("#r").unwrap();
        let region = html.select(&sel).next().unwrap();
        assert_eq!(
            plaintext_urls(&region),
            vec!["http://www.rtbf.be/info", "https://jobat.be/offers"]
        );
    }

    #[test]
    fn test_keyword_link() {
        let html = Html::parse_fragment(
            r#"<a rel="nofollow tag" href="/tag/x">x</a><a href="/y">y</a>"#,
        );
        let sel = Selector::parse("a").unwrap();
        let anchors: Vec<_> = html.select(&sel).collect();
        assert!(is_keyword_link(&anchors[0]));
        assert!(!is_keyword_link(&anchors[1]));
    }
}
