//! Shared Selectors

use once_cell::sync::Lazy;
use scraper::Selector;

/// Selector for anchor elements with hrefs.
pub static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid link selector"));

/// Selector for embedded frames, plugins and objects.
pub static EMBED_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("iframe[src], embed[src], object[data]").expect("valid embed selector")
});
