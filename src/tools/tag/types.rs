//! Tag vocabulary shared by the classifier, the extractors and site configs.

/// Link stays on the scraped site.
pub const INTERNAL: &str = "internal";
/// Link reached internal status through the two-label domain heuristic.
pub const INTERNAL_SITE: &str = "internal site";
/// Link leaves the scraped site.
pub const EXTERNAL: &str = "external";
/// In-page anchor such as `#comments`.
pub const ANCHOR: &str = "anchor";
/// Host belongs to another brand of the same media group.
pub const SAME_OWNER: &str = "same owner";

/// Context tags attached by extractors depending on where a link was found.
pub const IN_TEXT: &str = "in text";
pub const SIDEBAR_BOX: &str = "sidebar box";
pub const BOTTOM_BOX: &str = "bottom box";
pub const EMBEDDED: &str = "embedded";
pub const KEYWORD: &str = "keyword";
pub const PLAINTEXT: &str = "plaintext";
