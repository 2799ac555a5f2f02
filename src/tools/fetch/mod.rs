//! Fetch Tools
//!
//! Turns a [`Source`] into `(page_url, html)`. Only http(s) pages go through
//! the network; files and inline HTML are read locally.

mod client;
mod utils;

use utils::*;

use crate::error::{Result, TaggerError};
use crate::types::Source;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

/// Something that can download a page.
#[async_trait]
pub trait Fetcher: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetcher backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(None)
    }

    pub fn with_timeout(timeout_ms: Option<u64>) -> Result<Self> {
        let client = client::build_client(timeout_ms)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = parse_http_url(url).ok_or_else(|| TaggerError::InvalidUrl(url.to_string()))?;

        let start = Instant::now();
        let response = self.client.get(parsed.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if let Err(reason) = validate_response(status, &body) {
            warn!(url = %parsed, %reason, "Rejected response");
            return Err(TaggerError::fetch_error(parsed.as_str(), reason));
        }

        debug!(
            url = %parsed,
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

/// Resolve a source into its page url and HTML.
///
/// Files get a `file://` page url; inline HTML has none.
pub async fn resolve_source(fetcher: &dyn Fetcher, source: &Source) -> Result<(String, String)> {
    match source {
        Source::Url(url) => {
            let html = fetcher.fetch(url).await?;
            Ok((url.clone(), html))
        }
        Source::File(path) => {
            let html = tokio::fs::read_to_string(path).await?;
            let absolute = if path.is_absolute() {
                path.clone()
            } else {
                std::env::current_dir()?.join(path)
            };
            let page_url = Url::from_file_path(&absolute)
                .map(String::from)
                .map_err(|_| TaggerError::InvalidUrl(path.display().to_string()))?;
            Ok((page_url, html))
        }
        Source::Html(html) => Ok((String::new(), html.clone())),
    }
}
