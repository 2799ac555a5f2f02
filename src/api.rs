use crate::tools::batch::batch_ordered;
use crate::tools::fetch::{resolve_source, Fetcher};
use crate::tools::links::{extract_article_links, extract_toc_links};
use crate::{error::*, store::*, types::*};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};
use url::Url;

/* ------------ single page ------------ */

/// Fetch or read one page and tag every link on it for `site`.
#[instrument(level = "debug", skip_all, fields(site = %site.name))]
pub async fn tag_source(
    fetcher: &dyn Fetcher,
    source: &Source,
    site: &SiteConfig,
    kind: PageKind,
) -> Result<TagBatch> {
    let start = Instant::now();
    let (page_url, html) = resolve_source(fetcher, source).await?;

    let owned_site = site.clone();
    let links = tokio::task::spawn_blocking(move || match kind {
        PageKind::Article => extract_article_links(&html, &owned_site),
        PageKind::FrontPage => extract_toc_links(&html, &owned_site),
    })
    .await
    .map_err(|e| TaggerError::Other(format!("extraction task failed: {e}")))??;

    info!(
        site = %site.name,
        page = %page_url,
        kind = kind.as_str(),
        links = links.len(),
        "tag_source succeeded in {}ms",
        start.elapsed().as_millis()
    );

    Ok(TagBatch {
        source: site.name.clone(),
        page_url,
        kind,
        fetched_at: Utc::now(),
        links,
    })
}

/// Tag many pages with bounded concurrency. Results line up with `sources`.
pub async fn tag_sources(
    fetcher: Arc<dyn Fetcher>,
    sources: Vec<Source>,
    site: Arc<SiteConfig>,
    kind: PageKind,
    concurrency: usize,
) -> Vec<Result<TagBatch>> {
    batch_ordered(sources, concurrency, move |source| {
        let fetcher = Arc::clone(&fetcher);
        let site = Arc::clone(&site);
        async move { tag_source(&*fetcher, &source, &site, kind).await }
    })
    .await
}

/// Copy of `batch` with every link joined against its page url.
///
/// Pages without an absolute url are returned unchanged.
pub fn resolve_batch(batch: TagBatch) -> TagBatch {
    let Ok(base) = Url::parse(&batch.page_url) else {
        return batch;
    };
    let links = batch.links.iter().map(|l| l.resolved(&base)).collect();
    TagBatch { links, ..batch }
}

/* ------------ crawling into the store ------------ */

/// Tag every source, store the batches and log the failures.
///
/// Page failures do not stop the crawl; store failures do.
#[instrument(skip_all, fields(site = %site.name, pages = sources.len()))]
pub async fn crawl<S: LinkStore>(
    store: &S,
    fetcher: Arc<dyn Fetcher>,
    site: Arc<SiteConfig>,
    sources: Vec<Source>,
    kind: PageKind,
    concurrency: usize,
) -> Result<CrawlSummary> {
    let start = Instant::now();
    let labels: Vec<String> = sources.iter().map(source_label).collect();
    let results = tag_sources(fetcher, sources, Arc::clone(&site), kind, concurrency).await;

    let mut summary = CrawlSummary::default();
    for (label, result) in labels.into_iter().zip(results) {
        match result {
            Ok(batch) => {
                store.put_batch(&batch)?;
                summary.stored += 1;
                summary.links += batch.links.len();
            }
            Err(e) => {
                warn!(site = %site.name, page = %label, error = %e, "Page failed");
                store.log_error(&ErrorEntry {
                    timestamp: Utc::now(),
                    source: site.name.clone(),
                    page_url: label,
                    message: e.to_string(),
                })?;
                summary.failed += 1;
            }
        }
    }

    if summary.failed > 0 && summary.stored == 0 {
        error!(site = %site.name, failed = summary.failed, "Crawl stored nothing");
    }
    info!(
        site = %site.name,
        stored = summary.stored,
        failed = summary.failed,
        links = summary.links,
        "crawl finished in {}ms",
        start.elapsed().as_millis()
    );
    Ok(summary)
}

/// Crawl the table of contents of the site's front page.
pub async fn crawl_front_page<S: LinkStore>(
    store: &S,
    fetcher: Arc<dyn Fetcher>,
    site: Arc<SiteConfig>,
) -> Result<CrawlSummary> {
    let front = site
        .front_page
        .clone()
        .ok_or_else(|| TaggerError::Other(format!("site {} has no front page", site.name)))?;
    crawl(store, fetcher, site, vec![Source::Url(front)], PageKind::FrontPage, 1).await
}

fn source_label(source: &Source) -> String {
    match source {
        Source::Url(url) => url.clone(),
        Source::File(path) => path.display().to_string(),
        Source::Html(_) => String::new(),
    }
}
