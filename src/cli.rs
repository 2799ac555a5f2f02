use crate::api;
use crate::sites::SiteRegistry;
use crate::store::{LinkStore, LocalFsStore};
use crate::tools::fetch::{Fetcher, ReqwestFetcher};
use crate::tools::tag::update_tagged_urls;
use crate::types::{ApiResponse, PageKind, Source, NO_TITLE};
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "linktag", version, about = "Tag news links by origin (JSON only)")]
pub struct Cli {
    /// JSON file with site configurations overriding the built-ins
    #[arg(long, global = true, env = "LINKTAG_SITES")]
    sites: Option<PathBuf>,

    /// Directory holding stored batches
    #[arg(long, global = true, env = "LINKTAG_ROOT")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify a single URL for a site
    Classify {
        url: String,
        #[arg(long)]
        site: String,
    },
    /// List configured sites
    Sites,
    /// Tag the links of pages (http(s) URLs, files, or `-` for stdin)
    Tag(TagArgs),
    /// Tag pages and store the batches
    Crawl(CrawlArgs),
    /// Link and tag counts for a day
    Stats(DateArgs),
    /// Logged page failures for a day
    Errors(DateArgs),
}

#[derive(Debug, Args)]
struct TagArgs {
    #[arg(long)]
    site: String,
    /// Read the table of contents instead of article links
    #[arg(long)]
    front_page: bool,
    /// Join relative links against the page url
    #[arg(long)]
    resolve: bool,
    #[arg(long, default_value_t = 4)]
    concurrency: usize,
    #[arg(required = true)]
    sources: Vec<String>,
}

#[derive(Debug, Args)]
struct CrawlArgs {
    #[arg(long)]
    site: String,
    #[arg(long)]
    front_page: bool,
    #[arg(long, default_value_t = 4)]
    concurrency: usize,
    /// Pages to crawl; the site's front page when empty
    urls: Vec<String>,
}

#[derive(Debug, Args)]
struct DateArgs {
    /// YYYY-MM-DD, today (UTC) by default
    #[arg(long)]
    date: Option<NaiveDate>,
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run(cli: Cli) -> anyhow::Result<Value> {
    let registry = SiteRegistry::load_with_overrides(cli.sites.as_deref())
        .context("loading site configurations")?;
    debug!(sites = registry.len(), "Site registry ready");

    match cli.cmd {
        Command::Classify { url, site } => {
            let site = registry.get(&site)?;
            let link = (url.as_str(), NO_TITLE, site.classify(&url));
            let tagged = update_tagged_urls([link], &site.same_owner);
            Ok(json!(tagged[0].tags))
        }
        Command::Sites => Ok(serde_json::to_value(registry.sites().collect::<Vec<_>>())?),
        Command::Tag(args) => {
            let site = Arc::new(registry.get(&args.site)?.clone());
            let sources = sources_from_args(&args.sources)?;
            let kind = page_kind(args.front_page);
            let results =
                api::tag_sources(fetcher()?, sources, site, kind, args.concurrency).await;

            let out: Vec<ApiResponse<_>> = results
                .into_iter()
                .map(|r| match r {
                    Ok(batch) if args.resolve => ApiResponse::ok(api::resolve_batch(batch)),
                    Ok(batch) => ApiResponse::ok(batch),
                    Err(e) => ApiResponse::err(e.to_string()),
                })
                .collect();
            Ok(serde_json::to_value(out)?)
        }
        Command::Crawl(args) => {
            let site = Arc::new(registry.get(&args.site)?.clone());
            let store = open_store(cli.root)?;
            let summary = if args.urls.is_empty() {
                api::crawl_front_page(&store, fetcher()?, site).await?
            } else {
                let sources = args.urls.into_iter().map(Source::Url).collect();
                let kind = page_kind(args.front_page);
                api::crawl(&store, fetcher()?, site, sources, kind, args.concurrency).await?
            };
            Ok(serde_json::to_value(summary)?)
        }
        Command::Stats(args) => {
            let store = open_store(cli.root)?;
            Ok(serde_json::to_value(store.stats(date_or_today(args.date))?)?)
        }
        Command::Errors(args) => {
            let store = open_store(cli.root)?;
            Ok(serde_json::to_value(store.read_errors(date_or_today(args.date))?)?)
        }
    }
}

/// Print the outcome of [`run`] and report whether it succeeded.
pub fn finish(res: anyhow::Result<Value>) -> bool {
    match res {
        Ok(v) => {
            print_json(&ApiResponse::ok(v));
            true
        }
        Err(e) => {
            print_json(&ApiResponse::<()>::err(format!("{e:#}")));
            false
        }
    }
}

fn print_json<T: serde::Serialize>(val: &T) {
    match serde_json::to_string_pretty(val) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("failed to encode output: {e}"),
    }
}

/// Stdin can only be consumed once, so `-` may appear at most once.
fn sources_from_args(args: &[String]) -> anyhow::Result<Vec<Source>> {
    if args.iter().filter(|a| *a == "-").count() > 1 {
        anyhow::bail!("`-` (stdin) can only be given once");
    }
    args.iter().map(|a| source_from_arg(a)).collect()
}

fn source_from_arg(arg: &str) -> anyhow::Result<Source> {
    if arg == "-" {
        let html = std::io::read_to_string(std::io::stdin()).context("reading stdin")?;
        return Ok(Source::Html(html));
    }
    Ok(Source::from_arg(arg))
}

fn fetcher() -> anyhow::Result<Arc<dyn Fetcher>> {
    Ok(Arc::new(ReqwestFetcher::new()?))
}

fn open_store(root: Option<PathBuf>) -> anyhow::Result<LocalFsStore> {
    let store = match root {
        Some(root) => LocalFsStore::at(root)?,
        None => LocalFsStore::new()?,
    };
    Ok(store)
}

fn page_kind(front_page: bool) -> PageKind {
    if front_page {
        PageKind::FrontPage
    } else {
        PageKind::Article
    }
}

fn date_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Utc::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("linktag").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_classify() {
        let cli = parse(&["classify", "http://www.lesoir.be/x", "--site", "lesoir"]);
        match cli.cmd {
            Command::Classify { url, site } => {
                assert_eq!(url, "http://www.lesoir.be/x");
                assert_eq!(site, "lesoir");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_tag_with_globals() {
        let cli = parse(&[
            "tag",
            "--site",
            "dhnet",
            "--front-page",
            "--resolve",
            "--root",
            "/tmp/batches",
            "page.html",
            "-",
        ]);
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/batches")));
        match cli.cmd {
            Command::Tag(args) => {
                assert!(args.front_page);
                assert!(args.resolve);
                assert_eq!(args.concurrency, 4);
                assert_eq!(args.sources, vec!["page.html", "-"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_stdin_source_only_once() {
        let args = vec!["page.html".to_string(), "-".to_string(), "-".to_string()];
        let err = sources_from_args(&args).unwrap_err();
        assert!(err.to_string().contains("only be given once"));

        let files = vec!["a.html".to_string(), "https://www.lesoir.be/".to_string()];
        assert_eq!(
            sources_from_args(&files).unwrap(),
            vec![
                Source::File(PathBuf::from("a.html")),
                Source::Url("https://www.lesoir.be/".into()),
            ]
        );
    }

    #[test]
    fn test_tag_requires_a_source() {
        assert!(Cli::try_parse_from(["linktag", "tag", "--site", "lesoir"]).is_err());
    }

    #[test]
    fn test_parse_crawl_defaults() {
        let cli = parse(&["crawl", "--site", "lesoir", "--concurrency", "8"]);
        match cli.cmd {
            Command::Crawl(args) => {
                assert!(args.urls.is_empty());
                assert_eq!(args.concurrency, 8);
                assert!(!args.front_page);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_dates() {
        let cli = parse(&["stats", "--date", "2024-03-05"]);
        match cli.cmd {
            Command::Stats(args) => {
                assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 3, 5));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["linktag", "errors", "--date", "05/03/2024"]).is_err());
    }

    #[tokio::test]
    async fn test_run_classify_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();

        let tags = run(parse(&[
            "classify",
            "http://www.sudinfo.be/x",
            "--site",
            "lesoir",
            "--root",
            root,
        ]))
        .await
        .unwrap();
        assert_eq!(tags, json!(["external", "same owner"]));

        let stats = run(parse(&["stats", "--date", "2024-03-05", "--root", root]))
            .await
            .unwrap();
        assert_eq!(stats["batches"], 0);
        assert_eq!(stats["date"], "2024-03-05");
    }

    #[tokio::test]
    async fn test_run_unknown_site_fails() {
        let err = run(parse(&["classify", "/x", "--site", "nowhere"]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unknown site: nowhere"));
    }
}
