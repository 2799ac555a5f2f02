//! Site registry: the known portals plus any user overrides.

use crate::error::{Result, TaggerError};
use crate::tools::tag::{BOTTOM_BOX, IN_TEXT, INTERNAL, SIDEBAR_BOX};
use crate::tools::urls::hostname;
use crate::types::{Domain, LinkRegion, SiteConfig};
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Site configurations keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    sites: BTreeMap<String, SiteConfig>,
}

/* Groups sharing an owner */
const ROSSEL: &[&str] = &["lesoir.be", "sudinfo.be", "sudpresse.be", "7dimanche.be", "jobat.be"];
const IPM: &[&str] = &["lalibre.be", "dhnet.be", "dh.be", "ipmadvertising.be"];
const MEDIAHUIS: &[&str] = &["lavenir.net", "mediahuis.be"];
const DPG: &[&str] = &["7sur7.be", "hln.be", "demorgen.be", "dpgmedia.be"];
const ROULARTA: &[&str] = &["levif.be", "knack.be", "trends.be", "roularta.be"];

impl SiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configurations for the Belgian French-language portals.
    pub fn builtin() -> Self {
        let sites = vec![
            SiteConfig::new("lesoir", "www.lesoir.be")
                .with_associated("blog.lesoir.be", &[INTERNAL, "jblog"])
                .with_associated("geeko.lesoir.be", &[INTERNAL, "geeko"])
                .with_associated("soirmag.lesoir.be", &[INTERNAL, "soirmag"])
                .with_same_owner(ROSSEL)
                .with_front_page("https://www.lesoir.be/")
                .with_article_regions(vec![
                    LinkRegion::new("article .r-article--section", &[IN_TEXT]),
                    LinkRegion::new("aside", &[SIDEBAR_BOX]),
                    LinkRegion::new("article footer", &[BOTTOM_BOX]),
                ])
                .with_toc_regions(vec![LinkRegion::new("main h3", &[])]),
            SiteConfig::new("lalibre", "www.lalibre.be")
                .with_associated("blogs.lalibre.be", &[INTERNAL, "jblog"])
                .with_same_owner(IPM)
                .with_front_page("https://www.lalibre.be/")
                .with_article_regions(vec![
                    LinkRegion::new("div.article-text", &[IN_TEXT]),
                    LinkRegion::new("aside", &[SIDEBAR_BOX]),
                    LinkRegion::new("div.related-articles", &[BOTTOM_BOX]),
                ])
                .with_toc_regions(vec![LinkRegion::new("main article h2", &[])]),
            SiteConfig::new("dhnet", "www.dhnet.be")
                .with_associated("blogs.dhnet.be", &[INTERNAL, "jblog"])
                .with_same_owner(IPM)
                .with_front_page("https://www.dhnet.be/")
                .with_article_regions(vec![
                    LinkRegion::new("div.article-text", &[IN_TEXT]),
                    LinkRegion::new("aside", &[SIDEBAR_BOX]),
                ])
                .with_toc_regions(vec![LinkRegion::new("main article h2", &[])]),
            SiteConfig::new("sudinfo", "www.sudinfo.be")
                .with_associated("blog.sudinfo.be", &[INTERNAL, "jblog"])
                .with_same_owner(ROSSEL)
                .with_front_page("https://www.sudinfo.be/")
                .with_article_regions(vec![
                    LinkRegion::new("article .r-article--section", &[IN_TEXT]),
                    LinkRegion::new("aside", &[SIDEBAR_BOX]),
                ])
                .with_toc_regions(vec![LinkRegion::new("main h3", &[])]),
            SiteConfig::new("lavenir", "www.lavenir.net")
                .with_same_owner(MEDIAHUIS)
                .with_front_page("https://www.lavenir.net/")
                .with_article_regions(vec![
                    LinkRegion::new("div.article__body", &[IN_TEXT]),
                    LinkRegion::new("aside", &[SIDEBAR_BOX]),
                ])
                .with_toc_regions(vec![LinkRegion::new("main article h2", &[])]),
            SiteConfig::new("rtbfinfo", "www.rtbf.be")
                .with_associated("blog.rtbf.be", &[INTERNAL, "jblog"])
                .with_associated("auvio.rtbf.be", &[INTERNAL, "video"])
                .with_same_owner(&["rtbf.be"])
                .with_front_page("https://www.rtbf.be/info")
                .with_article_regions(vec![
                    LinkRegion::new("article div.body", &[IN_TEXT]),
                    LinkRegion::new("aside", &[SIDEBAR_BOX]),
                ])
                .with_toc_regions(vec![LinkRegion::new("main article h3", &[])]),
            SiteConfig::new("rtlinfo", "www.rtl.be")
                .with_associated("www.rtlinfo.be", &[INTERNAL])
                .with_same_owner(&["rtl.be", "rtlinfo.be", "bel-rtl.be", "radiocontact.be"])
                .with_front_page("https://www.rtl.be/info")
                .with_article_regions(vec![
                    LinkRegion::new("div.article-content", &[IN_TEXT]),
                    LinkRegion::new("aside", &[SIDEBAR_BOX]),
                ])
                .with_toc_regions(vec![LinkRegion::new("main h2", &[])]),
            SiteConfig::new("septsursept", "www.7sur7.be")
                .with_same_owner(DPG)
                .with_front_page("https://www.7sur7.be/")
                .with_article_regions(vec![
                    LinkRegion::new("article section.article__body", &[IN_TEXT]),
                    LinkRegion::new("aside", &[SIDEBAR_BOX]),
                ])
                .with_toc_regions(vec![LinkRegion::new("main h2", &[])]),
            SiteConfig::new("levif", "www.levif.be")
                .with_associated("trends.levif.be", &[INTERNAL, "trends"])
                .with_associated("weekend.levif.be", &[INTERNAL, "weekend"])
                .with_same_owner(ROULARTA)
                .with_front_page("https://www.levif.be/")
                .with_article_regions(vec![
                    LinkRegion::new("div.article-body", &[IN_TEXT]),
                    LinkRegion::new("aside", &[SIDEBAR_BOX]),
                ])
                .with_toc_regions(vec![LinkRegion::new("main h2", &[])]),
        ];

        let mut registry = Self::new();
        for site in sites {
            registry.insert(site);
        }
        registry
    }

    /// Parse a JSON list of site configurations.
    pub fn from_json(json: &str) -> Result<Self> {
        let sites: Vec<SiteConfig> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for site in sites {
            registry.insert(site);
        }
        Ok(registry)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let registry = Self::from_json(&json)?;
        info!(path = %path.display(), sites = registry.len(), "Loaded site overrides");
        Ok(registry)
    }

    /// Built-ins overlaid with `path`, or with the default override file when
    /// it exists.
    pub fn load_with_overrides(path: Option<&Path>) -> Result<Self> {
        let mut registry = Self::builtin();
        match path {
            Some(p) => registry.merge(Self::load(p)?),
            None => {
                if let Some(default) = default_sites_path().filter(|p| p.exists()) {
                    registry.merge(Self::load(&default)?);
                }
            }
        }
        Ok(registry)
    }

    /// Add or replace a site, canonicalizing its hostnames.
    pub fn insert(&mut self, site: SiteConfig) {
        let site = canonicalize(site);
        self.sites.insert(site.name.clone(), site);
    }

    /// Entries in `other` replace those with the same name.
    pub fn merge(&mut self, other: SiteRegistry) {
        for (name, site) in other.sites {
            debug!(site = %name, "Overriding site");
            self.sites.insert(name, site);
        }
    }

    pub fn get(&self, name: &str) -> Result<&SiteConfig> {
        self.sites
            .get(name)
            .ok_or_else(|| TaggerError::UnknownSite(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.sites.keys().map(String::as_str).collect()
    }

    pub fn sites(&self) -> impl Iterator<Item = &SiteConfig> {
        self.sites.values()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// The site owning `host`, either as its own netloc or an associated one.
    ///
    /// Accepts a bare host or a full URL, in unicode or punycode form.
    pub fn find_by_netloc(&self, host: &str) -> Option<&SiteConfig> {
        let host = if host.contains("//") {
            hostname(host)?
        } else {
            host.to_string()
        };
        let key = Domain::from_raw(&host);
        self.sites.values().find(|s| {
            Domain::from_raw(&s.own_netloc) == key
                || s.associated_sites.keys().any(|h| Domain::from_raw(h) == key)
        })
    }
}

/// Hosts are compared with raw link netlocs, so they are only trimmed and
/// lower-cased here, never converted to punycode.
fn canonicalize(mut site: SiteConfig) -> SiteConfig {
    site.own_netloc = site.own_netloc.trim().to_lowercase();
    site.associated_sites = site
        .associated_sites
        .into_iter()
        .map(|(host, tags)| (host.trim().to_lowercase(), tags))
        .collect();
    site.same_owner = site
        .same_owner
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .collect();
    site
}

/// `<config dir>/sites.json`
pub fn default_sites_path() -> Option<PathBuf> {
    ProjectDirs::from("be", "linktag", "linktag").map(|p| p.config_dir().join("sites.json"))
}
