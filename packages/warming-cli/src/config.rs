//! Site-configuration file format and the collaborators built from it.
//!
//! The CLI runs outside a CMS process, so the file stands in for the
//! platform's site/page registries: it declares sites, their languages and
//! optionally routable pages.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use url::Url;

use warming::{PageRecord, PageRegistry, PageUrlResolver, Site, SiteLanguage, SiteRegistry};

/// Root of the configuration file.
#[derive(Debug, Deserialize)]
pub struct WarmingFile {
    pub sites: Vec<SiteEntry>,

    /// Routable pages the CLI may warm up directly
    #[serde(default)]
    pub pages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SiteEntry {
    pub identifier: String,
    pub root_page_id: u32,
    pub base: Url,

    #[serde(default)]
    pub languages: Vec<LanguageEntry>,

    #[serde(default)]
    pub exclude: bool,

    pub sitemap_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageEntry {
    pub language_id: u32,
    pub base: Url,
    pub title: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub exclude: bool,
}

#[derive(Debug, Deserialize)]
pub struct PageEntry {
    pub id: u32,
    pub title: String,
    pub url: Url,

    /// Localized URLs keyed by language id
    #[serde(default)]
    pub localized_urls: HashMap<u32, Url>,
}

fn default_true() -> bool {
    true
}

impl WarmingFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    fn build_site(entry: &SiteEntry) -> Site {
        let mut site = Site::new(entry.identifier.clone(), entry.root_page_id, entry.base.clone());
        if !entry.languages.is_empty() {
            site = site.with_languages(entry.languages.iter().map(|l| {
                let mut language =
                    SiteLanguage::new(l.language_id, l.base.clone(), l.title.clone())
                        .with_enabled(l.enabled);
                if l.exclude {
                    language = language.with_configuration("exclude", json!(true));
                }
                language
            }));
        }
        if entry.exclude {
            site = site.with_configuration("exclude", json!(true));
        }
        if let Some(path) = &entry.sitemap_path {
            site = site.with_configuration("sitemap_path", json!(path));
        }
        site
    }
}

/// Site/page oracle backed by the configuration file.
pub struct FileRegistry {
    sites: Vec<Site>,
    pages: HashMap<u32, PageEntry>,
}

impl FileRegistry {
    pub fn new(file: WarmingFile) -> Self {
        let sites = file.sites.iter().map(WarmingFile::build_site).collect();
        let pages = file.pages.into_iter().map(|p| (p.id, p)).collect();
        Self { sites, pages }
    }
}

#[async_trait]
impl SiteRegistry for FileRegistry {
    async fn all_sites(&self) -> Vec<Site> {
        self.sites.clone()
    }

    async fn find_by_identifier(&self, identifier: &str) -> Option<Site> {
        self.sites
            .iter()
            .find(|s| s.identifier() == identifier)
            .cloned()
    }

    async fn find_by_root_page_id(&self, root_page_id: u32) -> Option<Site> {
        self.sites
            .iter()
            .find(|s| s.root_page_id() == root_page_id)
            .cloned()
    }

    async fn find_by_page_id(&self, page_id: u32) -> Option<Site> {
        self.find_by_root_page_id(page_id).await
    }
}

#[async_trait]
impl PageRegistry for FileRegistry {
    async fn page_record(&self, page_id: u32, _language_id: Option<u32>) -> Option<PageRecord> {
        if let Some(page) = self.pages.get(&page_id) {
            return Some(PageRecord::new(page.id, page.title.clone()));
        }
        // Site root pages are always known
        self.sites
            .iter()
            .find(|s| s.root_page_id() == page_id)
            .map(|s| PageRecord::new(page_id, s.identifier().to_owned()))
    }

    async fn rootline(&self, page_id: u32) -> Vec<u32> {
        vec![page_id]
    }

    async fn page_title(&self, page_id: u32) -> Option<String> {
        self.page_record(page_id, None).await.map(|r| r.title)
    }
}

#[async_trait]
impl PageUrlResolver for FileRegistry {
    async fn resolve(&self, page_id: u32, language_id: Option<u32>) -> Option<Url> {
        let page = self.pages.get(&page_id)?;
        match language_id {
            Some(language_id) => page.localized_urls.get(&language_id).cloned(),
            None => Some(page.url.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_file() {
        let file: WarmingFile = serde_json::from_str(
            r#"{
                "sites": [
                    {
                        "identifier": "shop",
                        "root_page_id": 1,
                        "base": "https://shop.example/",
                        "languages": [
                            {"language_id": 0, "base": "https://shop.example/", "title": "English"},
                            {"language_id": 1, "base": "https://shop.example/de/", "title": "German", "exclude": true}
                        ],
                        "sitemap_path": "custom.xml"
                    }
                ],
                "pages": [
                    {"id": 5, "title": "Landing", "url": "https://shop.example/p/5"}
                ]
            }"#,
        )
        .unwrap();

        let registry = FileRegistry::new(file);
        let site = registry.sites[0].clone();
        assert_eq!(site.identifier(), "shop");
        assert_eq!(site.sitemap_path(), Some("custom.xml"));
        assert!(!site.excluded());
        assert!(site.language(1).unwrap().excluded());
    }

    #[tokio::test]
    async fn test_registry_resolves_pages() {
        let file: WarmingFile = serde_json::from_str(
            r#"{
                "sites": [],
                "pages": [
                    {
                        "id": 5,
                        "title": "Landing",
                        "url": "https://shop.example/p/5",
                        "localized_urls": {"1": "https://shop.example/de/p/5"}
                    }
                ]
            }"#,
        )
        .unwrap();
        let registry = FileRegistry::new(file);

        assert_eq!(
            registry.resolve(5, None).await.unwrap().as_str(),
            "https://shop.example/p/5"
        );
        assert_eq!(
            registry.resolve(5, Some(1)).await.unwrap().as_str(),
            "https://shop.example/de/p/5"
        );
        assert!(registry.resolve(5, Some(2)).await.is_none());
        assert!(registry.resolve(6, None).await.is_none());
        assert_eq!(registry.page_title(5).await.unwrap(), "Landing");
    }
}
