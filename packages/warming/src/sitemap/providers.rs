//! Sitemap discovery providers.
//!
//! A provider inspects one source of truth for a site's sitemap URL and
//! returns the first candidate it finds, or `None` so the locator can try
//! the next provider in its chain.

use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::types::site::{Site, SiteLanguage};
use crate::types::sitemap::SiteAwareSitemap;

/// A single sitemap discovery source.
#[async_trait]
pub trait SitemapProvider: Send + Sync {
    /// Provider name used in logs.
    fn name(&self) -> &'static str;

    /// Discover the sitemap of a site (+ optional language).
    ///
    /// `Ok(None)` means "this provider has no answer"; the locator then
    /// walks on to the next provider.
    async fn get(&self, site: &Site, language: Option<&SiteLanguage>)
        -> Result<Option<SiteAwareSitemap>>;
}

/// Base URL the sitemap is resolved against: the language's base when a
/// language is given, the site's base otherwise.
pub(crate) fn effective_base<'a>(site: &'a Site, language: Option<&'a SiteLanguage>) -> &'a Url {
    language.map(|l| l.base()).unwrap_or_else(|| site.base())
}

fn effective_language(site: &Site, language: Option<&SiteLanguage>) -> SiteLanguage {
    language.cloned().unwrap_or_else(|| site.default_language().clone())
}

/// Resolves the `sitemap_path` configuration override, preferring the
/// language-level entry over the site-level one.
#[derive(Debug, Default)]
pub struct ConfiguredPathProvider;

impl ConfiguredPathProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SitemapProvider for ConfiguredPathProvider {
    fn name(&self) -> &'static str {
        "configured-path"
    }

    async fn get(
        &self,
        site: &Site,
        language: Option<&SiteLanguage>,
    ) -> Result<Option<SiteAwareSitemap>> {
        let path = language
            .and_then(|l| l.sitemap_path())
            .or_else(|| site.sitemap_path());
        let Some(path) = path else {
            return Ok(None);
        };

        // Absolute URLs pass through; relative paths resolve against the base
        let url = match Url::parse(path) {
            Ok(url) => url,
            Err(_) => match effective_base(site, language).join(path) {
                Ok(url) => url,
                Err(_) => {
                    tracing::warn!(
                        site = site.identifier(),
                        path,
                        "configured sitemap path is not resolvable"
                    );
                    return Ok(None);
                }
            },
        };

        Ok(Some(SiteAwareSitemap::new(
            url,
            site.clone(),
            effective_language(site, language),
        )))
    }
}

/// Reads `Sitemap:` directives from the site's `robots.txt`.
pub struct RobotsTxtProvider {
    client: reqwest::Client,
}

impl RobotsTxtProvider {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Extract `Sitemap:` directive values from robots.txt content.
    fn parse_sitemap_directives(content: &str) -> Vec<String> {
        let mut sitemaps = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((directive, value)) = line.split_once(':') {
                if directive.trim().eq_ignore_ascii_case("sitemap") {
                    let value = value.trim();
                    if !value.is_empty() {
                        sitemaps.push(value.to_string());
                    }
                }
            }
        }
        sitemaps
    }
}

#[async_trait]
impl SitemapProvider for RobotsTxtProvider {
    fn name(&self) -> &'static str {
        "robots-txt"
    }

    async fn get(
        &self,
        site: &Site,
        language: Option<&SiteLanguage>,
    ) -> Result<Option<SiteAwareSitemap>> {
        let base = effective_base(site, language);
        let Ok(robots_url) = base.join("/robots.txt") else {
            return Ok(None);
        };

        let content = match self.client.get(robots_url.clone()).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(content) => content,
                Err(_) => return Ok(None),
            },
            Ok(_) | Err(_) => {
                tracing::debug!(site = site.identifier(), url = %robots_url, "no robots.txt");
                return Ok(None);
            }
        };

        let sitemap = Self::parse_sitemap_directives(&content)
            .into_iter()
            .find_map(|candidate| Url::parse(&candidate).ok());

        Ok(sitemap.map(|url| {
            SiteAwareSitemap::new(url, site.clone(), effective_language(site, language))
        }))
    }
}

/// Falls back to the `sitemap.xml` convention below the base URL.
#[derive(Debug, Default)]
pub struct DefaultPathProvider;

impl DefaultPathProvider {
    /// Conventional sitemap location relative to a site's base URL.
    pub const DEFAULT_PATH: &'static str = "sitemap.xml";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SitemapProvider for DefaultPathProvider {
    fn name(&self) -> &'static str {
        "default-path"
    }

    async fn get(
        &self,
        site: &Site,
        language: Option<&SiteLanguage>,
    ) -> Result<Option<SiteAwareSitemap>> {
        let base = effective_base(site, language);
        let Ok(url) = base.join(Self::DEFAULT_PATH) else {
            return Ok(None);
        };

        Ok(Some(SiteAwareSitemap::new(
            url,
            site.clone(),
            effective_language(site, language),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::types::site::CONFIG_SITEMAP_PATH;

    fn site() -> Site {
        Site::new("shop", 1, Url::parse("https://shop.example").unwrap()).with_languages([
            SiteLanguage::new(0, Url::parse("https://shop.example").unwrap(), "English"),
            SiteLanguage::new(1, Url::parse("https://shop.example/de/").unwrap(), "German"),
        ])
    }

    #[tokio::test]
    async fn test_configured_path_absent() {
        let provider = ConfiguredPathProvider::new();
        assert!(provider.get(&site(), None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_configured_path_relative_to_base() {
        let site = site().with_configuration(CONFIG_SITEMAP_PATH, json!("custom/sitemap.xml"));
        let provider = ConfiguredPathProvider::new();

        let sitemap = provider.get(&site, None).await.unwrap().unwrap();
        assert_eq!(sitemap.url().as_str(), "https://shop.example/custom/sitemap.xml");
        assert_eq!(sitemap.language().id(), 0);
        assert!(!sitemap.is_cached());
    }

    #[tokio::test]
    async fn test_configured_path_language_override_wins() {
        let site = site().with_configuration(CONFIG_SITEMAP_PATH, json!("site.xml"));
        let language = SiteLanguage::new(1, Url::parse("https://shop.example/de/").unwrap(), "German")
            .with_configuration(CONFIG_SITEMAP_PATH, json!("lang.xml"));
        let site = site.with_language(language.clone());

        let provider = ConfiguredPathProvider::new();
        let sitemap = provider.get(&site, Some(&language)).await.unwrap().unwrap();
        assert_eq!(sitemap.url().as_str(), "https://shop.example/de/lang.xml");
    }

    #[tokio::test]
    async fn test_configured_path_accepts_absolute_url() {
        let site = site()
            .with_configuration(CONFIG_SITEMAP_PATH, json!("https://cdn.example/shop-sitemap.xml"));
        let provider = ConfiguredPathProvider::new();

        let sitemap = provider.get(&site, None).await.unwrap().unwrap();
        assert_eq!(sitemap.url().as_str(), "https://cdn.example/shop-sitemap.xml");
    }

    #[test]
    fn test_robots_directive_parsing() {
        let content = r#"
# robots for shop.example
User-agent: *
Disallow: /checkout/

Sitemap: https://shop.example/sitemap.xml
sitemap: https://shop.example/extra-sitemap.xml
        "#;

        let sitemaps = RobotsTxtProvider::parse_sitemap_directives(content);
        assert_eq!(
            sitemaps,
            vec![
                "https://shop.example/sitemap.xml",
                "https://shop.example/extra-sitemap.xml"
            ]
        );
    }

    #[test]
    fn test_robots_directive_parsing_ignores_noise() {
        assert!(RobotsTxtProvider::parse_sitemap_directives("").is_empty());
        assert!(RobotsTxtProvider::parse_sitemap_directives("Disallow: /\nSitemap:").is_empty());
    }

    #[tokio::test]
    async fn test_default_path_uses_language_base() {
        let site = site();
        let provider = DefaultPathProvider::new();

        let default = provider.get(&site, None).await.unwrap().unwrap();
        assert_eq!(default.url().as_str(), "https://shop.example/sitemap.xml");

        let german = site.language(1).unwrap().clone();
        let localized = provider.get(&site, Some(&german)).await.unwrap().unwrap();
        assert_eq!(localized.url().as_str(), "https://shop.example/de/sitemap.xml");
        assert_eq!(localized.language().id(), 1);
    }
}
