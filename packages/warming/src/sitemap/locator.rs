//! Sitemap location with cache-first discovery.

use indexmap::IndexMap;
use std::sync::Arc;
use url::Url;

use crate::error::{Result, WarmupError};
use crate::sitemap::cache::SitemapCache;
use crate::sitemap::providers::{
    effective_base, ConfiguredPathProvider, DefaultPathProvider, RobotsTxtProvider, SitemapProvider,
};
use crate::types::site::{Site, SiteLanguage};
use crate::types::sitemap::SiteAwareSitemap;

/// Locates the authoritative sitemap of a site (+ optional language),
/// consulting the cache before walking an ordered provider chain.
pub struct SitemapLocator {
    cache: SitemapCache,
    providers: Vec<Arc<dyn SitemapProvider>>,
    client: reqwest::Client,
}

impl SitemapLocator {
    /// Create a locator with an explicit provider chain.
    ///
    /// Fails with [`WarmupError::InvalidProvider`] when the chain is empty;
    /// a locator without providers could never resolve anything.
    pub fn new(
        cache: SitemapCache,
        providers: Vec<Arc<dyn SitemapProvider>>,
        client: reqwest::Client,
    ) -> Result<Self> {
        if providers.is_empty() {
            return Err(WarmupError::InvalidProvider {
                reason: "provider list must not be empty".into(),
            });
        }
        Ok(Self {
            cache,
            providers,
            client,
        })
    }

    /// Create a locator with the canonical provider order: configured path,
    /// robots.txt `Sitemap:` directive, `sitemap.xml` convention.
    pub fn with_default_providers(cache: SitemapCache, client: reqwest::Client) -> Self {
        let providers: Vec<Arc<dyn SitemapProvider>> = vec![
            Arc::new(ConfiguredPathProvider::new()),
            Arc::new(RobotsTxtProvider::new(client.clone())),
            Arc::new(DefaultPathProvider::new()),
        ];
        // The chain is non-empty by construction
        Self {
            cache,
            providers,
            client,
        }
    }

    /// Locate the sitemap of a site, for its default language or an
    /// explicit one.
    ///
    /// Cache hits are returned immediately (marked `cached`) without any
    /// provider or network access. On a cache miss the effective base URL
    /// is validated, the provider chain is walked in order, and the first
    /// hit is written back to the cache.
    pub async fn locate_by_site(
        &self,
        site: &Site,
        language: Option<&SiteLanguage>,
    ) -> Result<SiteAwareSitemap> {
        if let Some(cached) = self.cache.get(site, language).await {
            tracing::debug!(
                site = site.identifier(),
                language = cached.language().id(),
                "sitemap served from cache"
            );
            return Ok(cached);
        }

        let base = effective_base(site, language);
        if base.host_str().map_or(true, str::is_empty) {
            return Err(WarmupError::UnsupportedConfiguration {
                site: site.identifier().to_owned(),
                reason: format!("base URL \"{base}\" has no host"),
            });
        }

        for provider in &self.providers {
            if let Some(sitemap) = provider.get(site, language).await? {
                tracing::info!(
                    site = site.identifier(),
                    language = sitemap.language().id(),
                    provider = provider.name(),
                    sitemap = %sitemap.url(),
                    "sitemap discovered"
                );
                self.cache.set(&sitemap).await;
                return Ok(sitemap);
            }
        }

        Err(WarmupError::UnsupportedSite {
            site: site.identifier().to_owned(),
        })
    }

    /// Locate sitemaps for a set of languages of one site, keyed by
    /// language id, in the order given.
    ///
    /// Callers pass the languages visible to the current actor (see
    /// `SiteLanguageRepository::find_all`). Partial failures propagate:
    /// the first unresolvable language aborts the whole call.
    pub async fn locate_all_by_site<'a>(
        &self,
        site: &Site,
        languages: impl IntoIterator<Item = &'a SiteLanguage>,
    ) -> Result<IndexMap<u32, SiteAwareSitemap>> {
        let mut sitemaps = IndexMap::new();
        for language in languages {
            let sitemap = self.locate_by_site(site, Some(language)).await?;
            sitemaps.insert(language.id(), sitemap);
        }
        Ok(sitemaps)
    }

    /// Probe whether a site's located sitemap actually exists.
    ///
    /// Issues a HEAD request against the located URL; any error or status
    /// of 400 and above counts as "no sitemap". The probe is cheap because
    /// `locate_by_site` is cached.
    pub async fn site_contains_sitemap(
        &self,
        site: &Site,
        language: Option<&SiteLanguage>,
    ) -> bool {
        let Ok(sitemap) = self.locate_by_site(site, language).await else {
            return false;
        };
        self.head_ok(sitemap.url()).await
    }

    async fn head_ok(&self, url: &Url) -> bool {
        match self.client.head(url.clone()).send().await {
            Ok(response) => response.status().as_u16() < 400,
            Err(error) => {
                tracing::debug!(url = %url, %error, "sitemap HEAD probe failed");
                false
            }
        }
    }
}
