//! Persistent cache of located sitemap URLs.
//!
//! Stored shape, per site identifier: a map from language key to a list of
//! absolute sitemap URLs. The site's default language is stored under the
//! literal key `"default"`, every other language under its numeric id.
//! Entries never expire on their own; invalidation happens through
//! [`SitemapCache::remove`].

use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::traits::cache::KeyValueCache;
use crate::types::site::{Site, SiteLanguage};
use crate::types::sitemap::SiteAwareSitemap;

const KEY_PREFIX: &str = "warming:sitemap";
const DEFAULT_LANGUAGE_KEY: &str = "default";

/// Key/value-backed cache mapping (site, language) to sitemap URLs.
pub struct SitemapCache {
    store: Arc<dyn KeyValueCache>,
}

impl SitemapCache {
    pub fn new(store: Arc<dyn KeyValueCache>) -> Self {
        Self { store }
    }

    /// Get the cached sitemap for a site and language (default language
    /// when `None`). The returned sitemap is marked `cached`.
    pub async fn get(&self, site: &Site, language: Option<&SiteLanguage>) -> Option<SiteAwareSitemap> {
        let language = language.unwrap_or_else(|| site.default_language());
        let entry = self.store.get(&Self::site_key(site)).await?;
        let urls = entry.get(&Self::language_key(site, language))?.as_array()?;
        let first = urls.first()?.as_str()?;
        let url = first.parse().ok()?;

        Some(SiteAwareSitemap::new(url, site.clone(), language.clone()).with_cached(true))
    }

    /// Store a located sitemap under its site and language.
    pub async fn set(&self, sitemap: &SiteAwareSitemap) {
        let site = sitemap.site();
        let key = Self::site_key(site);
        let mut entry = self
            .store
            .get(&key)
            .await
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_else(Map::new);

        entry.insert(
            Self::language_key(site, sitemap.language()),
            json!([sitemap.url().to_string()]),
        );
        self.store.set(&key, Value::Object(entry)).await;
    }

    /// Remove the cache entry for one language, or for the whole site when
    /// no language is given.
    pub async fn remove(&self, site: &Site, language: Option<&SiteLanguage>) {
        let key = Self::site_key(site);
        match language {
            None => self.store.remove(&key).await,
            Some(language) => {
                let Some(mut entry) = self
                    .store
                    .get(&key)
                    .await
                    .and_then(|v| v.as_object().cloned())
                else {
                    return;
                };
                entry.remove(&Self::language_key(site, language));
                self.store.set(&key, Value::Object(entry)).await;
            }
        }
    }

    fn site_key(site: &Site) -> String {
        format!("{KEY_PREFIX}:{}", site.identifier())
    }

    fn language_key(site: &Site, language: &SiteLanguage) -> String {
        if language.id() == site.default_language().id() {
            DEFAULT_LANGUAGE_KEY.to_owned()
        } else {
            language.id().to_string()
        }
    }
}
