//! Sitemap value types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::site::{Site, SiteLanguage};

/// A resolved sitemap URL bound to the site and language it was discovered for.
///
/// Immutable after construction. `cached` marks sitemaps reconstructed from
/// the sitemap cache instead of freshly discovered by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteAwareSitemap {
    url: Url,
    site: Site,
    language: SiteLanguage,
    cached: bool,
}

impl SiteAwareSitemap {
    pub fn new(url: Url, site: Site, language: SiteLanguage) -> Self {
        Self {
            url,
            site,
            language,
            cached: false,
        }
    }

    /// Mark this sitemap as served from the cache.
    pub fn with_cached(mut self, cached: bool) -> Self {
        self.cached = cached;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn language(&self) -> &SiteLanguage {
        &self.language
    }

    pub fn is_cached(&self) -> bool {
        self.cached
    }
}

/// Where a crawl target was harvested from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapOrigin {
    /// URL of the sitemap the target came from
    pub sitemap: Url,

    /// Root page id of the originating site
    pub site_root_page: u32,

    /// Language id the sitemap was located for
    pub language_id: u32,
}

impl SitemapOrigin {
    pub fn of(sitemap: &SiteAwareSitemap) -> Self {
        Self {
            sitemap: sitemap.url().clone(),
            site_root_page: sitemap.site().root_page_id(),
            language_id: sitemap.language().id(),
        }
    }
}

/// A single crawl target harvested from a sitemap or registered directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlUrl {
    url: Url,

    /// Sitemap `<priority>` (0.0 to 1.0)
    priority: Option<f64>,

    /// Sitemap `<changefreq>` (e.g. "daily")
    change_frequency: Option<ChangeFrequency>,

    /// Sitemap `<lastmod>`
    last_modified: Option<DateTime<Utc>>,

    /// Originating sitemap; `None` for directly registered URLs
    origin: Option<SitemapOrigin>,
}

impl CrawlUrl {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            priority: None,
            change_frequency: None,
            last_modified: None,
            origin: None,
        }
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_change_frequency(mut self, change_frequency: ChangeFrequency) -> Self {
        self.change_frequency = Some(change_frequency);
        self
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    pub fn with_origin(mut self, origin: SitemapOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn origin(&self) -> Option<&SitemapOrigin> {
        self.origin.as_ref()
    }

    /// Priority with the sitemap protocol default of 0.5 when absent.
    pub fn priority(&self) -> f64 {
        self.priority.unwrap_or(0.5)
    }

    pub fn change_frequency(&self) -> Option<ChangeFrequency> {
        self.change_frequency
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }
}

/// Sitemap change frequency values, ordered from most to least volatile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    /// Parse a `<changefreq>` value; unknown values are discarded.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "always" => Some(Self::Always),
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            "never" => Some(Self::Never),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_frequency_parse() {
        assert_eq!(ChangeFrequency::parse("Daily"), Some(ChangeFrequency::Daily));
        assert_eq!(ChangeFrequency::parse(" never "), Some(ChangeFrequency::Never));
        assert_eq!(ChangeFrequency::parse("fortnightly"), None);
    }

    #[test]
    fn test_change_frequency_ordering() {
        assert!(ChangeFrequency::Always < ChangeFrequency::Daily);
        assert!(ChangeFrequency::Daily < ChangeFrequency::Never);
    }

    #[test]
    fn test_crawl_url_default_priority() {
        let url = CrawlUrl::new(Url::parse("https://shop.example/").unwrap());
        assert_eq!(url.priority(), 0.5);
        assert_eq!(url.clone().with_priority(0.9).priority(), 0.9);
    }
}
