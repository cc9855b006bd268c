//! Crawl result types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::types::state::WarmupState;

/// Data-bag key carrying the originating sitemap URL of an outcome.
pub const DATA_SITEMAP: &str = "sitemap";

/// Data-bag key carrying the root page id of the originating site.
pub const DATA_SITE: &str = "site";

/// Data-bag key carrying the language id of the originating site language.
pub const DATA_SITE_LANGUAGE: &str = "siteLanguage";

/// Outcome of crawling a single URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlOutcome {
    url: Url,

    /// Opaque per-result data (e.g. HTTP status, sitemap origin)
    #[serde(default)]
    data: Map<String, Value>,
}

impl CrawlOutcome {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            data: Map::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Root page id of the site this outcome originated from, if recorded.
    pub fn site_root_page(&self) -> Option<u32> {
        self.data
            .get(DATA_SITE)
            .and_then(Value::as_u64)
            .map(|v| v as u32)
    }

    /// Language id this outcome originated from, if recorded.
    pub fn site_language(&self) -> Option<u32> {
        self.data
            .get(DATA_SITE_LANGUAGE)
            .and_then(Value::as_u64)
            .map(|v| v as u32)
    }

    /// Originating sitemap URL, if recorded.
    pub fn sitemap(&self) -> Option<&str> {
        self.data.get(DATA_SITEMAP).and_then(Value::as_str)
    }
}

/// Raw per-URL result of a crawler run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlingResult {
    successful: Vec<CrawlOutcome>,
    failed: Vec<CrawlOutcome>,
}

impl CrawlingResult {
    pub fn new(successful: Vec<CrawlOutcome>, failed: Vec<CrawlOutcome>) -> Self {
        Self { successful, failed }
    }

    pub fn successful(&self) -> &[CrawlOutcome] {
        &self.successful
    }

    pub fn failed(&self) -> &[CrawlOutcome] {
        &self.failed
    }
}

/// Result of one warmup run: the raw crawl result plus everything the
/// crawler excluded up front. Read-only after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheWarmupResult {
    result: CrawlingResult,

    /// Sitemaps skipped by exclude patterns
    excluded_sitemaps: Vec<Url>,

    /// URLs skipped by exclude patterns
    excluded_urls: Vec<Url>,
}

impl CacheWarmupResult {
    pub fn new(result: CrawlingResult, excluded_sitemaps: Vec<Url>, excluded_urls: Vec<Url>) -> Self {
        Self {
            result,
            excluded_sitemaps,
            excluded_urls,
        }
    }

    pub fn result(&self) -> &CrawlingResult {
        &self.result
    }

    pub fn excluded_sitemaps(&self) -> &[Url] {
        &self.excluded_sitemaps
    }

    pub fn excluded_urls(&self) -> &[Url] {
        &self.excluded_urls
    }

    /// Overall state per the classification truth table.
    pub fn state(&self) -> WarmupState {
        WarmupState::from_counts(self.result.successful().len(), self.result.failed().len())
    }

    pub fn is_successful(&self) -> bool {
        self.state() == WarmupState::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outcome(url: &str) -> CrawlOutcome {
        CrawlOutcome::new(Url::parse(url).unwrap())
    }

    #[test]
    fn test_outcome_origin_accessors() {
        let outcome = outcome("https://shop.example/")
            .with_data(DATA_SITE, json!(1))
            .with_data(DATA_SITE_LANGUAGE, json!(0))
            .with_data(DATA_SITEMAP, json!("https://shop.example/sitemap.xml"));

        assert_eq!(outcome.site_root_page(), Some(1));
        assert_eq!(outcome.site_language(), Some(0));
        assert_eq!(outcome.sitemap(), Some("https://shop.example/sitemap.xml"));

        let bare = CrawlOutcome::new(Url::parse("https://shop.example/p").unwrap());
        assert_eq!(bare.site_root_page(), None);
        assert_eq!(bare.sitemap(), None);
    }

    #[test]
    fn test_result_state() {
        let ok = CacheWarmupResult::new(
            CrawlingResult::new(vec![outcome("https://a.example/")], Vec::new()),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(ok.state(), WarmupState::Success);
        assert!(ok.is_successful());

        let mixed = CacheWarmupResult::new(
            CrawlingResult::new(
                vec![outcome("https://a.example/")],
                vec![outcome("https://b.example/")],
            ),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(mixed.state(), WarmupState::Warning);
        assert!(!mixed.is_successful());
    }
}
