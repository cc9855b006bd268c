//! Crawl log row types.
//!
//! One entry is written per crawled URL. Persistence is owned by the host;
//! this library only defines the row shape and the write-sink seam
//! ([`CrawlLogSink`](crate::traits::crawler::CrawlLogSink)).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Terminal state of a single crawled URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlState {
    Success,
    Failed,
}

/// One log row per crawled URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlLogEntry {
    /// Id of the warmup run this URL belonged to
    pub request_id: String,

    pub date: DateTime<Utc>,

    pub url: Url,

    /// Short human-readable outcome (e.g. "OK (200)")
    pub message: String,

    pub state: CrawlState,

    /// Sitemap the URL was harvested from, if any
    pub sitemap: Option<Url>,

    /// Root page id of the originating site, if known
    pub site: Option<u32>,

    /// Language id of the originating site language, if known
    pub site_language: Option<u32>,
}

impl CrawlLogEntry {
    pub fn new(
        request_id: impl Into<String>,
        url: Url,
        message: impl Into<String>,
        state: CrawlState,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            date: Utc::now(),
            url,
            message: message.into(),
            state,
            sitemap: None,
            site: None,
            site_language: None,
        }
    }

    pub fn with_sitemap(mut self, sitemap: Url) -> Self {
        self.sitemap = Some(sitemap);
        self
    }

    pub fn with_site(mut self, root_page_id: u32) -> Self {
        self.site = Some(root_page_id);
        self
    }

    pub fn with_site_language(mut self, language_id: u32) -> Self {
        self.site_language = Some(language_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_serializes_state_lowercase() {
        let entry = CrawlLogEntry::new(
            "run-1",
            Url::parse("https://shop.example/").unwrap(),
            "OK (200)",
            CrawlState::Success,
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["state"], "success");
        assert_eq!(value["request_id"], "run-1");
        assert!(value["sitemap"].is_null());
    }
}
