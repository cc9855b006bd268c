//! Crawler engine seam.
//!
//! The orchestration core only assembles the target list and consumes the
//! aggregated result; the engine that issues HTTP requests is swappable
//! behind [`Crawler`] / [`CrawlerFactory`].

use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::Result;
use crate::types::events::WarmupProgressEvent;
use crate::types::log::CrawlLogEntry;
use crate::types::result::CrawlingResult;
use crate::types::sitemap::{CrawlUrl, SiteAwareSitemap};

/// Configuration handed to a crawler at construction.
#[derive(Clone)]
pub struct CrawlerOptions {
    /// Maximum number of URLs to crawl (0 = unlimited)
    pub limit: usize,

    /// Maximum number of concurrent requests
    pub concurrency: usize,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Shared HTTP client
    pub client: reqwest::Client,

    /// Compiled exclude patterns
    pub exclude_patterns: Vec<Regex>,

    /// Crawling-order strategy; `None` means no explicit ordering
    pub strategy: Option<Arc<dyn CrawlingStrategy>>,

    /// Id of the warmup run, stamped onto log entries
    pub request_id: String,

    /// Per-URL log sink, if any
    pub log_sink: Option<Arc<dyn CrawlLogSink>>,

    /// Per-URL progress callback, if any
    pub progress: Option<Arc<dyn ProgressHandler>>,
}

impl CrawlerOptions {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            limit: 0,
            concurrency: 5,
            request_timeout: Duration::from_secs(30),
            client: reqwest::Client::new(),
            exclude_patterns: Vec::new(),
            strategy: None,
            request_id: request_id.into(),
            log_sink: None,
            progress: None,
        }
    }

    /// Whether a URL is filtered out by the exclude patterns.
    pub fn is_excluded(&self, url: &Url) -> bool {
        let url = url.as_str();
        self.exclude_patterns.iter().any(|p| p.is_match(url))
    }
}

impl std::fmt::Debug for CrawlerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlerOptions")
            .field("limit", &self.limit)
            .field("concurrency", &self.concurrency)
            .field("exclude_patterns", &self.exclude_patterns.len())
            .field("strategy", &self.strategy.as_ref().map(|s| s.name()))
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}

/// A crawler engine for one warmup run.
///
/// Sitemaps and URLs are registered in orchestration order; `run` consumes
/// them and produces the per-URL result. Per-URL failures are entries in
/// the result, never errors.
#[async_trait]
pub trait Crawler: Send {
    /// Register a sitemap; the crawler fetches and parses it to extract
    /// leaf URLs.
    fn add_sitemap(&mut self, sitemap: SiteAwareSitemap);

    /// Register a concrete URL, bypassing sitemap discovery.
    fn add_url(&mut self, url: Url);

    /// Execute the crawl.
    async fn run(&mut self) -> Result<CrawlingResult>;

    /// Sitemaps skipped by exclude patterns.
    fn excluded_sitemaps(&self) -> &[Url];

    /// URLs skipped by exclude patterns.
    fn excluded_urls(&self) -> &[Url];
}

/// Builds a fresh crawler per warmup run.
pub trait CrawlerFactory: Send + Sync {
    fn create(&self, options: CrawlerOptions) -> Box<dyn Crawler>;
}

/// A pluggable ordering policy applied to the URL list before crawling.
pub trait CrawlingStrategy: Send + Sync {
    /// Registry name (e.g. "sort-by-priority").
    fn name(&self) -> &'static str;

    /// Reorder the crawl targets in place.
    fn prepare(&self, urls: &mut Vec<CrawlUrl>);
}

/// Write sink for per-URL crawl log rows.
#[async_trait]
pub trait CrawlLogSink: Send + Sync {
    async fn log(&self, entry: CrawlLogEntry);
}

/// Consumer of incremental per-URL progress.
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &WarmupProgressEvent);
}
