//! Default crawler engine.
//!
//! Fetches registered sitemaps, harvests their URLs (following one level of
//! `<sitemapindex>` nesting), applies exclude patterns, optionally reorders
//! targets via a crawling strategy, and warms the remaining URLs with
//! bounded concurrency. Per-URL failures are result entries, never errors.

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::json;
use std::collections::HashSet;
use url::Url;

use crate::error::Result;
use crate::traits::crawler::{Crawler, CrawlerFactory, CrawlerOptions};
use crate::types::events::{ProgressCounts, ProgressUrls, WarmupProgressEvent};
use crate::types::log::{CrawlLogEntry, CrawlState};
use crate::types::result::{
    CrawlOutcome, CrawlingResult, DATA_SITE, DATA_SITEMAP, DATA_SITE_LANGUAGE,
};
use crate::types::sitemap::{CrawlUrl, SiteAwareSitemap, SitemapOrigin};

use super::xml::SitemapParser;

/// Nested sitemap indexes are followed this deep at most.
const MAX_SITEMAP_DEPTH: usize = 2;

/// Builds [`ConcurrentCrawler`] instances.
#[derive(Debug, Default)]
pub struct DefaultCrawlerFactory;

impl CrawlerFactory for DefaultCrawlerFactory {
    fn create(&self, options: CrawlerOptions) -> Box<dyn Crawler> {
        Box::new(ConcurrentCrawler::new(options))
    }
}

/// Reqwest-based crawler with a bounded in-flight request window.
pub struct ConcurrentCrawler {
    options: CrawlerOptions,
    sitemaps: Vec<SiteAwareSitemap>,
    targets: Vec<CrawlUrl>,
    excluded_sitemaps: Vec<Url>,
    excluded_urls: Vec<Url>,
    parser: SitemapParser,
}

impl ConcurrentCrawler {
    pub fn new(options: CrawlerOptions) -> Self {
        Self {
            options,
            sitemaps: Vec::new(),
            targets: Vec::new(),
            excluded_sitemaps: Vec::new(),
            excluded_urls: Vec::new(),
            parser: SitemapParser::new(),
        }
    }

    /// Fetch one sitemap tree and collect its crawl targets.
    ///
    /// A sitemap that cannot be fetched produces a failed outcome for the
    /// sitemap URL itself; harvesting continues with the remaining sitemaps.
    async fn harvest(
        &mut self,
        sitemap: SiteAwareSitemap,
        failed: &mut Vec<CrawlOutcome>,
    ) -> Vec<CrawlUrl> {
        let origin = SitemapOrigin::of(&sitemap);
        let mut harvested = Vec::new();
        let mut queue = vec![(sitemap.url().clone(), 0usize)];
        let mut visited: HashSet<String> = HashSet::new();

        while let Some((url, depth)) = queue.pop() {
            if !visited.insert(url.to_string()) {
                continue;
            }

            let body = match self.fetch_text(&url).await {
                Ok(body) => body,
                Err(message) => {
                    tracing::warn!(sitemap = %url, error = %message, "sitemap fetch failed");
                    failed.push(outcome_with_origin(url, &origin).with_data("error", json!(message)));
                    continue;
                }
            };

            let content = self.parser.parse(&body);
            for crawl_url in content.urls {
                if self.options.is_excluded(crawl_url.url()) {
                    self.excluded_urls.push(crawl_url.url().clone());
                } else {
                    harvested.push(crawl_url.with_origin(origin.clone()));
                }
            }

            for nested in content.nested {
                if self.options.is_excluded(&nested) {
                    self.excluded_sitemaps.push(nested);
                } else if depth < MAX_SITEMAP_DEPTH {
                    queue.push((nested, depth + 1));
                } else {
                    tracing::warn!(sitemap = %nested, "sitemap nested too deep, skipping");
                }
            }
        }

        harvested
    }

    async fn fetch_text(&self, url: &Url) -> std::result::Result<String, String> {
        let response = self
            .options
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status().as_u16()));
        }
        response.text().await.map_err(|e| e.to_string())
    }

    async fn crawl_targets(
        &self,
        targets: Vec<CrawlUrl>,
        successful: &mut Vec<CrawlOutcome>,
        failed: &mut Vec<CrawlOutcome>,
    ) {
        let total = targets.len();
        let concurrency = self.options.concurrency.max(1);
        let client = &self.options.client;

        let mut in_flight = FuturesUnordered::new();
        let mut pending = targets.into_iter();
        let mut current = 0usize;

        loop {
            while in_flight.len() < concurrency {
                let Some(target) = pending.next() else {
                    break;
                };
                let client = client.clone();
                let request_timeout = self.options.request_timeout;
                in_flight.push(async move {
                    let result = tokio::time::timeout(
                        request_timeout,
                        client.get(target.url().clone()).send(),
                    )
                    .await;
                    (target, result)
                });
            }

            let Some((target, result)) = in_flight.next().await else {
                break;
            };
            current += 1;

            let (state, message, status) = match result {
                Ok(Ok(response)) => {
                    let status = response.status().as_u16();
                    if status < 400 {
                        (CrawlState::Success, format!("OK ({status})"), Some(status))
                    } else {
                        (CrawlState::Failed, format!("HTTP {status}"), Some(status))
                    }
                }
                Ok(Err(error)) => (CrawlState::Failed, error.to_string(), None),
                Err(_) => (
                    CrawlState::Failed,
                    format!("timeout after {}s", self.options.request_timeout.as_secs()),
                    None,
                ),
            };

            let mut outcome = CrawlOutcome::new(target.url().clone());
            if let Some(status) = status {
                outcome = outcome.with_data("status", json!(status));
            }
            if let Some(origin) = target.origin() {
                outcome = outcome
                    .with_data(DATA_SITEMAP, json!(origin.sitemap.to_string()))
                    .with_data(DATA_SITE, json!(origin.site_root_page))
                    .with_data(DATA_SITE_LANGUAGE, json!(origin.language_id));
            }

            self.log_entry(&target, &message, state).await;

            match state {
                CrawlState::Success => successful.push(outcome),
                CrawlState::Failed => {
                    tracing::debug!(url = %target.url(), error = %message, "URL warmup failed");
                    failed.push(outcome);
                }
            }

            self.emit_progress(target.url(), current, total, successful, failed);
        }
    }

    async fn log_entry(&self, target: &CrawlUrl, message: &str, state: CrawlState) {
        let Some(sink) = &self.options.log_sink else {
            return;
        };
        let mut entry = CrawlLogEntry::new(
            self.options.request_id.clone(),
            target.url().clone(),
            message,
            state,
        );
        if let Some(origin) = target.origin() {
            entry = entry
                .with_sitemap(origin.sitemap.clone())
                .with_site(origin.site_root_page)
                .with_site_language(origin.language_id);
        }
        sink.log(entry).await;
    }

    fn emit_progress(
        &self,
        current_url: &Url,
        current: usize,
        total: usize,
        successful: &[CrawlOutcome],
        failed: &[CrawlOutcome],
    ) {
        let Some(progress) = &self.options.progress else {
            return;
        };
        progress.on_progress(&WarmupProgressEvent {
            progress: ProgressCounts { current, total },
            urls: ProgressUrls {
                current: current_url.to_string(),
                successful: successful.iter().map(|o| o.url().to_string()).collect(),
                failed: failed.iter().map(|o| o.url().to_string()).collect(),
            },
        });
    }
}

fn outcome_with_origin(url: Url, origin: &SitemapOrigin) -> CrawlOutcome {
    CrawlOutcome::new(url)
        .with_data(DATA_SITEMAP, json!(origin.sitemap.to_string()))
        .with_data(DATA_SITE, json!(origin.site_root_page))
        .with_data(DATA_SITE_LANGUAGE, json!(origin.language_id))
}

#[async_trait]
impl Crawler for ConcurrentCrawler {
    fn add_sitemap(&mut self, sitemap: SiteAwareSitemap) {
        if self.options.is_excluded(sitemap.url()) {
            tracing::info!(sitemap = %sitemap.url(), "sitemap excluded by pattern");
            self.excluded_sitemaps.push(sitemap.url().clone());
        } else {
            self.sitemaps.push(sitemap);
        }
    }

    fn add_url(&mut self, url: Url) {
        if self.options.is_excluded(&url) {
            tracing::info!(url = %url, "URL excluded by pattern");
            self.excluded_urls.push(url);
        } else {
            self.targets.push(CrawlUrl::new(url));
        }
    }

    async fn run(&mut self) -> Result<CrawlingResult> {
        let mut successful = Vec::new();
        let mut failed = Vec::new();

        let mut targets = std::mem::take(&mut self.targets);
        for sitemap in std::mem::take(&mut self.sitemaps) {
            targets.extend(self.harvest(sitemap, &mut failed).await);
        }

        if let Some(strategy) = &self.options.strategy {
            tracing::debug!(strategy = strategy.name(), "ordering crawl targets");
            strategy.prepare(&mut targets);
        }

        if self.options.limit > 0 && targets.len() > self.options.limit {
            tracing::info!(
                limit = self.options.limit,
                dropped = targets.len() - self.options.limit,
                "URL limit reached, truncating crawl targets"
            );
            targets.truncate(self.options.limit);
        }

        tracing::info!(
            request_id = %self.options.request_id,
            targets = targets.len(),
            "starting crawl"
        );
        self.crawl_targets(targets, &mut successful, &mut failed)
            .await;
        tracing::info!(
            request_id = %self.options.request_id,
            successful = successful.len(),
            failed = failed.len(),
            "crawl finished"
        );

        Ok(CrawlingResult::new(successful, failed))
    }

    fn excluded_sitemaps(&self) -> &[Url] {
        &self.excluded_sitemaps
    }

    fn excluded_urls(&self) -> &[Url] {
        &self.excluded_urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn options() -> CrawlerOptions {
        CrawlerOptions::new("test-run")
    }

    fn sitemap(url: &str) -> SiteAwareSitemap {
        let site = crate::types::site::Site::new(
            "shop",
            1,
            Url::parse("https://shop.example").unwrap(),
        );
        SiteAwareSitemap::new(
            Url::parse(url).unwrap(),
            site.clone(),
            site.default_language().clone(),
        )
    }

    #[test]
    fn test_add_url_applies_exclude_patterns() {
        let mut options = options();
        options.exclude_patterns = vec![Regex::new("/private/").unwrap()];
        let mut crawler = ConcurrentCrawler::new(options);

        crawler.add_url(Url::parse("https://shop.example/").unwrap());
        crawler.add_url(Url::parse("https://shop.example/private/cart").unwrap());

        assert_eq!(crawler.targets.len(), 1);
        assert_eq!(
            crawler.excluded_urls(),
            &[Url::parse("https://shop.example/private/cart").unwrap()]
        );
    }

    #[test]
    fn test_add_sitemap_applies_exclude_patterns() {
        let mut options = options();
        options.exclude_patterns = vec![Regex::new(r"staging\.").unwrap()];
        let mut crawler = ConcurrentCrawler::new(options);

        crawler.add_sitemap(sitemap("https://shop.example/sitemap.xml"));
        crawler.add_sitemap(sitemap("https://staging.shop.example/sitemap.xml"));

        assert_eq!(crawler.sitemaps.len(), 1);
        assert_eq!(
            crawler.excluded_sitemaps(),
            &[Url::parse("https://staging.shop.example/sitemap.xml").unwrap()]
        );
    }

    #[tokio::test]
    async fn test_run_with_no_targets_is_empty_success() {
        let mut crawler = ConcurrentCrawler::new(options());
        let result = crawler.run().await.unwrap();
        assert!(result.successful().is_empty());
        assert!(result.failed().is_empty());
    }

    #[tokio::test]
    async fn test_failed_fetches_produce_log_entries_and_progress() {
        use crate::testing::{CollectingProgressHandler, MemoryLogSink};
        use std::sync::Arc;

        let sink = Arc::new(MemoryLogSink::new());
        let progress = Arc::new(CollectingProgressHandler::new());
        let mut options = options();
        options.log_sink = Some(sink.clone());
        options.progress = Some(progress.clone());

        // Nothing listens on the discard port; the connection is refused
        let mut crawler = ConcurrentCrawler::new(options);
        crawler.add_url(Url::parse("http://127.0.0.1:9/").unwrap());

        let result = crawler.run().await.unwrap();
        assert!(result.successful().is_empty());
        assert_eq!(result.failed().len(), 1);

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].state, CrawlState::Failed);
        assert_eq!(entries[0].request_id, "test-run");

        let events = progress.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].progress.current, 1);
        assert_eq!(events[0].progress.total, 1);
        assert_eq!(events[0].urls.failed.len(), 1);
    }
}
