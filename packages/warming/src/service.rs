//! Warmup orchestration service.
//!
//! Turns queued requests into a concrete crawl: sitemaps for site requests
//! (via the locator), page URLs for page requests (via the page-URL
//! resolver), handed to a freshly built crawler per run.

use std::sync::Arc;
use uuid::Uuid;

use crate::crawlers::concurrent::DefaultCrawlerFactory;
use crate::crawlers::strategy::StrategyRegistry;
use crate::error::{Result, WarmupError};
use crate::sitemap::locator::SitemapLocator;
use crate::traits::crawler::{CrawlLogSink, CrawlerFactory, CrawlerOptions, ProgressHandler};
use crate::traits::registry::PageUrlResolver;
use crate::types::config::WarmupConfig;
use crate::types::request::{PageWarmupRequest, SiteWarmupRequest};
use crate::types::result::CacheWarmupResult;

/// Executes warmup runs.
pub struct WarmupService {
    config: WarmupConfig,
    client: reqwest::Client,
    locator: Arc<SitemapLocator>,
    resolver: Arc<dyn PageUrlResolver>,
    crawler_factory: Box<dyn CrawlerFactory>,
    strategies: StrategyRegistry,
    log_sink: Option<Arc<dyn CrawlLogSink>>,
    progress: Option<Arc<dyn ProgressHandler>>,
}

impl WarmupService {
    pub fn new(
        config: WarmupConfig,
        locator: Arc<SitemapLocator>,
        resolver: Arc<dyn PageUrlResolver>,
    ) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            locator,
            resolver,
            crawler_factory: Box::new(DefaultCrawlerFactory),
            strategies: StrategyRegistry::new(),
            log_sink: None,
            progress: None,
        }
    }

    /// Swap the crawler implementation used for subsequent runs.
    pub fn set_crawler(&mut self, factory: Box<dyn CrawlerFactory>) {
        self.crawler_factory = factory;
    }

    /// Builder-style variant of [`set_crawler`](Self::set_crawler).
    pub fn with_crawler(mut self, factory: Box<dyn CrawlerFactory>) -> Self {
        self.crawler_factory = factory;
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_config(mut self, config: WarmupConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_resolver(mut self, resolver: impl PageUrlResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    pub fn with_strategies(mut self, strategies: StrategyRegistry) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_log_sink(mut self, log_sink: Arc<dyn CrawlLogSink>) -> Self {
        self.log_sink = Some(log_sink);
        self
    }

    pub fn with_progress_handler(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run a warmup for the given site and page requests.
    ///
    /// Sites are processed in the order supplied, languages within a site
    /// in the order supplied, then pages in the order supplied. A sitemap
    /// that cannot be located aborts the whole run; a page URL that cannot
    /// be resolved is skipped silently.
    pub async fn warmup(
        &self,
        sites: &[SiteWarmupRequest],
        pages: &[PageWarmupRequest],
        limit: Option<usize>,
        strategy: Option<&str>,
    ) -> Result<CacheWarmupResult> {
        let options = self.crawler_options(limit, strategy)?;
        let request_id = options.request_id.clone();
        let mut crawler = self.crawler_factory.create(options);

        for request in sites {
            let site = request.site();
            for language_id in request.language_ids() {
                let language =
                    site.language(language_id)
                        .ok_or_else(|| WarmupError::UnknownLanguage {
                            site: site.identifier().to_owned(),
                            language_id,
                        })?;
                let sitemap = self.locator.locate_by_site(site, Some(language)).await?;
                crawler.add_sitemap(sitemap);
            }
        }

        for request in pages {
            let language_ids: Vec<Option<u32>> = if request.language_ids().is_empty() {
                vec![None]
            } else {
                request.language_ids().iter().copied().map(Some).collect()
            };

            for language_id in language_ids {
                match self.resolver.resolve(request.page(), language_id).await {
                    Some(url) => crawler.add_url(url),
                    None => {
                        tracing::debug!(
                            page = request.page(),
                            language = ?language_id,
                            "page has no public URL, skipping"
                        );
                    }
                }
            }
        }

        let result = crawler.run().await?;
        tracing::info!(
            request_id = %request_id,
            successful = result.successful().len(),
            failed = result.failed().len(),
            "warmup run finished"
        );

        Ok(CacheWarmupResult::new(
            result,
            crawler.excluded_sitemaps().to_vec(),
            crawler.excluded_urls().to_vec(),
        ))
    }

    fn crawler_options(&self, limit: Option<usize>, strategy: Option<&str>) -> Result<CrawlerOptions> {
        let exclude_patterns = self
            .config
            .exclude_patterns
            .iter()
            .map(|pattern| {
                regex::Regex::new(pattern).map_err(|source| WarmupError::InvalidExcludePattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let strategy = strategy
            .or(self.config.strategy.as_deref())
            .and_then(|name| self.strategies.get(name));

        let mut options = CrawlerOptions::new(Uuid::new_v4().to_string());
        options.limit = limit.unwrap_or(self.config.limit);
        options.concurrency = self.config.concurrency;
        options.request_timeout = std::time::Duration::from_secs(self.config.request_timeout_secs);
        options.client = self.client.clone();
        options.exclude_patterns = exclude_patterns;
        options.strategy = strategy;
        options.log_sink = self.log_sink.clone();
        options.progress = self.progress.clone();
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        demo_site, service_with_crawler, MockCrawlerFactory, StaticUrlResolver,
    };
    use crate::types::site::SiteLanguage;
    use url::Url;

    #[tokio::test]
    async fn test_warmup_registers_sites_languages_then_pages_in_order() {
        let factory = MockCrawlerFactory::succeeding();
        let resolver = StaticUrlResolver::new()
            .with_url(5, None, "https://shop.example/p/5")
            .with_url(6, None, "https://shop.example/p/6");
        let service = service_with_crawler(factory.clone()).with_resolver(resolver);

        let site = demo_site();
        let sites = vec![SiteWarmupRequest::new(site.clone()).with_languages([0, 1])];
        let pages = vec![PageWarmupRequest::new(5), PageWarmupRequest::new(6)];

        let result = service.warmup(&sites, &pages, None, None).await.unwrap();
        assert!(result.is_successful());

        assert_eq!(
            factory.added_sitemaps(),
            vec![
                "https://shop.example/sitemap.xml",
                "https://shop.example/de/sitemap.xml"
            ]
        );
        assert_eq!(
            factory.added_urls(),
            vec!["https://shop.example/p/5", "https://shop.example/p/6"]
        );
    }

    #[tokio::test]
    async fn test_unresolvable_pages_are_skipped_silently() {
        let factory = MockCrawlerFactory::succeeding();
        let service = service_with_crawler(factory.clone());

        let pages = vec![PageWarmupRequest::new(404)];
        let result = service.warmup(&[], &pages, None, None).await.unwrap();

        assert!(factory.added_urls().is_empty());
        assert!(result.result().failed().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_language_aborts_run() {
        let factory = MockCrawlerFactory::succeeding();
        let service = service_with_crawler(factory.clone());

        let sites = vec![SiteWarmupRequest::new(demo_site()).with_languages([42])];
        let result = service.warmup(&sites, &[], None, None).await;

        assert!(matches!(result, Err(WarmupError::UnknownLanguage { .. })));
        assert_eq!(factory.runs(), 0);
    }

    #[tokio::test]
    async fn test_page_request_with_languages_resolves_each() {
        let factory = MockCrawlerFactory::succeeding();
        let resolver = StaticUrlResolver::new()
            .with_url(5, Some(0), "https://shop.example/p/5")
            .with_url(5, Some(1), "https://shop.example/de/p/5");
        let service = service_with_crawler(factory.clone()).with_resolver(resolver);

        let pages = vec![PageWarmupRequest::new(5).with_languages([0, 1])];
        service.warmup(&[], &pages, None, None).await.unwrap();

        assert_eq!(
            factory.added_urls(),
            vec!["https://shop.example/p/5", "https://shop.example/de/p/5"]
        );
    }

    #[tokio::test]
    async fn test_invalid_exclude_pattern_fails_before_crawl() {
        let factory = MockCrawlerFactory::succeeding();
        let service =
            service_with_crawler(factory.clone()).with_config(WarmupConfig::new().exclude("(("));

        let result = service.warmup(&[], &[], None, None).await;
        assert!(matches!(
            result,
            Err(WarmupError::InvalidExcludePattern { .. })
        ));
        assert_eq!(factory.runs(), 0);
    }

    #[tokio::test]
    async fn test_locator_failure_aborts_whole_run() {
        let factory = MockCrawlerFactory::succeeding();
        let service = service_with_crawler(factory.clone());

        // A site whose base URL has no host cannot be located
        let broken = crate::types::site::Site::new(
            "broken",
            9,
            Url::parse("unix:/run/site.sock").unwrap(),
        )
        .with_language(SiteLanguage::new(
            0,
            Url::parse("unix:/run/site.sock").unwrap(),
            "Default",
        ));
        let sites = vec![
            SiteWarmupRequest::new(broken),
            SiteWarmupRequest::new(demo_site()),
        ];

        let result = service.warmup(&sites, &[], None, None).await;
        assert!(matches!(
            result,
            Err(WarmupError::UnsupportedConfiguration { .. })
        ));
        assert_eq!(factory.runs(), 0);
    }
}
