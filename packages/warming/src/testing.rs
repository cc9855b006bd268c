//! Testing utilities including mock collaborators.
//!
//! These are useful for testing applications that embed the warmup core
//! without a real CMS backend or network access.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

use crate::error::{Result, WarmupError};
use crate::sitemap::cache::SitemapCache;
use crate::sitemap::locator::SitemapLocator;
use crate::sitemap::providers::{DefaultPathProvider, SitemapProvider};
use crate::service::WarmupService;
use crate::stores::MemoryCache;
use crate::traits::crawler::{Crawler, CrawlerFactory, CrawlerOptions, CrawlLogSink, ProgressHandler};
use crate::traits::registry::{PageRecord, PageRegistry, PageUrlResolver, SiteRegistry};
use crate::traits::user::UserAccess;
use crate::types::config::WarmupConfig;
use crate::types::events::WarmupProgressEvent;
use crate::types::log::CrawlLogEntry;
use crate::types::result::{
    CrawlOutcome, CrawlingResult, DATA_SITE, DATA_SITEMAP, DATA_SITE_LANGUAGE,
};
use crate::types::site::{Site, SiteLanguage};
use crate::types::sitemap::SiteAwareSitemap;

static USER_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A configurable backend user for permission tests.
pub struct TestUser {
    identifier: String,
    admin: bool,
    page_access: bool,
    allowed_pages: Vec<String>,
    allowed_sites: Vec<String>,
    languages: Vec<u32>,
}

impl TestUser {
    /// An admin user with a unique identifier.
    pub fn admin() -> Self {
        Self::named(format!("admin-{}", USER_COUNTER.fetch_add(1, Ordering::Relaxed))).as_admin()
    }

    /// A non-admin user with a unique identifier and no grants.
    pub fn editor() -> Self {
        Self::named(format!("editor-{}", USER_COUNTER.fetch_add(1, Ordering::Relaxed)))
    }

    pub fn named(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            admin: false,
            page_access: true,
            allowed_pages: Vec::new(),
            allowed_sites: Vec::new(),
            languages: Vec::new(),
        }
    }

    pub fn as_admin(mut self) -> Self {
        self.admin = true;
        self
    }

    /// Deny the record-level page ACL check.
    pub fn without_page_access(mut self) -> Self {
        self.page_access = false;
        self
    }

    pub fn with_allowed_pages<S: Into<String>>(
        mut self,
        pages: impl IntoIterator<Item = S>,
    ) -> Self {
        self.allowed_pages = pages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_allowed_sites<S: Into<String>>(
        mut self,
        sites: impl IntoIterator<Item = S>,
    ) -> Self {
        self.allowed_sites = sites.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_languages(mut self, languages: impl IntoIterator<Item = u32>) -> Self {
        self.languages = languages.into_iter().collect();
        self
    }
}

impl UserAccess for TestUser {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn is_admin(&self) -> bool {
        self.admin
    }

    fn has_page_access(&self, _page: &PageRecord) -> bool {
        self.page_access
    }

    fn has_language_access(&self, language_id: u32) -> bool {
        self.admin || self.languages.contains(&language_id)
    }

    fn allowed_pages(&self) -> Vec<String> {
        self.allowed_pages.clone()
    }

    fn allowed_sites(&self) -> Vec<String> {
        self.allowed_sites.clone()
    }
}

/// Site registry backed by a fixed list.
pub struct StaticSiteRegistry {
    sites: Vec<Site>,
}

impl StaticSiteRegistry {
    pub fn new(sites: Vec<Site>) -> Self {
        Self { sites }
    }
}

#[async_trait]
impl SiteRegistry for StaticSiteRegistry {
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
        // Fixture registries only know root pages
        self.find_by_root_page_id(page_id).await
    }
}

/// Page tree oracle backed by fixed records, with lookup counting for
/// memoization assertions.
#[derive(Default)]
pub struct StaticPageRegistry {
    records: HashMap<u32, PageRecord>,
    localized: HashMap<(u32, u32), PageRecord>,
    rootlines: HashMap<u32, Vec<u32>>,
    record_lookups: AtomicUsize,
}

impl StaticPageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, record: PageRecord) -> Self {
        self.records.insert(record.id, record);
        self
    }

    /// Register a localized overlay of a page.
    pub fn with_localized(mut self, page_id: u32, language_id: u32, record: PageRecord) -> Self {
        self.localized.insert((page_id, language_id), record);
        self
    }

    pub fn with_rootline(mut self, page_id: u32, rootline: impl IntoIterator<Item = u32>) -> Self {
        self.rootlines.insert(page_id, rootline.into_iter().collect());
        self
    }

    /// Number of `page_record` calls performed so far.
    pub fn record_lookups(&self) -> usize {
        self.record_lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PageRegistry for StaticPageRegistry {
    async fn page_record(&self, page_id: u32, language_id: Option<u32>) -> Option<PageRecord> {
        self.record_lookups.fetch_add(1, Ordering::Relaxed);
        match language_id {
            // Fall back to the base record when no explicit overlay exists
            Some(language_id) => self
                .localized
                .get(&(page_id, language_id))
                .or_else(|| self.records.get(&page_id))
                .cloned(),
            None => self.records.get(&page_id).cloned(),
        }
    }

    async fn rootline(&self, page_id: u32) -> Vec<u32> {
        self.rootlines.get(&page_id).cloned().unwrap_or_default()
    }

    async fn page_title(&self, page_id: u32) -> Option<String> {
        self.records.get(&page_id).map(|r| r.title.clone())
    }
}

/// Page-URL resolver backed by a fixed map.
#[derive(Default)]
pub struct StaticUrlResolver {
    urls: HashMap<(u32, Option<u32>), Url>,
}

impl StaticUrlResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, page_id: u32, language_id: Option<u32>, url: &str) -> Self {
        self.urls
            .insert((page_id, language_id), Url::parse(url).expect("valid URL"));
        self
    }
}

#[async_trait]
impl PageUrlResolver for StaticUrlResolver {
    async fn resolve(&self, page_id: u32, language_id: Option<u32>) -> Option<Url> {
        self.urls.get(&(page_id, language_id)).cloned()
    }
}

/// Sitemap provider with scripted results and call counting.
pub struct CountingProvider {
    mode: ProviderMode,
    calls: AtomicUsize,
}

enum ProviderMode {
    Empty,
    Fixed(Url),
    PerLanguage,
}

impl CountingProvider {
    /// Always answers "no sitemap here".
    pub fn empty() -> Self {
        Self {
            mode: ProviderMode::Empty,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always discovers the given URL.
    pub fn returning(url: &str) -> Self {
        Self {
            mode: ProviderMode::Fixed(Url::parse(url).expect("valid URL")),
            calls: AtomicUsize::new(0),
        }
    }

    /// Discovers `sitemap.xml` below the effective base URL.
    pub fn per_language() -> Self {
        Self {
            mode: ProviderMode::PerLanguage,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SitemapProvider for CountingProvider {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn get(
        &self,
        site: &Site,
        language: Option<&SiteLanguage>,
    ) -> Result<Option<SiteAwareSitemap>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let effective_language = language
            .cloned()
            .unwrap_or_else(|| site.default_language().clone());

        let url = match &self.mode {
            ProviderMode::Empty => return Ok(None),
            ProviderMode::Fixed(url) => url.clone(),
            ProviderMode::PerLanguage => match effective_language.base().join("sitemap.xml") {
                Ok(url) => url,
                Err(_) => return Ok(None),
            },
        };

        Ok(Some(SiteAwareSitemap::new(
            url,
            site.clone(),
            effective_language,
        )))
    }
}

/// Shared state of all crawlers built by one [`MockCrawlerFactory`].
#[derive(Default)]
struct MockCrawlerState {
    runs: AtomicUsize,
    sitemaps: Mutex<Vec<String>>,
    urls: Mutex<Vec<String>>,
}

enum MockBehavior {
    /// Every registered target succeeds
    Succeed,
    /// Targets whose URL is in the set fail, the rest succeed
    FailUrls(Vec<String>),
    /// `run` itself fails with a transport error
    Error(String),
}

/// Crawler factory producing scripted crawlers that never touch the
/// network. All crawlers share one state handle for assertions.
#[derive(Clone)]
pub struct MockCrawlerFactory {
    behavior: Arc<MockBehavior>,
    state: Arc<MockCrawlerState>,
}

impl MockCrawlerFactory {
    /// Every crawled target succeeds.
    pub fn succeeding() -> Self {
        Self {
            behavior: Arc::new(MockBehavior::Succeed),
            state: Arc::new(MockCrawlerState::default()),
        }
    }

    /// The given URLs fail, everything else succeeds.
    pub fn failing_urls<S: Into<String>>(urls: impl IntoIterator<Item = S>) -> Self {
        Self {
            behavior: Arc::new(MockBehavior::FailUrls(
                urls.into_iter().map(Into::into).collect(),
            )),
            state: Arc::new(MockCrawlerState::default()),
        }
    }

    /// `run` fails with a transport error.
    pub fn erroring(message: impl Into<String>) -> Self {
        Self {
            behavior: Arc::new(MockBehavior::Error(message.into())),
            state: Arc::new(MockCrawlerState::default()),
        }
    }

    /// Number of `run` invocations across all built crawlers.
    pub fn runs(&self) -> usize {
        self.state.runs.load(Ordering::Relaxed)
    }

    /// Sitemap URLs registered across all built crawlers, in order.
    pub fn added_sitemaps(&self) -> Vec<String> {
        self.state.sitemaps.lock().unwrap().clone()
    }

    /// URLs registered across all built crawlers, in order.
    pub fn added_urls(&self) -> Vec<String> {
        self.state.urls.lock().unwrap().clone()
    }
}

impl CrawlerFactory for MockCrawlerFactory {
    fn create(&self, _options: CrawlerOptions) -> Box<dyn Crawler> {
        Box::new(MockCrawler {
            behavior: self.behavior.clone(),
            state: self.state.clone(),
            sitemaps: Vec::new(),
            urls: Vec::new(),
            excluded_sitemaps: Vec::new(),
            excluded_urls: Vec::new(),
        })
    }
}

struct MockCrawler {
    behavior: Arc<MockBehavior>,
    state: Arc<MockCrawlerState>,
    sitemaps: Vec<SiteAwareSitemap>,
    urls: Vec<Url>,
    excluded_sitemaps: Vec<Url>,
    excluded_urls: Vec<Url>,
}

#[async_trait]
impl Crawler for MockCrawler {
    fn add_sitemap(&mut self, sitemap: SiteAwareSitemap) {
        self.state
            .sitemaps
            .lock()
            .unwrap()
            .push(sitemap.url().to_string());
        self.sitemaps.push(sitemap);
    }

    fn add_url(&mut self, url: Url) {
        self.state.urls.lock().unwrap().push(url.to_string());
        self.urls.push(url);
    }

    async fn run(&mut self) -> Result<CrawlingResult> {
        self.state.runs.fetch_add(1, Ordering::Relaxed);

        let failing: &[String] = match self.behavior.as_ref() {
            MockBehavior::Error(message) => {
                return Err(WarmupError::Crawl(message.clone().into()));
            }
            MockBehavior::FailUrls(urls) => urls,
            MockBehavior::Succeed => &[],
        };

        let mut successful = Vec::new();
        let mut failed = Vec::new();

        // Sitemap targets produce one outcome per sitemap, stamped with
        // their origin like a real crawler would stamp harvested URLs.
        for sitemap in &self.sitemaps {
            let outcome = CrawlOutcome::new(sitemap.url().clone())
                .with_data(DATA_SITEMAP, json!(sitemap.url().to_string()))
                .with_data(DATA_SITE, json!(sitemap.site().root_page_id()))
                .with_data(DATA_SITE_LANGUAGE, json!(sitemap.language().id()));
            if failing.contains(&sitemap.url().to_string()) {
                failed.push(outcome);
            } else {
                successful.push(outcome);
            }
        }

        for url in &self.urls {
            let outcome = CrawlOutcome::new(url.clone());
            if failing.contains(&url.to_string()) {
                failed.push(outcome);
            } else {
                successful.push(outcome);
            }
        }

        Ok(CrawlingResult::new(successful, failed))
    }

    fn excluded_sitemaps(&self) -> &[Url] {
        &self.excluded_sitemaps
    }

    fn excluded_urls(&self) -> &[Url] {
        &self.excluded_urls
    }
}

/// Log sink collecting entries in memory.
#[derive(Default)]
pub struct MemoryLogSink {
    entries: Mutex<Vec<CrawlLogEntry>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<CrawlLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl CrawlLogSink for MemoryLogSink {
    async fn log(&self, entry: CrawlLogEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}

/// Progress handler collecting events in memory.
#[derive(Default)]
pub struct CollectingProgressHandler {
    events: Mutex<Vec<WarmupProgressEvent>>,
}

impl CollectingProgressHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<WarmupProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressHandler for CollectingProgressHandler {
    fn on_progress(&self, event: &WarmupProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// The "shop" demo site: root page 1, English (0) and German (1).
pub fn demo_site() -> Site {
    Site::new("shop", 1, Url::parse("https://shop.example").unwrap()).with_languages([
        SiteLanguage::new(0, Url::parse("https://shop.example").unwrap(), "English"),
        SiteLanguage::new(1, Url::parse("https://shop.example/de/").unwrap(), "German"),
    ])
}

/// A service wired to offline collaborators and the given crawler factory:
/// in-memory sitemap cache, convention-only sitemap discovery, no page-URL
/// mappings.
pub fn service_with_crawler(factory: MockCrawlerFactory) -> WarmupService {
    let cache = SitemapCache::new(Arc::new(MemoryCache::new()));
    let locator = SitemapLocator::new(
        cache,
        vec![Arc::new(DefaultPathProvider::new())],
        reqwest::Client::new(),
    )
    .expect("non-empty provider list");

    WarmupService::new(
        WarmupConfig::default(),
        Arc::new(locator),
        Arc::new(StaticUrlResolver::new()),
    )
    .with_crawler(Box::new(factory))
}
