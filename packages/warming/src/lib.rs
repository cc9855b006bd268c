//! Cache Warmup Orchestration Library
//!
//! Lets editors of a multi-site, multi-language content platform trigger
//! cache warmup: pre-crawling a site's (or page's) public URLs so caches
//! are primed before real visitors arrive.
//!
//! # Design Philosophy
//!
//! - The host platform stays the source of truth: sites, pages, users and
//!   URL routing are consumed through read-only oracle traits.
//! - Permission denials are booleans, "not found" is `Option`; hard errors
//!   are reserved for broken configuration and failed discovery.
//! - Caches are advisory: a missing entry costs a re-discovery, never
//!   correctness.
//! - The crawler engine is swappable; the core only assembles the target
//!   list and consumes the aggregated result.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use warming::{
//!     MemoryCache, SitemapCache, SitemapLocator, WarmupConfig, WarmupQueue,
//!     WarmupService, SiteWarmupRequest,
//! };
//!
//! let cache = SitemapCache::new(Arc::new(MemoryCache::new()));
//! let locator = SitemapLocator::with_default_providers(cache, client.clone());
//! let service = WarmupService::new(WarmupConfig::default(), Arc::new(locator), resolver);
//!
//! let mut queue = WarmupQueue::new();
//! queue.enqueue(SiteWarmupRequest::new(site));
//! let result = queue.process(&service).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator seams (crawler, registries, user, cache)
//! - [`types`] - Value types (sites, requests, results, events)
//! - [`permission`] - Memoized permission guard
//! - [`sitemap`] - Sitemap cache, discovery providers and locator
//! - [`repository`] - Permission-filtered site/language views
//! - [`queue`] / [`service`] - Batch queue and warmup orchestration
//! - [`crawlers`] - Default crawler engine and crawling strategies
//! - [`notification`] - Per-request summary messages
//! - [`testing`] - Mock collaborators for embedding tests

pub mod crawlers;
pub mod error;
pub mod notification;
pub mod permission;
pub mod queue;
pub mod repository;
pub mod service;
pub mod sitemap;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{Result, WarmupError};
pub use permission::{PermissionContext, PermissionGuard};
pub use queue::WarmupQueue;
pub use repository::{SiteLanguageRepository, SiteRepository};
pub use service::WarmupService;
pub use sitemap::{
    ConfiguredPathProvider, DefaultPathProvider, RobotsTxtProvider, SitemapCache, SitemapLocator,
    SitemapProvider,
};
pub use stores::MemoryCache;
pub use traits::{
    cache::KeyValueCache,
    crawler::{
        CrawlLogSink, Crawler, CrawlerFactory, CrawlerOptions, CrawlingStrategy, ProgressHandler,
    },
    registry::{PageRecord, PageRegistry, PageUrlResolver, SiteRegistry},
    user::UserAccess,
};
pub use types::{
    config::WarmupConfig,
    events::{WarmupFinishedEvent, WarmupProgressEvent},
    log::{CrawlLogEntry, CrawlState},
    request::{PageWarmupRequest, SiteWarmupRequest, WarmupRequest, WarmupRequestSnapshot},
    result::{CacheWarmupResult, CrawlOutcome, CrawlingResult},
    site::{Site, SiteLanguage},
    sitemap::{ChangeFrequency, CrawlUrl, SiteAwareSitemap, SitemapOrigin},
    state::WarmupState,
};

// Re-export crawler implementations
pub use crawlers::{
    ConcurrentCrawler, DefaultCrawlerFactory, SitemapParser, SortByChangeFrequency,
    SortByLastModified, SortByPriority, StrategyRegistry,
};

// Re-export notification building
pub use notification::NotificationBuilder;
