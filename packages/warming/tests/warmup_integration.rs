//! End-to-end scenarios across the orchestration core, with offline
//! collaborators throughout.

use std::sync::Arc;

use warming::testing::{
    demo_site, service_with_crawler, MockCrawlerFactory, StaticPageRegistry, StaticSiteRegistry,
    StaticUrlResolver, TestUser,
};
use warming::{
    MemoryCache, NotificationBuilder, PageRecord, PageWarmupRequest, PermissionContext,
    PermissionGuard, SiteRepository, SiteWarmupRequest, SitemapCache, SitemapLocator,
    WarmupQueue, WarmupRequestSnapshot, WarmupState,
};

fn page_registry() -> StaticPageRegistry {
    StaticPageRegistry::new()
        .with_page(PageRecord::new(1, "Shop"))
        .with_page(PageRecord::new(5, "Landing page"))
}

fn admin_ctx() -> PermissionContext {
    PermissionContext::new(Arc::new(TestUser::admin()))
}

#[tokio::test]
async fn admin_sees_site_and_locator_caches_discovery() {
    let guard = Arc::new(PermissionGuard::new(
        Arc::new(page_registry()),
        Arc::new(MemoryCache::new()),
    ));
    let repository = SiteRepository::new(
        Arc::new(StaticSiteRegistry::new(vec![demo_site()])),
        guard,
    );

    let sites = repository.find_all(&admin_ctx()).await;
    assert!(sites.contains_key("shop"));

    let locator = SitemapLocator::new(
        SitemapCache::new(Arc::new(MemoryCache::new())),
        vec![Arc::new(warming::DefaultPathProvider::new())],
        reqwest::Client::new(),
    )
    .unwrap();

    let site = &sites["shop"];
    let first = locator.locate_by_site(site, None).await.unwrap();
    assert_eq!(first.url().as_str(), "https://shop.example/sitemap.xml");
    assert!(!first.is_cached());

    let second = locator.locate_by_site(site, None).await.unwrap();
    assert_eq!(second.url(), first.url());
    assert!(second.is_cached());
}

#[tokio::test]
async fn editor_without_site_grant_sees_nothing() {
    let guard = Arc::new(PermissionGuard::new(
        Arc::new(page_registry()),
        Arc::new(MemoryCache::new()),
    ));
    let repository = SiteRepository::new(
        Arc::new(StaticSiteRegistry::new(vec![demo_site()])),
        guard.clone(),
    );

    let ctx = PermissionContext::new(Arc::new(
        TestUser::editor()
            .with_allowed_pages(["1"])
            .with_allowed_sites(["blog"]),
    ));

    assert!(!guard.can_warmup_site(&demo_site(), &ctx).await);
    assert!(repository.find_all(&ctx).await.is_empty());
}

#[tokio::test]
async fn queued_batch_warms_up_successfully_end_to_end() {
    let factory = MockCrawlerFactory::succeeding();
    let resolver = StaticUrlResolver::new().with_url(5, None, "https://shop.example/p/5");
    let service = service_with_crawler(factory.clone()).with_resolver(resolver);

    let mut queue = WarmupQueue::new();
    queue.enqueue(SiteWarmupRequest::new(demo_site()));
    queue.enqueue(PageWarmupRequest::new(5));
    let snapshot = queue.snapshot();

    let result = queue.process(&service).await.unwrap().unwrap();
    assert!(queue.is_empty());
    assert!(result.result().failed().is_empty());
    assert_eq!(result.state(), WarmupState::Success);

    // The default language sitemap plus the page URL were registered
    assert_eq!(
        factory.added_sitemaps(),
        vec!["https://shop.example/sitemap.xml"]
    );
    assert_eq!(factory.added_urls(), vec!["https://shop.example/p/5"]);

    // Notification summarizes each request
    let builder = NotificationBuilder::new(
        Arc::new(page_registry()),
        Arc::new(StaticUrlResolver::new().with_url(5, None, "https://shop.example/p/5")),
    );
    let messages = builder.build_messages(&snapshot, &result).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("\"shop\""));
    assert!(messages[1].contains("Landing page"));
}

#[tokio::test]
async fn failed_urls_classify_as_warning() {
    let factory = MockCrawlerFactory::failing_urls(["https://shop.example/p/5"]);
    let resolver = StaticUrlResolver::new().with_url(5, None, "https://shop.example/p/5");
    let service = service_with_crawler(factory).with_resolver(resolver);

    let mut queue = WarmupQueue::new();
    queue.enqueue(SiteWarmupRequest::new(demo_site()));
    queue.enqueue(PageWarmupRequest::new(5));

    let result = queue.process(&service).await.unwrap().unwrap();
    assert_eq!(result.result().successful().len(), 1);
    assert_eq!(result.result().failed().len(), 1);
    assert_eq!(result.state(), WarmupState::Warning);
}

#[tokio::test]
async fn empty_request_yields_placeholder_message() {
    let builder = NotificationBuilder::new(
        Arc::new(page_registry()),
        Arc::new(StaticUrlResolver::new()),
    );
    let snapshot = WarmupRequestSnapshot::new(Vec::new(), Vec::new());

    let messages = builder
        .build_messages(&snapshot, &Default::default())
        .await
        .unwrap();
    assert_eq!(
        messages,
        vec![warming::notification::EMPTY_MESSAGE.to_owned()]
    );
}

#[tokio::test]
async fn untriggered_queue_stays_empty() {
    // An editorial trigger that decides a record is not warmable never
    // calls enqueue; the queue then drains to nothing.
    let factory = MockCrawlerFactory::succeeding();
    let service = service_with_crawler(factory.clone());

    let mut queue = WarmupQueue::new();
    assert!(queue.is_empty());
    assert!(queue.process(&service).await.unwrap().is_none());
    assert_eq!(factory.runs(), 0);
}
