//! `warming` — run cache warmup from the command line.
//!
//! Loads a JSON site-configuration file, enqueues the requested sites and
//! pages, drains the queue through the default crawler and prints one
//! summary message per request.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use config::{FileRegistry, WarmingFile};
use warming::{
    MemoryCache, NotificationBuilder, PageWarmupRequest, PermissionContext, PermissionGuard,
    ProgressHandler, SiteRepository, SiteWarmupRequest, SitemapCache, SitemapLocator, UserAccess,
    WarmupConfig, WarmupFinishedEvent, WarmupProgressEvent, WarmupQueue, WarmupService,
    WarmupState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "warming", about = "Warm up website caches from sitemaps")]
struct Args {
    /// Path to the JSON site-configuration file
    #[arg(short, long, default_value = "warming.json")]
    config: PathBuf,

    /// Site identifiers to warm up (repeatable)
    #[arg(short, long = "site")]
    sites: Vec<String>,

    /// Page ids to warm up (repeatable)
    #[arg(short, long = "page")]
    pages: Vec<u32>,

    /// Language ids to restrict site warmup to (repeatable)
    #[arg(short, long = "language")]
    languages: Vec<u32>,

    /// Maximum number of URLs to crawl (0 = unlimited)
    #[arg(long, default_value_t = 250)]
    limit: usize,

    /// Number of concurrent requests
    #[arg(long, default_value_t = 5)]
    concurrency: usize,

    /// Exclude pattern (regular expression, repeatable)
    #[arg(long = "exclude")]
    exclude_patterns: Vec<String>,

    /// Crawling-order strategy (e.g. sort-by-priority)
    #[arg(long)]
    strategy: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// The CLI operates with full access; permissions are a backend concern.
struct Operator;

impl UserAccess for Operator {
    fn identifier(&self) -> &str {
        "cli"
    }

    fn is_admin(&self) -> bool {
        true
    }

    fn has_page_access(&self, _page: &warming::PageRecord) -> bool {
        true
    }

    fn has_language_access(&self, _language_id: u32) -> bool {
        true
    }

    fn allowed_pages(&self) -> Vec<String> {
        Vec::new()
    }

    fn allowed_sites(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Prints one line per crawled URL in text mode.
struct PrintingProgress;

impl ProgressHandler for PrintingProgress {
    fn on_progress(&self, event: &WarmupProgressEvent) {
        eprintln!(
            "[{}/{}] {}",
            event.progress.current, event.progress.total, event.urls.current
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.sites.is_empty() && args.pages.is_empty() {
        bail!("nothing to warm up: pass at least one --site or --page");
    }

    let file = WarmingFile::load(&args.config)?;
    tracing::debug!(
        sites = file.sites.len(),
        pages = file.pages.len(),
        "configuration loaded"
    );
    let registry = Arc::new(FileRegistry::new(file));
    let ctx = PermissionContext::new(Arc::new(Operator));

    let guard = Arc::new(PermissionGuard::new(
        registry.clone(),
        Arc::new(MemoryCache::new()),
    ));
    let sites = SiteRepository::new(registry.clone(), guard);

    let client = reqwest::Client::new();
    let locator = Arc::new(SitemapLocator::with_default_providers(
        SitemapCache::new(Arc::new(MemoryCache::new())),
        client.clone(),
    ));

    let mut warmup_config = WarmupConfig::new()
        .with_limit(args.limit)
        .with_concurrency(args.concurrency);
    for pattern in &args.exclude_patterns {
        warmup_config = warmup_config.exclude(pattern);
    }
    if let Some(strategy) = &args.strategy {
        warmup_config = warmup_config.with_strategy(strategy);
    }

    let mut service = WarmupService::new(warmup_config, locator, registry.clone())
        .with_client(client);
    if args.format == OutputFormat::Text {
        service = service.with_progress_handler(Arc::new(PrintingProgress));
    }

    let mut queue = WarmupQueue::new();
    for identifier in &args.sites {
        let site = sites
            .find_one_by_identifier(identifier, &ctx)
            .await
            .with_context(|| format!("site \"{identifier}\" is unknown or excluded"))?;
        let mut request = SiteWarmupRequest::new(site);
        if !args.languages.is_empty() {
            request = request.with_languages(args.languages.iter().copied());
        }
        queue.enqueue(request);
    }
    for page in &args.pages {
        let mut request = PageWarmupRequest::new(*page);
        if !args.languages.is_empty() {
            request = request.with_languages(args.languages.iter().copied());
        }
        queue.enqueue(request);
    }

    let snapshot = queue.snapshot();
    let result = queue
        .process(&service)
        .await?
        .expect("queue was checked to be non-empty");

    let builder = NotificationBuilder::new(registry.clone(), registry);
    let messages = builder.build_messages(&snapshot, &result).await?;
    let finished = WarmupFinishedEvent::from_result("Cache warmup", &result, messages);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&finished)?),
        OutputFormat::Text => {
            for message in &finished.messages {
                println!("{message}");
            }
            println!(
                "State: {} ({} successful, {} failed, {} excluded)",
                finished.state,
                finished.urls.successful.len(),
                finished.urls.failed.len(),
                finished.excluded.urls.len() + finished.excluded.sitemaps.len()
            );
        }
    }

    if finished.state != WarmupState::Success {
        std::process::exit(1);
    }
    Ok(())
}
