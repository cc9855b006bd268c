//! Sitemap discovery: cache, providers and locator.

pub mod cache;
pub mod locator;
pub mod providers;

pub use cache::SitemapCache;
pub use locator::SitemapLocator;
pub use providers::{
    ConfiguredPathProvider, DefaultPathProvider, RobotsTxtProvider, SitemapProvider,
};
