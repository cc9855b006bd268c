//! Crawler engine implementations.

pub mod concurrent;
pub mod strategy;
pub mod xml;

pub use concurrent::{ConcurrentCrawler, DefaultCrawlerFactory};
pub use strategy::{SortByChangeFrequency, SortByLastModified, SortByPriority, StrategyRegistry};
pub use xml::{SitemapContent, SitemapParser};
