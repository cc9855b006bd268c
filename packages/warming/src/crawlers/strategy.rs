//! Crawling-order strategies.
//!
//! Strategies reorder the harvested URL list before crawling so the most
//! valuable URLs are warmed up first. They are resolved by name through
//! [`StrategyRegistry`]; an unknown or blank name means no explicit
//! ordering.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::traits::crawler::CrawlingStrategy;
use crate::types::sitemap::{ChangeFrequency, CrawlUrl};

/// Crawl high-priority URLs first.
#[derive(Debug, Default)]
pub struct SortByPriority;

impl CrawlingStrategy for SortByPriority {
    fn name(&self) -> &'static str {
        "sort-by-priority"
    }

    fn prepare(&self, urls: &mut Vec<CrawlUrl>) {
        urls.sort_by(|a, b| {
            b.priority()
                .partial_cmp(&a.priority())
                .unwrap_or(Ordering::Equal)
        });
    }
}

/// Crawl frequently-changing URLs first; URLs without a change frequency
/// go last.
#[derive(Debug, Default)]
pub struct SortByChangeFrequency;

impl SortByChangeFrequency {
    fn rank(change_frequency: Option<ChangeFrequency>) -> u8 {
        match change_frequency {
            Some(ChangeFrequency::Always) => 0,
            Some(ChangeFrequency::Hourly) => 1,
            Some(ChangeFrequency::Daily) => 2,
            Some(ChangeFrequency::Weekly) => 3,
            Some(ChangeFrequency::Monthly) => 4,
            Some(ChangeFrequency::Yearly) => 5,
            Some(ChangeFrequency::Never) => 6,
            None => 7,
        }
    }
}

impl CrawlingStrategy for SortByChangeFrequency {
    fn name(&self) -> &'static str {
        "sort-by-changefreq"
    }

    fn prepare(&self, urls: &mut Vec<CrawlUrl>) {
        urls.sort_by_key(|url| Self::rank(url.change_frequency()));
    }
}

/// Crawl recently-modified URLs first; URLs without a modification date
/// go last.
#[derive(Debug, Default)]
pub struct SortByLastModified;

impl CrawlingStrategy for SortByLastModified {
    fn name(&self) -> &'static str {
        "sort-by-lastmod"
    }

    fn prepare(&self, urls: &mut Vec<CrawlUrl>) {
        urls.sort_by(|a, b| match (a.last_modified(), b.last_modified()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }
}

/// Named registry of crawling strategies.
pub struct StrategyRegistry {
    strategies: HashMap<&'static str, Arc<dyn CrawlingStrategy>>,
}

impl Default for StrategyRegistry {
    /// Registry with the built-in strategies.
    fn default() -> Self {
        let mut registry = Self {
            strategies: HashMap::new(),
        };
        registry.register(Arc::new(SortByPriority));
        registry.register(Arc::new(SortByChangeFrequency));
        registry.register(Arc::new(SortByLastModified));
        registry
    }
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy under its own name.
    pub fn register(&mut self, strategy: Arc<dyn CrawlingStrategy>) {
        self.strategies.insert(strategy.name(), strategy);
    }

    /// Resolve a strategy by name. Blank or unknown names resolve to `None`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn CrawlingStrategy>> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let strategy = self.strategies.get(name).cloned();
        if strategy.is_none() {
            tracing::warn!(strategy = name, "unknown crawling strategy, crawling unordered");
        }
        strategy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use url::Url;

    fn url(path: &str) -> CrawlUrl {
        CrawlUrl::new(Url::parse(&format!("https://shop.example/{path}")).unwrap())
    }

    fn paths(urls: &[CrawlUrl]) -> Vec<&str> {
        urls.iter().map(|u| u.url().path()).collect()
    }

    #[test]
    fn test_sort_by_priority() {
        let mut urls = vec![
            url("low").with_priority(0.2),
            url("default"),
            url("high").with_priority(1.0),
        ];
        SortByPriority.prepare(&mut urls);
        assert_eq!(paths(&urls), vec!["/high", "/default", "/low"]);
    }

    #[test]
    fn test_sort_by_change_frequency() {
        let mut urls = vec![
            url("unspecified"),
            url("monthly").with_change_frequency(ChangeFrequency::Monthly),
            url("always").with_change_frequency(ChangeFrequency::Always),
        ];
        SortByChangeFrequency.prepare(&mut urls);
        assert_eq!(paths(&urls), vec!["/always", "/monthly", "/unspecified"]);
    }

    #[test]
    fn test_sort_by_last_modified() {
        let old = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let recent = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut urls = vec![
            url("old").with_last_modified(old),
            url("undated"),
            url("recent").with_last_modified(recent),
        ];
        SortByLastModified.prepare(&mut urls);
        assert_eq!(paths(&urls), vec!["/recent", "/old", "/undated"]);
    }

    #[test]
    fn test_registry_resolution() {
        let registry = StrategyRegistry::new();
        assert_eq!(
            registry.get("sort-by-priority").unwrap().name(),
            "sort-by-priority"
        );
        assert!(registry.get("").is_none());
        assert!(registry.get("  ").is_none());
        assert!(registry.get("sort-by-popularity").is_none());
    }

    #[test]
    fn test_sorting_is_stable() {
        let mut urls = vec![url("a"), url("b"), url("c")];
        SortByPriority.prepare(&mut urls);
        assert_eq!(paths(&urls), vec!["/a", "/b", "/c"]);
    }
}
