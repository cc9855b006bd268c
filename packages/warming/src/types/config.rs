//! Warmup configuration.

use serde::{Deserialize, Serialize};

/// Global configuration for warmup runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarmupConfig {
    /// Maximum number of URLs crawled per run (0 = unlimited). Default: 250.
    pub limit: usize,

    /// Maximum number of concurrent requests. Default: 5.
    pub concurrency: usize,

    /// Per-request timeout in seconds. Default: 30.
    pub request_timeout_secs: u64,

    /// Regular expressions filtering out URLs that must never be crawled.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Name of the crawling-order strategy (e.g. "sort-by-priority").
    /// Unknown or absent means no explicit ordering.
    pub strategy: Option<String>,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            limit: 250,
            concurrency: 5,
            request_timeout_secs: 30,
            exclude_patterns: vec![],
            strategy: None,
        }
    }
}

impl WarmupConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the URL limit (0 = unlimited).
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the request concurrency.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the per-request timeout in seconds.
    pub fn with_request_timeout_secs(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Set the crawling-order strategy by name.
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }
}
