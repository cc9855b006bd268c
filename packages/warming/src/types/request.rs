//! Warmup request value objects.
//!
//! Requests are created by editorial triggers, live inside one
//! [`WarmupQueue`](crate::queue::WarmupQueue) batch and are discarded once
//! the queue drains. Equality is structural.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::site::Site;

/// Request to warm up a whole site for one or more languages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteWarmupRequest {
    site: Site,

    /// Requested language ids; empty means "the site's default language",
    /// resolved lazily by [`language_ids`](Self::language_ids).
    language_ids: Vec<u32>,
}

impl SiteWarmupRequest {
    pub fn new(site: Site) -> Self {
        Self {
            site,
            language_ids: Vec::new(),
        }
    }

    /// Restrict the request to explicit language ids (order-preserving, deduplicated).
    pub fn with_languages(mut self, language_ids: impl IntoIterator<Item = u32>) -> Self {
        self.language_ids.clear();
        for id in language_ids {
            if !self.language_ids.contains(&id) {
                self.language_ids.push(id);
            }
        }
        self
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    /// Effective language ids: the explicit set, or the site's default
    /// language when none were given.
    pub fn language_ids(&self) -> Vec<u32> {
        if self.language_ids.is_empty() {
            vec![self.site.default_language().id()]
        } else {
            self.language_ids.clone()
        }
    }
}

/// Request to warm up a single page, optionally per language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageWarmupRequest {
    page: u32,

    /// Requested language ids; empty means "the page's own default".
    language_ids: Vec<u32>,
}

impl PageWarmupRequest {
    pub fn new(page: u32) -> Self {
        Self {
            page,
            language_ids: Vec::new(),
        }
    }

    /// Restrict the request to explicit language ids (order-preserving, deduplicated).
    pub fn with_languages(mut self, language_ids: impl IntoIterator<Item = u32>) -> Self {
        self.language_ids.clear();
        for id in language_ids {
            if !self.language_ids.contains(&id) {
                self.language_ids.push(id);
            }
        }
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Explicit language ids; empty means unspecified.
    pub fn language_ids(&self) -> &[u32] {
        &self.language_ids
    }
}

/// Either kind of warmup request, as accepted by the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WarmupRequest {
    Site(SiteWarmupRequest),
    Page(PageWarmupRequest),
}

impl From<SiteWarmupRequest> for WarmupRequest {
    fn from(request: SiteWarmupRequest) -> Self {
        Self::Site(request)
    }
}

impl From<PageWarmupRequest> for WarmupRequest {
    fn from(request: PageWarmupRequest) -> Self {
        Self::Page(request)
    }
}

/// Read-only snapshot of a queue batch, used for notification building
/// without draining the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarmupRequestSnapshot {
    id: String,
    sites: Vec<SiteWarmupRequest>,
    pages: Vec<PageWarmupRequest>,
}

impl WarmupRequestSnapshot {
    pub fn new(sites: Vec<SiteWarmupRequest>, pages: Vec<PageWarmupRequest>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sites,
            pages,
        }
    }

    /// Freshly generated unique batch id.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sites(&self) -> &[SiteWarmupRequest] {
        &self.sites
    }

    pub fn pages(&self) -> &[PageWarmupRequest] {
        &self.pages
    }
}
