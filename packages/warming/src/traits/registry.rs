//! Read-only oracles of the host platform: sites, pages and page URLs.
//!
//! Lookups signal "not found" with `Option`, never with errors — a site or
//! page that cannot be resolved is simply not warmed up.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::site::Site;

/// A page record as seen by the permission layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: u32,

    pub title: String,

    /// Hidden pages are never warmed up
    pub hidden: bool,

    /// Language this record (or its localization overlay) belongs to
    pub language_id: u32,
}

impl PageRecord {
    pub fn new(id: u32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            hidden: false,
            language_id: 0,
        }
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_language(mut self, language_id: u32) -> Self {
        self.language_id = language_id;
        self
    }
}

/// Site registry of the host platform.
#[async_trait]
pub trait SiteRegistry: Send + Sync {
    /// All known sites, in configuration order.
    async fn all_sites(&self) -> Vec<Site>;

    async fn find_by_identifier(&self, identifier: &str) -> Option<Site>;

    async fn find_by_root_page_id(&self, root_page_id: u32) -> Option<Site>;

    /// Resolve the site a page belongs to.
    async fn find_by_page_id(&self, page_id: u32) -> Option<Site>;
}

/// Page tree oracle of the host platform.
#[async_trait]
pub trait PageRegistry: Send + Sync {
    /// Fetch a page record.
    ///
    /// When `language_id` is set and non-zero, the localized overlay for
    /// that language is returned; `None` if the page (or its localization)
    /// does not exist.
    async fn page_record(&self, page_id: u32, language_id: Option<u32>) -> Option<PageRecord>;

    /// Ancestor chain of a page: the page itself first, the tree root last.
    /// Empty when the page is unknown.
    async fn rootline(&self, page_id: u32) -> Vec<u32>;

    /// Title of a page in its default language.
    async fn page_title(&self, page_id: u32) -> Option<String>;
}

/// Resolves a page (+ optional language) to its public URL.
#[async_trait]
pub trait PageUrlResolver: Send + Sync {
    /// `None` when the page has no public URL (e.g. unrouted doktype).
    async fn resolve(&self, page_id: u32, language_id: Option<u32>) -> Option<Url>;
}
