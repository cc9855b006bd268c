//! Warmup request queue.
//!
//! Editorial triggers within one logical operation (typically one backend
//! HTTP request) enqueue site- and page-warmup requests independently; the
//! queue coalesces them into a single batched crawl when drained at the end
//! of that operation.
//!
//! The queue is one-batch-per-operation state and deliberately not shared
//! across operations; hosts that reuse an instance concurrently must
//! synchronize externally.

use crate::error::Result;
use crate::service::WarmupService;
use crate::types::request::{
    PageWarmupRequest, SiteWarmupRequest, WarmupRequest, WarmupRequestSnapshot,
};
use crate::types::result::CacheWarmupResult;

/// Accumulates pending warmup requests and drains them in one batch.
#[derive(Debug, Default)]
pub struct WarmupQueue {
    sites: Vec<SiteWarmupRequest>,
    pages: Vec<PageWarmupRequest>,
}

impl WarmupQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request. Repeats are legal; duplicate crawl targets are
    /// deduplicated later by the crawler's exclude layer, not here.
    pub fn enqueue(&mut self, request: impl Into<WarmupRequest>) -> &mut Self {
        match request.into() {
            WarmupRequest::Site(request) => self.sites.push(request),
            WarmupRequest::Page(request) => self.pages.push(request),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty() && self.pages.is_empty()
    }

    /// Drain the queue into one warmup run.
    ///
    /// Returns `None` without touching the service when nothing is queued.
    /// The pending lists are detached from the queue before the service
    /// call, so the batch is never retained — a failed run is not replayed
    /// by a later `process`.
    pub async fn process(&mut self, service: &WarmupService) -> Result<Option<CacheWarmupResult>> {
        if self.is_empty() {
            return Ok(None);
        }

        let sites = std::mem::take(&mut self.sites);
        let pages = std::mem::take(&mut self.pages);
        tracing::debug!(
            sites = sites.len(),
            pages = pages.len(),
            "processing warmup queue"
        );

        service.warmup(&sites, &pages, None, None).await.map(Some)
    }

    /// Read-only snapshot of the current batch with a fresh request id,
    /// for notification building without draining the queue.
    pub fn snapshot(&self) -> WarmupRequestSnapshot {
        WarmupRequestSnapshot::new(self.sites.clone(), self.pages.clone())
    }
}
