//! Human-readable summaries of a warmup run.
//!
//! One message is built per requested site-language pair and per requested
//! page. Message templates are plain English; hosts that need localization
//! wrap or replace the builder output.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, WarmupError};
use crate::traits::registry::{PageRegistry, PageUrlResolver};
use crate::types::request::{PageWarmupRequest, WarmupRequestSnapshot};
use crate::types::result::{CacheWarmupResult, CrawlOutcome};
use crate::types::site::Site;
use crate::types::state::WarmupState;

/// Message emitted when nothing was requested at all.
pub const EMPTY_MESSAGE: &str = "No sites or pages were selected for cache warmup.";

/// Builds per-request summary messages from a warmup result.
pub struct NotificationBuilder {
    pages: Arc<dyn PageRegistry>,
    resolver: Arc<dyn PageUrlResolver>,
}

impl NotificationBuilder {
    pub fn new(pages: Arc<dyn PageRegistry>, resolver: Arc<dyn PageUrlResolver>) -> Self {
        Self { pages, resolver }
    }

    /// Build one message per requested site-language and per requested
    /// page. An empty request produces exactly the placeholder message.
    ///
    /// Fails with [`WarmupError::MissingPageId`] when a requested page has
    /// no record to resolve a title from.
    pub async fn build_messages(
        &self,
        request: &WarmupRequestSnapshot,
        result: &CacheWarmupResult,
    ) -> Result<Vec<String>> {
        let mut messages = Vec::new();

        for site_request in request.sites() {
            let site = site_request.site();
            for language_id in site_request.language_ids() {
                messages.push(self.site_message(site, language_id, result));
            }
        }

        // Crawl outcomes are computed once per unique page; every request
        // still emits its own message.
        let mut page_states: HashMap<u32, (WarmupState, usize, usize)> = HashMap::new();
        for page_request in request.pages() {
            let page_id = page_request.page();
            let (state, successful, failed) = match page_states.get(&page_id) {
                Some(classified) => *classified,
                None => {
                    let classified = self.classify_page(page_request, result).await;
                    page_states.insert(page_id, classified);
                    classified
                }
            };

            let title = self
                .pages
                .page_title(page_id)
                .await
                .ok_or(WarmupError::MissingPageId { page_id })?;
            messages.push(page_message(&title, page_id, state, successful, failed));
        }

        if messages.is_empty() {
            messages.push(EMPTY_MESSAGE.to_owned());
        }

        Ok(messages)
    }

    fn site_message(&self, site: &Site, language_id: u32, result: &CacheWarmupResult) -> String {
        let successful = count_matching(result.result().successful(), site, language_id);
        let failed = count_matching(result.result().failed(), site, language_id);
        let total = successful + failed;

        let language = site
            .language(language_id)
            .map(|l| l.title().to_owned())
            .unwrap_or_else(|| format!("language {language_id}"));

        if total == 0 {
            return format!(
                "No URLs were crawled for site \"{}\" ({language}).",
                site.identifier()
            );
        }

        match WarmupState::from_counts(successful, failed) {
            WarmupState::Success => format!(
                "Caches of site \"{}\" ({language}) were warmed up: {successful} of {total} URLs crawled successfully.",
                site.identifier()
            ),
            WarmupState::Warning => format!(
                "Cache warmup of site \"{}\" ({language}) finished with warnings: {failed} of {total} URLs failed.",
                site.identifier()
            ),
            _ => format!(
                "Cache warmup of site \"{}\" ({language}) failed: all {total} URLs failed.",
                site.identifier()
            ),
        }
    }

    /// Classify a page request by matching crawl outcomes against the
    /// page's resolved URLs. Zero outcomes mean nothing was attempted.
    async fn classify_page(
        &self,
        request: &PageWarmupRequest,
        result: &CacheWarmupResult,
    ) -> (WarmupState, usize, usize) {
        let language_ids: Vec<Option<u32>> = if request.language_ids().is_empty() {
            vec![None]
        } else {
            request.language_ids().iter().copied().map(Some).collect()
        };

        let mut urls = Vec::new();
        for language_id in language_ids {
            if let Some(url) = self.resolver.resolve(request.page(), language_id).await {
                urls.push(url);
            }
        }

        let successful = result
            .result()
            .successful()
            .iter()
            .filter(|o| urls.contains(o.url()))
            .count();
        let failed = result
            .result()
            .failed()
            .iter()
            .filter(|o| urls.contains(o.url()))
            .count();

        if successful == 0 && failed == 0 {
            (WarmupState::Unknown, 0, 0)
        } else {
            (WarmupState::from_counts(successful, failed), successful, failed)
        }
    }
}

fn count_matching(outcomes: &[CrawlOutcome], site: &Site, language_id: u32) -> usize {
    outcomes
        .iter()
        .filter(|o| {
            o.site_root_page() == Some(site.root_page_id())
                && o.site_language() == Some(language_id)
        })
        .count()
}

fn page_message(
    title: &str,
    page_id: u32,
    state: WarmupState,
    successful: usize,
    failed: usize,
) -> String {
    match state {
        WarmupState::Success => {
            format!("Caches of page \"{title}\" [{page_id}] were warmed up successfully.")
        }
        WarmupState::Warning => format!(
            "Cache warmup of page \"{title}\" [{page_id}] finished with warnings: {failed} of {} URLs failed.",
            successful + failed
        ),
        WarmupState::Failed => {
            format!("Cache warmup of page \"{title}\" [{page_id}] failed.")
        }
        WarmupState::Unknown => {
            format!("No URLs were crawled for page \"{title}\" [{page_id}].")
        }
    }
}
