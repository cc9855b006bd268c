//! Progress event shapes produced for UI consumers.
//!
//! The transport (SSE, AJAX polling) is owned by the host; these types
//! define the exact JSON layout of the two event kinds it forwards.

use serde::{Deserialize, Serialize};

use crate::types::result::CacheWarmupResult;
use crate::types::state::WarmupState;

/// Current/total counters of a running crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressCounts {
    pub current: usize,
    pub total: usize,
}

/// URL detail of a progress tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressUrls {
    /// URL currently being crawled
    pub current: String,

    /// All URLs crawled successfully so far
    pub successful: Vec<String>,

    /// All URLs failed so far
    pub failed: Vec<String>,
}

/// Incremental per-URL progress event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarmupProgressEvent {
    pub progress: ProgressCounts,
    pub urls: ProgressUrls,
}

/// URL lists of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinishedUrls {
    pub failed: Vec<String>,
    pub successful: Vec<String>,
}

/// Exclusions of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExcludedTargets {
    pub sitemaps: Vec<String>,
    pub urls: Vec<String>,
}

/// Terminal event of a warmup run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarmupFinishedEvent {
    pub state: WarmupState,
    pub title: String,
    pub progress: ProgressCounts,
    pub urls: FinishedUrls,
    pub excluded: ExcludedTargets,
    pub messages: Vec<String>,
}

impl WarmupFinishedEvent {
    /// Fold a warmup result into the terminal event shape.
    pub fn from_result(
        title: impl Into<String>,
        result: &CacheWarmupResult,
        messages: Vec<String>,
    ) -> Self {
        let successful: Vec<String> = result
            .result()
            .successful()
            .iter()
            .map(|o| o.url().to_string())
            .collect();
        let failed: Vec<String> = result
            .result()
            .failed()
            .iter()
            .map(|o| o.url().to_string())
            .collect();
        let total = successful.len() + failed.len();

        Self {
            state: result.state(),
            title: title.into(),
            progress: ProgressCounts {
                current: total,
                total,
            },
            urls: FinishedUrls { failed, successful },
            excluded: ExcludedTargets {
                sitemaps: result
                    .excluded_sitemaps()
                    .iter()
                    .map(|u| u.to_string())
                    .collect(),
                urls: result.excluded_urls().iter().map(|u| u.to_string()).collect(),
            },
            messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::result::{CrawlOutcome, CrawlingResult};
    use url::Url;

    #[test]
    fn test_progress_event_shape() {
        let event = WarmupProgressEvent {
            progress: ProgressCounts { current: 1, total: 3 },
            urls: ProgressUrls {
                current: "https://shop.example/".into(),
                successful: vec!["https://shop.example/".into()],
                failed: Vec::new(),
            },
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["progress"]["current"], 1);
        assert_eq!(value["progress"]["total"], 3);
        assert_eq!(value["urls"]["current"], "https://shop.example/");
        assert_eq!(value["urls"]["successful"][0], "https://shop.example/");
    }

    #[test]
    fn test_finished_event_from_result() {
        let result = CacheWarmupResult::new(
            CrawlingResult::new(
                vec![CrawlOutcome::new(Url::parse("https://a.example/").unwrap())],
                vec![CrawlOutcome::new(Url::parse("https://b.example/").unwrap())],
            ),
            vec![Url::parse("https://a.example/hidden.xml").unwrap()],
            Vec::new(),
        );

        let event =
            WarmupFinishedEvent::from_result("Cache warmup", &result, vec!["message".into()]);
        assert_eq!(event.state, WarmupState::Warning);
        assert_eq!(event.progress.current, 2);
        assert_eq!(event.progress.total, 2);
        assert_eq!(event.urls.successful, vec!["https://a.example/"]);
        assert_eq!(event.urls.failed, vec!["https://b.example/"]);
        assert_eq!(event.excluded.sitemaps, vec!["https://a.example/hidden.xml"]);

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["state"], "warning");
        assert_eq!(value["messages"][0], "message");
    }
}
