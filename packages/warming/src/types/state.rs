//! User-facing classification of a crawl outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall state of a warmup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarmupState {
    Success,
    Warning,
    Failed,
    Unknown,
}

impl WarmupState {
    /// Classify successful/failed counts.
    ///
    /// Precedence is fixed: `Failed` only when everything failed, `Warning`
    /// on a mixed outcome, otherwise `Success` — including the zero-crawl
    /// case. `Unknown` is reserved for callers that explicitly distinguish
    /// "nothing attempted" (e.g. a page request that produced no crawl
    /// outcomes at all).
    pub fn from_counts(successful: usize, failed: usize) -> Self {
        if failed > 0 && successful == 0 {
            Self::Failed
        } else if failed > 0 {
            Self::Warning
        } else {
            Self::Success
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WarmupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
