//! Typed errors for the warmup orchestration library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur during warmup orchestration.
#[derive(Debug, Error)]
pub enum WarmupError {
    /// A site or language base URL is unusable (e.g. has no host).
    ///
    /// Not retryable; the site setup must be fixed.
    #[error("unsupported configuration for site \"{site}\": {reason}")]
    UnsupportedConfiguration { site: String, reason: String },

    /// No discovery provider could resolve a sitemap for a site.
    #[error("no sitemap could be located for site \"{site}\"")]
    UnsupportedSite { site: String },

    /// The configured sitemap provider list is unusable.
    ///
    /// Raised at locator construction, never at request time.
    #[error("invalid sitemap provider configuration: {reason}")]
    InvalidProvider { reason: String },

    /// A requested page id does not resolve to a page record.
    #[error("page {page_id} does not exist")]
    MissingPageId { page_id: u32 },

    /// A warmup request named a language the site does not define.
    #[error("site \"{site}\" has no language {language_id}")]
    UnknownLanguage { site: String, language_id: u32 },

    /// An exclude pattern failed to compile.
    #[error("invalid exclude pattern \"{pattern}\": {source}")]
    InvalidExcludePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The crawler transport itself failed.
    ///
    /// Per-URL failures are never errors; they are entries in the
    /// crawl result. This covers a crawler that cannot run at all.
    #[error("crawl failed: {0}")]
    Crawl(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type alias for warmup operations.
pub type Result<T> = std::result::Result<T, WarmupError>;
