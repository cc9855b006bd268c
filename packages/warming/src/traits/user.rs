//! Backend-user capability seam.

use crate::traits::registry::PageRecord;

/// Capabilities of the acting backend user, as granted by the host
/// platform's ACL primitives.
pub trait UserAccess: Send + Sync {
    /// Stable identifier, used as a memoization key component.
    fn identifier(&self) -> &str;

    /// Admins bypass allow-list and language checks.
    fn is_admin(&self) -> bool;

    /// Record-level page ACL check.
    fn has_page_access(&self, page: &PageRecord) -> bool;

    /// Explicit access to a language.
    fn has_language_access(&self, language_id: u32) -> bool;

    /// Configured allow-list of page ids. An entry ending in `+`
    /// (e.g. `"42+"`) grants access to the page and its whole subtree.
    fn allowed_pages(&self) -> Vec<String>;

    /// Configured allow-list of site identifiers.
    fn allowed_sites(&self) -> Vec<String>;
}
