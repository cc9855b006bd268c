//! Permission checks for warmup requests.
//!
//! Decisions combine three independent axes — page ACL, site allow-list,
//! language access — and are memoized per (operation, subject, context)
//! through an injected key/value cache, so repeated checks within one
//! backend operation hit the underlying page registry only once.
//!
//! Permission denials are never errors: every entry point resolves to a
//! boolean, and any lookup failure (missing record, missing rootline)
//! resolves to `false`.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

use crate::traits::cache::KeyValueCache;
use crate::traits::registry::PageRegistry;
use crate::traits::user::UserAccess;
use crate::types::site::Site;

/// Immutable context of a permission check: the acting user and an
/// optional language scope.
#[derive(Clone)]
pub struct PermissionContext {
    user: Arc<dyn UserAccess>,
    language_id: Option<u32>,
}

impl PermissionContext {
    pub fn new(user: Arc<dyn UserAccess>) -> Self {
        Self {
            user,
            language_id: None,
        }
    }

    /// Scope the context to a language.
    pub fn with_language(mut self, language_id: u32) -> Self {
        self.language_id = Some(language_id);
        self
    }

    pub fn user(&self) -> &dyn UserAccess {
        self.user.as_ref()
    }

    pub fn language_id(&self) -> Option<u32> {
        self.language_id
    }

    /// Stable identity of this context, used in memoization keys.
    fn fingerprint(&self) -> String {
        match self.language_id {
            Some(language_id) => format!("{}@{}", self.user.identifier(), language_id),
            None => format!("{}@-", self.user.identifier()),
        }
    }
}

impl fmt::Debug for PermissionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionContext")
            .field("user", &self.user.identifier())
            .field("language_id", &self.language_id)
            .finish()
    }
}

/// Decides whether an actor may warm up a page or a site+language.
pub struct PermissionGuard {
    pages: Arc<dyn PageRegistry>,
    cache: Arc<dyn KeyValueCache>,
}

impl PermissionGuard {
    pub fn new(pages: Arc<dyn PageRegistry>, cache: Arc<dyn KeyValueCache>) -> Self {
        Self { pages, cache }
    }

    /// Whether the actor may warm up the caches of a single page.
    pub async fn can_warmup_page(&self, page_id: u32, ctx: &PermissionContext) -> bool {
        let key = Self::cache_key("canWarmupPage", &page_id.to_string(), ctx);
        if let Some(cached) = self.cached_decision(&key).await {
            return cached;
        }

        let decision = self.check_page(page_id, ctx).await;
        self.cache.set(&key, Value::Bool(decision)).await;
        decision
    }

    /// Whether the actor may warm up the caches of a whole site.
    pub async fn can_warmup_site(&self, site: &Site, ctx: &PermissionContext) -> bool {
        let key = Self::cache_key("canWarmupSite", site.identifier(), ctx);
        if let Some(cached) = self.cached_decision(&key).await {
            return cached;
        }

        let decision = self.check_site(site, ctx).await;
        self.cache.set(&key, Value::Bool(decision)).await;
        decision
    }

    async fn cached_decision(&self, key: &str) -> Option<bool> {
        self.cache.get(key).await.and_then(|v| v.as_bool())
    }

    fn cache_key(operation: &str, subject: &str, ctx: &PermissionContext) -> String {
        let mut hasher = Sha256::new();
        hasher.update(operation.as_bytes());
        hasher.update(b":");
        hasher.update(subject.as_bytes());
        hasher.update(b":");
        hasher.update(ctx.fingerprint().as_bytes());
        format!("warming:permission:{:x}", hasher.finalize())
    }

    async fn check_page(&self, page_id: u32, ctx: &PermissionContext) -> bool {
        // Localized overlay lookup only for explicit non-default languages
        let overlay = ctx.language_id.filter(|l| *l > 0);
        let record = match self.pages.page_record(page_id, overlay).await {
            Some(record) if !record.hidden => record,
            _ => {
                tracing::debug!(page = page_id, "page record missing or hidden");
                return false;
            }
        };

        let user = ctx.user();
        if user.is_admin() {
            return true;
        }

        if !user.has_page_access(&record) {
            return false;
        }

        if !self.page_in_allow_list(page_id, &user.allowed_pages()).await {
            return false;
        }

        match ctx.language_id {
            Some(language_id) => user.has_language_access(language_id),
            None => true,
        }
    }

    async fn check_site(&self, site: &Site, ctx: &PermissionContext) -> bool {
        // Root page must be warmable under the same rules as any page
        if !self.check_page(site.root_page_id(), ctx).await {
            return false;
        }

        if ctx.user().is_admin() {
            return true;
        }

        ctx.user()
            .allowed_sites()
            .iter()
            .any(|identifier| identifier == site.identifier())
    }

    /// Whether a page id is covered by the user's allow-list. Entries with a
    /// trailing `+` cover the page's whole rootline.
    async fn page_in_allow_list(&self, page_id: u32, entries: &[String]) -> bool {
        for entry in entries {
            if let Some(prefix) = entry.strip_suffix('+') {
                let Ok(ancestor) = prefix.parse::<u32>() else {
                    continue;
                };
                if ancestor == page_id {
                    return true;
                }
                if self.pages.rootline(page_id).await.contains(&ancestor) {
                    return true;
                }
            } else if entry.parse::<u32>() == Ok(page_id) {
                return true;
            }
        }
        false
    }
}
