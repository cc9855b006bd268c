//! Key/value cache seam.
//!
//! Backs both the sitemap cache and the permission guard's decision cache.
//! The stores are advisory: a missing or stale entry only costs a
//! re-discovery or re-check, never correctness, so the interface is
//! deliberately infallible — implementations map their own failures to
//! "no entry".

use async_trait::async_trait;
use serde_json::Value;

/// Process-wide key/value store with simple get/set/remove semantics.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Get a value, or `None` when absent (or the store failed).
    async fn get(&self, key: &str) -> Option<Value>;

    /// Store a value under a key, replacing any previous entry.
    async fn set(&self, key: &str, value: Value);

    /// Remove the entry for a key, if any.
    async fn remove(&self, key: &str);

    /// Whether an entry exists for a key.
    async fn has(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }
}
