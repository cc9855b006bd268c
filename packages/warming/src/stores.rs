//! In-memory key/value cache for testing, development and single-process
//! deployments.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::traits::cache::KeyValueCache;

/// In-memory cache. Data is lost on restart; deployments that need
/// persistence plug their own [`KeyValueCache`] implementation.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

#[async_trait]
impl KeyValueCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().unwrap().get(key).cloned()
    }

    async fn set(&self, key: &str, value: Value) {
        self.entries.write().unwrap().insert(key.to_owned(), value);
    }

    async fn remove(&self, key: &str) {
        self.entries.write().unwrap().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_set_remove() {
        let cache = MemoryCache::new();
        assert!(!cache.has("a").await);

        cache.set("a", json!({"x": 1})).await;
        assert_eq!(cache.get("a").await, Some(json!({"x": 1})));
        assert!(cache.has("a").await);
        assert_eq!(cache.len(), 1);

        cache.remove("a").await;
        assert!(cache.get("a").await.is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_set_replaces() {
        let cache = MemoryCache::new();
        cache.set("a", json!(1)).await;
        cache.set("a", json!(2)).await;
        assert_eq!(cache.get("a").await, Some(json!(2)));
    }
}
