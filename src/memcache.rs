//! In-memory cache backend.
//!
//! A `HashMap` behind a `tokio::sync::RwLock`, suitable for development,
//! testing, and single-process deployments. Expiry is checked lazily on
//! read; uses `tokio::time::Instant` so tests can pause and advance time.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::cache::CacheService;
use crate::error::Result;

struct Entry {
    value: Value,
    expires_at: Instant,
}

/// A TTL-bounded in-process cache.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    default_ttl_secs: u64,
}

impl MemoryCache {
    /// Create a cache with the given default TTL in seconds.
    pub fn new(default_ttl_secs: u64) -> Self {
        Self { entries: RwLock::new(HashMap::new()), default_ttl_secs }
    }

    /// Drop all entries.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_raw(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if Instant::now() >= entry.expires_at {
            return None;
        }
        Some(entry.value.clone())
    }

    async fn set_raw(&self, key: &str, value: Value, ttl_secs: u64) -> Result<()> {
        let expires_at = Instant::now() + Duration::from_secs(ttl_secs);
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    fn default_ttl(&self) -> u64 {
        self.default_ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_key_is_silent_absence() {
        let cache = MemoryCache::new(60);
        assert!(cache.get_raw("absent").await.is_none());
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = MemoryCache::new(60);
        cache.set_raw("k", json!({"a": [1, 2, 3]}), 60).await.unwrap();
        assert_eq!(cache.get_raw("k").await, Some(json!({"a": [1, 2, 3]})));
    }

    #[tokio::test]
    async fn overwrite_replaces_value() {
        let cache = MemoryCache::new(60);
        cache.set_raw("k", json!(1), 60).await.unwrap();
        cache.set_raw("k", json!(2), 60).await.unwrap();
        assert_eq!(cache.get_raw("k").await, Some(json!(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = MemoryCache::new(60);
        cache.set_raw("k", json!("v"), 10).await.unwrap();
        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(cache.get_raw("k").await.is_some());
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get_raw("k").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn overwrite_resets_ttl() {
        let cache = MemoryCache::new(60);
        cache.set_raw("k", json!(1), 10).await.unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set_raw("k", json!(2), 10).await.unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;
        assert_eq!(cache.get_raw("k").await, Some(json!(2)));
    }
}
