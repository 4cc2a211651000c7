//! Cache contract: deterministic key hashing plus TTL-bounded get/set.
//!
//! Absence and backend failure are both reported as `None` from reads; the
//! retrieval core never treats a cache problem as fatal.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::Result;

/// Derive a deterministic, fixed-length cache key from raw key material.
///
/// SHA-256 hex digest, stable across process restarts, so high-cardinality
/// natural-language strings become safe lookup keys.
pub fn cache_key(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A TTL-bounded store of JSON values.
///
/// Object safe; typed access goes through [`CacheServiceExt`].
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Fetch the raw JSON value stored under `key`.
    ///
    /// Returns `None` for a missing or expired key, and also for backend
    /// failures (which implementations log). Absence is a normal, silent
    /// outcome, never an error.
    async fn get_raw(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key` with the given TTL in seconds.
    ///
    /// Overwrite semantics: a second `set` on the same key replaces the
    /// prior value and resets the TTL.
    async fn set_raw(&self, key: &str, value: Value, ttl_secs: u64) -> Result<()>;

    /// The TTL in seconds applied when a call site does not pick one.
    fn default_ttl(&self) -> u64;
}

/// Typed convenience layer over [`CacheService`].
#[async_trait]
pub trait CacheServiceExt: CacheService {
    /// Fetch and deserialize a value. Deserialization failures (a value
    /// written under a different shape) are treated as misses.
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        let value = self.get_raw(key).await?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                warn!(key, error = %e, "cached value failed to deserialize, treating as miss");
                None
            }
        }
    }

    /// Serialize and store a value. `ttl_secs = None` uses the backend
    /// default. Failures are logged and swallowed; the caller's result is
    /// never affected by a cache write failure.
    async fn set_json<T: Serialize + Sync>(&self, key: &str, value: &T, ttl_secs: Option<u64>) {
        let ttl = ttl_secs.unwrap_or_else(|| self.default_ttl());
        let json = match serde_json::to_value(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "value failed to serialize, skipping cache write");
                return;
            }
        };
        if let Err(e) = self.set_raw(key, json, ttl).await {
            warn!(key, error = %e, "cache write failed");
        }
    }
}

impl<C: CacheService + ?Sized> CacheServiceExt for C {}
