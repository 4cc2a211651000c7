//! Redis cache backend.
//!
//! This module is only available when the `redis-cache` feature is enabled.
//!
//! Values are stored as JSON strings with `SET ... EX` expiry. Connectivity
//! failures on reads are logged and reported as misses, matching the
//! retrieval core's cache-miss degradation policy.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde_json::Value;
use tracing::warn;

use crate::cache::CacheService;
use crate::error::{RagError, Result};

/// A [`CacheService`] backed by Redis.
///
/// Holds a [`ConnectionManager`], which multiplexes and reconnects
/// internally; cloning it per operation is cheap and keeps this type safe
/// for concurrent use.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    default_ttl_secs: u64,
}

impl RedisCache {
    /// Connect to the given Redis URL.
    pub async fn connect(redis_url: &str, default_ttl_secs: u64) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(Self::map_err)?;
        let connection =
            client.get_tokio_connection_manager().await.map_err(Self::map_err)?;
        Ok(Self { connection, default_ttl_secs })
    }

    /// Build a cache from an existing connection manager.
    pub fn from_connection(connection: ConnectionManager, default_ttl_secs: u64) -> Self {
        Self { connection, default_ttl_secs }
    }

    fn map_err(e: redis::RedisError) -> RagError {
        RagError::CacheError { backend: "redis".to_string(), message: e.to_string() }
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_raw(&self, key: &str) -> Option<Value> {
        let mut connection = self.connection.clone();
        let raw: Option<String> = match connection.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "redis read failed, treating as miss");
                return None;
            }
        };
        let raw = raw?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "cached payload is not valid JSON, treating as miss");
                None
            }
        }
    }

    async fn set_raw(&self, key: &str, value: Value, ttl_secs: u64) -> Result<()> {
        let json = value.to_string();
        let mut connection = self.connection.clone();
        connection.set_ex::<_, _, ()>(key, json, ttl_secs).await.map_err(Self::map_err)?;
        Ok(())
    }

    fn default_ttl(&self) -> u64 {
        self.default_ttl_secs
    }
}
