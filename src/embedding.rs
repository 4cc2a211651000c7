//! Embedding acquisition: provider trait plus the caching service in front
//! of it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::cache::{CacheService, CacheServiceExt, cache_key};
use crate::config::ProviderKind;
use crate::error::{RagError, Result};

/// A backend that turns text into a fixed-dimension vector.
///
/// Implementations wrap specific embedding APIs (OpenAI, Google) behind a
/// unified async interface. They must be safe for concurrent use.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    ///
    /// Provider failures (auth, quota, malformed response) propagate as
    /// [`RagError::EmbeddingError`]; implementations never substitute a
    /// zero vector, which would corrupt similarity rankings.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Short backend name used in cache keys and error messages.
    fn name(&self) -> &str;
}

/// Options for one [`EmbeddingService::embed`] call.
#[derive(Debug, Clone, Default)]
pub struct EmbedOptions {
    /// Embedding backend to use; `None` uses the service default.
    pub provider: Option<ProviderKind>,
    /// Raw cache key material; defaults to `"embedding:<provider>:<text>"`.
    /// Hashed before storage either way.
    pub cache_key: Option<String>,
}

/// Cache-through embedding acquisition over a registry of providers.
///
/// Repeated calls for the same `(provider, text)` within the cache TTL skip
/// the remote provider. Every returned vector is checked against the
/// configured dimensionality; a mismatch is a fatal configuration error,
/// not a retry case.
pub struct EmbeddingService {
    providers: HashMap<ProviderKind, Arc<dyn EmbeddingProvider>>,
    cache: Arc<dyn CacheService>,
    default_provider: ProviderKind,
    dimensions: usize,
}

impl EmbeddingService {
    /// Create a service with no registered providers.
    pub fn new(
        cache: Arc<dyn CacheService>,
        default_provider: ProviderKind,
        dimensions: usize,
    ) -> Self {
        Self { providers: HashMap::new(), cache, default_provider, dimensions }
    }

    /// Register a backend for a provider kind, replacing any prior one.
    pub fn register(&mut self, kind: ProviderKind, provider: Arc<dyn EmbeddingProvider>) {
        self.providers.insert(kind, provider);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_provider(mut self, kind: ProviderKind, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.register(kind, provider);
        self
    }

    /// The dimensionality this service enforces on every returned vector.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed `text` with the selected provider, cache-first.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] when the provider is not
    /// registered, the provider call fails, or the returned vector length
    /// does not match the configured dimensionality.
    pub async fn embed(&self, text: &str, options: &EmbedOptions) -> Result<Vec<f32>> {
        let kind = options.provider.unwrap_or(self.default_provider);
        let material = options
            .cache_key
            .clone()
            .unwrap_or_else(|| format!("embedding:{kind}:{text}"));
        let key = cache_key(&material);

        if let Some(cached) = self.cache.get_json::<Vec<f32>>(&key).await {
            if cached.len() == self.dimensions {
                debug!(provider = %kind, "embedding served from cache");
                return Ok(cached);
            }
            // Stale entry from a different dimension configuration.
            debug!(provider = %kind, cached_len = cached.len(), "ignoring cached embedding with wrong dimensions");
        }

        let provider = self.providers.get(&kind).ok_or_else(|| RagError::EmbeddingError {
            provider: kind.to_string(),
            message: "no backend registered for this provider".to_string(),
        })?;

        let embedding = provider.embed(text).await?;
        if embedding.len() != self.dimensions {
            return Err(RagError::EmbeddingError {
                provider: kind.to_string(),
                message: format!(
                    "dimension mismatch: provider returned {}, store expects {}",
                    embedding.len(),
                    self.dimensions
                ),
            });
        }

        self.cache.set_json(&key, &embedding, None).await;
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::memcache::MemoryCache;

    struct FixedProvider {
        vector: Vec<f32>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.vector.clone())
        }

        fn dimensions(&self) -> usize {
            self.vector.len()
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn service_with(vector: Vec<f32>, dimensions: usize) -> (EmbeddingService, Arc<FixedProvider>) {
        let provider = Arc::new(FixedProvider { vector, calls: AtomicUsize::new(0) });
        let cache = Arc::new(MemoryCache::new(3600));
        let service = EmbeddingService::new(cache, ProviderKind::OpenAi, dimensions)
            .with_provider(ProviderKind::OpenAi, provider.clone());
        (service, provider)
    }

    #[tokio::test]
    async fn second_embed_is_served_from_cache() {
        let (service, provider) = service_with(vec![0.1, 0.2, 0.3], 3);
        let options = EmbedOptions::default();
        let first = service.embed("hello", &options).await.unwrap();
        let second = service.embed("hello", &options).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dimension_mismatch_is_fatal() {
        let (service, _provider) = service_with(vec![0.1, 0.2], 3);
        let err = service.embed("hello", &EmbedOptions::default()).await.unwrap_err();
        assert!(matches!(err, RagError::EmbeddingError { .. }));
    }

    #[tokio::test]
    async fn unregistered_provider_is_an_error() {
        let (service, _provider) = service_with(vec![0.0; 3], 3);
        let options =
            EmbedOptions { provider: Some(ProviderKind::Google), cache_key: None };
        let err = service.embed("hello", &options).await.unwrap_err();
        assert!(matches!(err, RagError::EmbeddingError { .. }));
    }
}
