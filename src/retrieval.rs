//! Retrieval orchestration.
//!
//! [`RetrievalOrchestrator`] composes the cache, embedding service, vector
//! store, and keyword fallback into one retrieval call. The flow is a
//! linear state machine with one branch:
//!
//! 1. cache check (short-circuit on hit)
//! 2. embed the topic (terminal failure on error)
//! 3. vector similarity search, over-fetching `max(limit * 2, 10)`
//! 4. keyword fallback when the vector search comes back empty
//! 5. truncate to `limit` and estimate tokens
//! 6. cache the shaped result
//!
//! The public entry point never returns an error: internal failures are
//! logged, reported through the [`ActivityTracker`], and converted into a
//! degraded or empty result.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::activity::{ACTIVITY_RAG_RETRIEVAL, ActivityStatus, ActivityTracker};
use crate::cache::{CacheService, CacheServiceExt, cache_key};
use crate::config::{ProviderConfig, RagConfig};
use crate::document::RagRetrievalResult;
use crate::embedding::{EmbedOptions, EmbeddingService};
use crate::error::{RagError, Result};
use crate::keywords::{KeywordSearch, extract_keywords};
use crate::vectorstore::VectorStore;

/// The retrieval orchestrator.
///
/// Construct one via [`RetrievalOrchestrator::builder()`]. Holds no locks
/// of its own; concurrent retrieval requests are handled by the
/// collaborators. Two simultaneous calls for the same topic before either
/// cache write completes will both do full work; that is an accepted
/// inefficiency, not a correctness bug.
pub struct RetrievalOrchestrator {
    config: RagConfig,
    cache: Arc<dyn CacheService>,
    embeddings: Arc<EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    keyword_search: Arc<dyn KeywordSearch>,
}

impl RetrievalOrchestrator {
    /// Create a new [`RetrievalOrchestratorBuilder`].
    pub fn builder() -> RetrievalOrchestratorBuilder {
        RetrievalOrchestratorBuilder::default()
    }

    /// Return a reference to the orchestrator configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Retrieve supporting context with the configured default limit.
    pub async fn retrieve_context(
        &self,
        topic: &str,
        provider_config: &ProviderConfig,
        tracker: &dyn ActivityTracker,
    ) -> RagRetrievalResult {
        self.retrieve_context_for_topic(topic, provider_config, tracker, self.config.default_limit)
            .await
    }

    /// Retrieve a ranked, token-budgeted set of supporting documents for a
    /// free-text research topic.
    ///
    /// Never fails: the only caller-visible failure mode is an empty
    /// result. Calling twice with identical `(topic, limit)` within the
    /// cache TTL yields identical results served from cache.
    pub async fn retrieve_context_for_topic(
        &self,
        topic: &str,
        provider_config: &ProviderConfig,
        tracker: &dyn ActivityTracker,
        limit: usize,
    ) -> RagRetrievalResult {
        tracker.add(
            ACTIVITY_RAG_RETRIEVAL,
            ActivityStatus::Pending,
            &format!("Retrieving relevant context for: {topic}"),
        );

        // Stage 1: cache check.
        let key = cache_key(&format!("rag-retrieval:{topic}:{limit}"));
        if let Some(cached) = self.cache.get_json::<RagRetrievalResult>(&key).await {
            info!(topic, documents = cached.documents.len(), "retrieval served from cache");
            tracker.add(
                ACTIVITY_RAG_RETRIEVAL,
                ActivityStatus::Complete,
                &format!("Retrieved {} relevant documents from cache", cached.documents.len()),
            );
            return cached;
        }

        // Stage 2: embed the topic. Failure here is terminal.
        let provider =
            provider_config.embedding_provider.unwrap_or(self.config.default_provider);
        let options = EmbedOptions {
            provider: Some(provider),
            cache_key: Some(format!("embedding:{provider}:{topic}")),
        };
        let embedding = match self.embeddings.embed(topic, &options).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(topic, error = %e, "embedding failed, returning empty result");
                tracker.add(
                    ACTIVITY_RAG_RETRIEVAL,
                    ActivityStatus::Error,
                    &format!("Failed to retrieve context: {e}"),
                );
                return RagRetrievalResult::empty();
            }
        };

        // Stage 3: vector search, over-fetched so truncation needs no
        // second round trip. A query error degrades to the fallback branch
        // instead of failing the request.
        let candidates = (limit * 2).max(10);
        let documents = match self.vector_store.similarity_search(&embedding, candidates).await {
            Ok(documents) => documents,
            Err(e) => {
                warn!(topic, error = %e, "vector search failed, trying keyword fallback");
                Vec::new()
            }
        };
        debug!(topic, documents = documents.len(), "vector similarity search finished");

        // Stage 4: keyword fallback when vector search found nothing.
        if documents.is_empty() {
            if let Some(result) = self.keyword_fallback(topic, limit, &key, tracker).await {
                return result;
            }
        }

        // Stage 5: shape. Order is preserved; no re-sorting after truncation.
        let mut documents = documents;
        documents.truncate(limit);
        let result = RagRetrievalResult::from_documents(documents);

        // Stage 6: cache write, log-and-continue on failure.
        self.cache.set_json(&key, &result, None).await;

        tracker.add(
            ACTIVITY_RAG_RETRIEVAL,
            ActivityStatus::Complete,
            &format!(
                "Retrieved {} relevant documents for context enhancement",
                result.documents.len()
            ),
        );
        result
    }

    /// Run the keyword fallback. Returns `Some(result)` when it produced
    /// documents (the result is cached and a `complete` activity emitted);
    /// `None` lets the caller fall through with an empty vector result.
    async fn keyword_fallback(
        &self,
        topic: &str,
        limit: usize,
        key: &str,
        tracker: &dyn ActivityTracker,
    ) -> Option<RagRetrievalResult> {
        let keywords = extract_keywords(topic);
        if keywords.is_empty() {
            return None;
        }
        debug!(topic, keywords = ?keywords, "no vector results, trying keyword fallback");

        match self.keyword_search.search_keywords(&keywords, limit).await {
            Ok(matched) if !matched.is_empty() => {
                let result = RagRetrievalResult::from_documents(matched);
                self.cache.set_json(key, &result, None).await;
                tracker.add(
                    ACTIVITY_RAG_RETRIEVAL,
                    ActivityStatus::Complete,
                    &format!(
                        "Retrieved {} relevant documents via keyword fallback",
                        result.documents.len()
                    ),
                );
                Some(result)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(topic, error = %e, "keyword fallback failed");
                None
            }
        }
    }
}

/// Builder for constructing a [`RetrievalOrchestrator`].
///
/// All collaborators are required. Call
/// [`build()`](RetrievalOrchestratorBuilder::build) to validate and produce
/// the orchestrator.
#[derive(Default)]
pub struct RetrievalOrchestratorBuilder {
    config: Option<RagConfig>,
    cache: Option<Arc<dyn CacheService>>,
    embeddings: Option<Arc<EmbeddingService>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    keyword_search: Option<Arc<dyn KeywordSearch>>,
}

impl RetrievalOrchestratorBuilder {
    /// Set the configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the cache backend.
    pub fn cache(mut self, cache: Arc<dyn CacheService>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the embedding service.
    pub fn embeddings(mut self, embeddings: Arc<EmbeddingService>) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the keyword fallback backend.
    pub fn keyword_search(mut self, search: Arc<dyn KeywordSearch>) -> Self {
        self.keyword_search = Some(search);
        self
    }

    /// Build the [`RetrievalOrchestrator`], validating that all
    /// collaborators are set and that the embedding service agrees with the
    /// configured dimensionality.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any collaborator is missing or
    /// the embedding service enforces a different dimension than the config.
    pub fn build(self) -> Result<RetrievalOrchestrator> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let cache =
            self.cache.ok_or_else(|| RagError::ConfigError("cache is required".to_string()))?;
        let embeddings = self
            .embeddings
            .ok_or_else(|| RagError::ConfigError("embeddings is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let keyword_search = self
            .keyword_search
            .ok_or_else(|| RagError::ConfigError("keyword_search is required".to_string()))?;

        if embeddings.dimensions() != config.vector_dimensions {
            return Err(RagError::ConfigError(format!(
                "embedding service dimensions ({}) do not match vector_dimensions ({})",
                embeddings.dimensions(),
                config.vector_dimensions
            )));
        }

        Ok(RetrievalOrchestrator { config, cache, embeddings, vector_store, keyword_search })
    }
}
