//! Retrieval-augmented-generation context retrieval for research report
//! generation.
//!
//! Given a free-text research topic, [`RetrievalOrchestrator`] returns a
//! ranked, token-budgeted set of supporting documents from a
//! vector-indexed store, with a lexical fallback when vector search yields
//! nothing:
//!
//! - cache-first lookup with TTL-bounded results
//! - embedding acquisition with per-provider caching
//! - cosine similarity search over the document corpus
//! - keyword fallback when the vector path comes back empty
//! - result shaping (truncation, 4-chars-per-token estimation)
//!
//! All internal failures degrade: the entry point never returns an error,
//! only a possibly empty [`RagRetrievalResult`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use research_rag::{
//!     EmbeddingService, InMemoryVectorStore, MemoryCache, NoopTracker,
//!     ProviderConfig, ProviderKind, RagConfig, RetrievalOrchestrator,
//! };
//!
//! let config = RagConfig::builder().vector_dimensions(1536).build()?;
//! let cache = Arc::new(MemoryCache::new(config.default_ttl_secs));
//! let store = Arc::new(InMemoryVectorStore::new(config.vector_dimensions));
//! let embeddings = Arc::new(
//!     EmbeddingService::new(cache.clone(), config.default_provider, config.vector_dimensions)
//!         .with_provider(ProviderKind::OpenAi, Arc::new(my_provider)),
//! );
//!
//! let orchestrator = RetrievalOrchestrator::builder()
//!     .config(config)
//!     .cache(cache)
//!     .embeddings(embeddings)
//!     .vector_store(store.clone())
//!     .keyword_search(store)
//!     .build()?;
//!
//! let result = orchestrator
//!     .retrieve_context("GRPO implementation in Deepseek", &ProviderConfig::default(), &NoopTracker)
//!     .await;
//! ```
//!
//! # Feature flags
//!
//! - `openai` – OpenAI embedding provider (reqwest)
//! - `google` – Google embedding provider (reqwest)
//! - `pgvector` – PostgreSQL/pgvector document store (sqlx)
//! - `redis-cache` – Redis cache backend
//! - `full` – everything above

pub mod activity;
pub mod cache;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod keywords;
pub mod memcache;
pub mod retrieval;
pub mod vectorstore;

#[cfg(feature = "google")]
pub mod google;
#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "pgvector")]
pub mod pgvector;
#[cfg(feature = "redis-cache")]
pub mod rediscache;

pub use activity::{
    ACTIVITY_RAG_RETRIEVAL, ACTIVITY_RAG_STORAGE, ActivityStatus, ActivityTracker, NoopTracker,
    TracingTracker,
};
pub use cache::{CacheService, CacheServiceExt, cache_key};
pub use config::{ProviderConfig, ProviderKind, RagConfig, RagConfigBuilder};
pub use document::{Document, RagDocument, RagRetrievalResult, estimate_tokens};
pub use embedding::{EmbedOptions, EmbeddingProvider, EmbeddingService};
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorStore;
pub use keywords::{KEYWORD_SENTINEL_SIMILARITY, KeywordSearch, extract_keywords};
pub use memcache::MemoryCache;
pub use retrieval::{RetrievalOrchestrator, RetrievalOrchestratorBuilder};
pub use vectorstore::VectorStore;

#[cfg(feature = "google")]
pub use google::GoogleEmbeddingProvider;
#[cfg(feature = "openai")]
pub use openai::OpenAiEmbeddingProvider;
#[cfg(feature = "pgvector")]
pub use pgvector::PgVectorStore;
#[cfg(feature = "redis-cache")]
pub use rediscache::RedisCache;
