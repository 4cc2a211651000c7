//! Vector store trait for persisting documents and similarity search.

use async_trait::async_trait;

use crate::document::{Document, RagDocument};
use crate::error::Result;

/// A storage backend for documents with embeddings.
///
/// Implementations must be safe for concurrent use by multiple logical
/// callers; any mutual exclusion (e.g. a connection pool) is the
/// implementation's responsibility.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Idempotent setup of the underlying index/table structures.
    ///
    /// Safe to call multiple times; must not destroy existing data.
    async fn initialize(&self) -> Result<()>;

    /// Batch insert documents, stamping `created_at` on each.
    ///
    /// Partial-failure policy is per-item: a document whose embedding is
    /// missing or whose length differs from the store's configured
    /// dimension is logged and skipped, while the rest of the batch still
    /// succeeds. Returns the number of documents stored.
    async fn add_documents(&self, documents: &[Document]) -> Result<usize>;

    /// Return up to `limit` documents ordered by descending cosine
    /// similarity to `query`.
    ///
    /// An empty corpus, or a corpus with no embeddings, yields an empty
    /// sequence rather than an error; the orchestrator uses that as the
    /// signal to try the keyword fallback.
    async fn similarity_search(&self, query: &[f32], limit: usize) -> Result<Vec<RagDocument>>;
}
