//! In-memory document store using cosine similarity, with substring
//! keyword search over the same corpus.
//!
//! Backed by an insertion-ordered `Vec` behind a `tokio::sync::RwLock`.
//! Suitable for development, testing, and small corpora; the pgvector
//! backend covers production scale.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::document::{Document, RagDocument};
use crate::error::Result;
use crate::keywords::{KEYWORD_SENTINEL_SIMILARITY, KeywordSearch};
use crate::vectorstore::VectorStore;

/// An in-memory [`VectorStore`] and [`KeywordSearch`] over one corpus.
///
/// Search results are ordered by descending cosine similarity; equal
/// scores are broken by insertion order (stable sort).
pub struct InMemoryVectorStore {
    documents: RwLock<Vec<Document>>,
    dimensions: usize,
}

impl InMemoryVectorStore {
    /// Create an empty store expecting embeddings of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self { documents: RwLock::new(Vec::new()), dimensions }
    }

    /// Number of documents currently stored.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn initialize(&self) -> Result<()> {
        // No structures to set up; existing data is left untouched.
        Ok(())
    }

    async fn add_documents(&self, documents: &[Document]) -> Result<usize> {
        let mut store = self.documents.write().await;
        let mut stored = 0;
        for document in documents {
            match &document.embedding {
                Some(embedding) if embedding.len() == self.dimensions => {
                    let mut document = document.clone();
                    if document.created_at.is_none() {
                        document.created_at = Some(Utc::now());
                    }
                    store.push(document);
                    stored += 1;
                }
                Some(embedding) => {
                    warn!(
                        document.id = %document.id,
                        got = embedding.len(),
                        expected = self.dimensions,
                        "skipping document with wrong embedding dimension"
                    );
                }
                None => {
                    warn!(document.id = %document.id, "skipping document without embedding");
                }
            }
        }
        Ok(stored)
    }

    async fn similarity_search(&self, query: &[f32], limit: usize) -> Result<Vec<RagDocument>> {
        let store = self.documents.read().await;
        let mut scored: Vec<RagDocument> = store
            .iter()
            .filter_map(|document| {
                let embedding = document.embedding.as_ref()?;
                Some(RagDocument {
                    id: document.id.clone(),
                    content: document.content.clone(),
                    metadata: document.metadata.clone(),
                    similarity: cosine_similarity(embedding, query),
                })
            })
            .collect();

        // Stable sort keeps insertion order for equal scores.
        scored.sort_by(|a, b| {
            b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        Ok(scored)
    }
}

#[async_trait]
impl KeywordSearch for InMemoryVectorStore {
    async fn search_keywords(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<RagDocument>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let needles: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        let store = self.documents.read().await;
        let matched = store
            .iter()
            .filter(|document| {
                let content = document.content.to_lowercase();
                let metadata = serde_json::to_string(&document.metadata)
                    .unwrap_or_default()
                    .to_lowercase();
                needles.iter().any(|needle| content.contains(needle) || metadata.contains(needle))
            })
            .take(limit)
            .map(|document| RagDocument {
                id: document.id.clone(),
                content: document.content.clone(),
                metadata: document.metadata.clone(),
                similarity: KEYWORD_SENTINEL_SIMILARITY,
            })
            .collect();
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_similarity_of_identical_vectors_is_one() {
        let v = vec![0.5, 0.5, 0.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_of_orthogonal_vectors_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_with_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
