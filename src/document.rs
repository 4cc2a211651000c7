//! Data types for documents and retrieval results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A persisted document with free-form metadata and an optional embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The text content of the document. Must be non-empty.
    pub content: String,
    /// Open mapping of string keys to JSON values (title, source, topic, ...).
    pub metadata: Map<String, Value>,
    /// The vector embedding for this document's content, if computed.
    ///
    /// When present its length must equal the store's configured dimension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Insertion timestamp, stamped by the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Create a document with a generated UUID id and no embedding.
    pub fn new(content: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            metadata,
            embedding: None,
            created_at: None,
        }
    }

    /// Attach an embedding vector.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// A retrieval-time projection of a [`Document`] with a relevance score.
///
/// For vector-search results `similarity` is a cosine-similarity-derived
/// score (higher is more relevant); for keyword-fallback results it is the
/// fixed sentinel [`KEYWORD_SENTINEL_SIMILARITY`](crate::keywords::KEYWORD_SENTINEL_SIMILARITY).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagDocument {
    /// Identifier of the source document.
    pub id: String,
    /// The text content of the document.
    pub content: String,
    /// Metadata carried over from the source document.
    pub metadata: Map<String, Value>,
    /// Relevance score, higher is more relevant.
    pub similarity: f32,
}

/// The shaped output of a retrieval call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagRetrievalResult {
    /// Retrieved documents, in the order the source stage produced them.
    pub documents: Vec<RagDocument>,
    /// Estimated token count for the returned contents (see [`estimate_tokens`]).
    pub total_tokens: usize,
}

impl RagRetrievalResult {
    /// The canonical empty result returned on terminal failure paths.
    pub fn empty() -> Self {
        Self { documents: Vec::new(), total_tokens: 0 }
    }

    /// Shape a result from documents, computing the token estimate.
    pub fn from_documents(documents: Vec<RagDocument>) -> Self {
        let total_tokens = estimate_tokens(&documents);
        Self { documents, total_tokens }
    }
}

/// Estimate the token count of a document set.
///
/// Uses a coarse 4-characters-per-token heuristic over the content byte
/// length, rounded up. This is an estimate, not a tokenizer count.
pub fn estimate_tokens(documents: &[RagDocument]) -> usize {
    let total_chars: usize = documents.iter().map(|d| d.content.len()).sum();
    total_chars.div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str) -> RagDocument {
        RagDocument {
            id: "d1".to_string(),
            content: content.to_string(),
            metadata: Map::new(),
            similarity: 0.9,
        }
    }

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(estimate_tokens(&[doc("abcd")]), 1);
        assert_eq!(estimate_tokens(&[doc("abcde")]), 2);
        assert_eq!(estimate_tokens(&[doc("ab"), doc("cd")]), 1);
        assert_eq!(estimate_tokens(&[]), 0);
    }

    #[test]
    fn empty_result_has_zero_tokens() {
        let result = RagRetrievalResult::empty();
        assert!(result.documents.is_empty());
        assert_eq!(result.total_tokens, 0);
    }
}
