//! Lexical fallback search: keyword extraction and the search trait.
//!
//! This path exists because vector search can legitimately return nothing
//! (sparse corpus, index mismatch, provider outage); the system still
//! answers with something relevant via lexical heuristics.

use async_trait::async_trait;

use crate::document::RagDocument;
use crate::error::Result;

/// Similarity score assigned to keyword-fallback results.
///
/// An arbitrary placeholder, not a meaningful threshold; keyword matches
/// carry no ranking signal.
pub const KEYWORD_SENTINEL_SIMILARITY: f32 = 0.5;

/// Stop words dropped during keyword extraction.
const STOP_WORDS: &[&str] =
    &["the", "and", "of", "to", "in", "a", "for", "with", "on", "at", "from", "by", "about"];

/// Extract search keywords from a free-text topic.
///
/// Lowercases, splits on whitespace, drops stop words and tokens of length
/// three or fewer. Source order is preserved for reproducible queries.
pub fn extract_keywords(topic: &str) -> Vec<String> {
    topic
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.len() > 3 && !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}

/// Lexical search over the same corpus the vector store persists.
#[async_trait]
pub trait KeywordSearch: Send + Sync {
    /// Return up to `limit` documents where any keyword occurs as a
    /// case-insensitive substring of the content or of the serialized
    /// metadata. Matches carry [`KEYWORD_SENTINEL_SIMILARITY`].
    ///
    /// An empty keyword slice yields an empty result without querying.
    async fn search_keywords(&self, keywords: &[String], limit: usize)
    -> Result<Vec<RagDocument>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_stop_words_and_short_tokens() {
        let keywords = extract_keywords("the GRPO implementation in Deepseek");
        assert_eq!(keywords, vec!["grpo", "implementation", "deepseek"]);
    }

    #[test]
    fn preserves_source_order() {
        let keywords = extract_keywords("quantum computing with superposition");
        assert_eq!(keywords, vec!["quantum", "computing", "superposition"]);
    }

    #[test]
    fn empty_topic_yields_no_keywords() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("the a of to").is_empty());
    }

    #[test]
    fn length_filter_is_strictly_greater_than_three() {
        // "word" (4 chars) kept, "cat" (3 chars) dropped.
        assert_eq!(extract_keywords("cat word"), vec!["word"]);
    }
}
