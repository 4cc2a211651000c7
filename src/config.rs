//! Configuration for the retrieval subsystem.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// The closed set of embedding backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI embeddings API (the default).
    OpenAi,
    /// Google Generative Language embeddings API.
    Google,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Google => write!(f, "google"),
        }
    }
}

/// The slice of application state the retrieval core reads: which embedding
/// backend to use for this request. `None` falls back to
/// [`RagConfig::default_provider`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Embedding backend override for this request.
    pub embedding_provider: Option<ProviderKind>,
}

/// Configuration parameters for the retrieval subsystem.
///
/// All configuration is explicit; the core never reads process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Connection string for the document store, if a remote backend is used.
    pub database_url: Option<String>,
    /// Connection string for the cache backend, if a remote backend is used.
    pub cache_url: Option<String>,
    /// Embedding backend used when a request does not specify one.
    pub default_provider: ProviderKind,
    /// Default TTL in seconds for cached values.
    pub default_ttl_secs: u64,
    /// Embedding dimensionality shared by the providers and the store.
    pub vector_dimensions: usize,
    /// Default number of documents returned by a retrieval call.
    pub default_limit: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            cache_url: None,
            default_provider: ProviderKind::OpenAi,
            default_ttl_secs: 3600,
            vector_dimensions: 1536,
            default_limit: 5,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the document store connection string.
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    /// Set the cache backend connection string.
    pub fn cache_url(mut self, url: impl Into<String>) -> Self {
        self.config.cache_url = Some(url.into());
        self
    }

    /// Set the embedding backend used when a request does not specify one.
    pub fn default_provider(mut self, provider: ProviderKind) -> Self {
        self.config.default_provider = provider;
        self
    }

    /// Set the default TTL in seconds for cached values.
    pub fn default_ttl_secs(mut self, ttl: u64) -> Self {
        self.config.default_ttl_secs = ttl;
        self
    }

    /// Set the embedding dimensionality.
    pub fn vector_dimensions(mut self, dimensions: usize) -> Self {
        self.config.vector_dimensions = dimensions;
        self
    }

    /// Set the default number of documents returned by a retrieval call.
    pub fn default_limit(mut self, limit: usize) -> Self {
        self.config.default_limit = limit;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `vector_dimensions == 0`
    /// - `default_limit == 0`
    /// - `default_ttl_secs == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.vector_dimensions == 0 {
            return Err(RagError::ConfigError(
                "vector_dimensions must be greater than zero".to_string(),
            ));
        }
        if self.config.default_limit == 0 {
            return Err(RagError::ConfigError("default_limit must be greater than zero".to_string()));
        }
        if self.config.default_ttl_secs == 0 {
            return Err(RagError::ConfigError(
                "default_ttl_secs must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_zero_dimensions() {
        let result = RagConfig::builder().vector_dimensions(0).build();
        assert!(matches!(result, Err(RagError::ConfigError(_))));
    }

    #[test]
    fn builder_defaults_match_reference_deployment() {
        let config = RagConfig::builder().build().unwrap();
        assert_eq!(config.vector_dimensions, 1536);
        assert_eq!(config.default_limit, 5);
        assert_eq!(config.default_provider, ProviderKind::OpenAi);
    }

    #[test]
    fn provider_kind_display_is_lowercase() {
        assert_eq!(ProviderKind::OpenAi.to_string(), "openai");
        assert_eq!(ProviderKind::Google.to_string(), "google");
    }
}
