//! Google embedding provider using the Generative Language API.
//!
//! This module is only available when the `google` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// The Generative Language API base URL.
const GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// The default model for Google embeddings.
const DEFAULT_MODEL: &str = "text-embedding-004";

/// The default dimensionality for `text-embedding-004`.
const DEFAULT_DIMENSIONS: usize = 768;

/// An [`EmbeddingProvider`] backed by the Google Generative Language
/// `embedContent` endpoint.
///
/// # Configuration
///
/// - `model` – defaults to `text-embedding-004`.
/// - `dimensions` – optional `outputDimensionality` override, needed when
///   the vector store expects a different dimension than the model default.
/// - `api_key` – from the constructor or the `GOOGLE_API_KEY` environment variable.
pub struct GoogleEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
    /// If set, sent as `outputDimensionality` for truncation.
    request_dimensions: Option<usize>,
}

impl GoogleEmbeddingProvider {
    /// Create a new provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::EmbeddingError {
                provider: "google".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
            request_dimensions: None,
        })
    }

    /// Create a new provider using the `GOOGLE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| RagError::EmbeddingError {
            provider: "google".into(),
            message: "GOOGLE_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the output dimensionality.
    ///
    /// This also updates the value returned by [`dimensions()`](EmbeddingProvider::dimensions).
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = Some(dims);
        self
    }
}

// ── Generative Language API request/response types ─────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dimensionality: Option<usize>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for GoogleEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "google", text_len = text.len(), model = %self.model, "embedding text");

        let url = format!("{GOOGLE_API_BASE}/{}:embedContent", self.model);
        let request_body = EmbedContentRequest {
            model: format!("models/{}", self.model),
            content: Content { parts: vec![Part { text }] },
            output_dimensionality: self.request_dimensions,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "google", error = %e, "request failed");
                RagError::EmbeddingError {
                    provider: "google".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            error!(provider = "google", %status, "API error");
            return Err(RagError::EmbeddingError {
                provider: "google".into(),
                message: format!("API returned {status}: {body}"),
            });
        }

        let embed_response: EmbedContentResponse = response.json().await.map_err(|e| {
            error!(provider = "google", error = %e, "failed to parse response");
            RagError::EmbeddingError {
                provider: "google".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        Ok(embed_response.embedding.values)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "google"
    }
}
