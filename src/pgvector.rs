//! pgvector (PostgreSQL) document store backend.
//!
//! Provides [`PgVectorStore`] which implements [`VectorStore`] and
//! [`KeywordSearch`] using [sqlx](https://docs.rs/sqlx) with the
//! [pgvector](https://github.com/pgvector/pgvector) PostgreSQL extension.
//!
//! This module is only available when the `pgvector` feature is enabled.
//!
//! # Prerequisites
//!
//! - PostgreSQL with the `pgvector` extension available
//! - [`initialize`](VectorStore::initialize) creates the extension, the
//!   `documents` table, and an ivfflat cosine index, all idempotently.

use async_trait::async_trait;
use serde_json::Map;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{debug, warn};

use crate::document::{Document, RagDocument};
use crate::error::{RagError, Result};
use crate::keywords::{KEYWORD_SENTINEL_SIMILARITY, KeywordSearch};
use crate::vectorstore::VectorStore;

/// A document store backed by PostgreSQL with the pgvector extension.
///
/// The corpus lives in a single `documents` table with columns `id`,
/// `content`, `metadata` (jsonb), `embedding` (vector), `created_at`.
/// Equal-similarity ordering is whatever the index yields; ties are
/// unspecified for this backend.
pub struct PgVectorStore {
    pool: PgPool,
    dimensions: usize,
}

impl PgVectorStore {
    /// Connect to the given database URL.
    pub async fn connect(database_url: &str, dimensions: usize) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(Self::map_err)?;
        Ok(Self { pool, dimensions })
    }

    /// Build a store from an existing connection pool.
    pub fn from_pool(pool: PgPool, dimensions: usize) -> Self {
        Self { pool, dimensions }
    }

    fn map_err(e: sqlx::Error) -> RagError {
        RagError::VectorStoreError { backend: "pgvector".to_string(), message: e.to_string() }
    }

    /// pgvector expects vectors as a string like `[1.0,2.0,3.0]`.
    fn vector_literal(embedding: &[f32]) -> String {
        format!("[{}]", embedding.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(","))
    }

    fn row_to_document(row: &sqlx::postgres::PgRow, similarity: f32) -> RagDocument {
        let metadata_value: serde_json::Value = row.get("metadata");
        let metadata: Map<String, serde_json::Value> =
            metadata_value.as_object().cloned().unwrap_or_default();
        RagDocument {
            id: row.get("id"),
            content: row.get("content"),
            metadata,
            similarity,
        }
    }
}

#[async_trait]
impl VectorStore for PgVectorStore {
    async fn initialize(&self) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await
            .map_err(Self::map_err)?;

        let create_sql = format!(
            "CREATE TABLE IF NOT EXISTS documents (\
                id TEXT PRIMARY KEY, \
                content TEXT NOT NULL, \
                metadata JSONB NOT NULL, \
                embedding VECTOR({}), \
                created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP\
            )",
            self.dimensions
        );
        sqlx::query(&create_sql).execute(&self.pool).await.map_err(Self::map_err)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS documents_embedding_idx \
             ON documents \
             USING ivfflat (embedding vector_cosine_ops) \
             WITH (lists = 100)",
        )
        .execute(&self.pool)
        .await
        .map_err(Self::map_err)?;

        debug!(dimensions = self.dimensions, "initialized pgvector documents table");
        Ok(())
    }

    async fn add_documents(&self, documents: &[Document]) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let upsert_sql = "INSERT INTO documents (id, content, metadata, embedding) \
             VALUES ($1, $2, $3::jsonb, $4::vector) \
             ON CONFLICT (id) DO UPDATE SET \
                content = EXCLUDED.content, \
                metadata = EXCLUDED.metadata, \
                embedding = EXCLUDED.embedding";

        let mut stored = 0;
        for document in documents {
            let embedding = match &document.embedding {
                Some(embedding) if embedding.len() == self.dimensions => embedding,
                Some(embedding) => {
                    warn!(
                        document.id = %document.id,
                        got = embedding.len(),
                        expected = self.dimensions,
                        "skipping document with wrong embedding dimension"
                    );
                    continue;
                }
                None => {
                    warn!(document.id = %document.id, "skipping document without embedding");
                    continue;
                }
            };

            let metadata_json = serde_json::to_string(&document.metadata)
                .unwrap_or_else(|_| "{}".to_string());

            sqlx::query(upsert_sql)
                .bind(&document.id)
                .bind(&document.content)
                .bind(&metadata_json)
                .bind(Self::vector_literal(embedding))
                .execute(&self.pool)
                .await
                .map_err(Self::map_err)?;
            stored += 1;
        }

        debug!(count = stored, "upserted documents to pgvector");
        Ok(stored)
    }

    async fn similarity_search(&self, query: &[f32], limit: usize) -> Result<Vec<RagDocument>> {
        // pgvector cosine distance operator: <=>
        // Returns distance (0 = identical), so similarity = 1 - distance
        let rows = sqlx::query(
            "SELECT id, content, metadata, \
                    1 - (embedding <=> $1::vector) AS similarity \
             FROM documents \
             WHERE embedding IS NOT NULL \
             ORDER BY embedding <=> $1::vector \
             LIMIT $2",
        )
        .bind(Self::vector_literal(query))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::map_err)?;

        let results = rows
            .iter()
            .map(|row| {
                let similarity: f64 = row.get("similarity");
                Self::row_to_document(row, similarity as f32)
            })
            .collect();
        Ok(results)
    }
}

#[async_trait]
impl KeywordSearch for PgVectorStore {
    async fn search_keywords(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<RagDocument>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let patterns: Vec<String> = keywords.iter().map(|k| format!("%{k}%")).collect();
        let rows = sqlx::query(
            "SELECT id, content, metadata \
             FROM documents \
             WHERE content ILIKE ANY($1) OR metadata::text ILIKE ANY($1) \
             LIMIT $2",
        )
        .bind(&patterns)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RagError::KeywordSearchError {
            backend: "pgvector".to_string(),
            message: e.to_string(),
        })?;

        debug!(keywords = keywords.len(), rows = rows.len(), "keyword query completed");

        Ok(rows.iter().map(|row| Self::row_to_document(row, KEYWORD_SENTINEL_SIMILARITY)).collect())
    }
}
