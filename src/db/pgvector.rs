//! PostgreSQL + pgvector backed vector store.
//!
//! Chunks live in a `chunks` table with an `embedding vector(N)` column and
//! a foreign key into `documents`. Ranking is delegated to the database's
//! `<=>` cosine-distance operator, so pgvector's HNSW/IVFFlat indexes apply.
//! Writes update existing chunk rows in place; chunk rows are owned by the
//! ingestion pipeline, this store only attaches embeddings to them.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use tracing::{info, warn};
use uuid::Uuid;

use super::vectorstore::{SearchFilters, VectorStore};
use crate::types::{AppError, ChunkResult, Metadata, Result};

/// Vector store backed by PostgreSQL with the pgvector extension.
pub struct PgVectorStore {
    pool: PgPool,
    dimension: usize,
}

/// Render a vector as pgvector's text literal, e.g. `[0.1,0.2,0.3]`.
fn vector_literal(vector: &[f32]) -> String {
    let mut out = String::with_capacity(vector.len() * 10 + 2);
    out.push('[');
    for (i, v) in vector.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&v.to_string());
    }
    out.push(']');
    out
}

impl PgVectorStore {
    /// Connect to the database and verify the expected dimension.
    pub async fn new(connection_string: &str, dimension: usize) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to PostgreSQL: {}", e)))?;

        info!(dimension, "connected to pgvector store");
        Ok(Self { pool, dimension })
    }

    fn check_dimension(&self, vector: &[f32], what: &str) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(AppError::DimensionMismatch(format!(
                "{} dimension {} doesn't match store dimension {}",
                what,
                vector.len(),
                self.dimension
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for PgVectorStore {
    fn provider_name(&self) -> &'static str {
        "pgvector"
    }

    async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
        filters: Option<&SearchFilters>,
    ) -> Result<Vec<ChunkResult>> {
        self.check_dimension(query_vector, "Query")?;

        let mut sql = String::from(
            "SELECT c.id::text AS id, c.content, c.metadata::text AS metadata, \
                    1 - (c.embedding <=> $1::vector) AS similarity \
             FROM chunks c \
             JOIN documents d ON d.id = c.document_id \
             WHERE c.embedding IS NOT NULL",
        );

        // Equality filters go into the WHERE clause so the planner can use
        // them before the vector scan.
        let document_type = filters.and_then(|f| f.document_type.as_deref());
        let language = filters.and_then(|f| f.language.as_deref());

        let mut param = 2;
        if document_type.is_some() {
            sql.push_str(&format!(" AND d.document_type = ${}", param));
            param += 1;
        }
        if language.is_some() {
            sql.push_str(&format!(" AND d.language = ${}", param));
            param += 1;
        }
        sql.push_str(&format!(
            " ORDER BY c.embedding <=> $1::vector LIMIT ${}",
            param
        ));

        let mut query = sqlx::query(&sql).bind(vector_literal(query_vector));
        if let Some(document_type) = document_type {
            query = query.bind(document_type);
        }
        if let Some(language) = language {
            query = query.bind(language);
        }
        query = query.bind(top_k as i64);

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Retriever(format!("Vector search failed: {}", e)))?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get("id");
            let chunk_id = Uuid::parse_str(&id)
                .map_err(|e| AppError::Retriever(format!("Invalid chunk id {}: {}", id, e)))?;
            let content: String = row.get("content");
            let similarity: f64 = row.get("similarity");
            let metadata: Option<String> = row.get("metadata");
            let metadata: Metadata = metadata
                .as_deref()
                .and_then(|m| serde_json::from_str(m).ok())
                .unwrap_or_default();

            results.push(ChunkResult {
                chunk_id,
                content,
                score: similarity as f32,
                metadata,
            });
        }
        Ok(results)
    }

    async fn add_vectors(
        &self,
        chunk_ids: &[Uuid],
        vectors: &[Vec<f32>],
        metadata: &[Metadata],
    ) -> Result<()> {
        if chunk_ids.len() != vectors.len() || vectors.len() != metadata.len() {
            return Err(AppError::Validation(
                "chunk_ids, vectors, and metadata must have same length".to_string(),
            ));
        }

        for (id, (vector, meta)) in chunk_ids.iter().zip(vectors.iter().zip(metadata.iter())) {
            self.check_dimension(vector, "Embedding")?;

            let meta_json = serde_json::to_string(meta)
                .map_err(|e| AppError::Database(format!("Metadata serialization failed: {}", e)))?;

            let result = sqlx::query(
                "UPDATE chunks \
                 SET embedding = $2::vector, metadata = COALESCE(metadata, '{}'::jsonb) || $3::jsonb \
                 WHERE id = $1::uuid",
            )
            .bind(id.to_string())
            .bind(vector_literal(vector))
            .bind(meta_json)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to store embedding: {}", e)))?;

            if result.rows_affected() == 0 {
                warn!(chunk_id = %id, "no chunk row for embedding, skipped");
            }
        }
        Ok(())
    }

    async fn delete_vectors(&self, chunk_ids: &[Uuid]) -> Result<()> {
        for id in chunk_ids {
            sqlx::query("UPDATE chunks SET embedding = NULL WHERE id = $1::uuid")
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::Database(format!("Failed to clear embedding: {}", e)))?;
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM chunks WHERE embedding IS NOT NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Count query failed: {}", e)))?;
        let n: i64 = row.get("n");
        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_literal_format() {
        assert_eq!(vector_literal(&[0.5, -1.0, 2.0]), "[0.5,-1,2]");
        assert_eq!(vector_literal(&[]), "[]");
    }
}
