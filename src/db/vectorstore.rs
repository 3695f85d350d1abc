//! Vector store abstraction and the in-memory brute-force backend.
//!
//! A store fixes its vector dimension on the first insert; every later
//! insert or query with a mismatched dimension fails with a
//! `DimensionMismatch` error rather than silently truncating or padding.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::types::{AppError, ChunkResult, Metadata, Result};

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for vector store backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum VectorStoreProvider {
    /// In-memory brute-force store. Data is lost when the process exits.
    ///
    /// O(N·D) per query; fine below ~100K vectors.
    Memory,

    /// PostgreSQL with the pgvector extension.
    ///
    /// Delegates ranking to the database's vector index and supports
    /// equality filters pushed into the WHERE clause.
    #[cfg(feature = "pgvector")]
    PgVector {
        /// PostgreSQL connection string.
        connection_string: String,
        /// Expected embedding dimension.
        dimension: usize,
    },
}

impl VectorStoreProvider {
    /// Create a vector store instance from this configuration.
    pub async fn create_store(&self) -> Result<Box<dyn VectorStore>> {
        match self {
            VectorStoreProvider::Memory => Ok(Box::new(MemoryVectorStore::new())),

            #[cfg(feature = "pgvector")]
            VectorStoreProvider::PgVector {
                connection_string,
                dimension,
            } => {
                let store = super::pgvector::PgVectorStore::new(connection_string, *dimension).await?;
                Ok(Box::new(store))
            }
        }
    }
}

// ============================================================================
// Search Filters
// ============================================================================

/// Equality filters applied during search.
///
/// Only the database-backed store honors filters; the brute-force store
/// ignores them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Restrict to one document classification.
    pub document_type: Option<String>,
    /// Restrict to one document language.
    pub language: Option<String>,
}

impl SearchFilters {
    /// Whether no filter is set.
    pub fn is_empty(&self) -> bool {
        self.document_type.is_none() && self.language.is_none()
    }
}

// ============================================================================
// Vector Store Trait
// ============================================================================

/// Port for vector similarity search.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Name of this backend.
    fn provider_name(&self) -> &'static str;

    /// Find the vectors most similar to the query.
    ///
    /// Results are ordered by descending cosine similarity; equal scores
    /// preserve the store's natural (insertion) order. At most `top_k`
    /// results are returned.
    ///
    /// # Errors
    ///
    /// [`AppError::DimensionMismatch`] when the query dimension differs
    /// from the store's; [`AppError::Retriever`] on backend failure.
    async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
        filters: Option<&SearchFilters>,
    ) -> Result<Vec<ChunkResult>>;

    /// Add vectors with their chunk ids and metadata.
    ///
    /// # Errors
    ///
    /// [`AppError::Validation`] when the three slices differ in length;
    /// [`AppError::DimensionMismatch`] when any vector's dimension differs
    /// from the store's.
    async fn add_vectors(
        &self,
        chunk_ids: &[Uuid],
        vectors: &[Vec<f32>],
        metadata: &[Metadata],
    ) -> Result<()>;

    /// Remove vectors by chunk id. Unknown ids are ignored.
    async fn delete_vectors(&self, chunk_ids: &[Uuid]) -> Result<()>;

    /// Number of vectors in the store.
    async fn count(&self) -> Result<usize>;
}

/// Cosine similarity between two equal-length vectors.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

// ============================================================================
// In-Memory Brute-Force Store
// ============================================================================

struct MemoryStoreInner {
    chunk_ids: Vec<Uuid>,
    vectors: Vec<Vec<f32>>,
    metadata: Vec<Metadata>,
    dimension: Option<usize>,
}

/// In-memory vector store using brute-force cosine similarity.
///
/// Vectors are appended to parallel lists; search scores every stored
/// vector against the query. Deletion filters the backing arrays by id-set
/// exclusion, no tombstones. Interior mutability via a read-write lock, so
/// concurrent search and insert are safe.
pub struct MemoryVectorStore {
    inner: RwLock<MemoryStoreInner>,
}

impl MemoryVectorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                chunk_ids: Vec::new(),
                vectors: Vec::new(),
                metadata: Vec::new(),
                dimension: None,
            }),
        }
    }

    /// Remove all vectors and reset the dimension.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.chunk_ids.clear();
        inner.vectors.clear();
        inner.metadata.clear();
        inner.dimension = None;
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    fn provider_name(&self) -> &'static str {
        "memory"
    }

    async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
        filters: Option<&SearchFilters>,
    ) -> Result<Vec<ChunkResult>> {
        if filters.is_some_and(|f| !f.is_empty()) {
            debug!("memory store ignores search filters");
        }

        let inner = self.inner.read();
        if inner.vectors.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(dimension) = inner.dimension {
            if query_vector.len() != dimension {
                return Err(AppError::DimensionMismatch(format!(
                    "Query dimension {} doesn't match store dimension {}",
                    query_vector.len(),
                    dimension
                )));
            }
        }

        let mut scored: Vec<(usize, f32)> = inner
            .vectors
            .iter()
            .enumerate()
            .map(|(idx, vector)| (idx, cosine_similarity(query_vector, vector)))
            .collect();

        // Stable sort keeps insertion order for equal scores.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(idx, score)| ChunkResult {
                chunk_id: inner.chunk_ids[idx],
                content: inner.metadata[idx]
                    .get("content")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                score,
                metadata: inner.metadata[idx].clone(),
            })
            .collect())
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

        if vectors.is_empty() {
            return Ok(());
        }

        let mut inner = self.inner.write();

        let dimension = match inner.dimension {
            Some(dimension) => dimension,
            None => {
                let dimension = vectors[0].len();
                inner.dimension = Some(dimension);
                dimension
            }
        };

        for vector in vectors {
            if vector.len() != dimension {
                return Err(AppError::DimensionMismatch(format!(
                    "Embedding dimension {} doesn't match store dimension {}",
                    vector.len(),
                    dimension
                )));
            }
        }

        inner.chunk_ids.extend_from_slice(chunk_ids);
        inner.vectors.extend_from_slice(vectors);
        inner.metadata.extend_from_slice(metadata);

        Ok(())
    }

    async fn delete_vectors(&self, chunk_ids: &[Uuid]) -> Result<()> {
        let ids_to_remove: std::collections::HashSet<Uuid> = chunk_ids.iter().copied().collect();

        let mut inner = self.inner.write();
        let mut new_ids = Vec::new();
        let mut new_vectors = Vec::new();
        let mut new_metadata = Vec::new();

        for ((id, vector), meta) in inner
            .chunk_ids
            .iter()
            .zip(inner.vectors.iter())
            .zip(inner.metadata.iter())
        {
            if !ids_to_remove.contains(id) {
                new_ids.push(*id);
                new_vectors.push(vector.clone());
                new_metadata.push(meta.clone());
            }
        }

        inner.chunk_ids = new_ids;
        inner.vectors = new_vectors;
        inner.metadata = new_metadata;

        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.inner.read().vectors.len())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(content: &str) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("content".to_string(), json!(content));
        metadata
    }

    #[tokio::test]
    async fn add_and_count() {
        let store = MemoryVectorStore::new();
        store
            .add_vectors(
                &[Uuid::new_v4(), Uuid::new_v4()],
                &[vec![1.0, 0.0], vec![0.0, 1.0]],
                &[meta("a"), meta("b")],
            )
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn search_orders_by_descending_score() {
        let store = MemoryVectorStore::new();
        let ids = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        store
            .add_vectors(
                &ids,
                &[
                    vec![0.0, 1.0, 0.0, 0.0],
                    vec![1.0, 0.0, 0.0, 0.0],
                    vec![0.9, 0.1, 0.0, 0.0],
                ],
                &[meta("orthogonal"), meta("exact"), meta("close")],
            )
            .await
            .unwrap();

        let results = store
            .search(&[1.0, 0.0, 0.0, 0.0], 2, None)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk_id, ids[1]);
        assert!((results[0].score - 1.0).abs() < 1e-5);
        assert_eq!(results[1].chunk_id, ids[2]);
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn equal_scores_preserve_insertion_order() {
        let store = MemoryVectorStore::new();
        let ids = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        // First and third are identical, so they tie exactly.
        store
            .add_vectors(
                &ids,
                &[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]],
                &[meta("first"), meta("other"), meta("dup")],
            )
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 3, None).await.unwrap();
        assert_eq!(results[0].chunk_id, ids[0]);
        assert_eq!(results[1].chunk_id, ids[2]);
    }

    #[tokio::test]
    async fn dimension_fixed_by_first_insert() {
        let store = MemoryVectorStore::new();
        store
            .add_vectors(&[Uuid::new_v4()], &[vec![1.0, 0.0, 0.0]], &[meta("a")])
            .await
            .unwrap();

        let result = store
            .add_vectors(&[Uuid::new_v4()], &[vec![1.0, 0.0]], &[meta("b")])
            .await;
        assert!(matches!(result, Err(AppError::DimensionMismatch(_))));

        let result = store.search(&[1.0, 0.0], 5, None).await;
        assert!(matches!(result, Err(AppError::DimensionMismatch(_))));
    }

    #[tokio::test]
    async fn mismatched_lengths_rejected() {
        let store = MemoryVectorStore::new();
        let result = store
            .add_vectors(
                &[Uuid::new_v4(), Uuid::new_v4()],
                &[vec![0.1, 0.2]],
                &[Metadata::new(), Metadata::new()],
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn delete_filters_by_id_set() {
        let store = MemoryVectorStore::new();
        let keep = Uuid::new_v4();
        let drop = Uuid::new_v4();
        store
            .add_vectors(
                &[keep, drop],
                &[vec![1.0, 0.0], vec![0.0, 1.0]],
                &[meta("keep"), meta("drop")],
            )
            .await
            .unwrap();

        store.delete_vectors(&[drop]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        let results = store.search(&[1.0, 0.0], 10, None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk_id, keep);
    }

    #[tokio::test]
    async fn empty_store_returns_no_results() {
        let store = MemoryVectorStore::new();
        let results = store.search(&[1.0, 0.0], 10, None).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn search_never_exceeds_stored_count() {
        let store = MemoryVectorStore::new();
        store
            .add_vectors(&[Uuid::new_v4()], &[vec![1.0, 0.0]], &[meta("only")])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 10, None).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn clear_resets_dimension() {
        let store = MemoryVectorStore::new();
        store
            .add_vectors(&[Uuid::new_v4()], &[vec![1.0, 0.0, 0.0]], &[meta("a")])
            .await
            .unwrap();

        store.clear();
        assert_eq!(store.count().await.unwrap(), 0);

        // A different dimension is accepted after clear.
        store
            .add_vectors(&[Uuid::new_v4()], &[vec![1.0, 0.0]], &[meta("b")])
            .await
            .unwrap();
    }

    #[test]
    fn cosine_similarity_reference_values() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-5);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-5);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-5);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
