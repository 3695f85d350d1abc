//! Embedding providers.
//!
//! This module defines the [`EmbeddingProvider`] port for converting text
//! into fixed-dimension vectors, plus the concrete implementations:
//!
//! - [`HttpEmbedding`] - remote OpenAI-compatible `/embeddings` endpoint
//! - [`FakeEmbedding`] - deterministic vectors for tests and offline runs
//! - [`FallbackEmbedding`] - composite primary + fallback provider
//! - `LocalEmbedding` - fastembed ONNX models (feature `local-embeddings`)
//!
//! Providers must be side-effect-free besides internal caching. The
//! remote-or-local failover decision lives in [`FallbackEmbedding`], not in
//! the retrieval strategy.

mod fake;
mod fallback;
mod http;

#[cfg(feature = "local-embeddings")]
mod local;

pub use fake::FakeEmbedding;
pub use fallback::FallbackEmbedding;
pub use http::HttpEmbedding;

#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbedding;

use async_trait::async_trait;

use crate::types::Result;

/// Port for embedding backends.
///
/// `embed_batch` is order-preserving and returns one vector per non-empty
/// input after trimming; empty strings are dropped, so the output may be
/// shorter than the input. All vectors from one provider share a single
/// dimension, reported by [`EmbeddingProvider::dimension`].
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for multiple texts.
    ///
    /// # Errors
    ///
    /// Returns [`crate::types::AppError::Embedding`] on backend failure or
    /// when the backend returns a vector count that does not match the
    /// cleaned input count.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding for a single query text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::types::AppError::Embedding`] for empty input or
    /// backend failure.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Dimension of vectors produced by this provider.
    ///
    /// Must be consistent across all embeddings; the vector store enforces
    /// it on every insert and query.
    fn dimension(&self) -> usize;

    /// Model identifier, carried into answer metadata for cost accounting.
    fn model_name(&self) -> &str;
}

/// Trim inputs and drop empty strings, preserving order.
pub(crate) fn clean_texts(texts: &[String]) -> Vec<String> {
    texts
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
