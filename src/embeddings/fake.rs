//! Deterministic embedding provider for tests and offline development.

use async_trait::async_trait;

use super::{clean_texts, EmbeddingProvider};
use crate::types::{AppError, Result};

/// Fake embedding provider producing deterministic, L2-normalized vectors.
///
/// The same text always maps to the same vector, so similarity comparisons
/// behave consistently across test runs without any model download.
pub struct FakeEmbedding {
    dimension: usize,
}

impl FakeEmbedding {
    /// Create a fake provider with the given vector dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        // FNV-style rolling hash seeds each component so distinct texts
        // land on distinct directions.
        let mut state: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in text.bytes() {
            state ^= u64::from(byte);
            state = state.wrapping_mul(0x0000_0100_0000_01b3);
        }

        let mut vector = Vec::with_capacity(self.dimension);
        for i in 0..self.dimension {
            let seed = state.wrapping_add(i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
            // Map to [-1, 1).
            let value = (seed >> 11) as f32 / (1u64 << 53) as f32 * 2.0 - 1.0;
            vector.push(value);
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Default for FakeEmbedding {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedding {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(clean_texts(texts)
            .iter()
            .map(|t| self.embed_text(t))
            .collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AppError::Embedding("Text cannot be empty".to_string()));
        }
        Ok(self.embed_text(trimmed))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "fake-embedding"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_text_same_vector() {
        let provider = FakeEmbedding::new(8);
        let a = provider.embed_query("hello").await.unwrap();
        let b = provider.embed_query("hello").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
    }

    #[tokio::test]
    async fn different_texts_differ() {
        let provider = FakeEmbedding::new(16);
        let a = provider.embed_query("hello").await.unwrap();
        let b = provider.embed_query("world").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn vectors_are_normalized() {
        let provider = FakeEmbedding::new(32);
        let v = provider.embed_query("normalize me").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn empty_query_is_an_error() {
        let provider = FakeEmbedding::default();
        assert!(provider.embed_query("   ").await.is_err());
    }

    #[tokio::test]
    async fn batch_drops_empty_inputs() {
        let provider = FakeEmbedding::new(4);
        let vectors = provider
            .embed_batch(&["a".to_string(), "  ".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors.len(), 2);
    }
}
