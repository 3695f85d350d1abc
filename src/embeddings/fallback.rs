//! Composite embedding provider with explicit failover.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::EmbeddingProvider;
use crate::types::{AppError, Result};

/// Primary + fallback embedding provider behind the same port.
///
/// Every call tries the primary first and switches to the fallback on
/// failure. Callers (the retrieval strategy in particular) stay unaware of
/// the failover mechanics. Both providers must agree on dimension, since
/// their vectors land in the same store.
pub struct FallbackEmbedding {
    primary: Arc<dyn EmbeddingProvider>,
    fallback: Arc<dyn EmbeddingProvider>,
}

impl FallbackEmbedding {
    /// Compose two providers.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the providers disagree on
    /// dimension.
    pub fn new(
        primary: Arc<dyn EmbeddingProvider>,
        fallback: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        if primary.dimension() != fallback.dimension() {
            return Err(AppError::Configuration(format!(
                "Fallback embedding dimension {} does not match primary dimension {}",
                fallback.dimension(),
                primary.dimension()
            )));
        }
        Ok(Self { primary, fallback })
    }
}

#[async_trait]
impl EmbeddingProvider for FallbackEmbedding {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self.primary.embed_batch(texts).await {
            Ok(vectors) => Ok(vectors),
            Err(e) => {
                warn!(
                    primary = self.primary.model_name(),
                    fallback = self.fallback.model_name(),
                    error = %e,
                    "primary embedding provider failed, using fallback"
                );
                self.fallback.embed_batch(texts).await
            }
        }
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        match self.primary.embed_query(text).await {
            Ok(vector) => Ok(vector),
            Err(e) => {
                warn!(
                    primary = self.primary.model_name(),
                    fallback = self.fallback.model_name(),
                    error = %e,
                    "primary embedding provider failed, using fallback"
                );
                self.fallback.embed_query(text).await
            }
        }
    }

    fn dimension(&self) -> usize {
        self.primary.dimension()
    }

    fn model_name(&self) -> &str {
        self.primary.model_name()
    }
}
