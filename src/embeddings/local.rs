//! Local ONNX embedding models via fastembed.

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;
use tracing::info;

use super::{clean_texts, EmbeddingProvider};
use crate::types::{AppError, Result};

/// Embedding provider running a fastembed model in-process.
///
/// No API calls, no rate limits. First use downloads the model weights.
pub struct LocalEmbedding {
    model: Mutex<TextEmbedding>,
    model_name: String,
    dimension: usize,
}

impl LocalEmbedding {
    /// Load the default BGE-small model (384 dimensions).
    pub fn new() -> Result<Self> {
        info!("loading local embedding model BGE-small-en-v1.5");
        let model = TextEmbedding::try_new(InitOptions::new(EmbeddingModel::BGESmallENV15))
            .map_err(|e| AppError::Embedding(format!("Model loading failed: {}", e)))?;

        Ok(Self {
            model: Mutex::new(model),
            model_name: "BAAI/bge-small-en-v1.5".to_string(),
            dimension: 384,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbedding {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let cleaned = clean_texts(texts);
        if cleaned.is_empty() {
            return Ok(Vec::new());
        }

        self.model
            .lock()
            .embed(cleaned, None)
            .map_err(|e| AppError::Embedding(format!("Embedding generation failed: {}", e)))
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AppError::Embedding("Text cannot be empty".to_string()));
        }

        let mut vectors = self
            .model
            .lock()
            .embed(vec![trimmed.to_string()], None)
            .map_err(|e| AppError::Embedding(format!("Query embedding failed: {}", e)))?;

        vectors
            .pop()
            .ok_or_else(|| AppError::Embedding("Model returned no embedding".to_string()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
