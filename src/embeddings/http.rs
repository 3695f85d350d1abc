//! Remote embedding provider over an OpenAI-compatible `/embeddings` API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{clean_texts, EmbeddingProvider};
use crate::types::{AppError, Result};

/// Embedding provider backed by an OpenAI-compatible HTTP endpoint.
///
/// Any backend exposing batch-embedding semantics (OpenAI, OpenRouter,
/// text-embeddings-inference, LocalAI) is substitutable. Requests carry an
/// explicit timeout; a timeout surfaces as an embedding error.
pub struct HttpEmbedding {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

impl HttpEmbedding {
    /// Create a provider for the given endpoint, model and vector dimension.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            dimension,
        })
    }

    async fn request_embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);
        debug!(count = inputs.len(), model = %self.model, "requesting embeddings");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "input": inputs,
            }))
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Embedding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Embedding(format!(
                "Embedding backend returned {}: {}",
                status, body
            )));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Invalid embedding response: {}", e)))?;

        if parsed.data.len() != inputs.len() {
            return Err(AppError::Embedding(format!(
                "Expected {} embeddings, got {}",
                inputs.len(),
                parsed.data.len()
            )));
        }

        // The API may return items out of order; restore input order.
        let mut items = parsed.data;
        items.sort_by_key(|item| item.index);

        for item in &items {
            if item.embedding.len() != self.dimension {
                return Err(AppError::Embedding(format!(
                    "Backend returned dimension {}, expected {}",
                    item.embedding.len(),
                    self.dimension
                )));
            }
        }

        Ok(items.into_iter().map(|item| item.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedding {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let cleaned = clean_texts(texts);
        if cleaned.is_empty() {
            return Ok(Vec::new());
        }
        self.request_embeddings(&cleaned).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AppError::Embedding("Text cannot be empty".to_string()));
        }

        let mut vectors = self.request_embeddings(&[trimmed.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| AppError::Embedding("Backend returned no embedding".to_string()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
