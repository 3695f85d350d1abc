//! Engine configuration.
//!
//! Defaults suit local development; `from_env()` overlays `.env` and
//! process environment variables. Provider selection is by tag string so
//! deployments can switch backends without recompiling.

use serde::Deserialize;
use std::env;

use crate::types::{AppError, Result};

/// Top-level engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DocentConfig {
    /// LLM backend.
    pub llm: LlmConfig,
    /// Embedding backend.
    pub embedding: EmbeddingConfig,
    /// Vector store backend.
    pub retriever: RetrieverConfig,
    /// Retrieval parameters.
    pub retrieval: RetrievalConfig,
    /// Daily cost budget.
    pub budget: BudgetConfig,
    /// Ingestion chunking parameters.
    pub chunking: ChunkingConfig,
}

/// LLM backend selection. `provider` is `"openrouter"` or `"fake"`.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Backend tag.
    pub provider: String,
    /// API key for remote backends.
    pub api_key: Option<String>,
    /// Chat-completions base URL.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Embedding backend selection. `provider` is `"http"`, `"fake"`, or
/// `"local"` (requires the `local-embeddings` feature).
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// Backend tag.
    pub provider: String,
    /// API key for remote backends.
    pub api_key: Option<String>,
    /// Embeddings endpoint base URL.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Vector dimension the backend produces.
    pub dimension: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Vector store selection. `provider` is `"memory"` or `"pgvector"`
/// (requires the `pgvector` feature and `database_url`).
#[derive(Debug, Clone, Deserialize)]
pub struct RetrieverConfig {
    /// Backend tag.
    pub provider: String,
    /// PostgreSQL connection string for the pgvector backend.
    pub database_url: Option<String>,
}

/// Retrieval parameters for the baseline strategy.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Candidates retrieved per query.
    pub top_k: usize,
    /// Minimum similarity for a chunk to be used.
    pub similarity_threshold: f32,
}

/// Daily cost budget settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetConfig {
    /// Daily spend ceiling in USD.
    pub daily_budget: f64,
    /// Warning threshold as a ratio of the daily budget.
    pub alert_threshold: f64,
}

/// Text chunking parameters for ingestion.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
}

impl Default for DocentConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                provider: "openrouter".to_string(),
                api_key: None,
                base_url: "https://openrouter.ai/api/v1".to_string(),
                model: "openai/gpt-4o-mini".to_string(),
                timeout_secs: 30,
            },
            embedding: EmbeddingConfig {
                provider: "http".to_string(),
                api_key: None,
                base_url: "https://openrouter.ai/api/v1".to_string(),
                model: "text-embedding-3-small".to_string(),
                dimension: 1536,
                timeout_secs: 30,
            },
            retriever: RetrieverConfig {
                provider: "memory".to_string(),
                database_url: None,
            },
            retrieval: RetrievalConfig {
                top_k: 10,
                similarity_threshold: 0.3,
            },
            budget: BudgetConfig {
                daily_budget: 50.0,
                alert_threshold: 0.8,
            },
            chunking: ChunkingConfig {
                chunk_size: 1200,
                chunk_overlap: 200,
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: &str) -> Result<T> {
    env_or(key, default)
        .parse()
        .map_err(|_| AppError::Configuration(format!("Invalid value for {}", key)))
}

impl DocentConfig {
    /// Load configuration from `.env` and environment variables, with the
    /// `Default` values as fallback.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            llm: LlmConfig {
                provider: env_or("LLM_PROVIDER", "openrouter"),
                api_key: env::var("OPENROUTER_API_KEY").ok(),
                base_url: env_or("LLM_BASE_URL", "https://openrouter.ai/api/v1"),
                model: env_or("LLM_MODEL", "openai/gpt-4o-mini"),
                timeout_secs: parse_env("LLM_TIMEOUT_SECS", "30")?,
            },
            embedding: EmbeddingConfig {
                provider: env_or("EMBEDDING_PROVIDER", "http"),
                api_key: env::var("EMBEDDING_API_KEY")
                    .or_else(|_| env::var("OPENROUTER_API_KEY"))
                    .ok(),
                base_url: env_or("EMBEDDING_BASE_URL", "https://openrouter.ai/api/v1"),
                model: env_or("EMBEDDING_MODEL", "text-embedding-3-small"),
                dimension: parse_env("EMBEDDING_DIMENSION", "1536")?,
                timeout_secs: parse_env("EMBEDDING_TIMEOUT_SECS", "30")?,
            },
            retriever: RetrieverConfig {
                provider: env_or("RETRIEVER_PROVIDER", "memory"),
                database_url: env::var("DATABASE_URL").ok(),
            },
            retrieval: RetrievalConfig {
                top_k: parse_env("RETRIEVAL_TOP_K", "10")?,
                similarity_threshold: parse_env("SIMILARITY_THRESHOLD", "0.3")?,
            },
            budget: BudgetConfig {
                daily_budget: parse_env("DAILY_BUDGET_USD", "50.0")?,
                alert_threshold: parse_env("BUDGET_ALERT_THRESHOLD", "0.8")?,
            },
            chunking: ChunkingConfig {
                chunk_size: parse_env("CHUNK_SIZE", "1200")?,
                chunk_overlap: parse_env("CHUNK_OVERLAP", "200")?,
            },
        })
    }
}
