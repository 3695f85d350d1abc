//! Service container: builds a wired [`ChatService`] from configuration.
//!
//! Providers are selected by config tag, never by globals; every test can
//! build a fresh container. The container owns nothing after `build()`;
//! collaborators are shared via `Arc` so callers can keep handles to the
//! repositories and budget monitor for inspection.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::budget::{BudgetMonitor, InMemoryBudgetMonitor};
use crate::chat::ChatService;
use crate::config::DocentConfig;
use crate::db::{
    ConversationRepository, InMemoryConversationRepository, InMemoryMessageRepository,
    MessageRepository, VectorStore, VectorStoreProvider,
};
use crate::embeddings::{EmbeddingProvider, FakeEmbedding, HttpEmbedding};
use crate::llm::{LlmClient, LlmProvider};
use crate::rag::BaselineStrategy;
use crate::types::{AppError, Result};

/// Wires providers, stores, repositories and the chat service from a
/// [`DocentConfig`].
pub struct ServiceContainer {
    config: DocentConfig,
}

impl ServiceContainer {
    /// Create a container over the given configuration.
    pub fn new(config: DocentConfig) -> Self {
        Self { config }
    }

    /// Build the LLM client named by `llm.provider`.
    pub fn llm_client(&self) -> Result<Arc<dyn LlmClient>> {
        let llm = &self.config.llm;
        let provider = match llm.provider.as_str() {
            "openrouter" => LlmProvider::OpenRouter {
                api_key: llm.api_key.clone().ok_or_else(|| {
                    AppError::Configuration("OPENROUTER_API_KEY is required".to_string())
                })?,
                base_url: llm.base_url.clone(),
                model: llm.model.clone(),
                timeout: Duration::from_secs(llm.timeout_secs),
            },
            "fake" => LlmProvider::Fake {
                response: "This is a canned response.".to_string(),
            },
            other => {
                return Err(AppError::Configuration(format!(
                    "Unknown LLM provider '{}'",
                    other
                )))
            }
        };

        info!(provider = provider.name(), "configured LLM client");
        Ok(Arc::from(provider.create_client()?))
    }

    /// Build the embedding provider named by `embedding.provider`.
    pub fn embedding_provider(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        let embedding = &self.config.embedding;
        match embedding.provider.as_str() {
            "http" => {
                let api_key = embedding.api_key.clone().ok_or_else(|| {
                    AppError::Configuration("Embedding API key is required".to_string())
                })?;
                Ok(Arc::new(HttpEmbedding::new(
                    embedding.base_url.clone(),
                    api_key,
                    embedding.model.clone(),
                    embedding.dimension,
                    Duration::from_secs(embedding.timeout_secs),
                )?))
            }
            "fake" => Ok(Arc::new(FakeEmbedding::new(embedding.dimension))),
            #[cfg(feature = "local-embeddings")]
            "local" => Ok(Arc::new(crate::embeddings::LocalEmbedding::new()?)),
            other => Err(AppError::Configuration(format!(
                "Unknown embedding provider '{}'",
                other
            ))),
        }
    }

    /// Build the vector store named by `retriever.provider`.
    pub async fn vector_store(&self) -> Result<Arc<dyn VectorStore>> {
        let provider = match self.config.retriever.provider.as_str() {
            "memory" => VectorStoreProvider::Memory,
            #[cfg(feature = "pgvector")]
            "pgvector" => VectorStoreProvider::PgVector {
                connection_string: self.config.retriever.database_url.clone().ok_or_else(
                    || AppError::Configuration("DATABASE_URL is required for pgvector".to_string()),
                )?,
                dimension: self.config.embedding.dimension,
            },
            other => {
                return Err(AppError::Configuration(format!(
                    "Unknown retriever provider '{}'",
                    other
                )))
            }
        };
        Ok(Arc::from(provider.create_store().await?))
    }

    /// Build the full chat service with in-memory repositories and budget
    /// ledger, returning handles to the shared collaborators.
    pub async fn build(&self) -> Result<BuiltServices> {
        let embedder = self.embedding_provider()?;
        let store = self.vector_store().await?;
        let llm = self.llm_client()?;

        let strategy = Arc::new(
            BaselineStrategy::new(embedder, store.clone(), llm)
                .with_top_k(self.config.retrieval.top_k)
                .with_similarity_threshold(self.config.retrieval.similarity_threshold),
        );

        let messages: Arc<InMemoryMessageRepository> = Arc::new(InMemoryMessageRepository::new());
        let conversations = Arc::new(InMemoryConversationRepository::with_messages(
            messages.clone(),
        ));
        let budget = Arc::new(InMemoryBudgetMonitor::with_threshold(
            self.config.budget.daily_budget,
            self.config.budget.alert_threshold,
        ));

        let service = ChatService::new(
            strategy,
            messages.clone() as Arc<dyn MessageRepository>,
            conversations.clone() as Arc<dyn ConversationRepository>,
            budget.clone() as Arc<dyn BudgetMonitor>,
        );

        Ok(BuiltServices {
            service,
            vector_store: store,
            messages,
            conversations,
            budget,
        })
    }
}

/// A wired chat service plus handles to its shared collaborators.
pub struct BuiltServices {
    /// The orchestration service.
    pub service: ChatService,
    /// Vector store used by the strategy, for ingestion.
    pub vector_store: Arc<dyn VectorStore>,
    /// Message repository shared with the service.
    pub messages: Arc<InMemoryMessageRepository>,
    /// Conversation repository shared with the service.
    pub conversations: Arc<InMemoryConversationRepository>,
    /// Budget ledger shared with the service.
    pub budget: Arc<InMemoryBudgetMonitor>,
}
