//! # Docent - document-grounded RAG chat engine
//!
//! A retrieval-augmented-generation engine for answering questions over a
//! document corpus, with conversation state, cost budgeting, and citation
//! extraction. Docent is a library: embed it behind your own transport.
//!
//! ## Overview
//!
//! One chat turn flows through the [`chat::ChatService`]:
//! embed the query, search a [`db::VectorStore`] for the most similar
//! chunks, render a language-aware prompt, generate once through an
//! [`llm::LlmClient`], resolve `[Document, Page N]` citations against the
//! retrieved chunks, and persist both sides of the exchange.
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use docent::{DocentConfig, ServiceContainer};
//!
//! #[tokio::main]
//! async fn main() -> docent::Result<()> {
//!     let config = DocentConfig::from_env()?;
//!     let built = ServiceContainer::new(config).build().await?;
//!
//!     let conversation = built
//!         .service
//!         .create_conversation("session-1", "en", "Router help")
//!         .await?;
//!     let answer = built
//!         .service
//!         .answer_question(conversation.id, "How do I reset the router?", "en")
//!         .await?;
//!     println!("{}", answer.content);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `pgvector` | PostgreSQL/pgvector vector store backend |
//! | `local-embeddings` | Local ONNX embedding models via fastembed |
//!
//! ## Modules
//!
//! - [`types`] - Domain model (chunks, citations, messages, answers, errors)
//! - [`embeddings`] - Embedding provider port and backends
//! - [`llm`] - LLM client port, OpenRouter-compatible backend, streaming
//! - [`db`] - Vector stores and conversation/message repositories
//! - [`rag`] - Baseline strategy, prompts, citation extraction, chunking
//! - [`chat`] - Turn orchestration, budget gate, fallback answers
//! - [`budget`] - Daily cost monitoring
//! - [`pricing`] - Static per-model token pricing

#![warn(missing_docs)]

/// Daily cost budget monitoring.
pub mod budget;
/// Chat turn orchestration.
pub mod chat;
/// Engine configuration.
pub mod config;
/// Service wiring from configuration.
pub mod container;
/// Vector stores and persistence ports.
pub mod db;
/// Embedding provider port and backends.
pub mod embeddings;
/// LLM client port and backends.
pub mod llm;
/// Per-model token pricing.
pub mod pricing;
/// Retrieval-augmented generation pipeline.
pub mod rag;
/// Core domain types and error handling.
pub mod types;

// Re-export commonly used types
pub use budget::{AlertLevel, BudgetMonitor, BudgetStatus, InMemoryBudgetMonitor};
pub use chat::ChatService;
pub use config::DocentConfig;
pub use container::{BuiltServices, ServiceContainer};
pub use db::{MemoryVectorStore, SearchFilters, VectorStore, VectorStoreProvider};
pub use embeddings::EmbeddingProvider;
pub use llm::{ChatMessage, GenerationOptions, LlmClient, LlmProvider};
pub use rag::{BaselineStrategy, PromptTemplate, RagStrategy, TextChunker};
pub use types::{
    Answer, AppError, Chunk, ChunkResult, Citation, Conversation, Message, MessageRole, Result,
    Source, TokenUsage,
};
