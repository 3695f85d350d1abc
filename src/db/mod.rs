//! Storage abstractions: vector stores and repository ports.
//!
//! The [`VectorStore`] trait covers similarity search over embedded chunks;
//! two backends conform to it: the brute-force [`MemoryVectorStore`] and a
//! pgvector-backed store behind the `pgvector` feature. Message and
//! conversation persistence are consumed through the repository ports in
//! [`repositories`], with in-memory reference implementations.

#[cfg(feature = "pgvector")]
pub mod pgvector;
/// Message and conversation repository ports and in-memory implementations.
pub mod repositories;
/// Vector store trait, provider configuration and the in-memory backend.
pub mod vectorstore;

#[cfg(feature = "pgvector")]
pub use pgvector::PgVectorStore;
pub use repositories::{
    ConversationRepository, InMemoryConversationRepository, InMemoryMessageRepository,
    MessageRepository,
};
pub use vectorstore::{MemoryVectorStore, SearchFilters, VectorStore, VectorStoreProvider};
