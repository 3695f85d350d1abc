//! Retrieval-augmented generation: strategy, prompts, citations, chunking.
//!
//! The pipeline per query is Retrieve → BuildPrompt → Generate →
//! ExtractCitations, composed by [`BaselineStrategy`]. Each stage is
//! stateless across queries; retry and fallback policy belong to the chat
//! service.

/// Text chunking for ingestion.
pub mod chunker;
/// Citation extraction from generated text.
pub mod citations;
/// Document parser port.
pub mod parser;
/// Language-aware system prompt rendering.
pub mod prompt;
/// Answer-generation strategies.
pub mod strategy;

pub use chunker::TextChunker;
pub use citations::extract_citations;
pub use parser::{DocumentParser, PlainTextParser};
pub use prompt::{is_supported_language, language_name, PromptTemplate, SUPPORTED_LANGUAGES};
pub use strategy::{
    BaselineStrategy, RagStrategy, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TOP_K,
};
