//! RAG answer-generation strategies.
//!
//! A strategy runs one stateless pipeline per query:
//! retrieve, build prompt, generate, extract citations. Retries and
//! fallback policy live in the chat service, never here.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info, warn};

use super::citations::extract_citations;
use super::prompt::PromptTemplate;
use crate::db::{SearchFilters, VectorStore};
use crate::embeddings::EmbeddingProvider;
use crate::llm::{ChatMessage, GenerationOptions, LlmClient};
use crate::types::{
    Answer, AppError, Chunk, DocumentType, Message, Metadata, Result, Source, TokenUsage,
};

/// Default number of candidates retrieved per query.
pub const DEFAULT_TOP_K: usize = 10;
/// Default minimum similarity for a chunk to survive retrieval.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.3;

/// Answer-generation strategy port.
#[async_trait]
pub trait RagStrategy: Send + Sync {
    /// Generate a complete answer for a query.
    ///
    /// # Errors
    ///
    /// [`AppError::InsufficientContext`] when no chunk scores above the
    /// similarity threshold; provider errors propagate unchanged.
    async fn generate_answer(
        &self,
        query: &str,
        history: &[Message],
        language: &str,
        filters: Option<&SearchFilters>,
    ) -> Result<Answer>;

    /// Strategy name, recorded in [`Answer::method`].
    fn name(&self) -> &'static str;
}

/// Dense-retrieval baseline: cosine top-k, single generation pass, regex
/// citation extraction.
pub struct BaselineStrategy {
    embedder: Arc<dyn EmbeddingProvider>,
    retriever: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmClient>,
    template: PromptTemplate,
    top_k: usize,
    similarity_threshold: f32,
    options: GenerationOptions,
}

impl BaselineStrategy {
    /// Create a strategy with default retrieval parameters.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        retriever: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            embedder,
            retriever,
            llm,
            template: PromptTemplate::new(),
            top_k: DEFAULT_TOP_K,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            options: GenerationOptions::default(),
        }
    }

    /// Override the number of candidates retrieved per query.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Override the similarity threshold.
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Override the generation options passed to the LLM.
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Embed the query, search the store, and keep chunks above the
    /// threshold in descending-score order.
    pub async fn retrieve(
        &self,
        query: &str,
        filters: Option<&SearchFilters>,
    ) -> Result<Vec<Chunk>> {
        let query_embedding = self.embedder.embed_query(query).await?;
        let results = self
            .retriever
            .search(&query_embedding, self.top_k, filters)
            .await?;

        let chunks: Vec<Chunk> = results
            .into_iter()
            .filter(|r| r.score >= self.similarity_threshold)
            .map(|r| Chunk {
                content: r.content,
                document: r
                    .metadata
                    .get("document_title")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Unknown")
                    .to_string(),
                page: r
                    .metadata
                    .get("page_number")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as u32,
                section: r
                    .metadata
                    .get("section_title")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                score: r.score,
            })
            .collect();

        info!(
            count = chunks.len(),
            threshold = self.similarity_threshold,
            "retrieved chunks above threshold"
        );
        Ok(chunks)
    }

    /// Assemble the LLM message list: system prompt with context, the last
    /// 6 history messages in chronological order, then the current query.
    pub fn build_prompt(
        &self,
        query: &str,
        chunks: &[Chunk],
        history: &[Message],
        language: &str,
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len().min(6) + 2);
        messages.push(ChatMessage::system(
            self.template.render_system(chunks, language),
        ));

        let start = history.len().saturating_sub(6);
        for message in &history[start..] {
            messages.push(ChatMessage {
                role: message.role,
                content: message.content.clone(),
            });
        }

        messages.push(ChatMessage::user(query));
        messages
    }

    fn build_sources(&self, chunks: &[Chunk]) -> Vec<Source> {
        chunks
            .iter()
            .take(5)
            .map(|chunk| Source {
                chunk_id: format!("{}:{}", chunk.document, chunk.page),
                document_title: chunk.document.clone(),
                document_type: DocumentType::Other,
                page_number: Some(chunk.page),
                section_title: chunk.section.clone(),
                content: chunk.content.clone(),
                similarity_score: chunk.score,
                embedding_model: Some(self.embedder.model_name().to_string()),
            })
            .collect()
    }
}

#[async_trait]
impl RagStrategy for BaselineStrategy {
    async fn generate_answer(
        &self,
        query: &str,
        history: &[Message],
        language: &str,
        filters: Option<&SearchFilters>,
    ) -> Result<Answer> {
        let chunks = self.retrieve(query, filters).await?;
        if chunks.is_empty() {
            warn!(
                query = %query.chars().take(50).collect::<String>(),
                "no relevant chunks found"
            );
            return Err(AppError::InsufficientContext(
                "No relevant information found in the knowledge base".to_string(),
            ));
        }

        let messages = self.build_prompt(query, &chunks, history, language);

        let response = match self.llm.generate(&messages, &self.options).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "LLM generation failed");
                return Err(e);
            }
        };
        let usage = self.llm.last_usage().unwrap_or(TokenUsage::default());

        let citations = extract_citations(&response, &chunks);
        let sources = self.build_sources(&chunks);

        let mut metadata = Metadata::new();
        metadata.insert("chunks_retrieved".to_string(), json!(chunks.len()));
        metadata.insert("chunks_used".to_string(), json!(chunks.len()));
        metadata.insert(
            "top_similarity_score".to_string(),
            json!(chunks.first().map(|c| c.score).unwrap_or(0.0)),
        );
        metadata.insert("llm_model".to_string(), json!(self.llm.model_name()));
        metadata.insert(
            "embedding_model".to_string(),
            json!(self.embedder.model_name()),
        );
        metadata.insert("prompt_tokens".to_string(), json!(usage.prompt_tokens));
        metadata.insert(
            "completion_tokens".to_string(),
            json!(usage.completion_tokens),
        );
        metadata.insert("total_tokens".to_string(), json!(usage.total_tokens));
        metadata.insert(
            "strategy_config".to_string(),
            json!({
                "top_k": self.top_k,
                "threshold": self.similarity_threshold,
            }),
        );

        info!(
            citations = citations.len(),
            chunks = chunks.len(),
            "generated answer"
        );

        Ok(Answer {
            content: response,
            citations,
            sources,
            method: self.name().to_string(),
            context_used: true,
            metadata,
        })
    }

    fn name(&self) -> &'static str {
        "baseline"
    }
}
