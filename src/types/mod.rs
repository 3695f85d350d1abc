//! Core domain types and error handling.
//!
//! Value objects ([`Citation`], [`Source`], [`Chunk`], [`ChunkResult`],
//! [`Answer`]) are immutable and compared structurally. Entities
//! ([`Message`], [`Conversation`]) carry an identity and are mutated only
//! through their owner or the persistence layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Free-form metadata attached to messages, chunks and answers.
pub type Metadata = Map<String, Value>;

// ============= Enums =============

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions (prompt preamble).
    System,
    /// End-user input.
    User,
    /// Model-generated reply.
    Assistant,
}

impl MessageRole {
    /// Wire-level role string ("system" / "user" / "assistant").
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// Document classification carried in chunk metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum DocumentType {
    Manual,
    Datasheet,
    FirmwareNotes,
    QuickStart,
    Troubleshooting,
    #[default]
    Other,
}

// ============= Value Objects =============

/// A reference from generated text back to a specific document page.
///
/// Immutable value object; two citations with identical fields are
/// interchangeable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Title of the cited document.
    pub document: String,
    /// Page number within the document.
    pub page: u32,
    /// Section title, when the chunk carried one.
    pub section: Option<String>,
    /// Snippet of the cited chunk (first 200 chars).
    pub text: String,
    /// Similarity score of the chunk the citation resolved to.
    pub score: f32,
}

impl std::fmt::Display for Citation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.section {
            Some(section) => write!(f, "[{}, Page {}, {}]", self.document, self.page, section),
            None => write!(f, "[{}, Page {}]", self.document, self.page),
        }
    }
}

/// A document chunk used as answer context, with full provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Identifier of the underlying chunk record.
    pub chunk_id: String,
    /// Title of the source document.
    pub document_title: String,
    /// Document classification.
    pub document_type: DocumentType,
    /// Page number, when known.
    pub page_number: Option<u32>,
    /// Section title within the page.
    pub section_title: String,
    /// Chunk text.
    pub content: String,
    /// Cosine similarity against the query.
    pub similarity_score: f32,
    /// Embedding model that produced the stored vector.
    pub embedding_model: Option<String>,
}

impl Source {
    /// Truncated content for display, cut on a char boundary.
    pub fn content_preview(&self, max_length: usize) -> String {
        if self.content.chars().count() <= max_length {
            return self.content.clone();
        }
        let truncated: String = self.content.chars().take(max_length).collect();
        format!("{}...", truncated)
    }
}

/// A text chunk with retrieval provenance, the unit of retrieval.
///
/// Transient: produced per query and discarded once the [`Answer`] is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text.
    pub content: String,
    /// Title of the document the chunk came from.
    pub document: String,
    /// Page number within the document.
    pub page: u32,
    /// Section title, empty when unknown.
    pub section: String,
    /// Similarity score against the query.
    pub score: f32,
}

impl Chunk {
    /// Whitespace-separated word count of the chunk text.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// A single similarity search hit from a vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkResult {
    /// Identifier of the matched chunk.
    pub chunk_id: Uuid,
    /// Chunk text.
    pub content: String,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f32,
    /// Stored chunk metadata (document_title, page_number, section_title, ...).
    pub metadata: Metadata,
}

// ============= Entities =============

/// A message in a conversation. Citations live inside `metadata`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier.
    pub id: Uuid,
    /// Owning conversation.
    pub conversation_id: Uuid,
    /// Who authored the message.
    pub role: MessageRole,
    /// Message text.
    pub content: String,
    /// Free-form metadata (citations, token counts, fallback flag).
    pub metadata: Metadata,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message in a conversation with empty metadata.
    pub fn new(conversation_id: Uuid, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            role,
            content: content.into(),
            metadata: Metadata::new(),
            created_at: Utc::now(),
        }
    }

    /// Append a citation to the `citations` array in metadata.
    pub fn add_citation(&mut self, citation: &Citation) {
        let entry = serde_json::to_value(citation).unwrap_or(Value::Null);
        match self.metadata.get_mut("citations") {
            Some(Value::Array(citations)) => citations.push(entry),
            _ => {
                self.metadata
                    .insert("citations".to_string(), Value::Array(vec![entry]));
            }
        }
    }

    /// Citations previously flattened into metadata, if any.
    pub fn citations(&self) -> Vec<Citation> {
        self.metadata
            .get("citations")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }
}

/// A conversation thread owning an ordered sequence of messages.
///
/// Invariant: `updated_at` is never older than any contained message's
/// `created_at`; the chat service touches it after every message save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Conversation language code (en, de, fr, es).
    pub language: String,
    /// Session the conversation belongs to.
    pub session_id: Option<String>,
    /// Owning user, when authenticated.
    pub user_id: Option<Uuid>,
    /// Messages in chronological order.
    pub messages: Vec<Message>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent message save.
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create an empty conversation for a session.
    pub fn new(session_id: impl Into<String>, language: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            language: language.into(),
            session_id: Some(session_id.into()),
            user_id: None,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and touch `updated_at`.
    pub fn add_message(&mut self, role: MessageRole, content: impl Into<String>) -> &Message {
        let message = Message::new(self.id, role, content);
        self.updated_at = message.created_at;
        self.messages.push(message);
        self.messages.last().expect("just pushed")
    }

    /// Number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// The most recent `limit` messages, oldest first.
    pub fn get_history(&self, limit: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }
}

// ============= Result Objects =============

/// Token counts reported by an LLM provider for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u64,
    /// Tokens generated.
    pub completion_tokens: u64,
    /// Prompt + completion.
    pub total_tokens: u64,
}

/// Result of RAG answer generation.
///
/// Invariant: `context_used == false` implies `citations` and `sources`
/// are empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Generated answer text.
    pub content: String,
    /// Citations resolved from the answer text.
    pub citations: Vec<Citation>,
    /// Up to 5 retrieved chunks, most relevant first.
    pub sources: Vec<Source>,
    /// Name of the strategy that produced the answer ("baseline", "fallback").
    pub method: String,
    /// Whether retrieved context informed the answer.
    pub context_used: bool,
    /// Token counts, similarity scores, model identifiers.
    pub metadata: Metadata,
}

impl Answer {
    /// Whether any citation was resolved.
    pub fn has_citations(&self) -> bool {
        !self.citations.is_empty()
    }

    /// Number of sources attached to the answer.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Serialize to a JSON value for API payloads and logs.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Extracted content of a parsed document, page-segmented.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentContent {
    /// Parsed pages in document order.
    pub pages: Vec<DocumentPage>,
    /// Number of pages.
    pub page_count: usize,
    /// Total character count across pages.
    pub total_chars: usize,
    /// Name of the extraction backend.
    pub extraction_method: String,
}

/// One page of extracted document text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPage {
    /// 1-based page number.
    pub number: u32,
    /// UTF-8 page text.
    pub text: String,
    /// Section title, when the parser detected one.
    pub section_title: Option<String>,
}

// ============= Error Types =============

/// Unified error type for the engine.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad input or budget exceeded; user-correctable.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Retrieval produced no chunks above the similarity threshold.
    ///
    /// An expected outcome, recovered into a fallback answer by the chat
    /// service; never surfaced to callers as a failure.
    #[error("Insufficient context: {0}")]
    InsufficientContext(String),

    /// Vector dimension contract violation. Always fatal; indicates a
    /// provider/store configuration mismatch.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Embedding backend failure.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// LLM backend failure (including timeouts).
    #[error("LLM provider error: {0}")]
    Llm(String),

    /// Vector store failure.
    #[error("Retriever error: {0}")]
    Retriever(String),

    /// Persistence layer failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unclassified internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citation_equality_is_structural() {
        let a = Citation {
            document: "Manual X".to_string(),
            page: 12,
            section: Some("Install".to_string()),
            text: "snippet".to_string(),
            score: 0.9,
        };
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn citation_display_includes_section() {
        let citation = Citation {
            document: "Manual X".to_string(),
            page: 3,
            section: Some("Setup".to_string()),
            text: String::new(),
            score: 0.0,
        };
        assert_eq!(citation.to_string(), "[Manual X, Page 3, Setup]");

        let without = Citation {
            section: None,
            ..citation
        };
        assert_eq!(without.to_string(), "[Manual X, Page 3]");
    }

    #[test]
    fn message_citation_roundtrip() {
        let mut message = Message::new(Uuid::new_v4(), MessageRole::Assistant, "answer");
        let citation = Citation {
            document: "Guide".to_string(),
            page: 1,
            section: None,
            text: "text".to_string(),
            score: 0.5,
        };
        message.add_citation(&citation);
        message.add_citation(&citation);

        let citations = message.citations();
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0], citation);
    }

    #[test]
    fn conversation_add_message_touches_updated_at() {
        let mut conversation = Conversation::new("session-1", "en", "Test");
        let before = conversation.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(2));

        conversation.add_message(MessageRole::User, "hello");
        assert!(conversation.updated_at >= before);
        assert_eq!(
            conversation.updated_at,
            conversation.messages.last().unwrap().created_at
        );
    }

    #[test]
    fn conversation_history_returns_most_recent() {
        let mut conversation = Conversation::new("s", "en", "");
        for i in 0..8 {
            conversation.add_message(MessageRole::User, format!("msg {}", i));
        }
        let history = conversation.get_history(3);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].content, "msg 5");
        assert_eq!(history[2].content, "msg 7");
    }

    #[test]
    fn source_preview_truncates_on_char_boundary() {
        let source = Source {
            chunk_id: "c1".to_string(),
            document_title: "Doc".to_string(),
            document_type: DocumentType::Other,
            page_number: Some(1),
            section_title: String::new(),
            content: "ä".repeat(200),
            similarity_score: 0.0,
            embedding_model: None,
        };
        let preview = source.content_preview(150);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 153);
    }
}
