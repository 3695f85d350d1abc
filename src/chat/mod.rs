//! Chat orchestration service.
//!
//! One `answer_question` call is one turn: validate, enforce the daily
//! budget, load state, run the strategy, persist both sides of the
//! exchange, record cost and latency. The user message is saved before
//! generation, so a failed generation never loses the question.

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::budget::{AlertLevel, BudgetMonitor, CostRecord};
use crate::db::{ConversationRepository, MessageRepository};
use crate::pricing::calculate_cost;
use crate::rag::{is_supported_language, RagStrategy};
use crate::types::{Answer, AppError, Conversation, Message, MessageRole, Metadata, Result};

/// Number of prior messages passed to the strategy as history.
const HISTORY_LIMIT: usize = 10;

/// Orchestrates chat turns over a RAG strategy and persistence ports.
pub struct ChatService {
    strategy: Arc<dyn RagStrategy>,
    messages: Arc<dyn MessageRepository>,
    conversations: Arc<dyn ConversationRepository>,
    budget: Arc<dyn BudgetMonitor>,
}

impl ChatService {
    /// Wire a service from its collaborators.
    pub fn new(
        strategy: Arc<dyn RagStrategy>,
        messages: Arc<dyn MessageRepository>,
        conversations: Arc<dyn ConversationRepository>,
        budget: Arc<dyn BudgetMonitor>,
    ) -> Self {
        Self {
            strategy,
            messages,
            conversations,
            budget,
        }
    }

    /// Answer a user question within a conversation.
    ///
    /// # Errors
    ///
    /// [`AppError::Validation`] for an empty query or an exhausted daily
    /// budget; [`AppError::NotFound`] for an unknown conversation. Strategy
    /// failures other than insufficient context propagate after the user
    /// message has been saved.
    pub async fn answer_question(
        &self,
        conversation_id: Uuid,
        query: &str,
        language: &str,
    ) -> Result<Answer> {
        let started = Instant::now();

        if query.trim().is_empty() {
            return Err(AppError::Validation("Query cannot be empty".to_string()));
        }

        let language = if is_supported_language(language) {
            language
        } else {
            warn!(language, "unsupported language, defaulting to 'en'");
            "en"
        };

        // Budget gate runs before any provider work so an exhausted budget
        // never incurs LLM cost.
        let status = self.budget.check_budget().await?;
        if status.alert_level == AlertLevel::Critical {
            warn!(
                total_cost = status.total_cost,
                daily_budget = status.daily_budget,
                "daily budget exceeded, rejecting request"
            );
            return Err(AppError::Validation("Daily budget exceeded".to_string()));
        }

        let mut conversation = self.conversations.get(conversation_id).await?;
        info!(%conversation_id, "processing query");

        let user_message = Message::new(conversation_id, MessageRole::User, query);
        self.messages.save(&user_message).await?;

        let history = self
            .messages
            .list_by_conversation(conversation_id, Some(HISTORY_LIMIT))
            .await?;

        match self
            .strategy
            .generate_answer(query, &history, language, None)
            .await
        {
            Ok(answer) => {
                let assistant_message = self.build_assistant_message(conversation_id, &answer);
                self.messages.save(&assistant_message).await?;

                conversation.updated_at = assistant_message.created_at;
                self.conversations.save(&conversation).await?;

                self.record_cost(&answer, started).await;

                info!(
                    citations = answer.citations.len(),
                    "successfully generated answer"
                );
                Ok(answer)
            }

            Err(AppError::InsufficientContext(_)) => {
                warn!(
                    query = %query.chars().take(50).collect::<String>(),
                    "no context found, returning fallback answer"
                );

                let content = fallback_answer(language);
                let mut assistant_message =
                    Message::new(conversation_id, MessageRole::Assistant, content);
                assistant_message
                    .metadata
                    .insert("fallback".to_string(), json!(true));
                assistant_message
                    .metadata
                    .insert("error".to_string(), json!("insufficient_context"));
                self.messages.save(&assistant_message).await?;

                conversation.updated_at = assistant_message.created_at;
                self.conversations.save(&conversation).await?;

                let mut metadata = Metadata::new();
                metadata.insert("error".to_string(), json!("insufficient_context"));
                Ok(Answer {
                    content: fallback_answer(language).to_string(),
                    citations: Vec::new(),
                    sources: Vec::new(),
                    method: "fallback".to_string(),
                    context_used: false,
                    metadata,
                })
            }

            // The user message stays saved; the question is not lost.
            Err(e) => {
                error!(error = %e, "error generating answer");
                Err(e)
            }
        }
    }

    fn build_assistant_message(&self, conversation_id: Uuid, answer: &Answer) -> Message {
        let mut message = Message::new(conversation_id, MessageRole::Assistant, &answer.content);
        for citation in &answer.citations {
            message.add_citation(citation);
        }
        message
            .metadata
            .insert("sources_count".to_string(), json!(answer.sources.len()));
        message
            .metadata
            .insert("method".to_string(), json!(answer.method));
        for (key, value) in &answer.metadata {
            message.metadata.insert(key.clone(), value.clone());
        }
        message
    }

    /// Compute and record the turn's cost. Accounting failures are logged,
    /// never surfaced to the caller.
    async fn record_cost(&self, answer: &Answer, started: Instant) {
        let model = answer
            .metadata
            .get("llm_model")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        let prompt_tokens = answer
            .metadata
            .get("prompt_tokens")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let completion_tokens = answer
            .metadata
            .get("completion_tokens")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let cost = calculate_cost(prompt_tokens, completion_tokens, &model);
        let latency_ms = started.elapsed().as_millis() as u64;

        info!(
            model = %model,
            prompt_tokens,
            completion_tokens,
            cost_usd = cost,
            latency_ms,
            "answered question"
        );

        let record = CostRecord {
            model,
            prompt_tokens,
            completion_tokens,
            estimated_cost_usd: cost,
            latency_ms,
            created_at: chrono::Utc::now(),
        };
        if let Err(e) = self.budget.record_cost(record).await {
            warn!(error = %e, "failed to record cost");
        }
    }

    /// Create a new conversation for a session.
    pub async fn create_conversation(
        &self,
        session_id: &str,
        language: &str,
        title: &str,
    ) -> Result<Conversation> {
        let title = if title.is_empty() {
            "New conversation"
        } else {
            title
        };
        let conversation = Conversation::new(session_id, language, title);
        self.conversations.save(&conversation).await?;
        info!(conversation_id = %conversation.id, "created conversation");
        Ok(conversation)
    }

    /// Fetch a conversation by id.
    pub async fn get_conversation(&self, conversation_id: Uuid) -> Result<Conversation> {
        self.conversations.get(conversation_id).await
    }

    /// Conversations of a session, most recently updated first.
    pub async fn list_session_conversations(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Conversation>> {
        let mut conversations = self.conversations.list_by_session(session_id).await?;
        conversations.truncate(limit);
        Ok(conversations)
    }

    /// Conversations of a user, most recently updated first.
    pub async fn list_user_conversations(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Conversation>> {
        let mut conversations = self.conversations.list_by_user(user_id).await?;
        conversations.truncate(limit);
        Ok(conversations)
    }

    /// Delete a conversation and its messages.
    pub async fn delete_conversation(&self, conversation_id: Uuid) -> Result<()> {
        self.conversations.delete(conversation_id).await?;
        info!(%conversation_id, "deleted conversation");
        Ok(())
    }
}

/// Localized answer used when retrieval finds nothing relevant.
fn fallback_answer(language: &str) -> &'static str {
    match language {
        "de" => {
            "Ich konnte keine relevanten Informationen in der Wissensdatenbank finden, \
             um Ihre Frage zu beantworten. Könnten Sie umformulieren oder etwas anderes fragen?"
        }
        "fr" => {
            "Je n'ai pas trouvé d'informations pertinentes dans la base de connaissances \
             pour répondre à votre question. Pourriez-vous reformuler ou poser une autre question?"
        }
        "es" => {
            "No pude encontrar información relevante en la base de conocimientos para \
             responder tu pregunta. ¿Podrías reformular o preguntar algo más?"
        }
        _ => {
            "I couldn't find relevant information in the knowledge base to answer your \
             question. Could you rephrase or ask something else?"
        }
    }
}
