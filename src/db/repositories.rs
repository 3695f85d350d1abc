//! Message and conversation persistence ports.
//!
//! The in-memory implementations back tests and single-process deployments.
//! Conversations and messages are stored separately; a conversation's
//! `messages` field is left to the caller to hydrate when needed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::types::{AppError, Conversation, Message, Result};

// ============================================================================
// Repository Ports
// ============================================================================

/// Persistence port for messages.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a message.
    async fn save(&self, message: &Message) -> Result<()>;

    /// Fetch a message by id.
    ///
    /// # Errors
    ///
    /// [`AppError::NotFound`] when no message has this id.
    async fn get(&self, id: Uuid) -> Result<Message>;

    /// Messages of a conversation in chronological order.
    ///
    /// With a limit, the most recent `limit` messages are returned, still
    /// oldest first.
    async fn list_by_conversation(
        &self,
        conversation_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<Message>>;

    /// Delete a message. Unknown ids are ignored.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Persistence port for conversations.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Persist a conversation (insert or overwrite).
    async fn save(&self, conversation: &Conversation) -> Result<()>;

    /// Fetch a conversation by id.
    ///
    /// # Errors
    ///
    /// [`AppError::NotFound`] when no conversation has this id.
    async fn get(&self, id: Uuid) -> Result<Conversation>;

    /// Conversations of a session, most recently updated first.
    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Conversation>>;

    /// Conversations of a user, most recently updated first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Conversation>>;

    /// Delete a conversation and its messages. Unknown ids are ignored.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

// ============================================================================
// In-Memory Implementations
// ============================================================================

/// In-memory message repository backed by a hash map.
#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: RwLock<HashMap<Uuid, Message>>,
}

impl InMemoryMessageRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn delete_by_conversation(&self, conversation_id: Uuid) {
        self.messages
            .write()
            .retain(|_, m| m.conversation_id != conversation_id);
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn save(&self, message: &Message) -> Result<()> {
        self.messages.write().insert(message.id, message.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Message> {
        self.messages
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Message {} not found", id)))
    }

    async fn list_by_conversation(
        &self,
        conversation_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .messages
            .read()
            .values()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);

        if let Some(limit) = limit {
            let start = messages.len().saturating_sub(limit);
            messages.drain(..start);
        }
        Ok(messages)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.messages.write().remove(&id);
        Ok(())
    }
}

/// In-memory conversation repository.
///
/// When constructed with a shared message repository handle, deleting a
/// conversation also deletes its messages, mirroring a foreign-key cascade.
#[derive(Default)]
pub struct InMemoryConversationRepository {
    conversations: RwLock<HashMap<Uuid, Conversation>>,
    messages: Option<Arc<InMemoryMessageRepository>>,
}

impl InMemoryConversationRepository {
    /// Create an empty repository without cascade.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository that cascades deletes into the given message
    /// repository.
    pub fn with_messages(messages: Arc<InMemoryMessageRepository>) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            messages: Some(messages),
        }
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn save(&self, conversation: &Conversation) -> Result<()> {
        self.conversations
            .write()
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Conversation> {
        self.conversations
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Conversation {} not found", id)))
    }

    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Conversation>> {
        let mut conversations: Vec<Conversation> = self
            .conversations
            .read()
            .values()
            .filter(|c| c.session_id.as_deref() == Some(session_id))
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Conversation>> {
        let mut conversations: Vec<Conversation> = self
            .conversations
            .read()
            .values()
            .filter(|c| c.user_id == Some(user_id))
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.conversations.write().remove(&id);
        if let Some(messages) = &self.messages {
            messages.delete_by_conversation(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageRole;

    #[tokio::test]
    async fn message_save_and_get() {
        let repo = InMemoryMessageRepository::new();
        let message = Message::new(Uuid::new_v4(), MessageRole::User, "hello");
        repo.save(&message).await.unwrap();

        let loaded = repo.get(message.id).await.unwrap();
        assert_eq!(loaded.content, "hello");

        let missing = repo.get(Uuid::new_v4()).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_returns_most_recent_in_order() {
        let repo = InMemoryMessageRepository::new();
        let conversation_id = Uuid::new_v4();

        for i in 0..5 {
            let mut message = Message::new(conversation_id, MessageRole::User, format!("m{}", i));
            message.created_at = chrono::Utc::now() + chrono::Duration::milliseconds(i);
            repo.save(&message).await.unwrap();
        }

        let all = repo.list_by_conversation(conversation_id, None).await.unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].content, "m0");

        let recent = repo
            .list_by_conversation(conversation_id, Some(2))
            .await
            .unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "m3");
        assert_eq!(recent[1].content, "m4");
    }

    #[tokio::test]
    async fn list_excludes_other_conversations() {
        let repo = InMemoryMessageRepository::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        repo.save(&Message::new(a, MessageRole::User, "in a"))
            .await
            .unwrap();
        repo.save(&Message::new(b, MessageRole::User, "in b"))
            .await
            .unwrap();

        let messages = repo.list_by_conversation(a, None).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "in a");
    }

    #[tokio::test]
    async fn conversation_lists_sorted_by_updated_at() {
        let repo = InMemoryConversationRepository::new();

        let mut older = Conversation::new("s1", "en", "older");
        older.updated_at = chrono::Utc::now() - chrono::Duration::minutes(5);
        repo.save(&older).await.unwrap();

        let newer = Conversation::new("s1", "en", "newer");
        repo.save(&newer).await.unwrap();

        let listed = repo.list_by_session("s1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "newer");
        assert_eq!(listed[1].title, "older");
    }

    #[tokio::test]
    async fn delete_cascades_into_messages() {
        let messages = Arc::new(InMemoryMessageRepository::new());
        let conversations = InMemoryConversationRepository::with_messages(messages.clone());

        let conversation = Conversation::new("s1", "en", "t");
        conversations.save(&conversation).await.unwrap();
        messages
            .save(&Message::new(conversation.id, MessageRole::User, "hi"))
            .await
            .unwrap();

        conversations.delete(conversation.id).await.unwrap();
        assert!(matches!(
            conversations.get(conversation.id).await,
            Err(AppError::NotFound(_))
        ));
        let remaining = messages
            .list_by_conversation(conversation.id, None)
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn list_by_user_filters() {
        let repo = InMemoryConversationRepository::new();
        let user = Uuid::new_v4();

        let mut owned = Conversation::new("s1", "en", "mine");
        owned.user_id = Some(user);
        repo.save(&owned).await.unwrap();
        repo.save(&Conversation::new("s1", "en", "anonymous"))
            .await
            .unwrap();

        let listed = repo.list_by_user(user).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "mine");
    }
}
