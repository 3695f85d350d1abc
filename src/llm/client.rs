//! LLM client trait and provider factory.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::types::{MessageRole, Result, TokenUsage};

/// A role-tagged message sent to an LLM backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role.
    pub role: MessageRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// System message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// User message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Per-call generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Sampling temperature (0.0-1.0).
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 1000,
        }
    }
}

/// Lazy stream of generated text fragments.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Generic LLM client trait for provider abstraction.
///
/// All providers implement this trait, allowing the strategy and chat
/// service to swap backends without code changes.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for the given messages.
    async fn generate(&self, messages: &[ChatMessage], options: &GenerationOptions)
        -> Result<String>;

    /// Stream a completion as it is generated.
    ///
    /// The stream is finite and not restartable; each call produces a
    /// fresh generation.
    async fn stream(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<TextStream>;

    /// Model identifier for cost accounting and answer metadata.
    fn model_name(&self) -> &str;

    /// Token usage from the most recent call, when the backend reports it.
    ///
    /// Providers without usage reporting return `None`; callers treat that
    /// as zero usage.
    fn last_usage(&self) -> Option<TokenUsage> {
        None
    }
}

/// Provider enum for runtime selection.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// OpenRouter or any OpenAI-compatible chat-completions API.
    OpenRouter {
        /// API key.
        api_key: String,
        /// Base URL (e.g., `https://openrouter.ai/api/v1`).
        base_url: String,
        /// Model identifier.
        model: String,
        /// Outbound request timeout.
        timeout: Duration,
    },

    /// Canned-response client for tests and offline development.
    Fake {
        /// Response text returned by every call.
        response: String,
    },
}

impl LlmProvider {
    /// Create a client instance for this provider.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the underlying HTTP client
    /// cannot be constructed.
    pub fn create_client(&self) -> Result<Box<dyn LlmClient>> {
        match self {
            LlmProvider::OpenRouter {
                api_key,
                base_url,
                model,
                timeout,
            } => Ok(Box::new(super::openrouter::OpenRouterClient::new(
                api_key.clone(),
                base_url.clone(),
                model.clone(),
                *timeout,
            )?)),

            LlmProvider::Fake { response } => Ok(Box::new(super::fake::FakeLlm::new(response))),
        }
    }

    /// Human-readable provider name.
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::OpenRouter { .. } => "OpenRouter",
            LlmProvider::Fake { .. } => "Fake",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_message_constructors_set_roles() {
        assert_eq!(ChatMessage::system("s").role, MessageRole::System);
        assert_eq!(ChatMessage::user("u").role, MessageRole::User);
        assert_eq!(ChatMessage::assistant("a").role, MessageRole::Assistant);
    }

    #[test]
    fn default_options_match_reference_defaults() {
        let options = GenerationOptions::default();
        assert_eq!(options.temperature, 0.1);
        assert_eq!(options.max_tokens, 1000);
    }

    #[test]
    fn provider_names() {
        let provider = LlmProvider::Fake {
            response: "hi".to_string(),
        };
        assert_eq!(provider.name(), "Fake");

        let provider = LlmProvider::OpenRouter {
            api_key: "k".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(provider.name(), "OpenRouter");
    }

    #[test]
    fn fake_provider_creates_client() {
        let provider = LlmProvider::Fake {
            response: "hello".to_string(),
        };
        let client = provider.create_client().unwrap();
        assert_eq!(client.model_name(), "fake-llm");
    }
}
