//! Canned-response LLM client for tests and offline development.

use async_trait::async_trait;
use futures::stream;

use super::client::{ChatMessage, GenerationOptions, LlmClient, TextStream};
use crate::types::{AppError, Result, TokenUsage};

/// LLM client that always returns a fixed response.
pub struct FakeLlm {
    response: String,
    usage: Option<TokenUsage>,
    should_fail: bool,
}

impl FakeLlm {
    /// Client that returns the given response with no usage reporting.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            usage: None,
            should_fail: false,
        }
    }

    /// Client that also reports token usage after each call.
    pub fn with_usage(response: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            response: response.into(),
            usage: Some(usage),
            should_fail: false,
        }
    }

    /// Client that fails every call.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            usage: None,
            should_fail: true,
        }
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn generate(
        &self,
        _messages: &[ChatMessage],
        _options: &GenerationOptions,
    ) -> Result<String> {
        if self.should_fail {
            return Err(AppError::Llm("Fake LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    async fn stream(
        &self,
        _messages: &[ChatMessage],
        _options: &GenerationOptions,
    ) -> Result<TextStream> {
        if self.should_fail {
            return Err(AppError::Llm("Fake LLM failure".to_string()));
        }

        let fragments: Vec<Result<String>> = self
            .response
            .split_inclusive(' ')
            .map(|s| Ok(s.to_string()))
            .collect();
        Ok(Box::pin(stream::iter(fragments)))
    }

    fn model_name(&self) -> &str {
        "fake-llm"
    }

    fn last_usage(&self) -> Option<TokenUsage> {
        self.usage
    }
}
