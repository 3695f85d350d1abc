//! OpenRouter chat-completions client.
//!
//! Works against any OpenAI-compatible endpoint; OpenRouter is the default
//! because a single key routes to many models.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::client::{ChatMessage, GenerationOptions, LlmClient, TextStream};
use crate::types::{AppError, Result, TokenUsage};

/// OpenAI-compatible chat-completions client with token-usage capture.
pub struct OpenRouterClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    last_usage: RwLock<Option<TokenUsage>>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    usage: Option<UsageBody>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageBody {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

impl OpenRouterClient {
    /// Create a client for the given endpoint and model.
    ///
    /// The timeout applies per request; a timed-out call surfaces as an
    /// LLM provider error.
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(AppError::Configuration(
                "OpenRouter API key is required".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            last_usage: RwLock::new(None),
        })
    }

    fn request_body(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
        stream: bool,
    ) -> serde_json::Value {
        let messages: Vec<_> = messages
            .iter()
            .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
            .collect();

        json!({
            "model": self.model,
            "messages": messages,
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
            "stream": stream,
        })
    }

    async fn post_completions(&self, body: serde_json::Value) -> Result<reqwest::Response> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!(
                "API returned {}: {}",
                status, body
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<String> {
        debug!(
            model = %self.model,
            temperature = options.temperature,
            max_tokens = options.max_tokens,
            "generating completion"
        );

        let response = self
            .post_completions(self.request_body(messages, options, false))
            .await?;

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Invalid completion response: {}", e)))?;

        if let Some(usage) = &parsed.usage {
            let usage = TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            };
            info!(total_tokens = usage.total_tokens, "tokens used");
            *self.last_usage.write() = Some(usage);
        } else {
            *self.last_usage.write() = None;
        }

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.is_empty() {
            return Err(AppError::Llm("Empty response from LLM".to_string()));
        }
        Ok(content)
    }

    async fn stream(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<TextStream> {
        debug!(model = %self.model, "streaming completion");

        let response = self
            .post_completions(self.request_body(messages, options, true))
            .await?;

        let mut bytes = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut buffer = String::new();
            'outer: while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(AppError::Llm(format!("Stream error: {}", e)));
                        break 'outer;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                // SSE frames are newline-delimited "data: {...}" lines.
                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].trim().to_string();
                    buffer.drain(..=pos);

                    let Some(data) = line.strip_prefix("data:") else {
                        continue;
                    };
                    let data = data.trim();
                    if data == "[DONE]" {
                        break 'outer;
                    }

                    if let Ok(value) = serde_json::from_str::<serde_json::Value>(data) {
                        if let Some(content) =
                            value["choices"][0]["delta"]["content"].as_str()
                        {
                            if !content.is_empty() {
                                yield Ok(content.to_string());
                            }
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn last_usage(&self) -> Option<TokenUsage> {
        *self.last_usage.read()
    }
}
