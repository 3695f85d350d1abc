//! LLM provider clients and abstractions.
//!
//! This module provides a unified interface for chat-completion backends.
//! Provider-specific wire formats stay behind the [`LlmClient`] trait, so
//! the retrieval strategy and chat service work with any supported backend.
//!
//! # Architecture
//!
//! - [`LlmClient`] - the core trait all providers implement
//! - [`LlmProvider`] - runtime provider selection and client factory
//! - [`OpenRouterClient`] - OpenAI-compatible chat completions over HTTP
//! - [`FakeLlm`] - canned responses for tests and offline runs
//!
//! # Streaming
//!
//! `stream` returns a finite, non-restartable stream of text fragments;
//! each call produces a fresh generation.

/// Core LLM client trait, message and option types, provider factory.
pub mod client;
mod fake;
mod openrouter;

pub use client::{ChatMessage, GenerationOptions, LlmClient, LlmProvider, TextStream};
pub use fake::FakeLlm;
pub use openrouter::OpenRouterClient;
