//! Static LLM model pricing table.
//!
//! Prices in USD per 1M tokens. Unknown models price at zero with a warning
//! rather than failing: cost accounting must never block a response.

use tracing::warn;

/// Per-model price entry, USD per 1M tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    /// Model identifier as reported by the provider.
    pub model: &'static str,
    /// Input (prompt) price.
    pub input: f64,
    /// Output (completion) price. Zero for embedding models.
    pub output: f64,
}

/// Known model prices, updated as of 2025.
pub const MODEL_PRICING: &[ModelPricing] = &[
    // OpenAI
    ModelPricing { model: "gpt-4o", input: 2.50, output: 10.00 },
    ModelPricing { model: "gpt-4o-mini", input: 0.150, output: 0.600 },
    ModelPricing { model: "gpt-4-turbo", input: 10.00, output: 30.00 },
    // Anthropic
    ModelPricing { model: "claude-3-5-sonnet", input: 3.00, output: 15.00 },
    ModelPricing { model: "claude-3-haiku", input: 0.25, output: 1.25 },
    // Meta Llama
    ModelPricing { model: "meta-llama/llama-3.2-3b-instruct", input: 0.06, output: 0.06 },
    ModelPricing { model: "meta-llama/llama-3-8b-instruct", input: 0.18, output: 0.18 },
    // Mistral
    ModelPricing { model: "mistralai/mistral-7b-instruct", input: 0.20, output: 0.20 },
    // Embeddings
    ModelPricing { model: "text-embedding-3-small", input: 0.020, output: 0.0 },
    ModelPricing { model: "text-embedding-3-large", input: 0.130, output: 0.0 },
];

/// Look up pricing for a model identifier.
pub fn model_pricing(model: &str) -> Option<&'static ModelPricing> {
    MODEL_PRICING.iter().find(|p| p.model == model)
}

/// Calculate the USD cost of one LLM call.
///
/// Unknown models cost 0.0 and log a warning.
pub fn calculate_cost(prompt_tokens: u64, completion_tokens: u64, model: &str) -> f64 {
    let Some(pricing) = model_pricing(model) else {
        warn!(model, "unknown model for pricing, charging 0.0");
        return 0.0;
    };

    let input_cost = (prompt_tokens as f64 / 1_000_000.0) * pricing.input;
    let output_cost = (completion_tokens as f64 / 1_000_000.0) * pricing.output;

    input_cost + output_cost
}

/// Pricing info for a model, including whether it is known.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// Model identifier.
    pub model: String,
    /// Input price per 1M tokens.
    pub input_price: f64,
    /// Output price per 1M tokens.
    pub output_price: f64,
    /// Whether the model is in the price table.
    pub known: bool,
}

/// Get pricing info for a model.
pub fn model_info(model: &str) -> ModelInfo {
    match model_pricing(model) {
        Some(pricing) => ModelInfo {
            model: model.to_string(),
            input_price: pricing.input,
            output_price: pricing.output,
            known: true,
        },
        None => ModelInfo {
            model: model.to_string(),
            input_price: 0.0,
            output_price: 0.0,
            known: false,
        },
    }
}
