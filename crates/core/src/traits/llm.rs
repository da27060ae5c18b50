//! L-M Model Gateway traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::Result;

/// LLM client interface.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for a system/user prompt pair.
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse>;

    /// Identifier used in logs and metrics (e.g. `openai:gpt-4o-mini`).
    fn model_id(&self) -> String {
        "unknown".to_string()
    }
}

/// One inference call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Instructions for the model.
    pub system_prompt: String,
    /// The user-facing prompt.
    pub user_prompt: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Completion token budget.
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        temperature: f64,
        max_tokens: u32,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            temperature,
            max_tokens,
        }
    }

    /// Same request with a different token budget.
    pub fn with_max_tokens(&self, max_tokens: u32) -> Self {
        Self {
            max_tokens,
            ..self.clone()
        }
    }
}

/// Response from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Generated content.
    pub content: String,
    /// Finish reason.
    pub finish_reason: String,
    /// Token usage.
    pub usage: LlmUsage,
}

impl LlmResponse {
    /// A plain `stop` response with estimated usage.
    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        let completion_tokens = (content.len() / 4) as u64;
        Self {
            content,
            finish_reason: "stop".to_string(),
            usage: LlmUsage {
                prompt_tokens: 0,
                completion_tokens,
                total_tokens: completion_tokens,
            },
        }
    }
}

/// Token usage from LLM call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmUsage {
    /// Prompt tokens.
    pub prompt_tokens: u64,
    /// Completion tokens.
    pub completion_tokens: u64,
    /// Total tokens.
    pub total_tokens: u64,
}
