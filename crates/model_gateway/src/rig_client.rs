//! Rig LLM client adapter.
//!
//! Wraps Rig's Agent for integration with our LlmClient trait.

use async_trait::async_trait;

use defi_agent_core::{
    traits::{CompletionRequest, LlmClient, LlmResponse, LlmUsage},
    Error, Result,
};

// Import required Rig traits
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;

/// Provider type for Rig clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigProvider {
    OpenAI,
    Anthropic,
}

impl RigProvider {
    fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    fn key_var(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// Rig-based LLM client.
///
/// API keys are read from the environment on every call, so a missing key
/// surfaces as a recoverable inference error instead of a panic inside Rig.
pub struct RigLlmClient {
    provider: RigProvider,
    model: String,
}

impl RigLlmClient {
    /// Create a new Rig client.
    pub fn new(provider: RigProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Create a client for an OpenAI model.
    pub fn openai(model: impl Into<String>) -> Self {
        Self::new(RigProvider::OpenAI, model)
    }

    /// Create a client for an Anthropic model.
    pub fn anthropic(model: impl Into<String>) -> Self {
        Self::new(RigProvider::Anthropic, model)
    }

    fn ensure_key(&self) -> Result<()> {
        if std::env::var(self.provider.key_var()).is_err() {
            return Err(Error::inference(format!("{} not set", self.provider.key_var())));
        }
        Ok(())
    }

    /// Provider errors carry no typed rate-limit variant; classify by message.
    fn map_provider_error(&self, message: String) -> Error {
        let err = Error::inference(format!("{} error: {}", self.provider.as_str(), message));
        if err.is_capacity_limit() {
            Error::capacity_limit(message)
        } else {
            err
        }
    }

    /// Call OpenAI via Rig.
    async fn call_openai(&self, request: &CompletionRequest) -> Result<String> {
        use rig::providers::openai;

        let client = openai::Client::from_env();
        let agent = client
            .agent(&self.model)
            .preamble(&request.system_prompt)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens as u64)
            .build();

        agent
            .prompt(request.user_prompt.as_str())
            .await
            .map_err(|e| self.map_provider_error(e.to_string()))
    }

    /// Call Anthropic via Rig.
    async fn call_anthropic(&self, request: &CompletionRequest) -> Result<String> {
        use rig::providers::anthropic;

        let client = anthropic::Client::from_env();
        let agent = client
            .agent(&self.model)
            .preamble(&request.system_prompt)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens as u64)
            .build();

        agent
            .prompt(request.user_prompt.as_str())
            .await
            .map_err(|e| self.map_provider_error(e.to_string()))
    }
}

#[async_trait]
impl LlmClient for RigLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse> {
        tracing::debug!(
            provider = self.provider.as_str(),
            model = %self.model,
            prompt_len = request.user_prompt.len(),
            max_tokens = request.max_tokens,
            "Calling LLM"
        );

        self.ensure_key()?;

        let content = match self.provider {
            RigProvider::OpenAI => self.call_openai(request).await?,
            RigProvider::Anthropic => self.call_anthropic(request).await?,
        };

        let prompt_len = request.system_prompt.len() + request.user_prompt.len();
        Ok(LlmResponse {
            usage: LlmUsage {
                prompt_tokens: (prompt_len / 4) as u64,
                completion_tokens: (content.len() / 4) as u64,
                total_tokens: ((prompt_len + content.len()) / 4) as u64,
            },
            content,
            finish_reason: "stop".to_string(),
        })
    }

    fn model_id(&self) -> String {
        format!("{}:{}", self.provider.as_str(), self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id() {
        assert_eq!(RigLlmClient::openai("gpt-4o-mini").model_id(), "openai:gpt-4o-mini");
        assert_eq!(
            RigLlmClient::anthropic("claude-3-haiku-20240307").model_id(),
            "anthropic:claude-3-haiku-20240307"
        );
    }

    #[test]
    fn test_rate_limit_errors_become_capacity_limits() {
        let client = RigLlmClient::openai("gpt-4o-mini");
        assert!(matches!(
            client.map_provider_error("HTTP 429: rate limit reached".into()),
            Error::CapacityLimit(_)
        ));
        assert!(matches!(
            client.map_provider_error("invalid request".into()),
            Error::Inference(_)
        ));
    }
}
