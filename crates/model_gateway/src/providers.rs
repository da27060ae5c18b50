//! LLM provider implementations.

use async_trait::async_trait;

use defi_agent_core::{
    traits::{CompletionRequest, LlmClient, LlmResponse, LlmUsage},
    Error, Result,
};

// =============================================================================
// Mock LLM Client for Testing
// =============================================================================

/// Mock LLM client for running without real API calls.
pub struct MockLlmClient {
    /// Response to return.
    response: String,
    /// Simulate failure.
    should_fail: bool,
}

impl MockLlmClient {
    /// Create a new mock client.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            should_fail: false,
        }
    }

    /// Create a failing mock client.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            should_fail: true,
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse> {
        if self.should_fail {
            return Err(Error::inference("Mock failure"));
        }

        let prompt_len = request.system_prompt.len() + request.user_prompt.len();
        Ok(LlmResponse {
            content: self.response.clone(),
            finish_reason: "stop".to_string(),
            usage: LlmUsage {
                prompt_tokens: prompt_len as u64 / 4,
                completion_tokens: self.response.len() as u64 / 4,
                total_tokens: (prompt_len + self.response.len()) as u64 / 4,
            },
        })
    }

    fn model_id(&self) -> String {
        "mock:static".to_string()
    }
}
