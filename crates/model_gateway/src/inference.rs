//! Inference service with JSON-constrained variant and capacity retry.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use defi_agent_core::{
    traits::{CompletionRequest, LlmClient},
    Result,
};

use crate::parser;

/// Black-box natural-language inference used by the classifier and by
/// inference-backed agents.
///
/// Capacity-limit-class failures are retried exactly once: on the
/// secondary profile when one is configured, otherwise on the primary
/// client with a reduced token budget. Every other failure is returned
/// as-is.
pub struct InferenceService {
    primary: Arc<dyn LlmClient>,
    secondary: Option<Arc<dyn LlmClient>>,
    retry_token_factor: f64,
}

impl InferenceService {
    /// Create a service backed by a single client.
    pub fn new(primary: Arc<dyn LlmClient>) -> Self {
        Self {
            primary,
            secondary: None,
            retry_token_factor: 0.5,
        }
    }

    /// Set the secondary inference profile.
    pub fn with_secondary(mut self, secondary: Arc<dyn LlmClient>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Set the token budget multiplier used on capacity retries.
    pub fn with_retry_token_factor(mut self, factor: f64) -> Self {
        if factor.is_finite() && factor > 0.0 {
            self.retry_token_factor = factor.min(1.0);
        }
        self
    }

    fn reduced_budget(&self, max_tokens: u32) -> u32 {
        ((max_tokens as f64 * self.retry_token_factor).floor() as u32).max(1)
    }

    /// Free-text inference.
    pub async fn infer(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String> {
        let request = CompletionRequest::new(system_prompt, user_prompt, temperature, max_tokens);

        let err = match self.primary.complete(&request).await {
            Ok(response) => return Ok(response.content),
            Err(e) => e,
        };

        if !err.is_capacity_limit() {
            return Err(err);
        }

        let (client, retry) = match &self.secondary {
            Some(secondary) => (secondary.clone(), request),
            None => {
                let budget = self.reduced_budget(max_tokens);
                (self.primary.clone(), request.with_max_tokens(budget))
            }
        };

        tracing::warn!(
            error = %err,
            model = %client.model_id(),
            max_tokens = retry.max_tokens,
            "Inference hit capacity limit, retrying once"
        );
        metrics::counter!("inference_capacity_retries_total", "model" => client.model_id())
            .increment(1);

        client.complete(&retry).await.map(|response| response.content)
    }

    /// JSON-constrained inference deserialized into `T`.
    pub async fn infer_json<T: DeserializeOwned>(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<T> {
        let text = self
            .infer(system_prompt, user_prompt, temperature, max_tokens)
            .await?;
        parser::parse_json(&text)
    }

    /// JSON-constrained inference returning a raw object.
    pub async fn infer_json_value(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<Value> {
        let text = self
            .infer(system_prompt, user_prompt, temperature, max_tokens)
            .await?;
        parser::parse_json_object(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defi_agent_core::mocks::{ScriptedLlm, ScriptedReply};
    use defi_agent_core::Error;

    #[tokio::test]
    async fn test_capacity_retry_reduces_budget() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            ScriptedReply::CapacityLimit("overloaded".into()),
            ScriptedReply::Text("ok".into()),
        ]));
        let service = InferenceService::new(llm.clone());

        let text = service.infer("sys", "user", 0.1, 1000).await.unwrap();
        assert_eq!(text, "ok");

        let requests = llm.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].max_tokens, 1000);
        assert_eq!(requests[1].max_tokens, 500);
    }

    #[tokio::test]
    async fn test_capacity_retry_uses_secondary_profile() {
        let primary = Arc::new(ScriptedLlm::new(vec![ScriptedReply::CapacityLimit(
            "429".into(),
        )]));
        let secondary = Arc::new(ScriptedLlm::constant("from secondary"));
        let service = InferenceService::new(primary.clone()).with_secondary(secondary.clone());

        let text = service.infer("sys", "user", 0.1, 800).await.unwrap();
        assert_eq!(text, "from secondary");
        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.requests()[0].max_tokens, 800);
    }

    #[tokio::test]
    async fn test_retries_only_once() {
        let llm = Arc::new(ScriptedLlm::new(vec![ScriptedReply::CapacityLimit(
            "rate limit".into(),
        )]));
        let service = InferenceService::new(llm.clone());

        let result = service.infer("sys", "user", 0.1, 100).await;
        assert!(matches!(result, Err(Error::CapacityLimit(_))));
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_other_failures_are_not_retried() {
        let llm = Arc::new(ScriptedLlm::failing("invalid api key"));
        let service = InferenceService::new(llm.clone());

        assert!(service.infer("sys", "user", 0.1, 100).await.is_err());
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_infer_json_value_requires_object() {
        let service = InferenceService::new(Arc::new(ScriptedLlm::constant("[1, 2, 3]")));
        let result = service.infer_json_value("sys", "user", 0.1, 100).await;
        assert!(matches!(result, Err(Error::MalformedOutput(_))));
    }
}
