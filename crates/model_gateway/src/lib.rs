#![deny(unused)]
//! L-M Model Gateway for the DeFi agent pipeline.
//!
//! This crate provides:
//! - The inference service (free text and JSON-constrained)
//! - Capacity-limit retry with a secondary profile or reduced budget
//! - Rig LLM client adapter
//! - Mock client for offline runs

pub mod inference;
pub mod parser;
pub mod providers;
pub mod rig_client;

pub use inference::InferenceService;
pub use providers::MockLlmClient;
pub use rig_client::{RigLlmClient, RigProvider};

use std::sync::Arc;

use defi_agent_core::{config::InferenceConfig, traits::LlmClient, Error, Result};

/// Create an LLM client for a provider/model pair.
pub fn create_client(provider: &str, model: &str) -> Result<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "openai" => Ok(Arc::new(RigLlmClient::openai(model))),
        "anthropic" => Ok(Arc::new(RigLlmClient::anthropic(model))),
        // An empty object parses as an agent payload but never as an intent,
        // so the classifier exercises its keyword fallback.
        "mock" => Ok(Arc::new(MockLlmClient::new("{}"))),
        other => Err(Error::inference(format!("Unsupported provider: {}", other))),
    }
}

/// Create the inference service described by configuration.
pub fn create_inference_service(config: &InferenceConfig) -> Result<InferenceService> {
    let primary = create_client(&config.provider, &config.model)?;
    let mut service =
        InferenceService::new(primary).with_retry_token_factor(config.retry_token_factor);

    if let Some(ref secondary_model) = config.secondary_model {
        tracing::info!(model = %secondary_model, "Secondary inference profile enabled");
        service = service.with_secondary(create_client(&config.provider, secondary_model)?);
    }

    Ok(service)
}
