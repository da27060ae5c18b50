//! Request pipeline: classify, route, coordinate, synthesize.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use defi_agent_agents::{create_default_registry, CapabilityRegistry};
use defi_agent_core::{
    config::AppConfig,
    types::{ExecutionState, QueryRequest, ResponseMetadata, UnifiedResponse},
    Result,
};
use defi_agent_gateway::{AgentRouter, IntentClassifier};
use defi_agent_governance::track_pipeline;
use defi_agent_model_gateway::{create_inference_service, InferenceService};

use crate::coordinator::ExecutionCoordinator;
use crate::synthesizer::ResponseSynthesizer;

/// End-to-end pipeline for one query at a time.
///
/// Holds only read-only state, so one instance serves concurrent requests.
pub struct Orchestrator {
    classifier: IntentClassifier,
    router: AgentRouter,
    registry: Arc<CapabilityRegistry>,
    coordinator: ExecutionCoordinator,
    synthesizer: ResponseSynthesizer,
    budget: Duration,
    visualize: bool,
}

impl Orchestrator {
    pub fn new(
        classifier: IntentClassifier,
        router: AgentRouter,
        registry: Arc<CapabilityRegistry>,
        synthesizer: ResponseSynthesizer,
    ) -> Self {
        Self {
            classifier,
            router,
            coordinator: ExecutionCoordinator::new(registry.clone()),
            registry,
            synthesizer,
            budget: Duration::from_millis(30_000),
            visualize: false,
        }
    }

    /// Wire the pipeline around an existing inference service and registry.
    pub fn with_components(
        config: &AppConfig,
        inference: Arc<InferenceService>,
        registry: Arc<CapabilityRegistry>,
    ) -> Self {
        let mut orchestrator = Self::new(
            IntentClassifier::new(inference, config.classifier.clone()),
            AgentRouter::from_config(&config.routing),
            registry,
            ResponseSynthesizer::new(config.synthesis.clone()),
        );
        orchestrator.budget = Duration::from_millis(config.pipeline.timeout_ms);
        orchestrator.visualize = config.pipeline.visualization;
        orchestrator
    }

    /// Build the full pipeline, including the built-in agents, from config.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let inference = Arc::new(create_inference_service(&config.inference)?);
        let registry = Arc::new(create_default_registry(inference.clone(), &config.inference)?);
        Ok(Self::with_components(config, inference, registry))
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Configured wall-clock budget.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Run the pipeline without a deadline.
    pub async fn process(&self, request: QueryRequest) -> UnifiedResponse {
        let started = Instant::now();
        tracing::info!(request_id = %request.request_id, query = %request.query, "Processing query");

        let intent = self.classifier.classify(&request).await;
        let plan = self.router.route(&intent, &self.registry);
        let outcome = self.coordinator.execute(&request.query, &intent, &plan).await;

        let metadata = ResponseMetadata {
            request_id: Some(request.request_id.clone()),
            total_execution_time_ms: 0,
            agents_used: outcome.agents_used(),
            coordination_strategy: plan.coordination_strategy,
            fallbacks_triggered: outcome.fallbacks_triggered.clone(),
        };

        let mut response = self.synthesizer.synthesize(
            &outcome.results,
            &intent,
            &plan,
            metadata,
            request.visualize || self.visualize,
        );

        let label = if response.is_error() {
            "error"
        } else if outcome.state == ExecutionState::Degraded {
            "degraded"
        } else {
            "success"
        };
        // Stamped last so the total covers synthesis.
        let elapsed_ms = started.elapsed().as_millis() as u64;
        response.metadata.total_execution_time_ms = elapsed_ms;
        tracing::info!(
            request_id = %request.request_id,
            outcome = label,
            confidence = response.confidence,
            elapsed_ms,
            "Query processed"
        );
        track_pipeline(label, Some(elapsed_ms));

        response
    }

    /// Run the pipeline under the configured budget.
    pub async fn run(&self, request: QueryRequest) -> UnifiedResponse {
        self.process_with_budget(request, self.budget).await
    }

    /// Race the pipeline against `budget`; on expiry in-flight work is
    /// dropped and the timeout response is returned.
    pub async fn process_with_budget(&self, request: QueryRequest, budget: Duration) -> UnifiedResponse {
        let request_id = request.request_id.clone();

        match tokio::time::timeout(budget, self.process(request)).await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(
                    request_id = %request_id,
                    budget_ms = budget.as_millis() as u64,
                    "Pipeline budget exhausted"
                );
                track_pipeline("timeout", None);

                UnifiedResponse::timeout(ResponseMetadata {
                    request_id: Some(request_id),
                    total_execution_time_ms: budget.as_millis() as u64,
                    ..Default::default()
                })
            }
        }
    }
}
