//! Metrics implementation using Prometheus.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use defi_agent_core::{Error, Result};

/// Outcome label of one agent invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentOutcome {
    Success,
    Failure,
    Missing,
}

impl AgentOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Missing => "missing",
        }
    }
}

/// Initialize Prometheus recorder and return the handle.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::telemetry(format!("Failed to install Prometheus recorder: {}", e)))?;

    describe_metrics();
    tracing::info!("Prometheus metrics recorder initialized");
    Ok(handle)
}

fn describe_metrics() {
    metrics::describe_counter!("agent_invocations_total", "Agent invocations by outcome");
    metrics::describe_histogram!("agent_execution_ms", "Agent execution time in milliseconds");
    metrics::describe_counter!("agent_fallbacks_total", "Fallback agent activations");
    metrics::describe_counter!("intent_classifications_total", "Classifications by source and intent");
    metrics::describe_counter!("inference_capacity_retries_total", "Inference retries after capacity limits");
    metrics::describe_counter!("pipeline_requests_total", "Pipeline requests by outcome");
    metrics::describe_histogram!("pipeline_duration_ms", "End-to-end pipeline latency in milliseconds");
}

/// Track one agent invocation (count and latency).
pub fn track_agent_invocation(agent: &str, outcome: AgentOutcome, elapsed_ms: u64) {
    metrics::counter!(
        "agent_invocations_total",
        "agent" => agent.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    if outcome != AgentOutcome::Missing {
        metrics::histogram!("agent_execution_ms", "agent" => agent.to_string())
            .record(elapsed_ms as f64);
    }
}

/// Track a fallback agent activation.
pub fn track_fallback(agent: &str) {
    metrics::counter!("agent_fallbacks_total", "agent" => agent.to_string()).increment(1);
}

/// Track one pipeline request. `elapsed_ms` is `None` for timeouts.
pub fn track_pipeline(outcome: &'static str, elapsed_ms: Option<u64>) {
    metrics::counter!("pipeline_requests_total", "outcome" => outcome).increment(1);
    if let Some(ms) = elapsed_ms {
        metrics::histogram!("pipeline_duration_ms").record(ms as f64);
    }
}
