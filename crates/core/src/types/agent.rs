use serde::{Deserialize, Serialize};

use super::intent::{RiskTolerance, SemanticIntent, TimeHorizon, Urgency};
use super::plan::AgentRole;

/// Opaque agent output. Only the fields read by the synthesizer are interpreted.
pub type AgentPayload = serde_json::Value;

// =============================================================================
// Agent Task (L1 Input)
// =============================================================================

/// Scheduling priority derived from urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Normal,
    High,
}

impl From<Urgency> for TaskPriority {
    fn from(urgency: Urgency) -> Self {
        match urgency {
            Urgency::Low => Self::Low,
            Urgency::Medium => Self::Normal,
            Urgency::High | Urgency::Critical => Self::High,
        }
    }
}

/// Normalized work item handed to an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTask {
    /// Raw user query.
    pub query: String,
    pub role: AgentRole,
    pub tokens: Vec<String>,
    pub protocols: Vec<String>,
    pub chains: Vec<String>,
    pub amounts: Vec<f64>,
    pub risk_tolerance: RiskTolerance,
    pub time_horizon: TimeHorizon,
    pub urgency: Urgency,
    pub priority: TaskPriority,
    /// Results produced earlier in the same request.
    pub prior_results: Vec<AgentExecutionResult>,
}

impl AgentTask {
    /// Build a task from a classified intent.
    pub fn from_intent(query: impl Into<String>, intent: &SemanticIntent, role: AgentRole) -> Self {
        Self {
            query: query.into(),
            role,
            tokens: intent.entities.tokens.clone(),
            protocols: intent.entities.protocols.clone(),
            chains: intent.entities.chains.clone(),
            amounts: intent.entities.amounts.clone(),
            risk_tolerance: intent.secondary.risk_tolerance,
            time_horizon: intent.secondary.time_horizon,
            urgency: intent.secondary.urgency,
            priority: intent.secondary.urgency.into(),
            prior_results: Vec::new(),
        }
    }

    /// Attach a snapshot of prior results.
    pub fn with_prior_results(mut self, prior: Vec<AgentExecutionResult>) -> Self {
        self.prior_results = prior;
        self
    }
}

// =============================================================================
// Agent Execution Result (L1 Output)
// =============================================================================

/// Record of one agent invocation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentExecutionResult {
    pub agent_name: String,
    pub role: AgentRole,
    pub response: Option<AgentPayload>,
    pub execution_time_ms: u64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentExecutionResult {
    /// Create a success record.
    pub fn success(
        agent_name: impl Into<String>,
        role: AgentRole,
        response: AgentPayload,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            role,
            response: Some(response),
            execution_time_ms,
            success: true,
            error: None,
        }
    }

    /// Create a failure record.
    pub fn failure(
        agent_name: impl Into<String>,
        role: AgentRole,
        error: impl Into<String>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            role,
            response: None,
            execution_time_ms,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Coordinator lifecycle for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionState {
    #[default]
    Idle,
    Running,
    /// The primary slot produced a result.
    Completed,
    /// The primary agent and all fallbacks failed.
    Degraded,
}

/// Everything the coordinator hands to the synthesizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    pub results: Vec<AgentExecutionResult>,
    pub fallbacks_triggered: Vec<String>,
    pub state: ExecutionState,
    pub total_execution_time_ms: u64,
}

impl ExecutionOutcome {
    pub fn successful(&self) -> impl Iterator<Item = &AgentExecutionResult> {
        self.results.iter().filter(|r| r.success)
    }

    /// Distinct agent names in invocation order.
    pub fn agents_used(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for result in &self.results {
            if !names.contains(&result.agent_name) {
                names.push(result.agent_name.clone());
            }
        }
        names
    }
}
