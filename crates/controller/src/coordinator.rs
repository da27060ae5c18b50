//! Execution coordinator.
//!
//! Runs the agents of a [`RoutingPlan`] under its coordination strategy.
//! Every invocation is isolated: errors and panics become failed
//! [`AgentExecutionResult`]s and never abort the request.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use tokio::time::Instant;

use defi_agent_agents::CapabilityRegistry;
use defi_agent_core::types::{
    AgentExecutionResult, AgentRole, AgentTask, CoordinationStrategy, ExecutionOutcome,
    ExecutionState, RoutingPlan, SemanticIntent,
};
use defi_agent_governance::{track_agent_invocation, track_fallback, AgentOutcome};

/// Runs routing plans against the capability registry.
pub struct ExecutionCoordinator {
    registry: Arc<CapabilityRegistry>,
}

impl ExecutionCoordinator {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    /// Execute `plan` for `query`.
    pub async fn execute(
        &self,
        query: &str,
        intent: &SemanticIntent,
        plan: &RoutingPlan,
    ) -> ExecutionOutcome {
        let started = Instant::now();
        let mut state = ExecutionState::Idle;
        transition(&mut state, ExecutionState::Running);

        let run = Run {
            coordinator: self,
            query,
            intent,
            plan,
        };

        let (results, fallbacks_triggered) = match plan.coordination_strategy {
            CoordinationStrategy::Sequential => run.sequential().await,
            CoordinationStrategy::Parallel => (run.parallel().await, Vec::new()),
            CoordinationStrategy::Conditional => run.conditional().await,
        };

        let primary_slot_ok = results
            .iter()
            .any(|r| r.success && matches!(r.role, AgentRole::Primary | AgentRole::Fallback));
        transition(
            &mut state,
            if primary_slot_ok {
                ExecutionState::Completed
            } else {
                ExecutionState::Degraded
            },
        );

        ExecutionOutcome {
            results,
            fallbacks_triggered,
            state,
            total_execution_time_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// Invoke one agent. Never fails.
    async fn invoke(&self, name: &str, role: AgentRole, task: AgentTask) -> AgentExecutionResult {
        let started = Instant::now();

        let Some(agent) = self.registry.get(name) else {
            tracing::warn!(agent = %name, role = role.as_str(), "Agent not registered");
            track_agent_invocation(name, AgentOutcome::Missing, 0);
            return AgentExecutionResult::failure(name, role, "agent not registered", 0);
        };

        let outcome = AssertUnwindSafe(agent.execute(&task)).catch_unwind().await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(Ok(payload)) => AgentExecutionResult::success(name, role, payload, elapsed_ms),
            Ok(Err(e)) => AgentExecutionResult::failure(name, role, e.to_string(), elapsed_ms),
            Err(panic) => AgentExecutionResult::failure(
                name,
                role,
                format!("agent panicked: {}", panic_message(panic.as_ref())),
                elapsed_ms,
            ),
        };

        match &result.error {
            None => {
                tracing::info!(agent = %name, role = role.as_str(), elapsed_ms, "Agent succeeded");
                track_agent_invocation(name, AgentOutcome::Success, elapsed_ms);
            }
            Some(error) => {
                tracing::warn!(agent = %name, role = role.as_str(), elapsed_ms, error = %error, "Agent failed");
                track_agent_invocation(name, AgentOutcome::Failure, elapsed_ms);
            }
        }

        result
    }
}

/// One request's execution.
struct Run<'a> {
    coordinator: &'a ExecutionCoordinator,
    query: &'a str,
    intent: &'a SemanticIntent,
    plan: &'a RoutingPlan,
}

impl Run<'_> {
    fn task(&self, role: AgentRole, prior: &[AgentExecutionResult]) -> AgentTask {
        AgentTask::from_intent(self.query, self.intent, role).with_prior_results(prior.to_vec())
    }

    async fn invoke(
        &self,
        name: &str,
        role: AgentRole,
        prior: &[AgentExecutionResult],
    ) -> AgentExecutionResult {
        self.coordinator.invoke(name, role, self.task(role, prior)).await
    }

    /// One at a time in execution order; each agent sees all prior results.
    async fn sequential(&self) -> (Vec<AgentExecutionResult>, Vec<String>) {
        let mut results = Vec::new();
        let mut fallbacks = Vec::new();

        for name in &self.plan.execution_order {
            let Some(role) = self.plan.role_of(name) else {
                tracing::warn!(agent = %name, "Agent in execution order has no role, skipping");
                continue;
            };

            let result = self.invoke(name, role, &results).await;
            let primary_failed = role == AgentRole::Primary && !result.success;
            results.push(result);

            if primary_failed {
                fallbacks.extend(self.fallback_chain(&mut results).await);
            }
        }

        (results, fallbacks)
    }

    /// All agents concurrently, results in invocation order.
    async fn parallel(&self) -> Vec<AgentExecutionResult> {
        let invocations = self.plan.execution_order.iter().filter_map(|name| {
            let role = self.plan.role_of(name)?;
            Some(self.invoke(name, role, &[]))
        });
        join_all(invocations).await
    }

    /// Primary first; supporting agents only once the primary slot succeeded.
    async fn conditional(&self) -> (Vec<AgentExecutionResult>, Vec<String>) {
        let mut results = Vec::new();
        let mut fallbacks = Vec::new();

        let primary = self
            .invoke(&self.plan.primary_agent.name, AgentRole::Primary, &[])
            .await;
        let mut primary_ok = primary.success;
        results.push(primary);

        if !primary_ok {
            fallbacks.extend(self.fallback_chain(&mut results).await);
            primary_ok = !fallbacks.is_empty();
        }

        if !primary_ok {
            tracing::warn!(
                primary = %self.plan.primary_agent.name,
                "Primary slot failed, skipping supporting agents"
            );
            return (results, fallbacks);
        }

        for supporting in self.plan.supporting_in_order() {
            let result = self.invoke(&supporting.name, supporting.role, &results).await;
            results.push(result);
        }

        (results, fallbacks)
    }

    /// Try fallbacks in order until one succeeds.
    async fn fallback_chain(&self, results: &mut Vec<AgentExecutionResult>) -> Option<String> {
        for name in &self.plan.fallback_plan {
            tracing::info!(agent = %name, primary = %self.plan.primary_agent.name, "Trying fallback agent");
            track_fallback(name);

            let result = self.invoke(name, AgentRole::Fallback, results).await;
            let succeeded = result.success;
            results.push(result);

            if succeeded {
                return Some(name.clone());
            }
        }

        tracing::warn!(primary = %self.plan.primary_agent.name, "Fallback chain exhausted");
        None
    }
}

fn transition(state: &mut ExecutionState, next: ExecutionState) {
    tracing::debug!(from = ?state, to = ?next, "Execution state changed");
    *state = next;
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
