//! Response synthesizer.
//!
//! Merges successful agent payloads into one [`UnifiedResponse`]. Any
//! failure inside synthesis, including a panic, degrades to the canonical
//! error response.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::{Map, Value};

use defi_agent_core::{
    config::SynthesisConfig,
    types::{
        clamp_unit, AgentExecutionResult, AgentRole, ResponseMetadata, RoutingPlan,
        SemanticIntent, UnifiedResponse,
    },
    Error, Result,
};

use crate::visualization::VisualizationBuilder;

/// Merged contributions of all successful agents.
#[derive(Debug, Default)]
struct Merged {
    opportunities: Vec<Value>,
    recommendations: Vec<String>,
    next_steps: Vec<String>,
    risk_assessment: Option<Value>,
}

impl Merged {
    fn absorb(&mut self, payload: &Map<String, Value>) {
        for section in sections(payload) {
            if let Some(items) = section.get("opportunities").and_then(Value::as_array) {
                for item in items {
                    if !self.opportunities.contains(item) {
                        self.opportunities.push(item.clone());
                    }
                }
            }
            push_unique_strings(&mut self.recommendations, section.get("recommendations"));
            push_unique_strings(&mut self.next_steps, section.get("nextSteps"));

            if let Some(risk) = section.get("riskAssessment").filter(|v| !is_empty(v)) {
                self.risk_assessment = Some(risk.clone());
            }
        }
    }
}

/// The payload itself, then its `analysis` object if present.
fn sections(payload: &Map<String, Value>) -> impl Iterator<Item = &Map<String, Value>> {
    std::iter::once(payload).chain(payload.get("analysis").and_then(Value::as_object))
}

fn push_unique_strings(target: &mut Vec<String>, source: Option<&Value>) {
    let Some(items) = source.and_then(Value::as_array) else {
        return;
    };
    for item in items.iter().filter_map(Value::as_str) {
        let item = item.trim();
        if !item.is_empty() && !target.iter().any(|t| t == item) {
            target.push(item.to_string());
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Builds the unified answer from per-agent results.
pub struct ResponseSynthesizer {
    config: SynthesisConfig,
}

impl ResponseSynthesizer {
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    /// Synthesize the unified response. Never fails.
    pub fn synthesize(
        &self,
        results: &[AgentExecutionResult],
        intent: &SemanticIntent,
        plan: &RoutingPlan,
        metadata: ResponseMetadata,
        visualize: bool,
    ) -> UnifiedResponse {
        let attempt = catch_unwind(AssertUnwindSafe(|| {
            self.try_synthesize(results, intent, plan, metadata.clone(), visualize)
        }));

        match attempt {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Synthesis failed, returning error response");
                UnifiedResponse::error(metadata)
            }
            Err(_) => {
                tracing::error!("Synthesis panicked, returning error response");
                UnifiedResponse::error(metadata)
            }
        }
    }

    fn try_synthesize(
        &self,
        results: &[AgentExecutionResult],
        intent: &SemanticIntent,
        plan: &RoutingPlan,
        metadata: ResponseMetadata,
        visualize: bool,
    ) -> Result<UnifiedResponse> {
        let successes: Vec<(&AgentExecutionResult, &Value)> = results
            .iter()
            .filter(|r| r.success)
            .filter_map(|r| r.response.as_ref().map(|payload| (r, payload)))
            .collect();

        let Some(reference) = reference_index(&successes) else {
            tracing::warn!(invoked = results.len(), "No agent succeeded");
            return Ok(UnifiedResponse::error(metadata));
        };

        let (reference_result, reference_payload) = successes[reference];
        if !reference_payload.is_object() {
            return Err(Error::synthesis(format!(
                "reference payload from '{}' is not an object",
                reference_result.agent_name
            )));
        }

        // Reference first, then the rest in invocation order.
        let payloads: Vec<&Map<String, Value>> = std::iter::once(reference)
            .chain((0..successes.len()).filter(|i| *i != reference))
            .filter_map(|i| successes[i].1.as_object())
            .collect();

        let mut merged = Merged::default();
        for payload in &payloads {
            merged.absorb(payload);
        }

        let summary = self.summary(intent, &merged, successes.len(), results.len());
        let confidence = self.confidence(intent, plan, successes.len(), results.len());

        let (visualizations, suggested_actions) = if visualize {
            let builder = VisualizationBuilder::new(&self.config);
            let visualizations: Vec<_> = payloads.iter().filter_map(|p| builder.describe(p)).collect();
            let actions = builder.suggest_actions(&payloads, &merged.opportunities);
            (Some(visualizations), Some(actions))
        } else {
            (None, None)
        };

        tracing::debug!(
            reference = %reference_result.agent_name,
            opportunities = merged.opportunities.len(),
            recommendations = merged.recommendations.len(),
            confidence,
            "Response synthesized"
        );

        Ok(UnifiedResponse {
            summary,
            recommendations: merged.recommendations,
            opportunities: (!merged.opportunities.is_empty()).then_some(merged.opportunities),
            risk_assessment: merged.risk_assessment,
            next_steps: merged.next_steps,
            confidence,
            metadata,
            visualizations,
            suggested_actions,
        })
    }

    fn summary(&self, intent: &SemanticIntent, merged: &Merged, succeeded: usize, invoked: usize) -> String {
        let mut parts = vec![format!(
            "Analyzed your {} request ({:.0}% intent confidence).",
            intent.intent_type().label(),
            clamp_unit(intent.primary.confidence) * 100.0
        )];

        if !merged.opportunities.is_empty() {
            parts.push(format!("Found {} opportunities.", merged.opportunities.len()));
        }
        if !merged.recommendations.is_empty() {
            parts.push(format!(
                "Generated {} recommendations.",
                merged.recommendations.len()
            ));
        }
        parts.push(format!(
            "{}/{} agents completed successfully.",
            succeeded, invoked
        ));

        parts.join(" ")
    }

    fn confidence(&self, intent: &SemanticIntent, plan: &RoutingPlan, succeeded: usize, invoked: usize) -> f64 {
        let success_ratio = if invoked == 0 {
            0.0
        } else {
            succeeded as f64 / invoked as f64
        };

        let raw = clamp_unit(intent.primary.confidence) * self.config.intent_weight
            + clamp_unit(plan.primary_agent.confidence) * self.config.routing_weight
            + success_ratio * self.config.success_weight;
        clamp_unit(round2(raw))
    }
}

/// Primary success, then fallback success, then the first success.
fn reference_index(successes: &[(&AgentExecutionResult, &Value)]) -> Option<usize> {
    let by_role = |role: AgentRole| successes.iter().position(|(r, _)| r.role == role);
    by_role(AgentRole::Primary)
        .or_else(|| by_role(AgentRole::Fallback))
        .or((!successes.is_empty()).then_some(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use defi_agent_core::types::{CoordinationStrategy, IntentType, PrimaryAgent, APOLOGY_SUMMARY};
    use serde_json::json;

    fn plan(confidence: f64) -> RoutingPlan {
        RoutingPlan {
            primary_agent: PrimaryAgent {
                name: "yield_optimizer".into(),
                confidence,
                reasoning: String::new(),
            },
            supporting_agents: vec![],
            execution_order: vec!["yield_optimizer".into()],
            coordination_strategy: CoordinationStrategy::Sequential,
            fallback_plan: vec![],
        }
    }

    fn ok(name: &str, role: AgentRole, payload: Value) -> AgentExecutionResult {
        AgentExecutionResult::success(name, role, payload, 10)
    }

    fn synthesize(results: &[AgentExecutionResult], visualize: bool) -> UnifiedResponse {
        ResponseSynthesizer::new(SynthesisConfig::default()).synthesize(
            results,
            &SemanticIntent::new(IntentType::YieldOptimization, 0.8, ""),
            &plan(0.6),
            ResponseMetadata::default(),
            visualize,
        )
    }

    #[test]
    fn test_duplicate_recommendations_merged_once() {
        let results = vec![
            ok("a", AgentRole::Primary, json!({"recommendations": ["Diversify your holdings"]})),
            ok(
                "b",
                AgentRole::RiskChecker,
                json!({"analysis": {"recommendations": ["Diversify your holdings", "Use stablecoins"]}}),
            ),
        ];

        let response = synthesize(&results, false);
        assert_eq!(
            response.recommendations,
            vec!["Diversify your holdings", "Use stablecoins"]
        );
    }

    #[test]
    fn test_all_failed_returns_apology() {
        let results = vec![
            AgentExecutionResult::failure("a", AgentRole::Primary, "down", 5),
            AgentExecutionResult::failure("b", AgentRole::Fallback, "down", 5),
        ];

        let response = synthesize(&results, true);
        assert_eq!(response.summary, APOLOGY_SUMMARY);
        assert_eq!(response.confidence, 0.0);
        assert_eq!(response.recommendations.len(), 3);
        assert_eq!(response.next_steps.len(), 2);
        assert!(response.visualizations.is_none());
    }

    #[test]
    fn test_confidence_and_summary() {
        let results = vec![
            ok(
                "a",
                AgentRole::Primary,
                json!({
                    "opportunities": [{"protocol": "Aave", "apy": 4.2}, {"protocol": "Aave", "apy": 4.2}],
                    "recommendations": ["Use Aave"],
                    "nextSteps": ["Check gas"]
                }),
            ),
            AgentExecutionResult::failure("b", AgentRole::RiskChecker, "down", 5),
        ];

        let response = synthesize(&results, false);
        // 0.8*0.4 + 0.6*0.3 + 0.5*0.3
        assert_eq!(response.confidence, 0.65);
        assert_eq!(response.opportunities.as_ref().map(Vec::len), Some(1));
        assert_eq!(
            response.summary,
            "Analyzed your yield optimization request (80% intent confidence). \
             Found 1 opportunities. Generated 1 recommendations. 1/2 agents completed successfully."
        );
    }

    #[test]
    fn test_reference_prefers_fallback_and_merges_it_first() {
        let results = vec![
            AgentExecutionResult::failure("a", AgentRole::Primary, "down", 5),
            ok("c", AgentRole::DataProvider, json!({"nextSteps": ["from provider"]})),
            ok("b", AgentRole::Fallback, json!({"nextSteps": ["from fallback"]})),
        ];

        let response = synthesize(&results, false);
        assert_eq!(response.next_steps, vec!["from fallback", "from provider"]);
        assert!(!response.is_error());
    }

    #[test]
    fn test_risk_assessment_takes_last_non_empty() {
        let results = vec![
            ok("a", AgentRole::Primary, json!({"riskAssessment": {"score": 3}})),
            ok("b", AgentRole::RiskChecker, json!({"riskAssessment": {"score": 6}})),
            ok("c", AgentRole::Validation, json!({"riskAssessment": {}})),
        ];

        let response = synthesize(&results, false);
        assert_eq!(response.risk_assessment, Some(json!({"score": 6})));
    }

    #[test]
    fn test_non_object_reference_degrades() {
        let results = vec![ok("a", AgentRole::Primary, json!(["not", "an", "object"]))];

        let response = synthesize(&results, false);
        assert!(response.is_error());
    }

    #[test]
    fn test_visualization_mode() {
        let results = vec![
            ok("a", AgentRole::Primary, json!({"opportunities": [{"protocol": "Aave", "apy": 4.2}]})),
            ok("b", AgentRole::RiskChecker, json!({"riskScore": 9})),
        ];

        let response = synthesize(&results, true);
        let visualizations = response.visualizations.unwrap();
        assert_eq!(visualizations.len(), 2);
        let actions = response.suggested_actions.unwrap();
        assert_eq!(actions.len(), 2);
    }
}
