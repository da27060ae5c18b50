use std::sync::Arc;

use defi_agent_agents::create_default_registry;
use defi_agent_core::config::InferenceConfig;
use defi_agent_core::mocks::ScriptedLlm;
use defi_agent_core::types::{AgentRole, AgentTask, AgentExecutionResult, IntentType, SemanticIntent};
use defi_agent_model_gateway::InferenceService;
use serde_json::json;

fn registry(reply: &str) -> (Arc<ScriptedLlm>, defi_agent_agents::CapabilityRegistry) {
    registry_with(reply, &InferenceConfig::default())
}

fn registry_with(
    reply: &str,
    config: &InferenceConfig,
) -> (Arc<ScriptedLlm>, defi_agent_agents::CapabilityRegistry) {
    let llm = Arc::new(ScriptedLlm::constant(reply));
    let inference = Arc::new(InferenceService::new(llm.clone()));
    (llm, create_default_registry(inference, config).unwrap())
}

#[test]
fn default_registry_loads_every_specialist_in_order() {
    let (_, registry) = registry("{}");

    assert_eq!(
        registry.names(),
        vec![
            "yield_optimizer",
            "advanced_yield_strategist",
            "risk_analyzer",
            "governance_tracker",
            "portfolio_analyst",
            "cross_chain_analyst",
            "market_intelligence",
        ]
    );
    assert!(registry
        .capability("risk_analyzer")
        .unwrap()
        .serves(IntentType::EmergencyAction));
}

#[tokio::test]
async fn agents_see_prior_results_from_the_same_request() {
    let (llm, registry) = registry(r#"{"riskScore": 3}"#);
    let agent = registry.get("risk_analyzer").unwrap();

    let intent = SemanticIntent::new(IntentType::YieldOptimization, 0.9, "");
    let prior = AgentExecutionResult::success(
        "yield_optimizer",
        AgentRole::Primary,
        json!({"opportunities": [{"protocol": "Aave", "apy": 4.1}]}),
        12,
    );
    let task = AgentTask::from_intent("safe ETH yield", &intent, AgentRole::RiskChecker)
        .with_prior_results(vec![prior]);

    let payload = agent.execute(&task).await.unwrap();
    assert_eq!(payload["riskScore"], 3);

    let prompt = &llm.requests()[0].user_prompt;
    assert!(prompt.contains("yield_optimizer"));
    assert!(prompt.contains("Aave"));
    assert!(prompt.contains("risk_checker"));
}

#[tokio::test]
async fn agents_sample_with_configured_settings() {
    let config = InferenceConfig {
        temperature: 0.7,
        max_tokens: 640,
        ..Default::default()
    };
    let (llm, registry) = registry_with("{}", &config);

    let intent = SemanticIntent::new(IntentType::MarketIntelligence, 0.9, "");
    let task = AgentTask::from_intent("eth sentiment", &intent, AgentRole::Primary);
    registry.get("market_intelligence").unwrap().execute(&task).await.unwrap();

    let request = &llm.requests()[0];
    assert_eq!(request.max_tokens, 640);
    assert_eq!(request.temperature, 0.7);
}
