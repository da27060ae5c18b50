//! End-to-end pipeline scenarios over the built-in capability table with
//! scripted inference and mock agents.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use defi_agent_agents::{default_agent_specs, CapabilityRegistry};
use defi_agent_controller::Orchestrator;
use defi_agent_core::{
    config::AppConfig,
    mocks::{MockAgent, MockBehavior, ScriptedLlm},
    types::{
        AgentRole, CoordinationStrategy, GaugeColor, QueryRequest, RiskTolerance, UserProfile,
        Visualization, APOLOGY_SUMMARY, TIMEOUT_SUMMARY,
    },
};
use defi_agent_model_gateway::InferenceService;
use serde_json::{json, Value};

// =============================================================================
// Fixtures
// =============================================================================

struct Harness {
    orchestrator: Orchestrator,
    llm: Arc<ScriptedLlm>,
    agents: HashMap<&'static str, Arc<MockAgent>>,
}

impl Harness {
    /// Every built-in agent as a mock. Agents without a scripted behavior
    /// answer with an empty object.
    fn new(llm: ScriptedLlm, behaviors: Vec<(&str, MockBehavior)>) -> Self {
        Self::with_config(AppConfig::default(), llm, behaviors)
    }

    fn with_config(config: AppConfig, llm: ScriptedLlm, behaviors: Vec<(&str, MockBehavior)>) -> Self {
        let mut behaviors: HashMap<&str, MockBehavior> = behaviors.into_iter().collect();
        let mut registry = CapabilityRegistry::new();
        let mut agents = HashMap::new();

        for spec in default_agent_specs() {
            let behavior = behaviors
                .remove(spec.name)
                .unwrap_or_else(|| MockBehavior::Respond(json!({})));
            let agent = Arc::new(MockAgent::new(spec.name, spec.capability, behavior));
            registry.register(agent.clone()).unwrap();
            agents.insert(spec.name, agent);
        }

        let llm = Arc::new(llm);
        let inference = Arc::new(InferenceService::new(llm.clone()));
        let orchestrator = Orchestrator::with_components(&config, inference, Arc::new(registry));

        Self {
            orchestrator,
            llm,
            agents,
        }
    }

    fn calls(&self, name: &str) -> usize {
        self.agents[name].call_count()
    }
}

fn respond(payload: Value) -> MockBehavior {
    MockBehavior::Respond(payload)
}

fn fail(message: &str) -> MockBehavior {
    MockBehavior::Fail(message.to_string())
}

/// What a model would return for "Find me safe yield for my USDC".
fn safe_yield_intent() -> ScriptedLlm {
    ScriptedLlm::constant(
        &json!({
            "primary": {
                "type": "YIELD_OPTIMIZATION",
                "confidence": 0.9,
                "reasoning": "User asks where to earn yield on a stablecoin"
            },
            "secondary": {
                "urgency": "medium",
                "riskTolerance": "medium",
                "timeHorizon": "medium",
                "complexity": 4
            },
            "entities": {
                "tokens": ["USDC"],
                "protocols": [],
                "chains": [],
                "amounts": [],
                "confidence": 0.9
            }
        })
        .to_string(),
    )
}

fn yield_payload() -> Value {
    json!({
        "opportunities": [
            {"protocol": "Aave", "apy": 4.2, "token": "USDC"},
            {"protocol": "Compound", "apy": 3.8, "token": "USDC"}
        ],
        "recommendations": ["Deposit USDC on Aave", "Diversify your holdings"],
        "nextSteps": ["Compare gas costs before depositing"]
    })
}

fn risk_payload() -> Value {
    json!({
        "riskScore": 3,
        "riskAssessment": {"score": 3, "level": "low"},
        "recommendations": ["Diversify your holdings", "Keep an eye on utilization"]
    })
}

fn safe_yield_request() -> QueryRequest {
    QueryRequest::text("Find me safe yield for my USDC")
        .with_profile(UserProfile::with_risk_tolerance(RiskTolerance::Low))
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_safe_yield_for_low_risk_user() {
    let harness = Harness::new(
        safe_yield_intent(),
        vec![
            ("yield_optimizer", respond(yield_payload())),
            ("risk_analyzer", respond(risk_payload())),
        ],
    );

    let response = harness.orchestrator.process(safe_yield_request()).await;

    assert!(!response.is_error());
    assert_eq!(
        response.metadata.coordination_strategy,
        CoordinationStrategy::Conditional
    );
    assert_eq!(
        response.metadata.agents_used,
        vec!["yield_optimizer", "risk_analyzer"]
    );
    assert!(response.metadata.fallbacks_triggered.is_empty());
    assert_eq!(response.opportunities.as_ref().map(Vec::len), Some(2));
    assert_eq!(response.risk_assessment, Some(json!({"score": 3, "level": "low"})));
    assert!(response
        .summary
        .starts_with("Analyzed your yield optimization request (90% intent confidence)."));
    assert!(response.summary.ends_with("2/2 agents completed successfully."));

    // The risk checker runs after the primary and sees its result.
    let risk_task = &harness.agents["risk_analyzer"].tasks()[0];
    assert_eq!(risk_task.role, AgentRole::RiskChecker);
    assert_eq!(risk_task.risk_tolerance, RiskTolerance::Low);
    assert_eq!(risk_task.prior_results.len(), 1);
    assert_eq!(risk_task.prior_results[0].agent_name, "yield_optimizer");

    assert_eq!(harness.llm.call_count(), 1);
    assert_eq!(harness.calls("market_intelligence"), 0);
}

#[tokio::test]
async fn test_duplicate_recommendations_appear_once() {
    let harness = Harness::new(
        safe_yield_intent(),
        vec![
            ("yield_optimizer", respond(yield_payload())),
            ("risk_analyzer", respond(risk_payload())),
        ],
    );

    let response = harness.orchestrator.process(safe_yield_request()).await;

    assert_eq!(
        response.recommendations,
        vec![
            "Deposit USDC on Aave",
            "Diversify your holdings",
            "Keep an eye on utilization"
        ]
    );
    assert_eq!(response.next_steps, vec!["Compare gas costs before depositing"]);
}

#[tokio::test]
async fn test_visualization_mode() {
    let harness = Harness::new(
        safe_yield_intent(),
        vec![
            ("yield_optimizer", respond(yield_payload())),
            ("risk_analyzer", respond(risk_payload())),
        ],
    );

    let response = harness
        .orchestrator
        .process(safe_yield_request().with_visualization())
        .await;

    let visualizations = response.visualizations.expect("visualizations requested");
    assert_eq!(visualizations.len(), 2);
    assert!(matches!(&visualizations[0], Visualization::BarChart { data, .. } if data.len() == 2));
    assert!(matches!(
        &visualizations[1],
        Visualization::Gauge { color: GaugeColor::Green, .. }
    ));

    let actions = response.suggested_actions.expect("actions requested");
    let kinds: Vec<_> = actions.iter().map(|a| a.action_type.as_str()).collect();
    assert_eq!(kinds, vec!["invest"]);
    assert!(actions[0].description.contains("Aave"));
}

#[tokio::test]
async fn test_inference_outage_falls_back_to_keywords() {
    let harness = Harness::new(
        ScriptedLlm::failing("provider unreachable"),
        vec![(
            "risk_analyzer",
            respond(json!({"riskScore": 6.5, "recommendations": ["Add collateral"]})),
        )],
    );

    let response = harness
        .orchestrator
        .process(QueryRequest::text("Am I at risk of liquidation on Aave?"))
        .await;

    assert!(!response.is_error());
    assert_eq!(response.metadata.agents_used, vec!["risk_analyzer"]);
    assert_eq!(
        response.metadata.coordination_strategy,
        CoordinationStrategy::Sequential
    );
    assert!(response
        .summary
        .starts_with("Analyzed your risk assessment request (30% intent confidence)."));
    assert_eq!(response.recommendations, vec!["Add collateral"]);
    assert_eq!(harness.llm.call_count(), 1);
}

#[tokio::test]
async fn test_first_successful_fallback_stops_the_chain() {
    let harness = Harness::new(
        safe_yield_intent(),
        vec![
            ("yield_optimizer", fail("rate feed offline")),
            ("advanced_yield_strategist", respond(yield_payload())),
            ("risk_analyzer", respond(risk_payload())),
        ],
    );

    let response = harness.orchestrator.process(safe_yield_request()).await;

    assert!(!response.is_error());
    assert_eq!(
        response.metadata.fallbacks_triggered,
        vec!["advanced_yield_strategist"]
    );
    assert_eq!(
        response.metadata.agents_used,
        vec!["yield_optimizer", "advanced_yield_strategist", "risk_analyzer"]
    );
    assert!(response.summary.ends_with("2/3 agents completed successfully."));
    assert_eq!(response.opportunities.as_ref().map(Vec::len), Some(2));

    assert_eq!(harness.agents["advanced_yield_strategist"].tasks()[0].role, AgentRole::Fallback);
    assert_eq!(harness.calls("market_intelligence"), 0);
}

#[tokio::test]
async fn test_supporting_agent_runs_once_when_fallbacks_are_needed() {
    let harness = Harness::new(
        safe_yield_intent(),
        vec![
            ("yield_optimizer", fail("rate feed offline")),
            ("advanced_yield_strategist", fail("rate feed offline")),
            ("market_intelligence", respond(json!({"recommendations": ["Stablecoin rates are flat"]}))),
            ("risk_analyzer", respond(risk_payload())),
        ],
    );

    let response = harness.orchestrator.process(safe_yield_request()).await;

    assert_eq!(harness.calls("risk_analyzer"), 1);
    assert_eq!(harness.agents["risk_analyzer"].tasks()[0].role, AgentRole::RiskChecker);
    assert_eq!(response.metadata.fallbacks_triggered, vec!["market_intelligence"]);
    assert_eq!(
        response.metadata.agents_used,
        vec![
            "yield_optimizer",
            "advanced_yield_strategist",
            "market_intelligence",
            "risk_analyzer"
        ]
    );
    assert!(response.summary.ends_with("2/4 agents completed successfully."));
}

#[tokio::test]
async fn test_all_agents_failing_returns_apology() {
    let harness = Harness::new(
        ScriptedLlm::failing("provider unreachable"),
        vec![
            ("risk_analyzer", fail("feed offline")),
            ("market_intelligence", MockBehavior::Panic("index out of bounds".into())),
        ],
    );

    let response = harness
        .orchestrator
        .process(QueryRequest::text("Am I at risk of liquidation on Aave?"))
        .await;

    assert_eq!(response.summary, APOLOGY_SUMMARY);
    assert_eq!(response.confidence, 0.0);
    assert_eq!(
        response.metadata.agents_used,
        vec!["risk_analyzer", "market_intelligence"]
    );
    assert!(response.metadata.fallbacks_triggered.is_empty());
    assert!(response.opportunities.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_configured_budget_yields_timeout_response() {
    let mut config = AppConfig::default();
    config.pipeline.timeout_ms = 2_000;

    let harness = Harness::with_config(
        config,
        ScriptedLlm::failing("provider unreachable"),
        vec![(
            "market_intelligence",
            MockBehavior::Delay(Duration::from_secs(60), json!({"recommendations": ["late"]})),
        )],
    );

    let request = QueryRequest::text("What's going on with ETH today?");
    let request_id = request.request_id.clone();
    let response = harness.orchestrator.run(request).await;

    assert_eq!(response.summary, TIMEOUT_SUMMARY);
    assert_eq!(response.confidence, 0.0);
    assert_eq!(response.metadata.request_id, Some(request_id));
    assert_eq!(response.metadata.total_execution_time_ms, 2_000);
}
