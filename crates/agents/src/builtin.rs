//! Built-in agents backed by the inference service.
//!
//! Domain answers (yield search, risk scoring, governance lookup) are
//! produced by prompting the model with the agent's specialty and the
//! normalized task; the returned JSON object is the agent payload.

use async_trait::async_trait;
use std::sync::Arc;

use defi_agent_core::{
    config::InferenceConfig,
    traits::Agent,
    types::{AgentCapability, AgentPayload, AgentTask, ComplexityTier, DataRequirement, IntentType},
    Error, Result,
};
use defi_agent_model_gateway::InferenceService;

use crate::registry::CapabilityRegistry;

/// Payload fields every built-in agent is asked to return.
const PAYLOAD_CONTRACT: &str = r#"Respond ONLY with a JSON object using these optional fields:
{
  "summary": "one paragraph answer",
  "recommendations": ["short actionable sentence"],
  "opportunities": [{"protocol": "name", "asset": "symbol", "apy": 4.2, "tvl": 1000000, "chain": "ethereum"}],
  "riskAssessment": {"score": 1-10, "factors": ["..."]},
  "riskScore": 1-10,
  "proposals": [{"title": "...", "status": "active|closed", "endTime": "ISO-8601", "impact": "low|medium|high"}],
  "nextSteps": ["short follow-up"]
}
Omit fields that do not apply to your specialty."#;

/// Static description of a built-in agent.
#[derive(Debug, Clone)]
pub struct AgentSpec {
    pub name: &'static str,
    pub specialty: &'static str,
    pub capability: AgentCapability,
}

/// The fixed capability table loaded at start-up.
pub fn default_agent_specs() -> Vec<AgentSpec> {
    use ComplexityTier::*;
    use DataRequirement::*;
    use IntentType::*;

    vec![
        AgentSpec {
            name: "yield_optimizer",
            specialty: "Find and compare lending, staking and liquidity-pool yields.",
            capability: AgentCapability::new([YieldOptimization, LiquidityManagement])
                .with_capabilities(["yield_optimization", "apy_comparison", "gas_optimization", "comprehensive_analysis"])
                .with_requirements([Tokens])
                .with_complexity(Medium)
                .with_real_time_data(true),
        },
        AgentSpec {
            name: "advanced_yield_strategist",
            specialty: "Validate and design multi-step yield strategies such as leverage loops and delta-neutral farming.",
            capability: AgentCapability::new([YieldOptimization, ArbitrageDetection])
                .with_capabilities(["advanced_strategies", "leverage_analysis", "yield_validation", "comprehensive_analysis"])
                .with_requirements([Tokens, Protocols])
                .with_complexity(High)
                .with_real_time_data(true),
        },
        AgentSpec {
            name: "risk_analyzer",
            specialty: "Score protocol, liquidation and smart-contract risk on a 1-10 scale.",
            capability: AgentCapability::new([RiskAssessment, EmergencyAction])
                .with_capabilities(["risk_analysis", "risk_assessment", "liquidation_monitoring", "immediate_action"])
                .with_complexity(Medium)
                .with_real_time_data(true),
        },
        AgentSpec {
            name: "governance_tracker",
            specialty: "Track DAO proposals, voting deadlines and their impact on token holders.",
            capability: AgentCapability::new([GovernanceParticipation])
                .with_capabilities(["governance_opportunities", "proposal_tracking", "voting_analysis"])
                .with_requirements([Tokens])
                .with_complexity(Low)
                .with_real_time_data(false),
        },
        AgentSpec {
            name: "portfolio_analyst",
            specialty: "Analyze holdings, allocation and rebalancing options.",
            capability: AgentCapability::new([PortfolioAnalysis])
                .with_capabilities(["portfolio_tracking", "risk_assessment", "yield_optimization", "rebalancing"])
                .with_complexity(Medium)
                .with_real_time_data(false),
        },
        AgentSpec {
            name: "cross_chain_analyst",
            specialty: "Compare opportunities and bridge costs across chains.",
            capability: AgentCapability::new([CrossChainAnalysis, ArbitrageDetection])
                .with_capabilities(["bridge_analysis", "cross_chain_yields", "gas_optimization"])
                .with_requirements([Chains])
                .with_complexity(High)
                .with_real_time_data(true),
        },
        AgentSpec {
            name: "market_intelligence",
            specialty: "Summarize market trends, prices and sentiment.",
            capability: AgentCapability::new([MarketIntelligence])
                .with_capabilities(["market_trends", "price_analysis", "sentiment_analysis"])
                .with_complexity(Low)
                .with_real_time_data(true),
        },
    ]
}

/// Agent that answers by prompting the inference service.
pub struct InferenceAgent {
    name: String,
    specialty: String,
    capability: AgentCapability,
    inference: Arc<InferenceService>,
    temperature: f64,
    max_tokens: u32,
}

impl InferenceAgent {
    /// Samples with the default inference settings until [`Self::with_sampling`].
    pub fn new(spec: AgentSpec, inference: Arc<InferenceService>) -> Self {
        let defaults = InferenceConfig::default();
        Self {
            name: spec.name.to_string(),
            specialty: spec.specialty.to_string(),
            capability: spec.capability,
            inference,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
        }
    }

    /// Set sampling parameters.
    pub fn with_sampling(mut self, temperature: f64, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are the '{}' agent of a DeFi research assistant.\n\
             Specialty: {}\n\
             You may receive results from agents that ran earlier in the same request; \
             build on them instead of repeating them.\n\n{}",
            self.name, self.specialty, PAYLOAD_CONTRACT
        )
    }

    fn user_prompt(task: &AgentTask) -> Result<String> {
        let prior: Vec<_> = task
            .prior_results
            .iter()
            .filter(|r| r.success)
            .map(|r| serde_json::json!({ "agent": r.agent_name, "role": r.role, "response": r.response }))
            .collect();

        let body = serde_json::json!({
            "query": task.query,
            "role": task.role,
            "tokens": task.tokens,
            "protocols": task.protocols,
            "chains": task.chains,
            "amounts": task.amounts,
            "riskTolerance": task.risk_tolerance,
            "timeHorizon": task.time_horizon,
            "urgency": task.urgency,
            "priority": task.priority,
            "priorResults": prior,
        });

        Ok(format!("Task:\n{}", serde_json::to_string_pretty(&body)?))
    }
}

#[async_trait]
impl Agent for InferenceAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> &AgentCapability {
        &self.capability
    }

    async fn execute(&self, task: &AgentTask) -> Result<AgentPayload> {
        let user_prompt = Self::user_prompt(task)?;

        self.inference
            .infer_json_value(&self.system_prompt(), &user_prompt, self.temperature, self.max_tokens)
            .await
            .map_err(|e| Error::agent_execution(&self.name, e.to_string()))
    }
}

/// Build a registry holding one inference-backed agent per default spec,
/// sampling with the configured temperature and token budget.
pub fn create_default_registry(
    inference: Arc<InferenceService>,
    config: &InferenceConfig,
) -> Result<CapabilityRegistry> {
    let mut registry = CapabilityRegistry::new();
    for spec in default_agent_specs() {
        let agent = InferenceAgent::new(spec, inference.clone())
            .with_sampling(config.temperature, config.max_tokens);
        registry.register(Arc::new(agent))?;
    }
    Ok(registry)
}
