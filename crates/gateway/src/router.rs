//! Capability-based agent router.
//!
//! Routing is a pure function of the [`SemanticIntent`] and the static
//! [`CapabilityRegistry`]: no I/O, no randomness, ties keep registry order.

use defi_agent_agents::CapabilityRegistry;
use defi_agent_core::{
    config::{DesignatedAgents, RoutingConfig, RoutingWeights},
    types::{
        clamp_unit, AgentCapability, AgentRole, CoordinationStrategy, IntentType, PrimaryAgent,
        RiskTolerance, RoutingPlan, SemanticIntent, SupportingAgent, Urgency,
    },
};

const RISK_ANALYSIS_NEED: &str = "risk_analysis";
const GOVERNANCE_NEED: &str = "governance_opportunities";

/// A scored routing candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub score: f64,
    pub intent_match: bool,
    pub capability_matches: usize,
}

/// Scores registered agents against an intent and builds a [`RoutingPlan`].
#[derive(Debug, Clone, Default)]
pub struct AgentRouter {
    weights: RoutingWeights,
    agents: DesignatedAgents,
}

impl AgentRouter {
    pub fn new(weights: RoutingWeights, agents: DesignatedAgents) -> Self {
        Self { weights, agents }
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        Self::new(config.weights.clone(), config.agents.clone())
    }

    /// Build the routing plan for `intent`.
    pub fn route(&self, intent: &SemanticIntent, registry: &CapabilityRegistry) -> RoutingPlan {
        let candidates = self.rank(intent, registry);
        let primary_agent = self.select_primary(intent, &candidates);
        let supporting_agents = self.select_supporting(intent, &primary_agent.name, registry);
        let execution_order = execution_order(&primary_agent.name, &supporting_agents);
        let coordination_strategy = self.select_strategy(intent);
        let fallback_plan = self.fallback_chain(&primary_agent.name, &supporting_agents, &candidates);

        tracing::info!(
            primary = %primary_agent.name,
            confidence = primary_agent.confidence,
            supporting = supporting_agents.len(),
            strategy = coordination_strategy.as_str(),
            fallbacks = ?fallback_plan,
            "Routing plan built"
        );

        RoutingPlan {
            primary_agent,
            supporting_agents,
            execution_order,
            coordination_strategy,
            fallback_plan,
        }
    }

    /// Relevant agents, best first.
    pub fn rank(&self, intent: &SemanticIntent, registry: &CapabilityRegistry) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = registry
            .capabilities()
            .filter_map(|(name, capability)| self.score(name, intent, capability))
            .filter(|c| c.score > 0.0)
            .collect();

        // Stable: equal scores keep registration order.
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        tracing::debug!(
            candidates = ?candidates.iter().map(|c| (c.name.as_str(), c.score)).collect::<Vec<_>>(),
            "Agents scored"
        );
        candidates
    }

    /// Score one agent, or `None` when it serves neither the intent nor any
    /// implicit need.
    pub fn score(
        &self,
        name: &str,
        intent: &SemanticIntent,
        capability: &AgentCapability,
    ) -> Option<Candidate> {
        let w = &self.weights;

        let intent_match = capability.serves(intent.intent_type());
        let capability_matches = intent
            .context
            .implicit_needs
            .iter()
            .filter(|need| matches_any_capability(need, &capability.secondary_capabilities))
            .count();

        if !intent_match && capability_matches == 0 {
            return None;
        }

        let mut score = capability_matches as f64 * w.capability_match;
        if intent_match {
            score += w.intent_match;
        }
        if capability.requirements_satisfied(&intent.entities) {
            score += w.data_requirements;
        }
        score += self.complexity_fit(capability, intent.secondary.complexity);
        if intent.secondary.urgency == Urgency::High && capability.real_time_data {
            score += w.urgency_real_time;
        }

        Some(Candidate {
            name: name.to_string(),
            score,
            intent_match,
            capability_matches,
        })
    }

    fn complexity_fit(&self, capability: &AgentCapability, complexity: u8) -> f64 {
        let distance = capability.complexity.reference_value().abs_diff(complexity);
        if distance <= self.weights.complexity_close_distance {
            self.weights.complexity_close_points
        } else if distance <= self.weights.complexity_near_distance {
            self.weights.complexity_near_points
        } else {
            0.0
        }
    }

    fn select_primary(&self, intent: &SemanticIntent, candidates: &[Candidate]) -> PrimaryAgent {
        let w = &self.weights;

        match candidates.first() {
            Some(top) => {
                let ratio = if w.confidence_normalizer > 0.0 {
                    top.score / w.confidence_normalizer
                } else {
                    1.0
                };
                let confidence = (ratio * intent.primary.confidence).min(w.max_primary_confidence);
                PrimaryAgent {
                    name: top.name.clone(),
                    confidence: clamp_unit(confidence),
                    reasoning: format!(
                        "Best match for {} (score {:.1}: intent match {}, {} capability match(es))",
                        intent.intent_type().label(),
                        top.score,
                        if top.intent_match { "yes" } else { "no" },
                        top.capability_matches
                    ),
                }
            }
            None => {
                tracing::warn!(
                    intent = %intent.intent_type(),
                    default = %self.agents.default_agent,
                    "No agent matched, using default agent"
                );
                PrimaryAgent {
                    name: self.agents.default_agent.clone(),
                    confidence: clamp_unit(w.default_agent_confidence),
                    reasoning: format!(
                        "No suitable agent found for {}; using the default agent",
                        intent.intent_type().label()
                    ),
                }
            }
        }
    }

    fn select_supporting(
        &self,
        intent: &SemanticIntent,
        primary: &str,
        registry: &CapabilityRegistry,
    ) -> Vec<SupportingAgent> {
        let w = &self.weights;
        let mut supporting: Vec<SupportingAgent> = Vec::new();

        let mut add = |name: &str, role: AgentRole, confidence: f64| {
            if name != primary
                && registry.contains(name)
                && !supporting.iter().any(|s| s.name == name)
            {
                supporting.push(SupportingAgent {
                    name: name.to_string(),
                    role,
                    confidence: clamp_unit(confidence),
                });
            }
        };

        let large_position = intent
            .entities
            .amounts
            .iter()
            .any(|amount| *amount > w.large_amount_threshold);
        if intent.secondary.risk_tolerance == RiskTolerance::Low || large_position {
            add(
                &self.agents.risk_specialist,
                AgentRole::RiskChecker,
                w.risk_checker_confidence,
            );
        }

        if !intent.entities.tokens.is_empty() && intent.has_need(GOVERNANCE_NEED) {
            add(
                &self.agents.governance_specialist,
                AgentRole::DataProvider,
                w.data_provider_confidence,
            );
        }

        if intent.intent_type() == IntentType::YieldOptimization
            && intent.secondary.complexity > w.advanced_yield_complexity
        {
            add(
                &self.agents.advanced_yield_specialist,
                AgentRole::Validation,
                w.validation_confidence,
            );
        }

        supporting
    }

    /// First matching rule wins.
    pub fn select_strategy(&self, intent: &SemanticIntent) -> CoordinationStrategy {
        let w = &self.weights;
        let secondary = &intent.secondary;

        if secondary.urgency == Urgency::Critical
            || intent.intent_type() == IntentType::EmergencyAction
        {
            CoordinationStrategy::Sequential
        } else if secondary.complexity > w.parallel_complexity
            && intent.context.implicit_needs.len() > w.parallel_min_needs
        {
            CoordinationStrategy::Parallel
        } else if secondary.risk_tolerance == RiskTolerance::Low
            || intent.has_need(RISK_ANALYSIS_NEED)
        {
            CoordinationStrategy::Conditional
        } else {
            CoordinationStrategy::Sequential
        }
    }

    /// Agents already in the plan never reappear as fallbacks.
    fn fallback_chain(
        &self,
        primary: &str,
        supporting: &[SupportingAgent],
        candidates: &[Candidate],
    ) -> Vec<String> {
        let in_plan = |name: &str| name == primary || supporting.iter().any(|s| s.name == name);

        let mut chain: Vec<String> = candidates
            .iter()
            .filter(|c| !in_plan(&c.name))
            .take(self.weights.fallback_depth)
            .map(|c| c.name.clone())
            .collect();

        let default = &self.agents.default_agent;
        if !in_plan(default) && !chain.contains(default) {
            chain.push(default.clone());
        }
        chain
    }
}

/// Case-insensitive substring match in either direction.
fn matches_any_capability(need: &str, capabilities: &[String]) -> bool {
    let need = need.to_lowercase();
    capabilities.iter().any(|cap| {
        let cap = cap.to_lowercase();
        cap.contains(&need) || need.contains(&cap)
    })
}

/// Data providers, then primary, then validation and risk checks, then executors.
fn execution_order(primary: &str, supporting: &[SupportingAgent]) -> Vec<String> {
    let with_roles = |roles: &[AgentRole]| {
        supporting
            .iter()
            .filter(|s| roles.contains(&s.role))
            .map(|s| s.name.clone())
            .collect::<Vec<_>>()
    };

    let mut order = with_roles(&[AgentRole::DataProvider]);
    order.push(primary.to_string());
    order.extend(with_roles(&[AgentRole::Validation, AgentRole::RiskChecker]));
    order.extend(with_roles(&[AgentRole::Executor]));
    order
}
