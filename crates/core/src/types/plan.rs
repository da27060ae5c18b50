use serde::{Deserialize, Serialize};

// =============================================================================
// Routing Plan (L0 Router Output)
// =============================================================================

/// Role an agent plays within one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Primary,
    Validation,
    DataProvider,
    RiskChecker,
    Executor,
    /// Stand-in invoked after the primary agent failed.
    Fallback,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Validation => "validation",
            Self::DataProvider => "data_provider",
            Self::RiskChecker => "risk_checker",
            Self::Executor => "executor",
            Self::Fallback => "fallback",
        }
    }
}

/// How the selected agents are run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinationStrategy {
    #[default]
    Sequential,
    Parallel,
    Conditional,
}

impl CoordinationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
            Self::Conditional => "conditional",
        }
    }
}

/// The agent chosen to answer the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryAgent {
    pub name: String,
    pub confidence: f64,
    pub reasoning: String,
}

/// An agent that assists the primary one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportingAgent {
    pub name: String,
    pub role: AgentRole,
    pub confidence: f64,
}

/// Decision of which agents run, in what order and how.
///
/// Created fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingPlan {
    pub primary_agent: PrimaryAgent,
    pub supporting_agents: Vec<SupportingAgent>,
    pub execution_order: Vec<String>,
    pub coordination_strategy: CoordinationStrategy,
    pub fallback_plan: Vec<String>,
}

impl RoutingPlan {
    /// Role of `name` within this plan.
    pub fn role_of(&self, name: &str) -> Option<AgentRole> {
        if self.primary_agent.name == name {
            return Some(AgentRole::Primary);
        }
        self.supporting_agents
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.role)
    }

    pub fn is_primary(&self, name: &str) -> bool {
        self.primary_agent.name == name
    }

    /// Primary followed by supporting agents, in declaration order.
    pub fn agents(&self) -> Vec<&str> {
        std::iter::once(self.primary_agent.name.as_str())
            .chain(self.supporting_agents.iter().map(|s| s.name.as_str()))
            .collect()
    }

    /// Supporting agents in execution order.
    pub fn supporting_in_order(&self) -> Vec<&SupportingAgent> {
        self.execution_order
            .iter()
            .filter_map(|name| self.supporting_agents.iter().find(|s| &s.name == name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> RoutingPlan {
        RoutingPlan {
            primary_agent: PrimaryAgent {
                name: "yield_optimizer".into(),
                confidence: 0.8,
                reasoning: String::new(),
            },
            supporting_agents: vec![
                SupportingAgent {
                    name: "risk_analyzer".into(),
                    role: AgentRole::RiskChecker,
                    confidence: 0.8,
                },
                SupportingAgent {
                    name: "governance_tracker".into(),
                    role: AgentRole::DataProvider,
                    confidence: 0.7,
                },
            ],
            execution_order: vec![
                "governance_tracker".into(),
                "yield_optimizer".into(),
                "risk_analyzer".into(),
            ],
            coordination_strategy: CoordinationStrategy::Conditional,
            fallback_plan: vec![],
        }
    }

    #[test]
    fn test_role_lookup() {
        let plan = plan();
        assert_eq!(plan.role_of("yield_optimizer"), Some(AgentRole::Primary));
        assert_eq!(plan.role_of("risk_analyzer"), Some(AgentRole::RiskChecker));
        assert_eq!(plan.role_of("unknown"), None);
    }

    #[test]
    fn test_supporting_follow_execution_order() {
        let plan = plan();
        let names: Vec<_> = plan.supporting_in_order().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["governance_tracker", "risk_analyzer"]);
    }

    #[test]
    fn test_strategy_wire_format() {
        let json = serde_json::to_value(plan()).unwrap();
        assert_eq!(json["coordinationStrategy"], "conditional");
        assert_eq!(json["supportingAgents"][1]["role"], "data_provider");
    }
}
