use serde::{Deserialize, Serialize};

use super::intent::{ExtractedEntities, IntentType};

// =============================================================================
// Capability Descriptors (static agent metadata)
// =============================================================================

/// Entity class an agent needs before it can produce a useful answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataRequirement {
    Tokens,
    Protocols,
    Chains,
}

impl DataRequirement {
    /// A requirement is satisfied when the matching entity list is non-empty.
    pub fn is_satisfied_by(&self, entities: &ExtractedEntities) -> bool {
        match self {
            Self::Tokens => !entities.tokens.is_empty(),
            Self::Protocols => !entities.protocols.is_empty(),
            Self::Chains => !entities.chains.is_empty(),
        }
    }
}

/// Complexity tier an agent is tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTier {
    Low,
    #[default]
    Medium,
    High,
}

impl ComplexityTier {
    /// Reference point on the 1..=10 query complexity scale.
    pub fn reference_value(&self) -> u8 {
        match self {
            Self::Low => 3,
            Self::Medium => 6,
            Self::High => 9,
        }
    }
}

/// Static description of what an agent can do.
///
/// Loaded once at process start and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapability {
    pub primary_intents: Vec<IntentType>,
    pub secondary_capabilities: Vec<String>,
    pub data_requirements: Vec<DataRequirement>,
    pub complexity: ComplexityTier,
    pub real_time_data: bool,
}

impl AgentCapability {
    pub fn new(primary_intents: impl IntoIterator<Item = IntentType>) -> Self {
        Self {
            primary_intents: primary_intents.into_iter().collect(),
            secondary_capabilities: Vec::new(),
            data_requirements: Vec::new(),
            complexity: ComplexityTier::Medium,
            real_time_data: false,
        }
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.secondary_capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_requirements(mut self, requirements: impl IntoIterator<Item = DataRequirement>) -> Self {
        self.data_requirements = requirements.into_iter().collect();
        self
    }

    pub fn with_complexity(mut self, complexity: ComplexityTier) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_real_time_data(mut self, real_time: bool) -> Self {
        self.real_time_data = real_time;
        self
    }

    pub fn serves(&self, intent: IntentType) -> bool {
        self.primary_intents.contains(&intent)
    }

    pub fn requirements_satisfied(&self, entities: &ExtractedEntities) -> bool {
        self.data_requirements
            .iter()
            .all(|r| r.is_satisfied_by(entities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirements_satisfied() {
        let cap = AgentCapability::new([IntentType::CrossChainAnalysis])
            .with_requirements([DataRequirement::Tokens, DataRequirement::Chains]);

        let mut entities = ExtractedEntities {
            tokens: vec!["ETH".into()],
            ..Default::default()
        };
        assert!(!cap.requirements_satisfied(&entities));

        entities.chains.push("arbitrum".into());
        assert!(cap.requirements_satisfied(&entities));
    }

    #[test]
    fn test_no_requirements_always_satisfied() {
        let cap = AgentCapability::new([IntentType::MarketIntelligence]);
        assert!(cap.requirements_satisfied(&ExtractedEntities::default()));
    }
}
