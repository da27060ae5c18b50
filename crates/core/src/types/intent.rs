use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// =============================================================================
// Intent Types (L0 Classifier Output)
// =============================================================================

/// Primary purpose of a user query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentType {
    YieldOptimization,
    RiskAssessment,
    GovernanceParticipation,
    PortfolioAnalysis,
    MarketIntelligence,
    CrossChainAnalysis,
    ArbitrageDetection,
    LiquidityManagement,
    EmergencyAction,
}

impl IntentType {
    /// All recognized intent categories, in prompt order.
    pub const ALL: [IntentType; 9] = [
        Self::YieldOptimization,
        Self::RiskAssessment,
        Self::GovernanceParticipation,
        Self::PortfolioAnalysis,
        Self::MarketIntelligence,
        Self::CrossChainAnalysis,
        Self::ArbitrageDetection,
        Self::LiquidityManagement,
        Self::EmergencyAction,
    ];

    /// Wire name (e.g. `YIELD_OPTIMIZATION`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::YieldOptimization => "YIELD_OPTIMIZATION",
            Self::RiskAssessment => "RISK_ASSESSMENT",
            Self::GovernanceParticipation => "GOVERNANCE_PARTICIPATION",
            Self::PortfolioAnalysis => "PORTFOLIO_ANALYSIS",
            Self::MarketIntelligence => "MARKET_INTELLIGENCE",
            Self::CrossChainAnalysis => "CROSS_CHAIN_ANALYSIS",
            Self::ArbitrageDetection => "ARBITRAGE_DETECTION",
            Self::LiquidityManagement => "LIQUIDITY_MANAGEMENT",
            Self::EmergencyAction => "EMERGENCY_ACTION",
        }
    }

    /// Human-readable label: lower-cased, underscores replaced with spaces.
    pub fn label(&self) -> String {
        self.as_str().to_lowercase().replace('_', " ")
    }
}

impl std::fmt::Display for IntentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How quickly the user needs an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Appetite for risk, stated or inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    #[default]
    Medium,
    High,
}

impl std::str::FromStr for RiskTolerance {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown risk tolerance '{}'", other)),
        }
    }
}

/// Investment horizon of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeHorizon {
    Short,
    #[default]
    Medium,
    Long,
}

/// Self-reported user experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

/// Primary classification with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PrimaryIntent {
    #[serde(rename = "type")]
    pub intent_type: IntentType,
    /// Confidence in [0, 1].
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

/// Secondary modifiers of the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SecondaryIntent {
    pub urgency: Urgency,
    pub risk_tolerance: RiskTolerance,
    pub time_horizon: TimeHorizon,
    /// Complexity on a 1..=10 scale.
    #[serde(deserialize_with = "lenient_complexity")]
    #[schemars(with = "u8")]
    pub complexity: u8,
}

/// Accept any JSON number for complexity, rounded and clamped to 1..=10.
fn lenient_complexity<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(if raw.is_finite() {
        raw.round().clamp(1.0, 10.0) as u8
    } else {
        5
    })
}

impl Default for SecondaryIntent {
    fn default() -> Self {
        Self {
            urgency: Urgency::Medium,
            risk_tolerance: RiskTolerance::Medium,
            time_horizon: TimeHorizon::Medium,
            complexity: 5,
        }
    }
}

/// Entities mentioned in the query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExtractedEntities {
    pub tokens: Vec<String>,
    pub protocols: Vec<String>,
    pub chains: Vec<String>,
    /// USD-denominated amounts.
    pub amounts: Vec<f64>,
    pub confidence: f64,
}

/// One prior exchange in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConversationTurn {
    pub role: String,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Stated preferences of the requesting user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub risk_tolerance: RiskTolerance,
    pub experience_level: ExperienceLevel,
    pub portfolio_size: Option<f64>,
    pub preferred_chains: Vec<String>,
    pub preferred_protocols: Vec<String>,
}

impl UserProfile {
    pub fn with_risk_tolerance(risk_tolerance: RiskTolerance) -> Self {
        Self {
            risk_tolerance,
            ..Default::default()
        }
    }
}

/// Derived context attached to an intent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct IntentContext {
    pub implicit_needs: Vec<String>,
    pub conversation_history: Option<Vec<ConversationTurn>>,
    pub user_profile: Option<UserProfile>,
}

/// Structured classification of one request. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SemanticIntent {
    pub primary: PrimaryIntent,
    #[serde(default)]
    pub secondary: SecondaryIntent,
    #[serde(default)]
    pub entities: ExtractedEntities,
    #[serde(default)]
    pub context: IntentContext,
}

impl SemanticIntent {
    /// Build an intent with default modifiers and no entities.
    pub fn new(intent_type: IntentType, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            primary: PrimaryIntent {
                intent_type,
                confidence: clamp_unit(confidence),
                reasoning: reasoning.into(),
            },
            secondary: SecondaryIntent::default(),
            entities: ExtractedEntities::default(),
            context: IntentContext::default(),
        }
    }

    pub fn intent_type(&self) -> IntentType {
        self.primary.intent_type
    }

    pub fn has_need(&self, need: &str) -> bool {
        self.context.implicit_needs.iter().any(|n| n == need)
    }
}

/// Clamp a confidence-like value into [0, 1]; non-finite values become 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
