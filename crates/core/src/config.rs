use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub inference: InferenceConfig,
    pub classifier: ClassifierConfig,
    pub routing: RoutingConfig,
    pub synthesis: SynthesisConfig,
    pub pipeline: PipelineConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InferenceConfig {
    /// `openai`, `anthropic` or `mock`.
    pub provider: String,
    pub model: String,
    /// Secondary profile used once on capacity-limit failures.
    pub secondary_model: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Token budget multiplier for the capacity-limit retry.
    pub retry_token_factor: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClassifierConfig {
    pub history_turns: usize,
    pub temperature: f64,
    pub max_tokens: u32,
    pub weak_entity_confidence: f64,
    pub strong_intent_confidence: f64,
    pub grounding_penalty: f64,
    pub grounding_floor: f64,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct RoutingConfig {
    pub weights: RoutingWeights,
    pub agents: DesignatedAgents,
}

/// Every hand-tuned routing constant in one place.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RoutingWeights {
    pub intent_match: f64,
    pub capability_match: f64,
    pub data_requirements: f64,
    pub urgency_real_time: f64,
    pub complexity_close_points: f64,
    pub complexity_close_distance: u8,
    pub complexity_near_points: f64,
    pub complexity_near_distance: u8,
    /// Divisor turning a raw score into a confidence.
    pub confidence_normalizer: f64,
    pub max_primary_confidence: f64,
    pub default_agent_confidence: f64,
    /// USD amount above which the risk specialist is attached.
    pub large_amount_threshold: f64,
    pub advanced_yield_complexity: u8,
    pub parallel_complexity: u8,
    pub parallel_min_needs: usize,
    pub risk_checker_confidence: f64,
    pub data_provider_confidence: f64,
    pub validation_confidence: f64,
    pub fallback_depth: usize,
}

/// Agents with a fixed role in routing decisions.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DesignatedAgents {
    pub default_agent: String,
    pub risk_specialist: String,
    pub governance_specialist: String,
    pub advanced_yield_specialist: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SynthesisConfig {
    pub intent_weight: f64,
    pub routing_weight: f64,
    pub success_weight: f64,
    pub max_chart_points: usize,
    pub gauge_green_max: f64,
    pub gauge_yellow_max: f64,
    pub rebalance_risk_score: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    pub timeout_ms: u64,
    pub visualization: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_filter: String,
    pub json_logs: bool,
    pub prometheus: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("DEFI_AGENT_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map APP__PIPELINE__TIMEOUT_MS=8000 to pipeline.timeout_ms
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "gpt-4o-mini".into(),
            secondary_model: None,
            temperature: 0.3,
            max_tokens: 2000,
            retry_token_factor: 0.5,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            history_turns: 5,
            temperature: 0.1,
            max_tokens: 1000,
            weak_entity_confidence: 0.5,
            strong_intent_confidence: 0.8,
            grounding_penalty: 0.2,
            grounding_floor: 0.6,
        }
    }
}

impl Default for RoutingWeights {
    fn default() -> Self {
        Self {
            intent_match: 10.0,
            capability_match: 3.0,
            data_requirements: 2.0,
            urgency_real_time: 2.0,
            complexity_close_points: 3.0,
            complexity_close_distance: 1,
            complexity_near_points: 1.0,
            complexity_near_distance: 3,
            confidence_normalizer: 15.0,
            max_primary_confidence: 0.95,
            default_agent_confidence: 0.3,
            large_amount_threshold: 10_000.0,
            advanced_yield_complexity: 6,
            parallel_complexity: 7,
            parallel_min_needs: 2,
            risk_checker_confidence: 0.8,
            data_provider_confidence: 0.7,
            validation_confidence: 0.85,
            fallback_depth: 2,
        }
    }
}

impl Default for DesignatedAgents {
    fn default() -> Self {
        Self {
            default_agent: "market_intelligence".into(),
            risk_specialist: "risk_analyzer".into(),
            governance_specialist: "governance_tracker".into(),
            advanced_yield_specialist: "advanced_yield_strategist".into(),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            intent_weight: 0.4,
            routing_weight: 0.3,
            success_weight: 0.3,
            max_chart_points: 10,
            gauge_green_max: 4.0,
            gauge_yellow_max: 7.0,
            rebalance_risk_score: 7.0,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            visualization: false,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: "info,defi_agent=debug".into(),
            json_logs: false,
            prometheus: false,
        }
    }
}
