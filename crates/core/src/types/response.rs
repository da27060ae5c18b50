use serde::{Deserialize, Serialize};

use super::plan::CoordinationStrategy;

// =============================================================================
// Unified Response (pipeline output)
// =============================================================================

/// Summary returned when no agent produced a usable answer.
pub const APOLOGY_SUMMARY: &str = "I apologize, but I encountered an issue processing your request. \
Please try again or rephrase your question.";

/// Summary returned when the caller's wall-clock budget is exhausted.
pub const TIMEOUT_SUMMARY: &str = "The analysis is taking longer than expected. \
Please try again with a more specific question.";

/// Request-scoped bookkeeping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub total_execution_time_ms: u64,
    pub agents_used: Vec<String>,
    pub coordination_strategy: CoordinationStrategy,
    pub fallbacks_triggered: Vec<String>,
}

/// Gauge colour band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeColor {
    Green,
    Yellow,
    Red,
}

/// One bar of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: String,
    pub y: f64,
}

/// Chart, metric or table descriptor for chart-producing UIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Visualization {
    BarChart {
        title: String,
        x_label: String,
        y_label: String,
        data: Vec<ChartPoint>,
    },
    Gauge {
        title: String,
        value: f64,
        max: f64,
        color: GaugeColor,
    },
    Table {
        title: String,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

/// Follow-up the UI may offer as a one-click action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedAction {
    pub action_type: String,
    pub label: String,
    pub description: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// The single merged answer returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedResponse {
    pub summary: String,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunities: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_assessment: Option<serde_json::Value>,
    pub next_steps: Vec<String>,
    pub confidence: f64,
    pub metadata: ResponseMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualizations: Option<Vec<Visualization>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_actions: Option<Vec<SuggestedAction>>,
}

impl UnifiedResponse {
    /// Canonical degraded response: fixed apology, zero confidence.
    pub fn error(metadata: ResponseMetadata) -> Self {
        Self {
            summary: APOLOGY_SUMMARY.to_string(),
            recommendations: vec![
                "Try rephrasing your question with more specific details".to_string(),
                "Check that the tokens or protocols you mentioned are supported".to_string(),
                "Try again in a few moments".to_string(),
            ],
            opportunities: None,
            risk_assessment: None,
            next_steps: vec![
                "Rephrase your query".to_string(),
                "Contact support if the issue persists".to_string(),
            ],
            confidence: 0.0,
            metadata,
            visualizations: None,
            suggested_actions: None,
        }
    }

    /// Deterministic response used when the wall-clock budget runs out.
    pub fn timeout(metadata: ResponseMetadata) -> Self {
        Self {
            summary: TIMEOUT_SUMMARY.to_string(),
            recommendations: vec![
                "Narrow the question to a single token or protocol".to_string(),
                "Try again in a few moments".to_string(),
            ],
            next_steps: vec!["Retry the request".to_string()],
            ..Self::error(metadata)
        }
    }

    pub fn is_error(&self) -> bool {
        self.confidence == 0.0 && self.summary == APOLOGY_SUMMARY
    }
}
