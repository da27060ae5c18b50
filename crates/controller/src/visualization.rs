//! Chart, gauge and table descriptors plus suggested actions.

use serde_json::{json, Map, Value};

use defi_agent_core::{
    config::SynthesisConfig,
    types::{ChartPoint, GaugeColor, SuggestedAction, Visualization},
};

const RISK_SCALE_MAX: f64 = 10.0;
const PROPOSAL_COLUMNS: [&str; 4] = ["title", "status", "endTime", "impact"];

/// Field lookup over a payload and its nested `analysis` object.
pub(crate) fn field<'a>(payload: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    payload.get(key).filter(|v| !v.is_null()).or_else(|| {
        payload
            .get("analysis")
            .and_then(Value::as_object)
            .and_then(|analysis| analysis.get(key))
            .filter(|v| !v.is_null())
    })
}

/// Numeric risk score from `riskScore` or `riskAssessment.score`.
pub(crate) fn risk_score(payload: &Map<String, Value>) -> Option<f64> {
    field(payload, "riskScore")
        .and_then(Value::as_f64)
        .or_else(|| {
            field(payload, "riskAssessment")
                .and_then(|r| r.get("score"))
                .and_then(Value::as_f64)
        })
        .filter(|score| score.is_finite())
}

fn yield_points(payload: &Map<String, Value>, limit: usize) -> Vec<ChartPoint> {
    field(payload, "opportunities")
        .and_then(Value::as_array)
        .map(|opportunities| {
            opportunities
                .iter()
                .filter_map(|o| {
                    let apy = o.get("apy").and_then(Value::as_f64)?;
                    let protocol = o.get("protocol").and_then(Value::as_str).unwrap_or("unknown");
                    Some(ChartPoint {
                        x: protocol.to_string(),
                        y: apy,
                    })
                })
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}

fn proposals(payload: &Map<String, Value>) -> &[Value] {
    field(payload, "proposals")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Builds UI descriptors from successful agent payloads.
pub struct VisualizationBuilder<'a> {
    config: &'a SynthesisConfig,
}

impl<'a> VisualizationBuilder<'a> {
    pub fn new(config: &'a SynthesisConfig) -> Self {
        Self { config }
    }

    pub fn gauge_color(&self, score: f64) -> GaugeColor {
        if score <= self.config.gauge_green_max {
            GaugeColor::Green
        } else if score <= self.config.gauge_yellow_max {
            GaugeColor::Yellow
        } else {
            GaugeColor::Red
        }
    }

    /// At most one descriptor per payload: yield chart, then risk gauge,
    /// then proposal table.
    pub fn describe(&self, payload: &Map<String, Value>) -> Option<Visualization> {
        let points = yield_points(payload, self.config.max_chart_points);
        if !points.is_empty() {
            return Some(Visualization::BarChart {
                title: "Top Yield Opportunities".to_string(),
                x_label: "Protocol".to_string(),
                y_label: "APY (%)".to_string(),
                data: points,
            });
        }

        if let Some(score) = risk_score(payload) {
            return Some(Visualization::Gauge {
                title: "Risk Score".to_string(),
                value: score,
                max: RISK_SCALE_MAX,
                color: self.gauge_color(score),
            });
        }

        let proposals = proposals(payload);
        if !proposals.is_empty() {
            return Some(Visualization::Table {
                title: "Governance Proposals".to_string(),
                columns: PROPOSAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
                rows: proposals
                    .iter()
                    .map(|p| PROPOSAL_COLUMNS.iter().map(|c| cell(p.get(*c))).collect())
                    .collect(),
            });
        }

        None
    }

    /// Invest, rebalance and vote suggestions, each at most once.
    pub fn suggest_actions(
        &self,
        payloads: &[&Map<String, Value>],
        opportunities: &[Value],
    ) -> Vec<SuggestedAction> {
        let mut actions = Vec::new();

        let top = opportunities
            .iter()
            .filter_map(|o| o.get("apy").and_then(Value::as_f64).map(|apy| (apy, o)))
            .max_by(|a, b| a.0.total_cmp(&b.0));
        if let Some((apy, opportunity)) = top {
            let protocol = opportunity.get("protocol").and_then(Value::as_str).unwrap_or("the top protocol");
            actions.push(SuggestedAction {
                action_type: "invest".to_string(),
                label: "Invest in top opportunity".to_string(),
                description: format!("Deposit into {} at {:.2}% APY", protocol, apy),
                params: opportunity.clone(),
            });
        }

        let max_risk = payloads
            .iter()
            .filter_map(|p| risk_score(p))
            .max_by(|a, b| a.total_cmp(b));
        if let Some(score) = max_risk.filter(|s| *s > self.config.rebalance_risk_score) {
            actions.push(SuggestedAction {
                action_type: "rebalance".to_string(),
                label: "Rebalance portfolio".to_string(),
                description: format!("Risk score {:.1} exceeds your comfort level", score),
                params: json!({ "riskScore": score }),
            });
        }

        let active: Vec<&Value> = payloads
            .iter()
            .flat_map(|p| proposals(p))
            .filter(|p| {
                p.get("status")
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.eq_ignore_ascii_case("active"))
            })
            .collect();
        if !active.is_empty() {
            actions.push(SuggestedAction {
                action_type: "vote".to_string(),
                label: "Vote on proposals".to_string(),
                description: format!("{} active proposal(s) are open for voting", active.len()),
                params: json!({ "proposals": active }),
            });
        }

        actions
    }
}
