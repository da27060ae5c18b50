//! Keyword tables for the deterministic classifier fallback and for
//! implicit-need derivation.

use defi_agent_core::types::{IntentType, SemanticIntent};

/// Confidence of a fallback intent backed by a stem match.
pub const STEM_MATCH_CONFIDENCE: f64 = 0.3;

/// Confidence of the market-intelligence default.
pub const DEFAULT_CONFIDENCE: f64 = 0.1;

/// Intent cues checked in priority order. The first table with a hit wins.
/// Stems match word prefixes; words must match a whole word.
const FALLBACK_CUES: &[(IntentType, &[&str], &[&str])] = &[
    (
        IntentType::YieldOptimization,
        &["yield", "apy", "apr", "farm", "stak", "earn", "lend"],
        &["interest", "interests"],
    ),
    (
        IntentType::RiskAssessment,
        &["risk", "liquidat", "safe", "secur", "exposure", "hedge"],
        &[],
    ),
    (
        IntentType::GovernanceParticipation,
        &["govern", "proposal", "vote", "voting", "dao"],
        &[],
    ),
    (
        IntentType::PortfolioAnalysis,
        &["portfolio", "holdings", "balance", "rebalanc", "allocation"],
        &[],
    ),
];

const SAFETY_CUES: &[&str] = &["safe", "secure"];
const COST_CUES: &[&str] = &["gas", "fee"];
const COMPARISON_CUES: &[&str] = &["best", "compare"];
const URGENCY_CUES: &[&str] = &["urgent", "emergency"];
const GOVERNANCE_CUES: &[&str] = &["vote", "governance", "proposal"];

fn contains_any(text: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| text.contains(cue))
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty())
}

/// True if any word of `text` starts with `stem`.
fn has_stem(text: &str, stem: &str) -> bool {
    words(text).any(|word| word.starts_with(stem))
}

fn has_word(text: &str, cue: &str) -> bool {
    words(text).any(|word| word == cue)
}

/// Pure keyword classification.
///
/// Never fails: a query with no recognized stem becomes a low-confidence
/// market-intelligence intent.
pub fn fallback_intent(query: &str) -> SemanticIntent {
    let lower = query.to_lowercase();

    for (intent, stems, whole_words) in FALLBACK_CUES {
        let hit = stems
            .iter()
            .find(|stem| has_stem(&lower, stem))
            .or_else(|| whole_words.iter().find(|cue| has_word(&lower, cue)));
        if let Some(cue) = hit {
            return SemanticIntent::new(
                *intent,
                STEM_MATCH_CONFIDENCE,
                format!("Keyword fallback matched '{}'", cue),
            );
        }
    }

    SemanticIntent::new(
        IntentType::MarketIntelligence,
        DEFAULT_CONFIDENCE,
        "Keyword fallback found no intent cue",
    )
}

/// Implicit needs triggered by the raw query for a given primary intent.
pub fn implicit_needs(intent: IntentType, query: &str) -> Vec<String> {
    let lower = query.to_lowercase();
    let mut needs: Vec<&str> = Vec::new();

    match intent {
        IntentType::YieldOptimization => {
            if contains_any(&lower, SAFETY_CUES) {
                needs.push("risk_analysis");
            }
            if contains_any(&lower, COST_CUES) {
                needs.push("gas_optimization");
            }
            if contains_any(&lower, GOVERNANCE_CUES) {
                needs.push("governance_opportunities");
            }
        }
        IntentType::PortfolioAnalysis => {
            needs.push("risk_assessment");
            needs.push("yield_optimization");
            if contains_any(&lower, GOVERNANCE_CUES) {
                needs.push("governance_opportunities");
            }
        }
        IntentType::RiskAssessment => {
            if lower.contains("liquidat") {
                needs.push("liquidation_monitoring");
            }
        }
        IntentType::CrossChainAnalysis => {
            if lower.contains("bridge") {
                needs.push("bridge_analysis");
            }
        }
        _ => {}
    }

    if contains_any(&lower, COMPARISON_CUES) {
        needs.push("comprehensive_analysis");
    }
    if contains_any(&lower, URGENCY_CUES) {
        needs.push("immediate_action");
    }

    needs.into_iter().map(String::from).collect()
}

/// Union `extra` into `needs`, keeping first-seen order.
pub fn merge_needs(needs: &mut Vec<String>, extra: Vec<String>) {
    for need in extra {
        if !needs.contains(&need) {
            needs.push(need);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_priority_order() {
        // "safe" is a risk stem but yield is checked first.
        let intent = fallback_intent("Find me safe yield for USDC");
        assert_eq!(intent.intent_type(), IntentType::YieldOptimization);
        assert_eq!(intent.primary.confidence, STEM_MATCH_CONFIDENCE);
        assert!(intent.context.implicit_needs.is_empty());
        assert!(intent.entities.tokens.is_empty());
    }

    #[test]
    fn test_fallback_matches_word_prefixes_only() {
        // "learn" must not hit the "earn" stem.
        let intent = fallback_intent("I want to learn about liquidation risk");
        assert_eq!(intent.intent_type(), IntentType::RiskAssessment);

        let intent = fallback_intent("Show my staking rewards");
        assert_eq!(intent.intent_type(), IntentType::YieldOptimization);
    }

    #[test]
    fn test_interest_matches_whole_words_only() {
        let intent = fallback_intent("Interesting, what's my liquidation risk?");
        assert_eq!(intent.intent_type(), IntentType::RiskAssessment);

        let intent = fallback_intent("I'm interested in a DAO vote");
        assert_eq!(intent.intent_type(), IntentType::GovernanceParticipation);

        for query in ["Where do I get interest on DAI?", "best interest-bearing stablecoin"] {
            let intent = fallback_intent(query);
            assert_eq!(intent.intent_type(), IntentType::YieldOptimization, "{}", query);
            assert_eq!(intent.primary.confidence, STEM_MATCH_CONFIDENCE);
        }
    }

    #[test]
    fn test_fallback_default() {
        let intent = fallback_intent("What's happening with ETH today?");
        assert_eq!(intent.intent_type(), IntentType::MarketIntelligence);
        assert_eq!(intent.primary.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_yield_needs() {
        let needs = implicit_needs(
            IntentType::YieldOptimization,
            "What is the best safe yield after gas fees?",
        );
        assert_eq!(
            needs,
            vec!["risk_analysis", "gas_optimization", "comprehensive_analysis"]
        );
    }

    #[test]
    fn test_portfolio_always_needs_risk_and_yield() {
        let needs = implicit_needs(IntentType::PortfolioAnalysis, "show my holdings");
        assert_eq!(needs, vec!["risk_assessment", "yield_optimization"]);
    }

    #[test]
    fn test_supplementary_triggers() {
        assert!(implicit_needs(IntentType::RiskAssessment, "liquidation levels?")
            .contains(&"liquidation_monitoring".to_string()));
        assert!(implicit_needs(IntentType::CrossChainAnalysis, "cheapest bridge to arbitrum")
            .contains(&"bridge_analysis".to_string()));
        assert!(implicit_needs(IntentType::PortfolioAnalysis, "any proposal I should vote on?")
            .contains(&"governance_opportunities".to_string()));
        assert!(implicit_needs(IntentType::MarketIntelligence, "URGENT: is usdc depegging")
            .contains(&"immediate_action".to_string()));
    }

    #[test]
    fn test_merge_needs_deduplicates() {
        let mut needs = vec!["risk_analysis".to_string()];
        merge_needs(
            &mut needs,
            vec!["gas_optimization".into(), "risk_analysis".into()],
        );
        assert_eq!(needs, vec!["risk_analysis", "gas_optimization"]);
    }
}
