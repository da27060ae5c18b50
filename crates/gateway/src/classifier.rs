//! Intent classifier: inference-scored with a keyword fallback.

use std::sync::Arc;

use defi_agent_core::{
    config::ClassifierConfig,
    types::{
        clamp_unit, ConversationTurn, IntentType, QueryRequest, RiskTolerance,
        SemanticIntent, UserProfile,
    },
};
use defi_agent_model_gateway::InferenceService;

use crate::keywords;

/// Trigger phrases shown to the model for each intent category.
const CATEGORY_CUES: &[(IntentType, &str)] = &[
    (IntentType::YieldOptimization, "best yield, highest APY, where to stake, farming, lending rates"),
    (IntentType::RiskAssessment, "is it safe, protocol risk, liquidation risk, smart contract audit"),
    (IntentType::GovernanceParticipation, "proposals, voting, DAO decisions, delegate"),
    (IntentType::PortfolioAnalysis, "my holdings, allocation, rebalance, performance"),
    (IntentType::MarketIntelligence, "price, trends, sentiment, what is happening"),
    (IntentType::CrossChainAnalysis, "bridge, other chains, L2 comparison, cross-chain yields"),
    (IntentType::ArbitrageDetection, "price difference, arbitrage, spread between DEXes"),
    (IntentType::LiquidityManagement, "provide liquidity, LP position, impermanent loss, ranges"),
    (IntentType::EmergencyAction, "exploit, hack, depeg, withdraw now, urgent exit"),
];

const MODIFIER_CUES: &str = "\
- urgency: \"now\", \"asap\", \"urgent\" => high; \"emergency\", \"hack\", \"exploit\" => critical; no time pressure => low or medium
- riskTolerance: \"safe\", \"conservative\", \"stable\" => low; \"degen\", \"aggressive\", \"max\" => high; otherwise medium
- timeHorizon: \"today\", \"this week\" => short; \"long term\", \"hold\", \"years\" => long; otherwise medium
- complexity: 1 for a single lookup, 10 for multi-protocol, multi-chain strategies";

/// Where a classification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    Inference,
    KeywordFallback,
}

impl ClassificationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inference => "inference",
            Self::KeywordFallback => "keyword_fallback",
        }
    }
}

/// Turns a raw query into a [`SemanticIntent`].
///
/// Classification never fails: inference errors and unparsable output
/// degrade to the keyword fallback, and post-processing runs on both paths.
pub struct IntentClassifier {
    inference: Arc<InferenceService>,
    config: ClassifierConfig,
    schema: String,
}

impl IntentClassifier {
    pub fn new(inference: Arc<InferenceService>, config: ClassifierConfig) -> Self {
        let schema = serde_json::to_string_pretty(&schemars::schema_for!(SemanticIntent))
            .unwrap_or_default();
        Self {
            inference,
            config,
            schema,
        }
    }

    /// Classify a request.
    pub async fn classify(&self, request: &QueryRequest) -> SemanticIntent {
        self.classify_with_source(request).await.0
    }

    /// Classify a request and report which path produced the intent.
    pub async fn classify_with_source(
        &self,
        request: &QueryRequest,
    ) -> (SemanticIntent, ClassificationSource) {
        let history = request.recent_history(self.config.history_turns);
        let profile = request.user_profile.as_ref();

        let user_prompt = self.build_user_prompt(&request.query, history, profile);
        let inferred = self
            .inference
            .infer_json::<SemanticIntent>(
                &self.build_system_prompt(),
                &user_prompt,
                self.config.temperature,
                self.config.max_tokens,
            )
            .await;

        let (intent, source) = match inferred {
            Ok(intent) => (normalize(intent), ClassificationSource::Inference),
            Err(e) => {
                tracing::warn!(error = %e, "Intent inference failed, using keyword fallback");
                (
                    keywords::fallback_intent(&request.query),
                    ClassificationSource::KeywordFallback,
                )
            }
        };

        let mut intent = self.post_process(intent, &request.query, profile);
        if !history.is_empty() {
            intent.context.conversation_history = Some(history.to_vec());
        }

        tracing::info!(
            intent = %intent.intent_type(),
            confidence = intent.primary.confidence,
            source = source.as_str(),
            needs = ?intent.context.implicit_needs,
            "Intent classified"
        );
        metrics::counter!(
            "intent_classifications_total",
            "source" => source.as_str(),
            "intent" => intent.intent_type().as_str()
        )
        .increment(1);

        (intent, source)
    }

    fn build_system_prompt(&self) -> String {
        let categories = CATEGORY_CUES
            .iter()
            .map(|(intent, cues)| format!("- {}: {}", intent, cues))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "You classify DeFi questions.\n\n\
             Primary intent categories (pick exactly one):\n{}\n\n\
             Secondary modifiers:\n{}\n\n\
             Extract tokens (symbols), protocols, chains and USD amounts mentioned in the query, \
             with a confidence for the extraction as a whole.\n\n\
             Respond ONLY with a JSON object matching this schema:\n{}",
            categories, MODIFIER_CUES, self.schema
        )
    }

    fn build_user_prompt(
        &self,
        query: &str,
        history: &[ConversationTurn],
        profile: Option<&UserProfile>,
    ) -> String {
        let mut prompt = String::new();

        if !history.is_empty() {
            prompt.push_str("Conversation so far:\n");
            for turn in history {
                prompt.push_str(&format!("{}: {}\n", turn.role, turn.content));
            }
            prompt.push('\n');
        }

        if let Some(profile) = profile {
            if let Ok(json) = serde_json::to_string(profile) {
                prompt.push_str(&format!("User profile: {}\n\n", json));
            }
        }

        prompt.push_str(&format!("Query: {}", query));
        prompt
    }

    /// Profile override, implicit needs and grounding penalty.
    fn post_process(
        &self,
        mut intent: SemanticIntent,
        query: &str,
        profile: Option<&UserProfile>,
    ) -> SemanticIntent {
        if let Some(profile) = profile {
            if intent.secondary.risk_tolerance == RiskTolerance::Medium {
                intent.secondary.risk_tolerance = profile.risk_tolerance;
            }
            intent.context.user_profile = Some(profile.clone());
        }

        let derived = keywords::implicit_needs(intent.intent_type(), query);
        let mut needs = Vec::new();
        keywords::merge_needs(&mut needs, std::mem::take(&mut intent.context.implicit_needs));
        keywords::merge_needs(&mut needs, derived);
        intent.context.implicit_needs = needs;

        if intent.entities.confidence < self.config.weak_entity_confidence
            && intent.primary.confidence > self.config.strong_intent_confidence
        {
            let penalized = (intent.primary.confidence - self.config.grounding_penalty)
                .max(self.config.grounding_floor);
            tracing::debug!(
                from = intent.primary.confidence,
                to = penalized,
                "Weak entity grounding, lowering intent confidence"
            );
            intent.primary.confidence = clamp_unit(penalized);
        }

        intent
    }
}

/// Clamp scores and clean up entity lists returned by inference.
fn normalize(mut intent: SemanticIntent) -> SemanticIntent {
    intent.primary.confidence = clamp_unit(intent.primary.confidence);
    intent.secondary.complexity = intent.secondary.complexity.clamp(1, 10);

    let entities = &mut intent.entities;
    entities.confidence = clamp_unit(entities.confidence);
    clean_names(&mut entities.tokens);
    clean_names(&mut entities.protocols);
    clean_names(&mut entities.chains);
    entities.amounts.retain(|a| a.is_finite() && *a >= 0.0);

    let mut needs = Vec::new();
    keywords::merge_needs(
        &mut needs,
        intent
            .context
            .implicit_needs
            .drain(..)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect(),
    );
    intent.context.implicit_needs = needs;

    // Context is owned by the pipeline, not the model.
    intent.context.conversation_history = None;
    intent.context.user_profile = None;
    intent
}

fn clean_names(names: &mut Vec<String>) {
    let mut seen: Vec<String> = Vec::with_capacity(names.len());
    for name in names.drain(..) {
        let name = name.trim().to_string();
        if !name.is_empty() && !seen.iter().any(|s| s.eq_ignore_ascii_case(&name)) {
            seen.push(name);
        }
    }
    *names = seen;
}
