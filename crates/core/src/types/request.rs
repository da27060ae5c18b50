use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::intent::{ConversationTurn, UserProfile};

// =============================================================================
// Request Types
// =============================================================================

/// Free-form request entering the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Unique ID for this request.
    pub request_id: String,

    /// Raw query text.
    pub query: String,

    /// Prior conversation turns, oldest first.
    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,

    /// Stated user preferences.
    #[serde(default)]
    pub user_profile: Option<UserProfile>,

    /// Produce chart/table descriptors and suggested actions.
    #[serde(default)]
    pub visualize: bool,
}

impl QueryRequest {
    /// Create a new request from query text.
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            query: query.into(),
            conversation_history: Vec::new(),
            user_profile: None,
            visualize: false,
        }
    }

    /// Attach conversation history.
    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.conversation_history = history;
        self
    }

    /// Attach a user profile.
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.user_profile = Some(profile);
        self
    }

    /// Request visualization output.
    pub fn with_visualization(mut self) -> Self {
        self.visualize = true;
        self
    }

    /// The last `n` conversation turns.
    pub fn recent_history(&self, n: usize) -> &[ConversationTurn] {
        let start = self.conversation_history.len().saturating_sub(n);
        &self.conversation_history[start..]
    }
}
