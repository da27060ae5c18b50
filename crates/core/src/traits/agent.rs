//! Agent traits.

use async_trait::async_trait;
use crate::error::Result;
use crate::types::{AgentCapability, AgentPayload, AgentTask};

/// A specialized handler that answers one or more intents.
///
/// The router only reads [`Agent::capability`]; the coordinator only calls
/// [`Agent::execute`].
#[async_trait]
pub trait Agent: Send + Sync {
    /// Unique registry name.
    fn name(&self) -> &str;

    /// Static descriptor used for routing.
    fn capability(&self) -> &AgentCapability;

    /// Produce a domain answer for the task.
    async fn execute(&self, task: &AgentTask) -> Result<AgentPayload>;
}
