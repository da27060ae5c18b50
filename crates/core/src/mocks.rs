//! Mock implementations of core traits for testing.
//!
//! These doubles are shared by the unit and integration tests of every
//! crate in the workspace.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::{
    traits::{Agent, CompletionRequest, LlmClient, LlmResponse},
    types::{AgentCapability, AgentPayload, AgentTask},
    Error, Result,
};

// =============================================================================
// Scripted LLM Client
// =============================================================================

/// One scripted reply of [`ScriptedLlm`].
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    Fail(String),
    CapacityLimit(String),
}

/// Scripted mock LLM that cycles through predefined replies.
pub struct ScriptedLlm {
    replies: Vec<ScriptedReply>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    /// Create a mock with a queue of replies.
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A mock that always answers with the same text.
    pub fn constant(response: &str) -> Self {
        Self::new(vec![ScriptedReply::Text(response.to_string())])
    }

    /// A mock whose every call fails.
    pub fn failing(message: &str) -> Self {
        Self::new(vec![ScriptedReply::Fail(message.to_string())])
    }

    /// Number of calls made to this mock.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse> {
        let idx = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            (requests.len() - 1) % self.replies.len().max(1)
        };

        match self.replies.get(idx) {
            Some(ScriptedReply::Text(text)) => Ok(LlmResponse::text(text.clone())),
            Some(ScriptedReply::Fail(msg)) => Err(Error::inference(msg.clone())),
            Some(ScriptedReply::CapacityLimit(msg)) => Err(Error::capacity_limit(msg.clone())),
            None => Err(Error::inference("no scripted reply")),
        }
    }

    fn model_id(&self) -> String {
        "mock:scripted".to_string()
    }
}

// =============================================================================
// Mock Agent
// =============================================================================

/// What a [`MockAgent`] does when executed.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Respond(AgentPayload),
    Fail(String),
    Panic(String),
    Delay(Duration, AgentPayload),
}

/// Agent double that records every task it receives.
pub struct MockAgent {
    name: String,
    capability: AgentCapability,
    behavior: MockBehavior,
    tasks: Mutex<Vec<AgentTask>>,
}

impl MockAgent {
    pub fn new(name: &str, capability: AgentCapability, behavior: MockBehavior) -> Self {
        Self {
            name: name.to_string(),
            capability,
            behavior,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// An agent that answers with `payload`.
    pub fn responding(name: &str, capability: AgentCapability, payload: AgentPayload) -> Self {
        Self::new(name, capability, MockBehavior::Respond(payload))
    }

    /// An agent whose every invocation fails.
    pub fn failing(name: &str, capability: AgentCapability, message: &str) -> Self {
        Self::new(name, capability, MockBehavior::Fail(message.to_string()))
    }

    /// Tasks received so far.
    pub fn tasks(&self) -> Vec<AgentTask> {
        self.tasks.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }
}

#[async_trait]
impl Agent for MockAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> &AgentCapability {
        &self.capability
    }

    async fn execute(&self, task: &AgentTask) -> Result<AgentPayload> {
        self.tasks.lock().unwrap().push(task.clone());

        match &self.behavior {
            MockBehavior::Respond(payload) => Ok(payload.clone()),
            MockBehavior::Fail(msg) => Err(Error::agent_execution(&self.name, msg.clone())),
            MockBehavior::Panic(msg) => panic!("{}", msg),
            MockBehavior::Delay(delay, payload) => {
                tokio::time::sleep(*delay).await;
                Ok(payload.clone())
            }
        }
    }
}
