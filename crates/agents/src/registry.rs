//! Capability registry implementation.

use std::collections::HashMap;
use std::sync::Arc;

use defi_agent_core::{traits::Agent, types::AgentCapability, Error, Result};

/// Static table of agents and their capability descriptors.
///
/// Populated once at start-up, then shared read-only (usually behind an
/// `Arc`). Iteration follows registration order, which is also the
/// router's tie-break order.
#[derive(Default)]
pub struct CapabilityRegistry {
    agents: Vec<Arc<dyn Agent>>,
    index: HashMap<String, usize>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent. Names must be unique.
    pub fn register(&mut self, agent: Arc<dyn Agent>) -> Result<()> {
        let name = agent.name().to_string();
        if self.index.contains_key(&name) {
            return Err(Error::internal(format!(
                "Agent '{}' is already registered",
                name
            )));
        }

        tracing::info!(agent = %name, intents = ?agent.capability().primary_intents, "Registering agent");
        self.index.insert(name, self.agents.len());
        self.agents.push(agent);
        Ok(())
    }

    /// Builder-style registration.
    pub fn with_agent(mut self, agent: Arc<dyn Agent>) -> Result<Self> {
        self.register(agent)?;
        Ok(self)
    }

    /// Look up an agent by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.index.get(name).map(|&i| self.agents[i].clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Capability descriptor of a registered agent.
    pub fn capability(&self, name: &str) -> Option<&AgentCapability> {
        self.index.get(name).map(|&i| self.agents[i].capability())
    }

    /// `(name, capability)` pairs in registration order.
    pub fn capabilities(&self) -> impl Iterator<Item = (&str, &AgentCapability)> {
        self.agents.iter().map(|a| (a.name(), a.capability()))
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.name().to_string()).collect()
    }

    /// Get the number of registered agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
