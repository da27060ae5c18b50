#![deny(unused)]
//! Agent registry and the built-in DeFi specialist agents.
//!
//! The [`CapabilityRegistry`] is the static table the router scores
//! against and the coordinator dispatches through. The built-in agents
//! are thin prompts over the shared inference service.

pub mod builtin;
pub mod registry;

pub use builtin::{create_default_registry, default_agent_specs, AgentSpec, InferenceAgent};
pub use registry::CapabilityRegistry;
