//! Core traits for the DeFi agent pipeline.
//!
//! - `agent`: the polymorphic agent seam (capability descriptor + execute)
//! - `llm`: the inference client seam

pub mod agent;
pub mod llm;

pub use agent::*;
pub use llm::*;
