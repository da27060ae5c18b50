#![deny(unused)]
//! L0 Gateway for the DeFi agent pipeline.
//!
//! This crate turns a raw query into a routing decision:
//! - Intent classification (inference-scored, keyword fallback)
//! - Capability-based agent routing

pub mod classifier;
pub mod keywords;
pub mod router;

pub use classifier::{ClassificationSource, IntentClassifier};
pub use router::{AgentRouter, Candidate};
