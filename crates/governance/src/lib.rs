#![deny(unused)]
//! L4 Governance for the DeFi agent pipeline.
//!
//! This crate provides:
//! - Structured logging setup
//! - Prometheus metrics recorder
//! - Pipeline metric helpers

pub mod metrics;
pub mod tracing_layer;

pub use metrics::{
    setup_metrics_recorder, track_agent_invocation, track_fallback, track_pipeline, AgentOutcome,
};
pub use tracing_layer::configure_tracing;
