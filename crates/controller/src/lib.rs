#![deny(unused)]
//! L1 Controller for the DeFi agent pipeline.
//!
//! This crate runs routing plans and turns agent results into a single
//! answer: the execution coordinator, the response synthesizer with its
//! visualization mode, and the end-to-end request pipeline.

pub mod coordinator;
pub mod pipeline;
pub mod synthesizer;
pub mod visualization;

pub use coordinator::ExecutionCoordinator;
pub use pipeline::Orchestrator;
pub use synthesizer::ResponseSynthesizer;
pub use visualization::VisualizationBuilder;
