#![deny(unused)]
//! Core types, traits, and error definitions for the DeFi agent pipeline.
//!
//! This crate provides the foundational building blocks shared across all layers:
//! the request-scoped data model, the `Agent` and `LlmClient` seams, the error
//! enum and the layered application config.

pub mod config;
pub mod error;
pub mod mocks;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::*;
pub use types::*;
