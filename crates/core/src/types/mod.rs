//! Core type definitions for the DeFi agent pipeline.
//!
//! Everything here is created and consumed within one request, except the
//! capability descriptors which are loaded once at start-up.

pub mod agent;
pub mod capability;
pub mod intent;
pub mod plan;
pub mod request;
pub mod response;

pub use agent::*;
pub use capability::*;
pub use intent::*;
pub use plan::*;
pub use request::*;
pub use response::*;
