//! Error types for the DeFi agent pipeline.

use thiserror::Error;

/// Result type alias using the pipeline's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DeFi agent pipeline.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Inference Errors (L-M)
    // =========================================================================
    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Inference capacity limit: {0}")]
    CapacityLimit(String),

    #[error("Malformed inference output: {0}")]
    MalformedOutput(String),

    // =========================================================================
    // Classification & Routing Errors (L0)
    // =========================================================================
    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    // =========================================================================
    // Execution Errors (L1)
    // =========================================================================
    #[error("Agent '{agent}' failed: {message}")]
    AgentExecution { agent: String, message: String },

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    // =========================================================================
    // Telemetry Errors
    // =========================================================================
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Provider message fragments that indicate a capacity-limit-class failure.
const CAPACITY_MARKERS: &[&str] = &[
    "429",
    "rate limit",
    "rate_limit",
    "overloaded",
    "capacity",
    "too many requests",
    "quota",
];

impl Error {
    /// Create an inference error.
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a capacity-limit error.
    pub fn capacity_limit(msg: impl Into<String>) -> Self {
        Self::CapacityLimit(msg.into())
    }

    /// Create a malformed-output error.
    pub fn malformed_output(msg: impl Into<String>) -> Self {
        Self::MalformedOutput(msg.into())
    }

    /// Create an agent execution error.
    pub fn agent_execution(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AgentExecution {
            agent: agent.into(),
            message: message.into(),
        }
    }

    /// Create a synthesis error.
    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn telemetry(msg: impl Into<String>) -> Self {
        Self::Telemetry(msg.into())
    }

    /// Whether this failure belongs to the capacity-limit class.
    ///
    /// Providers rarely expose a typed rate-limit error, so inference
    /// errors are also matched on their message.
    pub fn is_capacity_limit(&self) -> bool {
        match self {
            Self::CapacityLimit(_) => true,
            Self::Inference(msg) => {
                let lower = msg.to_lowercase();
                CAPACITY_MARKERS.iter().any(|m| lower.contains(m))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_limit_detection() {
        assert!(Error::capacity_limit("slow down").is_capacity_limit());
        assert!(Error::inference("HTTP 429 Too Many Requests").is_capacity_limit());
        assert!(Error::inference("model is Overloaded").is_capacity_limit());
        assert!(!Error::inference("invalid api key").is_capacity_limit());
        assert!(!Error::malformed_output("rate limit").is_capacity_limit());
    }

    #[test]
    fn test_agent_execution_display() {
        let err = Error::agent_execution("risk_analyzer", "feed offline");
        assert_eq!(err.to_string(), "Agent 'risk_analyzer' failed: feed offline");
    }
}
