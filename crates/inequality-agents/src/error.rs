//! Error types for the inequality-agents crate.
//!
//! Errors here only arise while building a population. Once agents exist,
//! every mechanism guards its own cross-references and never fails mid-step.

/// Errors that can occur while creating agents.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A population must contain at least one agent.
    #[error("population must contain at least one agent")]
    EmptyPopulation,

    /// A sampling distribution rejected its parameters.
    #[error("invalid {distribution} distribution: {reason}")]
    Distribution {
        /// Which distribution was being built.
        distribution: &'static str,
        /// The underlying parameter error.
        reason: String,
    },

    /// A model parameter is outside its valid range.
    #[error("invalid model parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name as it appears in configuration.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}
