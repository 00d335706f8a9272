//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and the run itself.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: inequality_core::ConfigError,
    },

    /// The configured simulation could not be built.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: inequality_core::SimulationError,
    },

    /// Writing the final report failed.
    #[error("report error: {source}")]
    Report {
        /// The underlying report error.
        #[from]
        source: inequality_core::ReportError,
    },
}
