//! Shared type definitions for the Inequality simulator.
//!
//! This crate is the single source of truth for the plain data types that
//! flow between the agent logic, the simulation engine, and the reporting
//! layer. Nothing here owns behaviour beyond small, pure helpers.
//!
//! # Modules
//!
//! - [`enums`] -- Wealth brackets, policy tags, start-up aggressiveness
//! - [`structs`] -- Bracket thresholds, agent snapshots, metric series, churn

pub mod enums;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    Bracket, ParseAggressivenessError, ParsePolicyError, PolicyKind, StartUpAggressiveness,
};
pub use structs::{AgentSnapshot, Brackets, ChurnReport, MetricsPoint, MetricsSeries};
