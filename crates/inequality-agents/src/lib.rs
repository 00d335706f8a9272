//! Agent state, bracket classification, mobility, and policy mechanisms for
//! the Inequality simulator.
//!
//! This crate contains the logic layer for agents -- everything that moves
//! wealth or classifies it without touching I/O. It sits between
//! `inequality-types` (which defines the shared data structures) and
//! `inequality-core` (which owns the step loop and metrics).
//!
//! # Modules
//!
//! - [`agent`] -- The [`Agent`] record and population creation
//! - [`bracket`] -- Percentile-based bracket thresholds
//! - [`config`] -- Model constants ([`ModelParams`])
//! - [`distribution`] -- Seeded random draws and percentiles
//! - [`error`] -- Error types for agent operations ([`AgentError`])
//! - [`mobility`] -- Rolling mobility tracker
//! - [`policy`] -- The [`PolicyMechanism`] trait and its implementations

pub mod agent;
pub mod bracket;
pub mod config;
pub mod distribution;
pub mod error;
pub mod mobility;
pub mod policy;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, elite_indices, spawn_population};
pub use bracket::{population_thresholds, thresholds};
pub use config::ModelParams;
pub use distribution::{InnovationDraw, SimRng, percentile};
pub use error::AgentError;
pub use mobility::{MobilityTracker, bartholomew};
pub use policy::{
    BaselineExchange, Capitalism, Communism, Fascism, InnovationEvent, Patron, PolicyMechanism,
    StepContext, UniversalBasicIncome, mechanism_for,
};
