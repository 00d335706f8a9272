//! Step cycle, metrics, and policy comparison for the Inequality simulator.
//!
//! This crate owns the per-step cycle that drives a population: recompute
//! globals, run population-level policy effects, activate every agent in
//! shuffled order, record metrics.
//!
//! # Modules
//!
//! - [`comparison`] -- [`ComparisonOrchestrator`], four lock-stepped
//!   policies from one seed.
//! - [`config`] -- Configuration loading from `inequality-config.yaml` into
//!   strongly-typed structs.
//! - [`metrics`] -- Gini coefficient, total wealth, mean mobility, survival
//!   cost, and class churn.
//! - [`report`] -- Serializable run reports.
//! - [`runner`] -- Bounded runs with per-step callbacks and the
//!   [`SharedModel`] lock wrapper.
//! - [`simulation`] -- The single-policy [`Simulation`] and its step cycle.

pub mod comparison;
pub mod config;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod simulation;

pub use comparison::{ComparisonOrchestrator, PolicyResults};
pub use config::{ConfigError, InequalityConfig};
pub use report::{ComparisonReport, ReportError, SimulationReport, write_report};
pub use runner::{
    NoOpCallback, RunSummary, RunnerError, SharedModel, StepCallback, StepSummary, Steppable,
    log_run_end, run_with_callback,
};
pub use simulation::{
    ConfigurationIssue, Simulation, SimulationError, SimulationOptions, SimulationStatus,
};
