//! Serializable run reports.
//!
//! A report captures the outcome of a run: its metric series, the final
//! agent snapshots and the last step's class churn. Each report gets a
//! time-ordered run id so reports written to the same directory sort by
//! creation.

use std::path::Path;

use chrono::{DateTime, Utc};
use inequality_types::{AgentSnapshot, Bracket, ChurnReport, MetricsSeries, PolicyKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::comparison::ComparisonOrchestrator;
use crate::metrics;
use crate::simulation::Simulation;

/// Errors that can occur while writing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The report could not be serialized.
    #[error("failed to serialize report: {source}")]
    Serialize {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The report could not be written.
    #[error("failed to write report: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

/// Report of a single-policy run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Unique run id (`UUIDv7`).
    pub run_id: Uuid,
    /// When the report was assembled.
    pub generated_at: DateTime<Utc>,
    /// Policy simulated.
    pub policy: PolicyKind,
    /// Number of agents.
    pub population: usize,
    /// Steps taken.
    pub steps: u64,
    /// Seed of the random stream.
    pub seed: u64,
    /// Metrics of every step taken.
    pub series: MetricsSeries,
    /// Final agent states.
    pub agents: Vec<AgentSnapshot>,
    /// Class movement on the last step.
    pub churn: ChurnReport,
    /// Final total wealth with a scale word.
    pub total_in_words: String,
}

impl SimulationReport {
    /// Assemble a report from a simulation's current state.
    pub fn from_simulation(sim: &Simulation) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            generated_at: Utc::now(),
            policy: sim.policy(),
            population: sim.population(),
            steps: sim.step_count(),
            seed: sim.seed(),
            series: sim.series(),
            agents: sim.snapshots(),
            churn: sim.churn(),
            total_in_words: metrics::wealth_in_words(metrics::total_wealth(sim.agents())),
        }
    }
}

/// One policy's section of a comparison report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyReport {
    /// Policy simulated.
    pub policy: PolicyKind,
    /// Descriptive policy tag.
    pub label: String,
    /// Metrics from step 0 onwards.
    pub series: MetricsSeries,
    /// Final wealth of every agent.
    pub final_wealth: Vec<f64>,
    /// Final bracket of every agent.
    pub final_bracket: Vec<Bracket>,
    /// Class movement on the last step.
    pub churn: ChurnReport,
}

/// Report of a comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Unique run id (`UUIDv7`).
    pub run_id: Uuid,
    /// When the report was assembled.
    pub generated_at: DateTime<Utc>,
    /// Agents per simulation.
    pub population: usize,
    /// Steps taken.
    pub steps: u64,
    /// Shared seed.
    pub seed: u64,
    /// One section per policy, in advancement order.
    pub policies: Vec<PolicyReport>,
}

impl ComparisonReport {
    /// Assemble a report from an orchestrator's current state.
    pub fn from_orchestrator(cmp: &ComparisonOrchestrator) -> Self {
        let policies = cmp
            .simulations()
            .iter()
            .filter_map(|sim| {
                let results = cmp.results(sim.policy())?;
                Some(PolicyReport {
                    policy: sim.policy(),
                    label: sim.policy().label().to_owned(),
                    series: results.series.clone(),
                    final_wealth: results.final_wealth.clone(),
                    final_bracket: results.final_bracket.clone(),
                    churn: sim.churn(),
                })
            })
            .collect();
        Self {
            run_id: Uuid::now_v7(),
            generated_at: Utc::now(),
            population: cmp.population(),
            steps: cmp.step_count(),
            seed: cmp.seed(),
            policies,
        }
    }
}

/// Serialize `report` as pretty JSON and write it to `path`, creating
/// parent directories as needed.
///
/// # Errors
///
/// Returns [`ReportError`] if serialization or the write fails.
pub fn write_report<T: Serialize>(report: &T, path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(report)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    Ok(())
}
