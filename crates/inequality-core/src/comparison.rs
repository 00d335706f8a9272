//! Side-by-side comparison of the fixed policy set.
//!
//! The orchestrator builds one [`Simulation`] per policy in
//! [`PolicyKind::COMPARISON`], all from the same seed, so the initial
//! payoff rates, innovation factors and elite flags are identical across
//! policies. It records step-0 metrics at construction and then advances
//! every simulation exactly once per step, always in the same order, so
//! index `k` of every series refers to the same step.

use std::collections::BTreeMap;

use inequality_agents::Agent;
use inequality_types::{Bracket, MetricsPoint, MetricsSeries, PolicyKind, StartUpAggressiveness};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::simulation::{Simulation, SimulationError, SimulationOptions};

/// Accumulated results for one policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyResults {
    /// Metrics from step 0 onwards.
    pub series: MetricsSeries,
    /// Wealth of every agent after the latest step.
    pub final_wealth: Vec<f64>,
    /// Bracket of every agent after the latest step.
    pub final_bracket: Vec<Bracket>,
}

impl PolicyResults {
    fn record(&mut self, point: &MetricsPoint, sim: &Simulation) {
        self.series.push(point);
        self.final_wealth = sim.agents().iter().map(Agent::wealth).collect();
        self.final_bracket = sim.agents().iter().map(Agent::bracket).collect();
    }
}

/// Four lock-stepped simulations, one per comparison policy.
#[derive(Debug)]
pub struct ComparisonOrchestrator {
    simulations: Vec<Simulation>,
    results: BTreeMap<PolicyKind, PolicyResults>,
    step_count: u64,
    population: usize,
    seed: u64,
}

impl ComparisonOrchestrator {
    /// Construct from raw settings with default model parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfiguration`] for a zero
    /// population or an aggressiveness outside `1..=3`.
    pub fn new(
        population: usize,
        start_up_required: u8,
        patron_enabled: bool,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        let options = SimulationOptions {
            population,
            aggressiveness: StartUpAggressiveness::try_from(start_up_required)?,
            patron_enabled,
            seed,
            ..SimulationOptions::default()
        };
        Self::from_options(&options)
    }

    /// Construct from options; `options.policy` is ignored.
    ///
    /// # Errors
    ///
    /// Propagates the first construction error of any simulation.
    pub fn from_options(options: &SimulationOptions) -> Result<Self, SimulationError> {
        let mut simulations = Vec::with_capacity(PolicyKind::COMPARISON.len());
        let mut results = BTreeMap::new();
        for policy in PolicyKind::COMPARISON {
            let sim = Simulation::from_options(&SimulationOptions {
                policy,
                ..*options
            })?;
            let mut entry = PolicyResults::default();
            entry.record(&sim.metrics_point(), &sim);
            results.insert(policy, entry);
            simulations.push(sim);
        }

        info!(
            population = options.population,
            seed = options.seed,
            policies = simulations.len(),
            "Comparison created"
        );

        Ok(Self {
            simulations,
            results,
            step_count: 0,
            population: options.population,
            seed: options.seed,
        })
    }

    /// Advance every simulation once, in fixed order, and record results.
    ///
    /// Returns the new metrics of each policy in that order.
    pub fn step(&mut self) -> Vec<(PolicyKind, MetricsPoint)> {
        self.step_count = self.step_count.saturating_add(1);
        let mut points = Vec::with_capacity(self.simulations.len());
        for sim in &mut self.simulations {
            let point = sim.step();
            self.results
                .entry(sim.policy())
                .or_default()
                .record(&point, sim);
            points.push((sim.policy(), point));
        }
        debug!(step = self.step_count, "Comparison step complete");
        points
    }

    /// Advance `steps` times.
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Orchestrator steps taken so far.
    pub const fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Agents per simulation.
    pub const fn population(&self) -> usize {
        self.population
    }

    /// Shared seed.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Results for one policy.
    pub fn results(&self, policy: PolicyKind) -> Option<&PolicyResults> {
        self.results.get(&policy)
    }

    /// Results for every policy.
    pub const fn all_results(&self) -> &BTreeMap<PolicyKind, PolicyResults> {
        &self.results
    }

    /// The live simulation for one policy.
    pub fn simulation(&self, policy: PolicyKind) -> Option<&Simulation> {
        self.simulations.iter().find(|s| s.policy() == policy)
    }

    /// All simulations in advancement order.
    pub fn simulations(&self) -> &[Simulation] {
        &self.simulations
    }
}
