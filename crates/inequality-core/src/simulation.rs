//! The single-policy simulation and its step cycle.
//!
//! Each call to [`Simulation::step`] runs these phases in order:
//!
//! 1. **Globals** -- bracket thresholds, total wealth and survival cost are
//!    recomputed from the current wealth distribution into a fresh
//!    [`StepContext`]; mechanisms may then extend it (start-up capital).
//! 2. **Population effects** -- add-ons (patron network, basic income) run
//!    once, then the base policy's population-level rule (communism).
//! 3. **Activation** -- every agent is activated once in a freshly shuffled
//!    order. The base mechanism applies its per-agent rule, then the agent
//!    is reclassified against the step's thresholds and its mobility is
//!    updated. Transfers are visible to agents activated later.
//! 4. **Metrics** -- Gini, total wealth and mean mobility are recorded.
//!
//! A step is never rolled back and never fails.

use std::sync::Arc;

use inequality_agents::{
    Agent, AgentError, ModelParams, Patron, PolicyMechanism, SimRng, StepContext, elite_indices,
    mechanism_for, population_thresholds, spawn_population,
};
use inequality_types::{
    AgentSnapshot, Brackets, ChurnReport, MetricsPoint, MetricsSeries, ParseAggressivenessError,
    ParsePolicyError, PolicyKind, StartUpAggressiveness,
};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::metrics;

/// Which construction constraint was violated.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationIssue {
    /// The population must contain at least one agent.
    #[error("population must be positive")]
    ZeroPopulation,

    /// The policy tag is not recognized.
    #[error(transparent)]
    UnknownPolicy(#[from] ParsePolicyError),

    /// The start-up aggressiveness is outside `1..=3`.
    #[error(transparent)]
    Aggressiveness(#[from] ParseAggressivenessError),

    /// A model parameter or distribution is unusable.
    #[error(transparent)]
    Model(#[from] AgentError),
}

/// Errors that can occur while building a simulation.
///
/// Stepping never fails; every error is raised at construction.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The requested configuration cannot be simulated.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationIssue),
}

impl From<AgentError> for SimulationError {
    fn from(source: AgentError) -> Self {
        match source {
            AgentError::EmptyPopulation => ConfigurationIssue::ZeroPopulation.into(),
            other => ConfigurationIssue::Model(other).into(),
        }
    }
}

impl From<ParsePolicyError> for SimulationError {
    fn from(source: ParsePolicyError) -> Self {
        ConfigurationIssue::UnknownPolicy(source).into()
    }
}

impl From<ParseAggressivenessError> for SimulationError {
    fn from(source: ParseAggressivenessError) -> Self {
        ConfigurationIssue::Aggressiveness(source).into()
    }
}

/// Everything needed to construct a simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationOptions {
    /// Base policy.
    pub policy: PolicyKind,
    /// Number of agents.
    pub population: usize,
    /// Start-up capital bin under capitalism.
    pub aggressiveness: StartUpAggressiveness,
    /// Whether the patron add-on runs every step.
    pub patron_enabled: bool,
    /// Seed of the simulation's random stream.
    pub seed: u64,
    /// Model hyper-parameters.
    pub params: ModelParams,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            policy: PolicyKind::Baseline,
            population: 200,
            aggressiveness: StartUpAggressiveness::default(),
            patron_enabled: false,
            seed: 42,
            params: ModelParams::default(),
        }
    }
}

/// Policy, population size and progress of a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStatus {
    /// Descriptive policy tag.
    pub policy: String,
    /// Number of agents.
    pub population: usize,
    /// Steps taken so far.
    pub step: u64,
}

/// One policy applied to one population.
#[derive(Debug)]
pub struct Simulation {
    policy: PolicyKind,
    seed: u64,
    params: ModelParams,
    agents: Vec<Agent>,
    mechanism: Box<dyn PolicyMechanism>,
    add_ons: Vec<Box<dyn PolicyMechanism>>,
    rng: SimRng,
    context: StepContext,
    history: Vec<MetricsPoint>,
}

impl Simulation {
    /// Construct from raw tags: a policy tag and aggressiveness `1..=3`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfiguration`] for a zero
    /// population, an unknown policy tag or an aggressiveness outside
    /// `1..=3`.
    pub fn new(
        policy: &str,
        population: usize,
        start_up_required: u8,
        patron_enabled: bool,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        let options = SimulationOptions {
            policy: policy.parse()?,
            population,
            aggressiveness: StartUpAggressiveness::try_from(start_up_required)?,
            patron_enabled,
            seed,
            params: ModelParams::default(),
        };
        Self::from_options(&options)
    }

    /// Construct with a freshly drawn population.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfiguration`] if the population
    /// is empty or a model parameter is invalid.
    pub fn from_options(options: &SimulationOptions) -> Result<Self, SimulationError> {
        if options.population == 0 {
            return Err(ConfigurationIssue::ZeroPopulation.into());
        }
        options.params.validate()?;
        let mut rng = SimRng::seed_from_u64(options.seed);
        let agents = spawn_population(options.population, &options.params, &mut rng)?;
        Self::assemble(options, agents, rng)
    }

    /// Construct around an explicit population.
    ///
    /// Agent ids are reassigned to their positions. The random stream is
    /// seeded from `options.seed`; `options.population` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfiguration`] if `agents` is
    /// empty or a model parameter is invalid.
    pub fn from_agents(
        options: &SimulationOptions,
        agents: Vec<Agent>,
    ) -> Result<Self, SimulationError> {
        if agents.is_empty() {
            return Err(ConfigurationIssue::ZeroPopulation.into());
        }
        options.params.validate()?;
        let rng = SimRng::seed_from_u64(options.seed);
        Self::assemble(options, agents, rng)
    }

    fn assemble(
        options: &SimulationOptions,
        mut agents: Vec<Agent>,
        rng: SimRng,
    ) -> Result<Self, SimulationError> {
        let params = options.params;
        let mechanism = mechanism_for(options.policy, options.aggressiveness, &params)?;
        let mut add_ons: Vec<Box<dyn PolicyMechanism>> = Vec::new();
        if options.patron_enabled {
            add_ons.push(Box::new(Patron::new(&params)));
        }

        let brackets = population_thresholds(&agents, &params).unwrap_or_default();
        for (index, agent) in agents.iter_mut().enumerate() {
            agent.set_id(index);
            agent.classify(&brackets);
        }
        let context = StepContext {
            step: 0,
            population: agents.len(),
            brackets,
            total_wealth: metrics::total_wealth(&agents),
            survival_cost: metrics::survival_cost(&agents, &params),
            initial_capital: None,
            elites: elite_indices(&agents).into(),
        };

        info!(
            policy = %options.policy,
            population = agents.len(),
            aggressiveness = u8::from(options.aggressiveness),
            patron = options.patron_enabled,
            seed = options.seed,
            "Simulation created"
        );

        Ok(Self {
            policy: options.policy,
            seed: options.seed,
            params,
            agents,
            mechanism,
            add_ons,
            rng,
            context,
            history: Vec::new(),
        })
    }

    /// Attach a population-level add-on, run every step after the patron
    /// network and before the base policy's own redistribution.
    #[must_use]
    pub fn with_add_on(mut self, add_on: Box<dyn PolicyMechanism>) -> Self {
        debug!(add_on = add_on.name(), "Add-on attached");
        self.add_ons.push(add_on);
        self
    }

    /// Advance the simulation by one step and return the recorded metrics.
    pub fn step(&mut self) -> MetricsPoint {
        let step = self.context.step.saturating_add(1);

        // Globals
        let mut ctx = self.compute_context(step);
        self.mechanism.refresh(&self.agents, &mut ctx);
        for add_on in &self.add_ons {
            add_on.refresh(&self.agents, &mut ctx);
        }

        // Population effects
        for add_on in &self.add_ons {
            add_on.redistribute(&mut self.agents, &ctx, &mut self.rng);
        }
        self.mechanism.redistribute(&mut self.agents, &ctx, &mut self.rng);

        // Activation
        let mut order: Vec<usize> = (0..self.agents.len()).collect();
        order.shuffle(&mut self.rng);
        for actor in order {
            self.mechanism.apply(actor, &mut self.agents, &ctx, &mut self.rng);
            for add_on in &self.add_ons {
                add_on.apply(actor, &mut self.agents, &ctx, &mut self.rng);
            }
            if let Some(agent) = self.agents.get_mut(actor) {
                agent.settle(&ctx.brackets);
            }
        }

        // Metrics
        let point = metrics::metrics_point(step, &self.agents);
        self.context = ctx;
        self.history.push(point);

        debug!(
            policy = self.policy.name(),
            step,
            gini = point.gini,
            total = point.total,
            mobility = point.mobility,
            survival_cost = self.context.survival_cost,
            "Step complete"
        );
        point
    }

    /// Advance `steps` times.
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    fn compute_context(&self, step: u64) -> StepContext {
        StepContext {
            step,
            population: self.agents.len(),
            brackets: population_thresholds(&self.agents, &self.params)
                .unwrap_or(self.context.brackets),
            total_wealth: metrics::total_wealth(&self.agents),
            survival_cost: metrics::survival_cost(&self.agents, &self.params),
            initial_capital: None,
            elites: Arc::clone(&self.context.elites),
        }
    }

    /// The base policy.
    pub const fn policy(&self) -> PolicyKind {
        self.policy
    }

    /// Seed the random stream was created from.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Model hyper-parameters.
    pub const fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Number of agents.
    pub const fn population(&self) -> usize {
        self.agents.len()
    }

    /// Steps taken so far.
    pub const fn step_count(&self) -> u64 {
        self.context.step
    }

    /// The live agent records.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Read-only snapshots of every agent.
    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        self.agents.iter().map(Agent::snapshot).collect()
    }

    /// Context of the most recent step (or of construction).
    pub const fn context(&self) -> &StepContext {
        &self.context
    }

    /// Bracket thresholds used by the most recent step.
    pub const fn brackets(&self) -> Brackets {
        self.context.brackets
    }

    /// Survival cost used by the most recent step.
    pub const fn survival_cost(&self) -> f64 {
        self.context.survival_cost
    }

    /// Metrics of every step taken, oldest first.
    pub fn history(&self) -> &[MetricsPoint] {
        &self.history
    }

    /// Metric history as columns.
    pub fn series(&self) -> MetricsSeries {
        self.history.iter().collect()
    }

    /// Metrics of the population as it stands now.
    pub fn metrics_point(&self) -> MetricsPoint {
        metrics::metrics_point(self.step_count(), &self.agents)
    }

    /// Class movement on the most recent step.
    pub fn churn(&self) -> ChurnReport {
        metrics::churn(&self.agents)
    }

    /// Policy, population size and step count.
    pub fn status(&self) -> SimulationStatus {
        SimulationStatus {
            policy: self.policy.label().to_owned(),
            population: self.population(),
            step: self.step_count(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use inequality_agents::UniversalBasicIncome;

    use super::*;

    fn options(policy: PolicyKind) -> SimulationOptions {
        SimulationOptions {
            policy,
            population: 50,
            ..SimulationOptions::default()
        }
    }

    #[test]
    fn construction_classifies_population() {
        let sim = Simulation::from_options(&options(PolicyKind::Baseline)).unwrap();
        assert_eq!(sim.population(), 50);
        assert_eq!(sim.step_count(), 0);
        assert!(sim.history().is_empty());
        assert!(sim.brackets().lower <= sim.brackets().upper);
        assert!((sim.metrics_point().total - 50.0).abs() < 1e-9);
    }

    #[test]
    fn raw_tags_are_validated() {
        assert!(Simulation::new("innovation", 10, 2, true, 1).is_ok());
        assert!(matches!(
            Simulation::new("anarchy", 10, 1, false, 1),
            Err(SimulationError::InvalidConfiguration(ConfigurationIssue::UnknownPolicy(_)))
        ));
        assert!(matches!(
            Simulation::new("baseline", 10, 4, false, 1),
            Err(SimulationError::InvalidConfiguration(ConfigurationIssue::Aggressiveness(_)))
        ));
        assert!(matches!(
            Simulation::new("baseline", 0, 1, false, 1),
            Err(SimulationError::InvalidConfiguration(ConfigurationIssue::ZeroPopulation))
        ));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let opts = SimulationOptions {
            params: ModelParams {
                party_tax: 1.5,
                ..ModelParams::default()
            },
            ..options(PolicyKind::Fascism)
        };
        assert!(matches!(
            Simulation::from_options(&opts),
            Err(SimulationError::InvalidConfiguration(ConfigurationIssue::Model(_)))
        ));
    }

    #[test]
    fn each_step_appends_one_point() {
        let mut sim = Simulation::from_options(&options(PolicyKind::Capitalism)).unwrap();
        sim.run(5);
        assert_eq!(sim.step_count(), 5);
        assert_eq!(sim.history().len(), 5);
        assert_eq!(sim.series().len(), 5);
        assert_eq!(sim.history().last().map(|p| p.step), Some(5));
    }

    #[test]
    fn wealth_and_mobility_stay_in_range() {
        for policy in PolicyKind::COMPARISON {
            let opts = SimulationOptions {
                patron_enabled: true,
                ..options(policy)
            };
            let mut sim = Simulation::from_options(&opts).unwrap();
            for _ in 0..30 {
                let point = sim.step();
                assert!((0.0..=1.0).contains(&point.gini));
                assert!((0.0..=1.0).contains(&point.mobility));
                for agent in sim.agents() {
                    assert!(agent.wealth() >= 0.0);
                    assert!((0.0..=1.0).contains(&agent.mobility()));
                }
                assert!(sim.brackets().lower <= sim.brackets().upper);
                assert!(sim.survival_cost() >= 0.0);
            }
        }
    }

    #[test]
    fn same_seed_same_trajectory() {
        let mut a = Simulation::from_options(&options(PolicyKind::Fascism)).unwrap();
        let mut b = Simulation::from_options(&options(PolicyKind::Fascism)).unwrap();
        a.run(20);
        b.run(20);
        assert_eq!(a.history(), b.history());
        assert_eq!(a.snapshots(), b.snapshots());
    }

    #[test]
    fn status_reports_label() {
        let sim = Simulation::new("powerful leaders", 12, 1, false, 3).unwrap();
        let status = sim.status();
        assert_eq!(status.policy, "powerful leaders");
        assert_eq!(status.population, 12);
        assert_eq!(status.step, 0);
    }

    #[test]
    fn explicit_agents_are_renumbered_by_position() {
        let agents: Vec<Agent> = (0..4)
            .map(|i| Agent::new(7, f64::from(i) + 1.0, 0.05, 2.0, false, 20))
            .collect();
        let sim = Simulation::from_agents(&options(PolicyKind::Baseline), agents).unwrap();
        let ids: Vec<usize> = sim.snapshots().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert!(sim.agents().iter().enumerate().all(|(i, a)| a.id() == i));
    }

    #[test]
    fn add_on_runs_every_step() {
        let ubi = UniversalBasicIncome::new(0.5, 0.1).unwrap();
        let mut sim = Simulation::from_options(&options(PolicyKind::Baseline))
            .unwrap()
            .with_add_on(Box::new(ubi));
        sim.run(10);
        assert_eq!(sim.history().len(), 10);
    }
}
