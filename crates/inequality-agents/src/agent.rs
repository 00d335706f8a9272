//! Agent records and population creation.
//!
//! An [`Agent`] owns its wealth, payoff rate, innovation state, elite flag,
//! current bracket and mobility tracker. Agents never act on their own:
//! the simulation hands each one to the active policy mechanism, then calls
//! [`Agent::settle`] to reclassify it against the step's thresholds.

use inequality_types::{AgentSnapshot, Bracket, Brackets};

use crate::config::ModelParams;
use crate::distribution::{self, InnovationDraw, SimRng};
use crate::error::AgentError;
use crate::mobility::MobilityTracker;

/// One economic agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    id: usize,
    wealth: f64,
    payoff_rate: f64,
    base_payoff_rate: f64,
    innovation_factor: f64,
    innovating: bool,
    is_elite: bool,
    bracket: Bracket,
    previous_bracket: Bracket,
    mobility: MobilityTracker,
}

impl Agent {
    /// Create an agent with explicit attributes.
    ///
    /// The agent starts in the middle bracket with an empty history.
    pub fn new(
        id: usize,
        wealth: f64,
        payoff_rate: f64,
        innovation_factor: f64,
        is_elite: bool,
        mobility_window: usize,
    ) -> Self {
        Self {
            id,
            wealth: wealth.max(0.0),
            payoff_rate,
            base_payoff_rate: payoff_rate,
            innovation_factor,
            innovating: false,
            is_elite,
            bracket: Bracket::Middle,
            previous_bracket: Bracket::Middle,
            mobility: MobilityTracker::new(mobility_window),
        }
    }

    /// Index of this agent within its population.
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Move the agent to position `id` of its population.
    pub const fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    /// Current wealth.
    pub const fn wealth(&self) -> f64 {
        self.wealth
    }

    /// Overwrite wealth, clamped to be non-negative.
    pub fn set_wealth(&mut self, wealth: f64) {
        self.wealth = wealth.max(0.0);
    }

    /// Add a non-negative amount of wealth.
    pub fn credit(&mut self, amount: f64) {
        self.wealth += amount.max(0.0);
    }

    /// Remove up to `amount` of wealth and return what was actually taken.
    ///
    /// Never takes more than the agent holds, so wealth stays non-negative.
    pub fn debit(&mut self, amount: f64) -> f64 {
        let taken = amount.max(0.0).min(self.wealth);
        self.wealth -= taken;
        taken
    }

    /// Current payoff rate `W`.
    pub const fn payoff_rate(&self) -> f64 {
        self.payoff_rate
    }

    /// Payoff rate drawn at creation, before any innovation boost.
    pub const fn base_payoff_rate(&self) -> f64 {
        self.base_payoff_rate
    }

    /// Current innovation factor `I`.
    pub const fn innovation_factor(&self) -> f64 {
        self.innovation_factor
    }

    /// Whether an innovation boost is currently active.
    pub const fn is_innovating(&self) -> bool {
        self.innovating
    }

    /// Whether the agent belongs to the party elite.
    pub const fn is_elite(&self) -> bool {
        self.is_elite
    }

    /// Bracket assigned at the end of the last step.
    pub const fn bracket(&self) -> Bracket {
        self.bracket
    }

    /// Bracket held before the last reclassification.
    pub const fn previous_bracket(&self) -> Bracket {
        self.previous_bracket
    }

    /// Mobility score in `[0, 1]`.
    pub const fn mobility(&self) -> f64 {
        self.mobility.score()
    }

    /// Full mobility tracker.
    pub const fn mobility_tracker(&self) -> &MobilityTracker {
        &self.mobility
    }

    /// Organic income: grow wealth by `W * wealth`.
    pub fn earn(&mut self) {
        let grown = self.payoff_rate.mul_add(self.wealth, self.wealth);
        self.wealth = grown.max(0.0);
    }

    /// Start an innovation boost: multiply the payoff rate by the current
    /// innovation factor.
    pub(crate) fn activate_innovation(&mut self) {
        self.innovating = true;
        self.payoff_rate *= self.innovation_factor;
    }

    /// Decay the innovation factor by `decay`.
    pub(crate) fn decay_innovation(&mut self, decay: f64) {
        self.innovation_factor *= decay;
    }

    /// End the boost, restore the base payoff rate and take a fresh factor.
    pub(crate) fn renew_innovation(&mut self, fresh_factor: f64) {
        self.innovating = false;
        self.payoff_rate = self.base_payoff_rate;
        self.innovation_factor = fresh_factor;
    }

    /// Classify wealth against `brackets` without touching the history.
    ///
    /// Used once at population creation.
    pub fn classify(&mut self, brackets: &Brackets) {
        self.bracket = brackets.classify(self.wealth);
        self.previous_bracket = self.bracket;
    }

    /// Reclassify after acting, append to the bracket history and refresh
    /// mobility.
    pub fn settle(&mut self, brackets: &Brackets) {
        self.previous_bracket = self.bracket;
        self.bracket = brackets.classify(self.wealth);
        self.mobility.record(self.bracket);
    }

    /// Read-only snapshot for reporting.
    pub const fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            wealth: self.wealth,
            bracket: self.bracket,
            mobility: self.mobility.score(),
            payoff_rate: self.payoff_rate,
            is_elite: self.is_elite,
        }
    }
}

/// Indices of the party elite within `agents`.
pub fn elite_indices(agents: &[Agent]) -> Vec<usize> {
    agents
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_elite())
        .map(|(idx, _)| idx)
        .collect()
}

/// Create a fresh population of `count` agents.
///
/// Draw order is fixed: all payoff rates first, then all innovation
/// factors. Agents whose payoff rate reaches the elite percentile of the
/// drawn rates become party elite.
///
/// # Errors
///
/// Returns [`AgentError::EmptyPopulation`] for `count == 0`, or a
/// distribution error if the parameters are unusable.
pub fn spawn_population(
    count: usize,
    params: &ModelParams,
    rng: &mut SimRng,
) -> Result<Vec<Agent>, AgentError> {
    if count == 0 {
        return Err(AgentError::EmptyPopulation);
    }

    let payoff_rates = distribution::draw_payoff_rates(count, params, rng)?;
    let innovation = InnovationDraw::new(params)?;
    let factors: Vec<f64> = (0..count).map(|_| innovation.sample(rng)).collect();

    let elite_cut = distribution::percentile(&payoff_rates, params.elite_percentile)
        .ok_or(AgentError::EmptyPopulation)?;

    let agents: Vec<Agent> = payoff_rates
        .iter()
        .zip(factors)
        .enumerate()
        .map(|(id, (&rate, factor))| {
            Agent::new(
                id,
                params.initial_wealth,
                rate,
                factor,
                rate >= elite_cut,
                params.mobility_window,
            )
        })
        .collect();

    let elites = agents.iter().filter(|a| a.is_elite()).count();
    tracing::debug!(count, elites, elite_cut, "Population spawned");

    Ok(agents)
}
