//! Policy mechanisms: the pluggable rules that move wealth each step.
//!
//! A simulation owns one base mechanism (selected once from its
//! [`PolicyKind`]) plus any number of population-level add-ons such as the
//! [`Patron`] network. Each step the engine drives every mechanism through
//! three hooks in a fixed order:
//!
//! 1. [`PolicyMechanism::refresh`] -- read the population and derive extra
//!    global state into the [`StepContext`] (e.g. start-up capital).
//! 2. [`PolicyMechanism::redistribute`] -- population-level transfers that
//!    run once before any agent acts (add-ons first, then the base policy).
//! 3. [`PolicyMechanism::apply`] -- invoked once per agent, in a freshly
//!    shuffled order, with mutable access to the whole population so that
//!    transfers to counterparties are visible to later agents.
//!
//! # Submodules
//!
//! - [`exchange`] -- Baseline econophysics exchange (growth, survival, thrive)
//! - [`fascism`] -- Party tax paid by non-elites to elites
//! - [`capitalism`] -- Start-up capital threshold and innovation boosts
//! - [`communism`] -- Equal redistribution of all wealth
//! - [`patron`] -- Top-earner patronage add-on
//! - [`basic_income`] -- Universal basic income add-on
//!
//! [`PolicyKind`]: inequality_types::PolicyKind

pub mod basic_income;
pub mod capitalism;
pub mod communism;
pub mod exchange;
pub mod fascism;
pub mod patron;

use std::fmt;
use std::sync::Arc;

use inequality_types::{Brackets, PolicyKind, StartUpAggressiveness};
use rand::Rng;

use crate::agent::Agent;
use crate::config::ModelParams;
use crate::distribution::SimRng;
use crate::error::AgentError;

pub use basic_income::UniversalBasicIncome;
pub use capitalism::{Capitalism, InnovationEvent};
pub use communism::Communism;
pub use exchange::BaselineExchange;
pub use fascism::Fascism;
pub use patron::Patron;

/// Global state recomputed once per step before any agent acts.
///
/// Agents only ever see this read-only; mechanisms may extend it during
/// [`PolicyMechanism::refresh`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepContext {
    /// Step number being executed (1 for the first call to `step`).
    pub step: u64,
    /// Population size.
    pub population: usize,
    /// Bracket thresholds for this step.
    pub brackets: Brackets,
    /// Total wealth at the start of the step.
    pub total_wealth: f64,
    /// Inflation-indexed cost of living.
    pub survival_cost: f64,
    /// Start-up capital threshold; only set under capitalism.
    pub initial_capital: Option<f64>,
    /// Indices of the party elite. Fixed for the life of a population.
    pub elites: Arc<[usize]>,
}

/// A rule that modifies wealth during a step.
///
/// Mechanisms are stateless strategy objects: everything that changes
/// between steps lives on the agents or in the [`StepContext`]. All hooks
/// default to doing nothing, so an add-on implements only the scope it
/// needs.
///
/// Implementations must keep every agent's wealth non-negative. The
/// [`transfer`] helper does this for point-to-point payments.
pub trait PolicyMechanism: fmt::Debug + Send {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Derive additional global state from the population.
    fn refresh(&self, _agents: &[Agent], _ctx: &mut StepContext) {}

    /// Population-level transfers, run once per step before agents act.
    fn redistribute(&self, _agents: &mut [Agent], _ctx: &StepContext, _rng: &mut SimRng) {}

    /// Per-agent rule for the agent at index `actor`.
    fn apply(&self, _actor: usize, _agents: &mut [Agent], _ctx: &StepContext, _rng: &mut SimRng) {
    }
}

/// Build the base mechanism for a policy.
///
/// # Errors
///
/// Returns an [`AgentError`] if the innovation distribution cannot be built
/// from `params`.
pub fn mechanism_for(
    kind: PolicyKind,
    aggressiveness: StartUpAggressiveness,
    params: &ModelParams,
) -> Result<Box<dyn PolicyMechanism>, AgentError> {
    let mechanism: Box<dyn PolicyMechanism> = match kind {
        PolicyKind::Baseline => Box::new(BaselineExchange::new(params)),
        PolicyKind::Fascism => Box::new(Fascism::new(params)),
        PolicyKind::Communism => Box::new(Communism::new(params)),
        PolicyKind::Capitalism => Box::new(Capitalism::new(aggressiveness, params)?),
    };
    Ok(mechanism)
}

/// Move up to `amount` from agent `from` to agent `to`.
///
/// Negative amounts move nothing, and the payer never goes below zero, so
/// total wealth is conserved exactly. Returns the amount moved. Paying
/// oneself or naming an index outside the population moves nothing.
pub fn transfer(agents: &mut [Agent], from: usize, to: usize, amount: f64) -> f64 {
    if from == to || to >= agents.len() {
        return 0.0;
    }
    let Some(payer) = agents.get_mut(from) else {
        return 0.0;
    };
    let moved = payer.debit(amount);
    if let Some(payee) = agents.get_mut(to) {
        payee.credit(moved);
    }
    moved
}

/// Pick a uniformly random agent index other than `actor`.
///
/// Returns `None` when the population has no other agent.
pub fn pick_counterpart(rng: &mut SimRng, population: usize, actor: usize) -> Option<usize> {
    if population < 2 {
        return None;
    }
    let k = rng.random_range(0..population.saturating_sub(1));
    if k >= actor {
        Some(k.saturating_add(1))
    } else {
        Some(k)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use inequality_types::Brackets;

    use super::StepContext;
    use crate::agent::{self, Agent};

    /// Agents with the given wealth and payoff rates, no elites.
    pub fn population(wealth: &[f64], payoff: &[f64]) -> Vec<Agent> {
        wealth
            .iter()
            .zip(payoff)
            .enumerate()
            .map(|(id, (&w, &p))| Agent::new(id, w, p, 2.0, false, 20))
            .collect()
    }

    /// A context with the given survival cost and neutral thresholds.
    pub fn context(agents: &[Agent], survival_cost: f64) -> StepContext {
        StepContext {
            step: 1,
            population: agents.len(),
            brackets: Brackets::new(1.0, 2.0),
            total_wealth: total(agents),
            survival_cost,
            initial_capital: None,
            elites: agent::elite_indices(agents).into(),
        }
    }

    /// Sum of wealth.
    pub fn total(agents: &[Agent]) -> f64 {
        agents.iter().map(Agent::wealth).sum()
    }
}
