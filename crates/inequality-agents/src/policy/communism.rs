//! Communism: equal redistribution at the start of every step.
//!
//! Before anyone acts, the population's total wealth is divided equally
//! and every agent's wealth is overwritten with that share. The baseline
//! exchange then runs as usual, so inequality re-emerges within the step
//! and is flattened again at the start of the next.

use super::{BaselineExchange, PolicyMechanism, StepContext};
use crate::agent::Agent;
use crate::config::ModelParams;
use crate::distribution::SimRng;

/// Equal redistribution followed by the baseline exchange.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Communism {
    exchange: BaselineExchange,
}

impl Communism {
    /// Build from model parameters.
    pub const fn new(params: &ModelParams) -> Self {
        Self {
            exchange: BaselineExchange::new(params),
        }
    }
}

/// Overwrite every agent's wealth with an equal share of the total.
///
/// Returns the share, or `None` for an empty population.
pub fn equalize(agents: &mut [Agent]) -> Option<f64> {
    if agents.is_empty() {
        return None;
    }
    let total: f64 = agents.iter().map(Agent::wealth).sum();
    let share = total / agents.len() as f64;
    for agent in agents.iter_mut() {
        agent.set_wealth(share);
    }
    Some(share)
}

impl PolicyMechanism for Communism {
    fn name(&self) -> &'static str {
        "communism"
    }

    fn redistribute(&self, agents: &mut [Agent], ctx: &StepContext, _rng: &mut SimRng) {
        if let Some(share) = equalize(agents) {
            tracing::trace!(step = ctx.step, share, "Wealth equalized");
        }
    }

    fn apply(&self, actor: usize, agents: &mut [Agent], ctx: &StepContext, rng: &mut SimRng) {
        self.exchange.run(actor, agents, ctx, rng);
    }
}
