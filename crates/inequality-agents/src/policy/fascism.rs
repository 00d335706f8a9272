//! Fascism: non-elite agents pay a party tax to the elite.
//!
//! Before its exchange, every non-elite agent pays a fixed share of its
//! wealth to one uniformly chosen party elite. Elite agents never pay and
//! never initiate exchanges; they only gain wealth as recipients of tax and
//! of other agents' survival and thrive payments.

use rand::seq::IndexedRandom;
use tracing::trace;

use super::{BaselineExchange, PolicyMechanism, StepContext, transfer};
use crate::agent::Agent;
use crate::config::ModelParams;
use crate::distribution::SimRng;

/// Party tax followed by the baseline exchange.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fascism {
    tax_rate: f64,
    exchange: BaselineExchange,
}

impl Fascism {
    /// Build from model parameters.
    pub const fn new(params: &ModelParams) -> Self {
        Self {
            tax_rate: params.party_tax,
            exchange: BaselineExchange::new(params),
        }
    }

    /// Pay the party tax for `actor` to a random member of `elites`.
    /// Returns the tax paid; an elite drawn to pay itself moves nothing.
    pub fn pay_tax(
        &self,
        actor: usize,
        agents: &mut [Agent],
        elites: &[usize],
        rng: &mut SimRng,
    ) -> f64 {
        let Some(&elite) = elites.choose(rng) else {
            trace!(actor, "No party elite to receive tax");
            return 0.0;
        };
        let wealth = agents.get(actor).map_or(0.0, Agent::wealth);
        transfer(agents, actor, elite, wealth * self.tax_rate)
    }
}

impl PolicyMechanism for Fascism {
    fn name(&self) -> &'static str {
        "fascism"
    }

    fn apply(&self, actor: usize, agents: &mut [Agent], ctx: &StepContext, rng: &mut SimRng) {
        let is_elite = agents.get(actor).is_some_and(Agent::is_elite);
        if is_elite {
            return;
        }
        self.pay_tax(actor, agents, &ctx.elites, rng);
        self.exchange.run(actor, agents, ctx, rng);
    }
}
