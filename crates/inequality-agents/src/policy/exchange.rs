//! Baseline econophysics exchange.
//!
//! Every active agent goes through three phases:
//!
//! 1. **Payday** -- wealth grows by `W * wealth`. This is the only place new
//!    money enters the economy.
//! 2. **Survival** -- the agent pays the step's survival cost to another
//!    random agent. An agent that cannot cover the cost hands over all it
//!    has and is reset to the subsistence floor.
//! 3. **Thrive** -- the agent buys from a third random agent, paying that
//!    counterpart's payoff rate times its own wealth, provided it can
//!    afford it.
//!
//! The other policies wrap this exchange with their own rules.

use tracing::trace;

use super::{PolicyMechanism, StepContext, pick_counterpart, transfer};
use crate::agent::Agent;
use crate::config::ModelParams;
use crate::distribution::SimRng;

/// The plain exchange with no policy intervention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineExchange {
    subsistence_floor: f64,
}

impl BaselineExchange {
    /// Build from model parameters.
    pub const fn new(params: &ModelParams) -> Self {
        Self {
            subsistence_floor: params.subsistence_floor,
        }
    }

    /// Run payday, survival and thrive for the agent at `actor`.
    pub fn run(&self, actor: usize, agents: &mut [Agent], ctx: &StepContext, rng: &mut SimRng) {
        let population = agents.len();
        let Some(agent) = agents.get_mut(actor) else {
            return;
        };

        // Payday
        agent.earn();

        // Survival
        if let Some(seller) = pick_counterpart(rng, population, actor) {
            self.pay_survival(actor, seller, agents, ctx.survival_cost);
        } else {
            trace!(actor, "No survival counterpart, payment skipped");
        }

        // Thrive
        if let Some(seller) = pick_counterpart(rng, population, actor) {
            pay_thrive(actor, seller, agents);
        } else {
            trace!(actor, "No thrive counterpart, payment skipped");
        }
    }

    fn pay_survival(&self, actor: usize, seller: usize, agents: &mut [Agent], cost: f64) {
        let wealth = agents.get(actor).map_or(0.0, Agent::wealth);
        if wealth > cost {
            transfer(agents, actor, seller, cost);
        } else {
            // Subsistence failure: everything goes, then the floor is restored.
            transfer(agents, actor, seller, wealth);
            if let Some(agent) = agents.get_mut(actor) {
                agent.set_wealth(self.subsistence_floor);
            }
            trace!(actor, wealth, cost, "Subsistence failure");
        }
    }
}

fn pay_thrive(actor: usize, seller: usize, agents: &mut [Agent]) {
    let wealth = agents.get(actor).map_or(0.0, Agent::wealth);
    let rate = agents.get(seller).map_or(0.0, Agent::payoff_rate);
    let price = (rate * wealth).max(0.0);
    if wealth > price {
        transfer(agents, actor, seller, price);
    }
}

impl PolicyMechanism for BaselineExchange {
    fn name(&self) -> &'static str {
        "baseline"
    }

    fn apply(&self, actor: usize, agents: &mut [Agent], ctx: &StepContext, rng: &mut SimRng) {
        self.run(actor, agents, ctx, rng);
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;

    use super::super::test_support::{context, population, total};
    use super::*;

    #[test]
    fn zero_growth_exchange_conserves_wealth() {
        let mut agents = population(&[3.0, 2.0, 5.0, 1.5], &[0.0, 0.0, 0.0, 0.0]);
        let ctx = context(&agents, 0.4);
        let exchange = BaselineExchange::new(&ModelParams::default());
        let mut rng = SimRng::seed_from_u64(11);
        let before = total(&agents);
        for actor in 0..agents.len() {
            exchange.run(actor, &mut agents, &ctx, &mut rng);
            assert!((total(&agents) - before).abs() < 1e-9);
        }
    }

    #[test]
    fn growth_is_the_only_source_of_new_wealth() {
        let mut agents = population(&[1.0, 1.0, 1.0], &[0.1, 0.2, 0.3]);
        let ctx = context(&agents, 0.0);
        let exchange = BaselineExchange::new(&ModelParams::default());
        let mut rng = SimRng::seed_from_u64(2);

        let before = total(&agents);
        let expected_growth = agents[0].payoff_rate() * agents[0].wealth();
        exchange.run(0, &mut agents, &ctx, &mut rng);
        assert!((total(&agents) - (before + expected_growth)).abs() < 1e-9);
    }

    #[test]
    fn broke_agent_resets_to_floor() {
        let mut agents = population(&[0.5, 4.0], &[0.0, 0.0]);
        let ctx = context(&agents, 2.0);
        let exchange = BaselineExchange::new(&ModelParams::default());
        let mut rng = SimRng::seed_from_u64(1);
        exchange.run(0, &mut agents, &ctx, &mut rng);
        // 0.5 handed over, floor restored; thrive price is 0 with W = 0.
        assert!((agents[0].wealth() - 1.0).abs() < 1e-12);
        assert!((agents[1].wealth() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn solvent_agent_pays_survival_cost() {
        let mut agents = population(&[5.0, 1.0], &[0.0, 0.0]);
        let ctx = context(&agents, 2.0);
        let exchange = BaselineExchange::new(&ModelParams::default());
        let mut rng = SimRng::seed_from_u64(1);
        exchange.run(0, &mut agents, &ctx, &mut rng);
        assert!((agents[0].wealth() - 3.0).abs() < 1e-12);
        assert!((agents[1].wealth() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn thrive_pays_counterpart_share() {
        let mut agents = population(&[10.0, 0.0], &[0.0, 0.25]);
        let ctx = context(&agents, 0.0);
        let exchange = BaselineExchange::new(&ModelParams::default());
        let mut rng = SimRng::seed_from_u64(4);
        exchange.run(0, &mut agents, &ctx, &mut rng);
        // survival cost 0, then thrive: 0.25 * 10
        assert!((agents[0].wealth() - 7.5).abs() < 1e-12);
        assert!((agents[1].wealth() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn lone_agent_only_earns() {
        let mut agents = population(&[2.0], &[0.5]);
        let ctx = context(&agents, 10.0);
        let exchange = BaselineExchange::new(&ModelParams::default());
        let mut rng = SimRng::seed_from_u64(4);
        exchange.run(0, &mut agents, &ctx, &mut rng);
        assert!((agents[0].wealth() - 3.0).abs() < 1e-12);
    }
}
