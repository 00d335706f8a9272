//! Patron network add-on.
//!
//! Once per step the wealthiest share of the population acts as patrons.
//! Each patron samples a "network" from the non-patron pool, picks one
//! client from it and gives that client a fixed share of its own wealth.
//! Patrons are never sampled as clients.

use rand::Rng;
use rand::seq::index;
use tracing::trace;

use super::{PolicyMechanism, StepContext, transfer};
use crate::agent::Agent;
use crate::config::ModelParams;
use crate::distribution::SimRng;

/// Top-earner patronage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patron {
    share: f64,
    network_share: f64,
    gift: f64,
}

impl Patron {
    /// Build from model parameters.
    pub const fn new(params: &ModelParams) -> Self {
        Self {
            share: params.patron_share,
            network_share: params.patron_network_share,
            gift: params.patron_gift,
        }
    }

    /// Number of patrons for a population: at least one.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn patron_count(&self, population: usize) -> usize {
        let count = (population as f64 * self.share).floor() as usize;
        count.max(1).min(population)
    }

    /// Size of each patron's sampled network: at least one, at most the pool.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn network_size(&self, pool: usize) -> usize {
        let size = (pool as f64 * self.network_share).floor() as usize;
        size.max(1).min(pool)
    }

    /// Indices of the patrons, wealthiest first, and of the remaining pool.
    pub fn partition(&self, agents: &[Agent]) -> (Vec<usize>, Vec<usize>) {
        let mut ranked: Vec<usize> = (0..agents.len()).collect();
        ranked.sort_by(|&a, &b| {
            let wa = agents.get(a).map_or(0.0, Agent::wealth);
            let wb = agents.get(b).map_or(0.0, Agent::wealth);
            wb.total_cmp(&wa)
        });
        let pool = ranked.split_off(self.patron_count(agents.len()));
        (ranked, pool)
    }
}

impl PolicyMechanism for Patron {
    fn name(&self) -> &'static str {
        "patron"
    }

    fn redistribute(&self, agents: &mut [Agent], ctx: &StepContext, rng: &mut SimRng) {
        let (patrons, pool) = self.partition(agents);
        if pool.is_empty() {
            trace!(step = ctx.step, "No clients outside the patron set, skipping");
            return;
        }

        let network_size = self.network_size(pool.len());
        let mut given = 0.0;
        for patron in patrons {
            let network = index::sample(rng, pool.len(), network_size).into_vec();
            let pick = rng.random_range(0..network.len());
            let Some(client) = network.get(pick).and_then(|&slot| pool.get(slot)).copied()
            else {
                continue;
            };
            let amount = agents.get(patron).map_or(0.0, Agent::wealth) * self.gift;
            given += transfer(agents, patron, client, amount);
        }
        trace!(step = ctx.step, given, network_size, "Patron gifts paid");
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;

    use super::super::test_support::{context, population, total};
    use super::*;

    #[test]
    fn patron_and_network_sizes() {
        let patron = Patron::new(&ModelParams::default());
        assert_eq!(patron.patron_count(200), 40);
        assert_eq!(patron.patron_count(3), 1);
        assert_eq!(patron.network_size(160), 48);
        assert_eq!(patron.network_size(2), 1);
    }

    #[test]
    fn richest_agents_become_patrons() {
        let agents = population(&[1.0, 9.0, 3.0, 7.0, 2.0], &[0.1; 5]);
        let (patrons, pool) = Patron::new(&ModelParams::default()).partition(&agents);
        assert_eq!(patrons, vec![1]);
        assert_eq!(pool.len(), 4);
        assert!(!pool.contains(&1));
    }

    #[test]
    fn gift_moves_from_patron_to_a_non_patron() {
        let mut agents = population(&[1.0, 10.0, 1.0, 1.0, 1.0], &[0.1; 5]);
        let ctx = context(&agents, 0.0);
        let mut rng = SimRng::seed_from_u64(6);
        Patron::new(&ModelParams::default()).redistribute(&mut agents, &ctx, &mut rng);

        assert!((agents[1].wealth() - 9.0).abs() < 1e-12);
        assert!((total(&agents) - 14.0).abs() < 1e-12);
        let gained = agents
            .iter()
            .filter(|a| a.id() != 1 && (a.wealth() - 2.0).abs() < 1e-12)
            .count();
        assert_eq!(gained, 1);
    }

    #[test]
    fn lone_agent_has_no_clients() {
        let mut agents = population(&[5.0], &[0.1]);
        let ctx = context(&agents, 0.0);
        let mut rng = SimRng::seed_from_u64(6);
        Patron::new(&ModelParams::default()).redistribute(&mut agents, &ctx, &mut rng);
        assert!((agents[0].wealth() - 5.0).abs() < f64::EPSILON);
    }
}
