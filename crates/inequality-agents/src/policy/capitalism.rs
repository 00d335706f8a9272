//! Capitalism: start-up capital and temporary innovation boosts.
//!
//! Population level: each step a wealth histogram is built with Sturges'
//! rule and the start-up capital threshold is taken from one of its bins,
//! chosen by the configured [`StartUpAggressiveness`].
//!
//! Agent level, before the baseline exchange:
//!
//! - An idle agent whose wealth exceeds the threshold **activates**: its
//!   payoff rate is multiplied by its innovation factor, once.
//! - On every later step the active factor is multiplied by the decay
//!   (halved by default). Once it drops below one the agent **renews**:
//!   the boost ends, the base payoff rate returns and a fresh factor is
//!   drawn.

use inequality_types::StartUpAggressiveness;
use tracing::trace;

use super::{BaselineExchange, PolicyMechanism, StepContext};
use crate::agent::Agent;
use crate::config::ModelParams;
use crate::distribution::{InnovationDraw, SimRng};
use crate::error::AgentError;

/// What happened to an agent's innovation state on one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InnovationEvent {
    /// Not innovating and below the capital threshold.
    Idle,
    /// Crossed the threshold; payoff rate multiplied by the factor.
    Activated,
    /// Still innovating; factor decayed.
    Decayed,
    /// Factor fell below one; boost ended and a fresh factor was drawn.
    Renewed,
}

/// Innovation followed by the baseline exchange.
#[derive(Debug, Clone)]
pub struct Capitalism {
    aggressiveness: StartUpAggressiveness,
    capital_floor: f64,
    decay: f64,
    draw: InnovationDraw,
    exchange: BaselineExchange,
}

impl Capitalism {
    /// Build from model parameters.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Distribution`] if the innovation distribution
    /// cannot be built.
    pub fn new(
        aggressiveness: StartUpAggressiveness,
        params: &ModelParams,
    ) -> Result<Self, AgentError> {
        Ok(Self {
            aggressiveness,
            capital_floor: params.capital_floor,
            decay: params.innovation_decay,
            draw: InnovationDraw::new(params)?,
            exchange: BaselineExchange::new(params),
        })
    }

    /// Advance the innovation state of one agent against `capital`.
    pub fn innovate(&self, agent: &mut Agent, capital: f64, rng: &mut SimRng) -> InnovationEvent {
        if !agent.is_innovating() {
            if agent.wealth() > capital {
                agent.activate_innovation();
                return InnovationEvent::Activated;
            }
            return InnovationEvent::Idle;
        }

        agent.decay_innovation(self.decay);
        if agent.innovation_factor() < 1.0 {
            let fresh = self.draw.sample(rng);
            agent.renew_innovation(fresh);
            return InnovationEvent::Renewed;
        }
        InnovationEvent::Decayed
    }
}

impl PolicyMechanism for Capitalism {
    fn name(&self) -> &'static str {
        "capitalism"
    }

    fn refresh(&self, agents: &[Agent], ctx: &mut StepContext) {
        let wealths: Vec<f64> = agents.iter().map(Agent::wealth).collect();
        let capital = start_up_capital(&wealths, self.aggressiveness, self.capital_floor);
        ctx.initial_capital = Some(capital);
    }

    fn apply(&self, actor: usize, agents: &mut [Agent], ctx: &StepContext, rng: &mut SimRng) {
        let capital = ctx.initial_capital.unwrap_or(self.capital_floor);
        if let Some(agent) = agents.get_mut(actor) {
            let event = self.innovate(agent, capital, rng);
            if event != InnovationEvent::Idle {
                trace!(actor, ?event, factor = agent.innovation_factor(), "Innovation");
            }
        }
        self.exchange.run(actor, agents, ctx, rng);
    }
}

/// Number of histogram bins by Sturges' rule: `ceil(log2(n) + 1)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sturges_bins(population: usize) -> usize {
    if population == 0 {
        return 1;
    }
    let bins = ((population as f64).log2() + 1.0).ceil();
    (bins as usize).max(1)
}

/// Largest wealth value inside each equal-width bin between the minimum
/// and maximum wealth, or `None` for an empty bin.
///
/// Bins are closed on both ends, so a value on an interior edge belongs to
/// both neighbours.
pub fn bin_maxima(wealths: &[f64]) -> Vec<Option<f64>> {
    let Some(min) = wealths.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = wealths.iter().copied().fold(min, f64::max);
    let bins = sturges_bins(wealths.len());
    let width = (max - min) / bins as f64;

    (0..bins)
        .map(|i| {
            let lo = (i as f64).mul_add(width, min);
            let hi = if i.saturating_add(1) == bins {
                max
            } else {
                ((i.saturating_add(1)) as f64).mul_add(width, min)
            };
            wealths
                .iter()
                .copied()
                .filter(|w| *w >= lo && *w <= hi)
                .reduce(f64::max)
        })
        .collect()
}

/// Start-up capital threshold for a wealth distribution.
///
/// `Lowest` uses the first non-empty bin, `Median` the middle bin (or the
/// next non-empty bin above it), `Highest` the last bin. The result is
/// never below `floor`.
pub fn start_up_capital(
    wealths: &[f64],
    aggressiveness: StartUpAggressiveness,
    floor: f64,
) -> f64 {
    let bins = bin_maxima(wealths);
    let chosen = match aggressiveness {
        StartUpAggressiveness::Lowest => bins.iter().flatten().next().copied(),
        StartUpAggressiveness::Median => {
            let mid = bins.len() / 2;
            bins.iter()
                .skip(mid)
                .flatten()
                .next()
                .or_else(|| bins.iter().flatten().last())
                .copied()
        }
        StartUpAggressiveness::Highest => bins.iter().flatten().last().copied(),
    };
    chosen.map_or(floor, |capital| capital.max(floor))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn capitalism() -> Capitalism {
        Capitalism::new(StartUpAggressiveness::Lowest, &ModelParams::default()).unwrap()
    }

    #[test]
    fn sturges_rule() {
        assert_eq!(sturges_bins(1), 1);
        assert_eq!(sturges_bins(8), 4);
        assert_eq!(sturges_bins(200), 9);
    }

    #[test]
    fn bin_maxima_cover_range() {
        let wealths: Vec<f64> = (1..=8).map(f64::from).collect();
        let bins = bin_maxima(&wealths);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.last().copied().flatten(), Some(8.0));
        assert!(bins.iter().all(Option::is_some));
    }

    #[test]
    fn aggressiveness_picks_increasing_thresholds() {
        let wealths: Vec<f64> = (1..=64).map(|w| f64::from(w) * 2.0).collect();
        let low = start_up_capital(&wealths, StartUpAggressiveness::Lowest, 1.5);
        let mid = start_up_capital(&wealths, StartUpAggressiveness::Median, 1.5);
        let high = start_up_capital(&wealths, StartUpAggressiveness::Highest, 1.5);
        assert!(low < mid && mid < high);
        assert!((high - 128.0).abs() < 1e-12);
    }

    #[test]
    fn capital_respects_floor() {
        let wealths = [1.0, 1.0, 1.0];
        let capital = start_up_capital(&wealths, StartUpAggressiveness::Highest, 1.5);
        assert!((capital - 1.5).abs() < f64::EPSILON);
        assert!((start_up_capital(&[], StartUpAggressiveness::Lowest, 1.5) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn agent_below_capital_stays_idle() {
        let policy = capitalism();
        let mut agent = Agent::new(0, 1.0, 0.2, 2.0, false, 20);
        let mut rng = SimRng::seed_from_u64(1);
        for _ in 0..5 {
            assert_eq!(policy.innovate(&mut agent, 5.0, &mut rng), InnovationEvent::Idle);
        }
        assert!((agent.payoff_rate() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn activation_multiplies_once_then_decays_until_renewal() {
        let policy = capitalism();
        let mut agent = Agent::new(0, 10.0, 0.2, 2.5, false, 20);
        let mut rng = SimRng::seed_from_u64(1);

        assert_eq!(policy.innovate(&mut agent, 5.0, &mut rng), InnovationEvent::Activated);
        assert!((agent.payoff_rate() - 0.5).abs() < 1e-12);
        assert!((agent.innovation_factor() - 2.5).abs() < 1e-12);

        // 2.5 -> 1.25: still innovating, payoff not multiplied again
        assert_eq!(policy.innovate(&mut agent, 5.0, &mut rng), InnovationEvent::Decayed);
        assert!((agent.innovation_factor() - 1.25).abs() < 1e-12);
        assert!((agent.payoff_rate() - 0.5).abs() < 1e-12);

        // 1.25 -> 0.625: below one, fresh draw
        assert_eq!(policy.innovate(&mut agent, 5.0, &mut rng), InnovationEvent::Renewed);
        assert!(!agent.is_innovating());
        assert!(agent.innovation_factor() >= 1.0);
        assert!((agent.payoff_rate() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn refresh_sets_initial_capital() {
        let policy = capitalism();
        let agents: Vec<Agent> = (0..10)
            .map(|i| Agent::new(i, f64::from(u32::try_from(i).unwrap_or(0)), 0.1, 2.0, false, 20))
            .collect();
        let mut ctx = super::super::test_support::context(&agents, 0.0);
        policy.refresh(&agents, &mut ctx);
        assert!(ctx.initial_capital.is_some_and(|c| c >= 1.5));
    }
}
