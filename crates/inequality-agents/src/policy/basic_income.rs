//! Universal basic income add-on.
//!
//! Wealth held above `mean * (1 + redistribution_percentage)` is skimmed
//! into a pool, and the pool is shared equally by every agent whose wealth
//! is below the survival amount. Recipients are chosen before skimming. If
//! nobody qualifies nothing is skimmed, so total wealth is always conserved.

use tracing::trace;

use super::{PolicyMechanism, StepContext};
use crate::agent::Agent;
use crate::distribution::SimRng;
use crate::error::AgentError;

/// Skim the excess from the rich, pay it to those below subsistence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniversalBasicIncome {
    survival_amount: f64,
    redistribution_percentage: f64,
}

impl UniversalBasicIncome {
    /// Create the add-on.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidParameter`] if either value is negative
    /// or not finite.
    pub fn new(survival_amount: f64, redistribution_percentage: f64) -> Result<Self, AgentError> {
        if !survival_amount.is_finite() || survival_amount < 0.0 {
            return Err(AgentError::InvalidParameter {
                name: "survival_amount",
                value: survival_amount,
            });
        }
        if !redistribution_percentage.is_finite() || redistribution_percentage < 0.0 {
            return Err(AgentError::InvalidParameter {
                name: "redistribution_percentage",
                value: redistribution_percentage,
            });
        }
        Ok(Self {
            survival_amount,
            redistribution_percentage,
        })
    }

    /// Wealth level above which holdings are skimmed.
    pub fn ceiling(&self, agents: &[Agent]) -> Option<f64> {
        if agents.is_empty() {
            return None;
        }
        let mean = agents.iter().map(Agent::wealth).sum::<f64>() / agents.len() as f64;
        Some(mean * (1.0 + self.redistribution_percentage))
    }
}

impl PolicyMechanism for UniversalBasicIncome {
    fn name(&self) -> &'static str {
        "basic_income"
    }

    fn redistribute(&self, agents: &mut [Agent], ctx: &StepContext, _rng: &mut SimRng) {
        let Some(ceiling) = self.ceiling(agents) else {
            return;
        };
        let recipients: Vec<usize> = agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.wealth() < self.survival_amount)
            .map(|(idx, _)| idx)
            .collect();
        if recipients.is_empty() {
            return;
        }

        let pool: f64 = agents
            .iter_mut()
            .map(|a| {
                let excess = a.wealth() - ceiling;
                if excess > 0.0 { a.debit(excess) } else { 0.0 }
            })
            .sum();

        let share = pool / recipients.len() as f64;
        for idx in &recipients {
            if let Some(agent) = agents.get_mut(*idx) {
                agent.credit(share);
            }
        }
        trace!(step = ctx.step, pool, recipients = recipients.len(), "Basic income paid");
    }
}
