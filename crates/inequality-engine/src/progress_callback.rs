//! Step callback that logs run progress.
//!
//! Every step is logged at `debug`; every `interval`-th step and the final
//! step are logged at `info` with the total wealth spelled out.

use inequality_core::metrics::wealth_in_words;
use inequality_core::{StepCallback, StepSummary};
use tracing::{debug, info};

/// Callback that reports per-policy metrics as the run progresses.
pub struct ProgressCallback {
    interval: u64,
    last_step: u64,
}

impl ProgressCallback {
    /// Create a callback that logs at `info` every `interval` steps and on
    /// `last_step`.
    pub const fn new(interval: u64, last_step: u64) -> Self {
        Self {
            interval,
            last_step,
        }
    }

    /// Whether `step` is logged at `info`.
    const fn is_milestone(&self, step: u64) -> bool {
        step == self.last_step || (self.interval > 0 && step % self.interval == 0)
    }
}

impl StepCallback for ProgressCallback {
    fn on_step(&mut self, summary: &StepSummary) {
        let milestone = self.is_milestone(summary.step);
        for (policy, point) in &summary.points {
            if milestone {
                info!(
                    policy = policy.name(),
                    step = summary.step,
                    gini = point.gini,
                    total = %wealth_in_words(point.total),
                    mobility = point.mobility,
                    "Progress"
                );
            } else {
                debug!(
                    policy = policy.name(),
                    step = summary.step,
                    gini = point.gini,
                    total = point.total,
                    mobility = point.mobility,
                    "Step"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestones_follow_interval_and_last_step() {
        let callback = ProgressCallback::new(10, 25);
        assert!(callback.is_milestone(10));
        assert!(callback.is_milestone(20));
        assert!(callback.is_milestone(25));
        assert!(!callback.is_milestone(7));
    }

    #[test]
    fn zero_interval_only_reports_the_end() {
        let callback = ProgressCallback::new(0, 5);
        assert!(!callback.is_milestone(4));
        assert!(callback.is_milestone(5));
    }
}
