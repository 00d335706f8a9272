//! Bounded run loop with per-step callbacks and shared access.
//!
//! [`run_with_callback`] drives any [`Steppable`] model for a fixed number
//! of steps and hands every step's summary to a [`StepCallback`].
//! [`SharedModel`] wraps a model in a single lock for callers that step it
//! from more than one place.

use std::sync::{Arc, Mutex, MutexGuard};

use inequality_types::{MetricsPoint, PolicyKind};
use tracing::{info, warn};

use crate::comparison::ComparisonOrchestrator;
use crate::simulation::Simulation;

/// Errors from the shared-model wrapper.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A previous holder of the lock panicked mid-step.
    #[error("model lock poisoned")]
    Poisoned,
}

/// Metrics recorded by one step, per policy.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSummary {
    /// Step that just completed.
    pub step: u64,
    /// One entry per simulated policy, in advancement order.
    pub points: Vec<(PolicyKind, MetricsPoint)>,
}

/// Result of a bounded run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Steps executed by this run.
    pub total_steps: u64,
    /// Summary of the last step, if any step ran.
    pub final_summary: Option<StepSummary>,
}

/// A model that can be advanced one step at a time.
pub trait Steppable {
    /// Advance one step.
    fn advance(&mut self) -> StepSummary;

    /// Steps taken so far.
    fn steps_taken(&self) -> u64;
}

impl Steppable for Simulation {
    fn advance(&mut self) -> StepSummary {
        let point = self.step();
        StepSummary {
            step: point.step,
            points: vec![(self.policy(), point)],
        }
    }

    fn steps_taken(&self) -> u64 {
        self.step_count()
    }
}

impl Steppable for ComparisonOrchestrator {
    fn advance(&mut self) -> StepSummary {
        let points = self.step();
        StepSummary {
            step: self.step_count(),
            points,
        }
    }

    fn steps_taken(&self) -> u64 {
        self.step_count()
    }
}

/// Callback invoked after each step completes.
pub trait StepCallback: Send {
    /// Called with the summary of the step that just completed.
    fn on_step(&mut self, summary: &StepSummary);
}

/// A no-op step callback.
pub struct NoOpCallback;

impl StepCallback for NoOpCallback {
    fn on_step(&mut self, _summary: &StepSummary) {}
}

/// Advance `model` by `steps`, notifying `callback` after each step.
pub fn run_with_callback<M: Steppable + ?Sized>(
    model: &mut M,
    steps: u64,
    callback: &mut dyn StepCallback,
) -> RunSummary {
    info!(steps, start = model.steps_taken(), "Run starting");
    let mut final_summary = None;
    for _ in 0..steps {
        let summary = model.advance();
        callback.on_step(&summary);
        final_summary = Some(summary);
    }
    RunSummary {
        total_steps: steps,
        final_summary,
    }
}

/// Log the end of a run.
pub fn log_run_end(result: &RunSummary) {
    info!(
        total_steps = result.total_steps,
        final_step = result.final_summary.as_ref().map(|s| s.step),
        "Run ended"
    );

    if let Some(ref summary) = result.final_summary {
        for (policy, point) in &summary.points {
            info!(
                policy = policy.name(),
                step = point.step,
                gini = point.gini,
                total = point.total,
                mobility = point.mobility,
                "Final metrics"
            );
        }
    } else {
        warn!("Run ended with no steps executed");
    }
}

/// A model behind one mutex, so two callers can never step it at once.
#[derive(Debug)]
pub struct SharedModel<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for SharedModel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SharedModel<T> {
    /// Wrap a model.
    pub fn new(model: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(model)),
        }
    }

    /// Lock the model for exclusive access.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Poisoned`] if a previous holder panicked.
    pub fn lock(&self) -> Result<MutexGuard<'_, T>, RunnerError> {
        self.inner.lock().map_err(|_poisoned| RunnerError::Poisoned)
    }

    /// Run `f` with exclusive access to the model.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Poisoned`] if a previous holder panicked.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, RunnerError> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }
}

impl<T: Steppable> SharedModel<T> {
    /// Advance the shared model by one step.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Poisoned`] if a previous holder panicked.
    pub fn step(&self) -> Result<StepSummary, RunnerError> {
        self.with(Steppable::advance)
    }
}
