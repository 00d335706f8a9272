//! Bounded bracket history and the Bartholomew mobility ratio.
//!
//! Each step an agent appends its freshly computed bracket. Only the most
//! recent `window` entries are retained. Mobility is the mean absolute
//! change in bracket position between consecutive entries, divided by the
//! largest possible change (Lower to Upper).

use std::collections::VecDeque;

use inequality_types::Bracket;
use serde::Serialize;

/// Largest possible position change between two brackets.
const MAX_STEP_CHANGE: f64 = 2.0;

/// Per-agent bracket history with a cached mobility score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MobilityTracker {
    history: VecDeque<Bracket>,
    window: usize,
    score: f64,
}

impl MobilityTracker {
    /// Create an empty tracker retaining at most `window` brackets.
    pub fn new(window: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(window.saturating_add(1)),
            window,
            score: 0.0,
        }
    }

    /// Append a bracket, dropping the oldest entry once over capacity, and
    /// refresh the mobility score.
    pub fn record(&mut self, bracket: Bracket) {
        self.history.push_back(bracket);
        while self.history.len() > self.window {
            self.history.pop_front();
        }
        self.score = bartholomew(self.history.iter().copied());
    }

    /// Current mobility in `[0, 1]`.
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Retained brackets, oldest first.
    pub const fn history(&self) -> &VecDeque<Bracket> {
        &self.history
    }
}

/// Bartholomew ratio of a bracket sequence.
///
/// Fewer than two entries yield 0.
pub fn bartholomew<I>(brackets: I) -> f64
where
    I: IntoIterator<Item = Bracket>,
{
    let mut previous: Option<u8> = None;
    let mut moves: u32 = 0;
    let mut total_change: u32 = 0;
    for bracket in brackets {
        let position = bracket.position();
        if let Some(prev) = previous {
            total_change = total_change.saturating_add(u32::from(position.abs_diff(prev)));
            moves = moves.saturating_add(1);
        }
        previous = Some(position);
    }
    if moves == 0 {
        return 0.0;
    }
    let mean_change = f64::from(total_change) / f64::from(moves);
    (mean_change / MAX_STEP_CHANGE).clamp(0.0, 1.0)
}
