//! Plain data structs shared across the simulator.
//!
//! Covers bracket thresholds, read-only agent snapshots, per-step metric
//! points and their column-oriented series, and class churn summaries.

use serde::{Deserialize, Serialize};

use crate::enums::Bracket;

// ---------------------------------------------------------------------------
// Bracket thresholds
// ---------------------------------------------------------------------------

/// The pair of wealth thresholds separating the three brackets.
///
/// Recomputed from the live wealth distribution at the start of every step.
/// Construction always orders the pair so that `lower <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brackets {
    /// Wealth below this value is [`Bracket::Lower`].
    pub lower: f64,
    /// Wealth at or above this value is [`Bracket::Upper`].
    pub upper: f64,
}

impl Brackets {
    /// Build a threshold pair, swapping the values if they arrive reversed.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { lower: a, upper: b }
        } else {
            Self { lower: b, upper: a }
        }
    }

    /// Classify a wealth value.
    ///
    /// `w < lower` is Lower, `w >= upper` is Upper, everything else Middle.
    pub fn classify(&self, wealth: f64) -> Bracket {
        if wealth < self.lower {
            Bracket::Lower
        } else if wealth >= self.upper {
            Bracket::Upper
        } else {
            Bracket::Middle
        }
    }
}

impl Default for Brackets {
    /// Thresholds used before any distribution has been observed.
    fn default() -> Self {
        Self {
            lower: 0.75,
            upper: 1.25,
        }
    }
}

// ---------------------------------------------------------------------------
// Agent snapshot
// ---------------------------------------------------------------------------

/// A read-only view of one agent at the end of the most recent step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Index of the agent within its population.
    pub id: usize,
    /// Current wealth.
    pub wealth: f64,
    /// Current bracket.
    pub bracket: Bracket,
    /// Bartholomew mobility score in `[0, 1]`.
    pub mobility: f64,
    /// Current payoff rate (may be boosted under capitalism).
    pub payoff_rate: f64,
    /// Whether the agent belongs to the party elite.
    pub is_elite: bool,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Population metrics recorded after one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsPoint {
    /// Step index; 0 is the state before any step ran.
    pub step: u64,
    /// Gini coefficient of wealth.
    pub gini: f64,
    /// Sum of all wealth.
    pub total: f64,
    /// Mean agent mobility.
    pub mobility: f64,
}

/// Column-oriented metric time series, one entry per recorded step.
///
/// Index `k` of every column refers to the same step, which is what makes
/// series from different policies line up in comparison mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSeries {
    /// Gini coefficient per step.
    pub gini: Vec<f64>,
    /// Total wealth per step.
    pub total: Vec<f64>,
    /// Mean mobility per step.
    pub mobility: Vec<f64>,
}

impl MetricsSeries {
    /// Append one step's metrics.
    pub fn push(&mut self, point: &MetricsPoint) {
        self.gini.push(point.gini);
        self.total.push(point.total);
        self.mobility.push(point.mobility);
    }

    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.gini.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.gini.is_empty()
    }
}

impl<'a> FromIterator<&'a MetricsPoint> for MetricsSeries {
    fn from_iter<I: IntoIterator<Item = &'a MetricsPoint>>(iter: I) -> Self {
        let mut series = Self::default();
        for point in iter {
            series.push(point);
        }
        series
    }
}

// ---------------------------------------------------------------------------
// Churn
// ---------------------------------------------------------------------------

/// How many agents changed class on the last step, and the class sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnReport {
    /// Agents whose bracket rose on the last step.
    pub moving_up: usize,
    /// Agents whose bracket fell on the last step.
    pub moving_down: usize,
    /// Agents currently in the lower bracket.
    pub lower: usize,
    /// Agents currently in the middle bracket.
    pub middle: usize,
    /// Agents currently in the upper bracket.
    pub upper: usize,
}

impl ChurnReport {
    /// Total number of classified agents.
    pub const fn population(&self) -> usize {
        self.lower
            .saturating_add(self.middle)
            .saturating_add(self.upper)
    }

    /// Percentage of the population currently in `bracket`.
    pub fn share(&self, bracket: Bracket) -> f64 {
        let count = match bracket {
            Bracket::Lower => self.lower,
            Bracket::Middle => self.middle,
            Bracket::Upper => self.upper,
        };
        percent(count, self.population())
    }

    /// Percentage of the population that moved up.
    pub fn moving_up_share(&self) -> f64 {
        percent(self.moving_up, self.population())
    }

    /// Percentage of the population that moved down.
    pub fn moving_down_share(&self) -> f64 {
        percent(self.moving_down, self.population())
    }
}

fn percent(count: usize, of: usize) -> f64 {
    if of == 0 {
        return 0.0;
    }
    count as f64 / of as f64 * 100.0
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn brackets_are_ordered_on_construction() {
        let b = Brackets::new(5.0, 2.0);
        assert!(b.lower <= b.upper);
        assert!((b.lower - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn classify_ties_go_to_middle_or_upper() {
        let b = Brackets::new(1.0, 2.0);
        assert_eq!(b.classify(0.5), Bracket::Lower);
        assert_eq!(b.classify(1.0), Bracket::Middle);
        assert_eq!(b.classify(1.999), Bracket::Middle);
        assert_eq!(b.classify(2.0), Bracket::Upper);
    }

    #[test]
    fn classify_with_collapsed_thresholds() {
        let b = Brackets::new(1.0, 1.0);
        assert_eq!(b.classify(0.9), Bracket::Lower);
        assert_eq!(b.classify(1.0), Bracket::Upper);
    }

    #[test]
    fn series_columns_stay_aligned() {
        let points = [
            MetricsPoint {
                step: 0,
                gini: 0.0,
                total: 10.0,
                mobility: 0.0,
            },
            MetricsPoint {
                step: 1,
                gini: 0.2,
                total: 12.0,
                mobility: 0.1,
            },
        ];
        let series: MetricsSeries = points.iter().collect();
        assert_eq!(series.len(), 2);
        assert_eq!(series.total.len(), series.mobility.len());
        assert!((series.gini[1] - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn churn_shares_are_percentages() {
        let churn = ChurnReport {
            moving_up: 1,
            moving_down: 3,
            lower: 5,
            middle: 3,
            upper: 2,
        };
        assert_eq!(churn.population(), 10);
        assert!((churn.share(Bracket::Lower) - 50.0).abs() < 1e-9);
        assert!((churn.moving_down_share() - 30.0).abs() < 1e-9);
        assert!(ChurnReport::default().share(Bracket::Upper).abs() < f64::EPSILON);
    }
}
