//! Bracket thresholds derived from the live wealth distribution.
//!
//! Thresholds are always the lower and upper percentiles of the current
//! wealth values (33rd and 67th by default). Cuts relative to the maximum
//! wealth are deliberately not supported so that a single outlier cannot
//! push the whole population into the lower bracket.

use inequality_types::Brackets;

use crate::agent::Agent;
use crate::config::ModelParams;
use crate::distribution::percentile_sorted;

/// Compute bracket thresholds for a set of wealth values.
///
/// Returns `None` for an empty distribution. The result always satisfies
/// `lower <= upper`.
pub fn thresholds(wealths: &[f64], params: &ModelParams) -> Option<Brackets> {
    let mut sorted = wealths.to_vec();
    sorted.sort_by(f64::total_cmp);
    let lower = percentile_sorted(&sorted, params.lower_bracket_percentile)?;
    let upper = percentile_sorted(&sorted, params.upper_bracket_percentile)?;
    Some(Brackets::new(lower, upper))
}

/// Compute bracket thresholds for a population.
pub fn population_thresholds(agents: &[Agent], params: &ModelParams) -> Option<Brackets> {
    let wealths: Vec<f64> = agents.iter().map(Agent::wealth).collect();
    thresholds(&wealths, params)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use inequality_types::Bracket;

    use super::*;

    #[test]
    fn thresholds_follow_percentiles() {
        let wealths: Vec<f64> = (0..=100).map(f64::from).collect();
        let b = thresholds(&wealths, &ModelParams::default()).unwrap();
        assert!((b.lower - 33.0).abs() < 1e-9);
        assert!((b.upper - 67.0).abs() < 1e-9);
        assert_eq!(b.classify(10.0), Bracket::Lower);
        assert_eq!(b.classify(50.0), Bracket::Middle);
        assert_eq!(b.classify(90.0), Bracket::Upper);
    }

    #[test]
    fn thresholds_are_monotone_for_any_distribution() {
        let samples: [&[f64]; 4] = [
            &[1.0],
            &[5.0, 5.0, 5.0],
            &[0.0, 1000.0],
            &[3.2, 0.1, 9.9, 4.4, 4.4, 0.0],
        ];
        for wealths in samples {
            let b = thresholds(wealths, &ModelParams::default()).unwrap();
            assert!(b.lower <= b.upper);
        }
    }

    #[test]
    fn outlier_does_not_collapse_brackets() {
        let mut wealths = vec![1.0; 99];
        wealths.push(1_000_000.0);
        let b = thresholds(&wealths, &ModelParams::default()).unwrap();
        assert!(b.upper < 2.0);
    }

    #[test]
    fn empty_distribution_has_no_thresholds() {
        assert!(thresholds(&[], &ModelParams::default()).is_none());
    }
}
