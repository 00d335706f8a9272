//! Population-level metrics.
//!
//! Pure functions over a population: no state, no randomness. Degenerate
//! inputs (no agents, no wealth) produce a defined fallback instead of an
//! error so that metric recording can never abort a step.

use inequality_agents::{Agent, ModelParams};
use inequality_types::{Bracket, ChurnReport, MetricsPoint};

/// Gini coefficient of a set of wealth values, in `[0, 1]`.
///
/// Sorts absolute wealth ascending as `x_0..x_{N-1}` and returns
/// `1 + 1/N - 2B` with `B = sum(x_i * (N - i)) / (N * sum(x))`. An empty
/// set or zero total wealth yields 0.
pub fn gini_of(wealths: &[f64]) -> f64 {
    let n = wealths.len();
    if n == 0 {
        return 0.0;
    }
    let mut sorted: Vec<f64> = wealths.iter().map(|w| w.abs()).collect();
    sorted.sort_by(f64::total_cmp);

    let sum: f64 = sorted.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return 0.0;
    }

    let n_f = n as f64;
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| x * n.saturating_sub(i) as f64)
        .sum();
    let b = weighted / (n_f * sum);
    2.0_f64.mul_add(-b, 1.0 + n_f.recip()).clamp(0.0, 1.0)
}

/// Gini coefficient of a population's wealth.
pub fn gini(agents: &[Agent]) -> f64 {
    let wealths: Vec<f64> = agents.iter().map(Agent::wealth).collect();
    gini_of(&wealths)
}

/// Sum of all wealth.
pub fn total_wealth(agents: &[Agent]) -> f64 {
    agents.iter().map(Agent::wealth).sum()
}

/// Mean mobility score; 0 for an empty population.
pub fn mean_mobility(agents: &[Agent]) -> f64 {
    if agents.is_empty() {
        return 0.0;
    }
    agents.iter().map(Agent::mobility).sum::<f64>() / agents.len() as f64
}

/// The metrics recorded for `step`.
pub fn metrics_point(step: u64, agents: &[Agent]) -> MetricsPoint {
    MetricsPoint {
        step,
        gini: gini(agents),
        total: total_wealth(agents),
        mobility: mean_mobility(agents),
    }
}

/// Inflation-indexed cost of living.
///
/// The `quantile` point of an exponential distribution whose scale is the
/// mean wealth: `-mean * ln(1 - quantile)`. Zero while mean wealth is at or
/// below 1.
pub fn survival_cost(agents: &[Agent], params: &ModelParams) -> f64 {
    if agents.is_empty() {
        return 0.0;
    }
    let mean = total_wealth(agents) / agents.len() as f64;
    if mean <= 1.0 {
        return 0.0;
    }
    let quantile = params.survival_quantile.clamp(0.0, 1.0);
    (-mean * (-quantile).ln_1p()).max(0.0)
}

/// Class movement on the last step and current class sizes.
pub fn churn(agents: &[Agent]) -> ChurnReport {
    let mut report = ChurnReport::default();
    for agent in agents {
        let (now, before) = (agent.bracket(), agent.previous_bracket());
        if now > before {
            report.moving_up = report.moving_up.saturating_add(1);
        } else if now < before {
            report.moving_down = report.moving_down.saturating_add(1);
        }
        match now {
            Bracket::Lower => report.lower = report.lower.saturating_add(1),
            Bracket::Middle => report.middle = report.middle.saturating_add(1),
            Bracket::Upper => report.upper = report.upper.saturating_add(1),
        }
    }
    report
}

/// Format an amount with a scale word: "12 Thousand", "3 Million".
///
/// Amounts below one thousand are printed with two decimals.
#[allow(clippy::cast_possible_truncation)]
pub fn wealth_in_words(amount: f64) -> String {
    const SCALES: [(f64, &str); 4] = [
        (1e12, "Trillion"),
        (1e9, "Billion"),
        (1e6, "Million"),
        (1e3, "Thousand"),
    ];
    for (threshold, word) in SCALES {
        if amount >= threshold {
            return format!("{} {word}", (amount / threshold).trunc() as i64);
        }
    }
    format!("{amount:.2}")
}
