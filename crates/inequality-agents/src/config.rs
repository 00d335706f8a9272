//! Tunable model parameters for agents and policy mechanisms.
//!
//! The [`ModelParams`] struct bundles every hyper-parameter of the wealth
//! model so that callers (the simulation engine, tests, configuration files)
//! can override defaults. Defaults reproduce the reference model.

use serde::Deserialize;

use crate::error::AgentError;

/// Hyper-parameters for population creation and policy mechanisms.
///
/// Every field has a serde default, so a partial YAML `model:` section only
/// overrides what it names.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Wealth every agent starts with (default: 1).
    pub initial_wealth: f64,

    /// Mean of the normal payoff-rate distribution (default: 0.2).
    pub payoff_mean: f64,

    /// Standard deviation of the payoff-rate distribution
    /// (default: 0.05 * sqrt(2)).
    pub payoff_sigma: f64,

    /// Percentile of initial payoff rates at or above which an agent is
    /// party elite (default: 95).
    pub elite_percentile: f64,

    /// Shape of the Pareto (Lomax) innovation distribution (default: 2.5).
    pub innovation_shape: f64,

    /// Smallest innovation factor after clipping (default: 1).
    pub innovation_min: f64,

    /// Largest innovation factor after clipping (default: 3).
    pub innovation_max: f64,

    /// Multiplier applied to an active innovation factor each step
    /// (default: 0.5).
    pub innovation_decay: f64,

    /// Lowest start-up capital threshold under capitalism (default: 1.5).
    pub capital_floor: f64,

    /// Fraction of wealth a non-elite agent pays to an elite under fascism
    /// (default: 0.2).
    pub party_tax: f64,

    /// Fraction of the population acting as patrons (default: 0.2).
    pub patron_share: f64,

    /// Fraction of the non-patron pool forming a patron's network
    /// (default: 0.3).
    pub patron_network_share: f64,

    /// Fraction of its wealth a patron gives to one client (default: 0.1).
    pub patron_gift: f64,

    /// Quantile of the exponential wealth fit used as survival cost
    /// (default: 0.1).
    pub survival_quantile: f64,

    /// Wealth an agent is reset to after failing to pay survival cost
    /// (default: 1).
    pub subsistence_floor: f64,

    /// Lower bracket percentile (default: 33).
    pub lower_bracket_percentile: f64,

    /// Upper bracket percentile (default: 67).
    pub upper_bracket_percentile: f64,

    /// Number of most recent brackets kept for mobility (default: 20).
    pub mobility_window: usize,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            initial_wealth: 1.0,
            payoff_mean: 0.2,
            payoff_sigma: 0.05 * std::f64::consts::SQRT_2,
            elite_percentile: 95.0,
            innovation_shape: 2.5,
            innovation_min: 1.0,
            innovation_max: 3.0,
            innovation_decay: 0.5,
            capital_floor: 1.5,
            party_tax: 0.2,
            patron_share: 0.2,
            patron_network_share: 0.3,
            patron_gift: 0.1,
            survival_quantile: 0.1,
            subsistence_floor: 1.0,
            lower_bracket_percentile: 33.0,
            upper_bracket_percentile: 67.0,
            mobility_window: 20,
        }
    }
}

impl ModelParams {
    /// Check that every parameter is finite and inside its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidParameter`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), AgentError> {
        let fractions = [
            ("party_tax", self.party_tax),
            ("patron_share", self.patron_share),
            ("patron_network_share", self.patron_network_share),
            ("patron_gift", self.patron_gift),
            ("innovation_decay", self.innovation_decay),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(AgentError::InvalidParameter { name, value });
            }
        }

        let non_negative = [
            ("initial_wealth", self.initial_wealth),
            ("payoff_sigma", self.payoff_sigma),
            ("capital_floor", self.capital_floor),
            ("subsistence_floor", self.subsistence_floor),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(AgentError::InvalidParameter { name, value });
            }
        }

        let percentiles = [
            ("elite_percentile", self.elite_percentile),
            ("lower_bracket_percentile", self.lower_bracket_percentile),
            ("upper_bracket_percentile", self.upper_bracket_percentile),
        ];
        for (name, value) in percentiles {
            if !(0.0..=100.0).contains(&value) {
                return Err(AgentError::InvalidParameter { name, value });
            }
        }

        if !self.payoff_mean.is_finite() {
            return Err(AgentError::InvalidParameter {
                name: "payoff_mean",
                value: self.payoff_mean,
            });
        }
        if !(self.survival_quantile > 0.0 && self.survival_quantile < 1.0) {
            return Err(AgentError::InvalidParameter {
                name: "survival_quantile",
                value: self.survival_quantile,
            });
        }
        if !(self.innovation_shape.is_finite() && self.innovation_shape > 0.0) {
            return Err(AgentError::InvalidParameter {
                name: "innovation_shape",
                value: self.innovation_shape,
            });
        }
        if !(self.innovation_min.is_finite() && self.innovation_min <= self.innovation_max) {
            return Err(AgentError::InvalidParameter {
                name: "innovation_min",
                value: self.innovation_min,
            });
        }
        if self.mobility_window < 2 {
            return Err(AgentError::InvalidParameter {
                name: "mobility_window",
                value: self.mobility_window as f64,
            });
        }
        Ok(())
    }
}
