//! Enumeration types for the Inequality simulator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wealth brackets
// ---------------------------------------------------------------------------

/// A coarse wealth class, recomputed for every agent on every step.
///
/// Brackets are ordinal: `Lower < Middle < Upper`. The numeric
/// [`position`](Self::position) is what mobility scoring works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bracket {
    /// Wealth below the lower threshold.
    Lower,
    /// Wealth between the two thresholds.
    Middle,
    /// Wealth at or above the upper threshold.
    Upper,
}

impl Bracket {
    /// All brackets in ascending order.
    pub const ALL: [Self; 3] = [Self::Lower, Self::Middle, Self::Upper];

    /// Ordinal position used for mobility: Lower = 0, Middle = 1, Upper = 2.
    pub const fn position(self) -> u8 {
        match self {
            Self::Lower => 0,
            Self::Middle => 1,
            Self::Upper => 2,
        }
    }

    /// Human-readable class name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lower => "Lower",
            Self::Middle => "Middle",
            Self::Upper => "Upper",
        }
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Policy tags
// ---------------------------------------------------------------------------

/// The base policy regime governing a simulation.
///
/// Each variant maps to one policy mechanism in `inequality-agents`. The
/// patron add-on is not a variant here: it is layered on top of any base
/// policy by a separate flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Plain econophysics exchange: growth, survival cost, thrive payment.
    Baseline,
    /// Non-elite agents pay a party tax to a random elite before exchanging.
    Fascism,
    /// All wealth is divided equally at the start of every step.
    Communism,
    /// Agents above the start-up capital threshold innovate.
    Capitalism,
}

impl PolicyKind {
    /// The fixed policy set run side by side in comparison mode, in the
    /// order the orchestrator advances them.
    pub const COMPARISON: [Self; 4] = [
        Self::Baseline,
        Self::Fascism,
        Self::Communism,
        Self::Capitalism,
    ];

    /// Descriptive tag shown to users and used as the comparison key.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Baseline => "econophysics",
            Self::Fascism => "powerful leaders",
            Self::Communism => "equal wealth distribution",
            Self::Capitalism => "innovation",
        }
    }

    /// Short mechanism name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Fascism => "fascism",
            Self::Communism => "communism",
            Self::Capitalism => "capitalism",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A policy tag did not name any known policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown policy tag: {0:?}")]
pub struct ParsePolicyError(pub String);

impl FromStr for PolicyKind {
    type Err = ParsePolicyError;

    /// Accepts both the descriptive label and the mechanism name,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        match tag.as_str() {
            "econophysics" | "baseline" => Ok(Self::Baseline),
            "powerful leaders" | "fascism" => Ok(Self::Fascism),
            "equal wealth distribution" | "communism" => Ok(Self::Communism),
            "innovation" | "capitalism" => Ok(Self::Capitalism),
            _ => Err(ParsePolicyError(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Start-up aggressiveness
// ---------------------------------------------------------------------------

/// How much capital an agent needs before it can start innovating.
///
/// Selects which wealth-histogram bin supplies the capital threshold under
/// the capitalism policy. Configured as the integers 1, 2 and 3.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum StartUpAggressiveness {
    /// Threshold from the lowest non-empty bin (easy to start a business).
    #[default]
    Lowest,
    /// Threshold from the middle bin.
    Median,
    /// Threshold from the highest bin (only the richest can start).
    Highest,
}

/// An aggressiveness level outside `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("start-up aggressiveness must be 1, 2 or 3 (got {0})")]
pub struct ParseAggressivenessError(pub u8);

impl TryFrom<u8> for StartUpAggressiveness {
    type Error = ParseAggressivenessError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Lowest),
            2 => Ok(Self::Median),
            3 => Ok(Self::Highest),
            other => Err(ParseAggressivenessError(other)),
        }
    }
}

impl From<StartUpAggressiveness> for u8 {
    fn from(value: StartUpAggressiveness) -> Self {
        match value {
            StartUpAggressiveness::Lowest => 1,
            StartUpAggressiveness::Median => 2,
            StartUpAggressiveness::Highest => 3,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bracket_positions_are_ordinal() {
        assert_eq!(Bracket::Lower.position(), 0);
        assert_eq!(Bracket::Middle.position(), 1);
        assert_eq!(Bracket::Upper.position(), 2);
        assert!(Bracket::Lower < Bracket::Upper);
    }

    #[test]
    fn policy_parses_labels_and_names() {
        assert_eq!("econophysics".parse::<PolicyKind>().unwrap(), PolicyKind::Baseline);
        assert_eq!("Powerful Leaders".parse::<PolicyKind>().unwrap(), PolicyKind::Fascism);
        assert_eq!(
            " equal wealth distribution ".parse::<PolicyKind>().unwrap(),
            PolicyKind::Communism
        );
        assert_eq!("capitalism".parse::<PolicyKind>().unwrap(), PolicyKind::Capitalism);
    }

    #[test]
    fn policy_rejects_unknown_tag() {
        let err = "feudalism".parse::<PolicyKind>().unwrap_err();
        assert_eq!(err, ParsePolicyError("feudalism".to_owned()));
    }

    #[test]
    fn policy_label_round_trips() {
        for kind in PolicyKind::COMPARISON {
            assert_eq!(kind.label().parse::<PolicyKind>().unwrap(), kind);
            assert_eq!(kind.name().parse::<PolicyKind>().unwrap(), kind);
        }
    }

    #[test]
    fn aggressiveness_accepts_one_to_three() {
        assert_eq!(StartUpAggressiveness::try_from(1).unwrap(), StartUpAggressiveness::Lowest);
        assert_eq!(StartUpAggressiveness::try_from(2).unwrap(), StartUpAggressiveness::Median);
        assert_eq!(StartUpAggressiveness::try_from(3).unwrap(), StartUpAggressiveness::Highest);
        assert_eq!(StartUpAggressiveness::try_from(0), Err(ParseAggressivenessError(0)));
        assert_eq!(StartUpAggressiveness::try_from(4), Err(ParseAggressivenessError(4)));
    }

    #[test]
    fn aggressiveness_deserializes_from_integer() {
        let level: StartUpAggressiveness = serde_json::from_str("2").unwrap();
        assert_eq!(level, StartUpAggressiveness::Median);
        assert!(serde_json::from_str::<StartUpAggressiveness>("7").is_err());
    }
}
