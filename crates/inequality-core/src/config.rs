//! Configuration loading and typed config structures for the Inequality
//! simulator.
//!
//! The canonical configuration lives in `inequality-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads the file and applies
//! environment overrides. Every field has a default, so an empty file is a
//! valid configuration.

use std::path::{Path, PathBuf};

use inequality_agents::ModelParams;
use inequality_types::{PolicyKind, StartUpAggressiveness};
use serde::Deserialize;
use tracing::warn;

use crate::simulation::{SimulationError, SimulationOptions};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `inequality-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InequalityConfig {
    /// Run parameters for a single simulation (and shared by comparisons).
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Comparison mode toggle.
    #[serde(default)]
    pub comparison: ComparisonConfig,

    /// Model hyper-parameters.
    #[serde(default)]
    pub model: ModelParams,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Report output.
    #[serde(default)]
    pub output: OutputConfig,
}

impl InequalityConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `INEQUALITY_SEED` overrides `simulation.seed`
    /// - `INEQUALITY_POPULATION` overrides `simulation.population`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_yaml(yaml)?;
        config.simulation.apply_env_overrides();
        Ok(config)
    }

    fn parse_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Resolve the run parameters into simulation options.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfiguration`] for an unknown
    /// policy tag or an aggressiveness outside `1..=3`.
    pub fn simulation_options(&self) -> Result<SimulationOptions, SimulationError> {
        Ok(SimulationOptions {
            policy: self.simulation.policy.parse::<PolicyKind>()?,
            population: self.simulation.population,
            aggressiveness: StartUpAggressiveness::try_from(self.simulation.start_up_required)?,
            patron_enabled: self.simulation.patron_enabled,
            seed: self.simulation.seed,
            params: self.model,
        })
    }
}

/// Run parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Policy tag: a descriptive label or a mechanism name.
    #[serde(default = "default_policy")]
    pub policy: String,

    /// Number of agents.
    #[serde(default = "default_population")]
    pub population: usize,

    /// Start-up capital bin under capitalism (1, 2 or 3).
    #[serde(default = "default_start_up_required")]
    pub start_up_required: u8,

    /// Whether the patron add-on runs every step.
    #[serde(default)]
    pub patron_enabled: bool,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of steps the engine runs.
    #[serde(default = "default_steps")]
    pub steps: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            population: default_population(),
            start_up_required: default_start_up_required(),
            patron_enabled: false,
            seed: default_seed(),
            steps: default_steps(),
        }
    }
}

impl SimulationConfig {
    /// Apply `INEQUALITY_SEED` and `INEQUALITY_POPULATION` if set.
    ///
    /// Values that do not parse are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides read through `lookup`, keyed by variable name.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("INEQUALITY_SEED") {
            match val.trim().parse() {
                Ok(seed) => self.seed = seed,
                Err(e) => warn!(value = %val, error = %e, "Ignoring INEQUALITY_SEED"),
            }
        }
        if let Some(val) = lookup("INEQUALITY_POPULATION") {
            match val.trim().parse() {
                Ok(population) => self.population = population,
                Err(e) => warn!(value = %val, error = %e, "Ignoring INEQUALITY_POPULATION"),
            }
        }
    }
}

/// Comparison mode configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ComparisonConfig {
    /// Run all four policies side by side instead of a single simulation.
    #[serde(default)]
    pub enabled: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Where to write the final JSON report, if anywhere.
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_policy() -> String {
    PolicyKind::Baseline.label().to_owned()
}

const fn default_population() -> usize {
    200
}

const fn default_start_up_required() -> u8 {
    1
}

const fn default_seed() -> u64 {
    42
}

const fn default_steps() -> u64 {
    50
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = InequalityConfig::default();
        assert_eq!(config.simulation.population, 200);
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.simulation.steps, 50);
        assert_eq!(config.simulation.policy, "econophysics");
        assert!(!config.comparison.enabled);
        assert_eq!(config.logging.level, "info");
        assert!(config.output.report_path.is_none());
        assert!(config.simulation_options().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
simulation:
  policy: "innovation"
  population: 120
  start_up_required: 3
  patron_enabled: true
  seed: 9
  steps: 75

comparison:
  enabled: true

model:
  party_tax: 0.25
  mobility_window: 10

logging:
  level: "debug"
  json: true

output:
  report_path: "out/report.json"
"#;
        let config = InequalityConfig::parse_yaml(yaml).unwrap();
        assert_eq!(config.simulation.policy, "innovation");
        assert_eq!(config.simulation.population, 120);
        assert_eq!(config.simulation.start_up_required, 3);
        assert!(config.simulation.patron_enabled);
        assert_eq!(config.simulation.steps, 75);
        assert!(config.comparison.enabled);
        assert!((config.model.party_tax - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.model.mobility_window, 10);
        assert!((config.model.patron_gift - 0.1).abs() < f64::EPSILON);
        assert!(config.logging.json);
        assert_eq!(
            config.output.report_path,
            Some(PathBuf::from("out/report.json"))
        );

        let options = config.simulation_options().unwrap();
        assert_eq!(options.policy, PolicyKind::Capitalism);
        assert_eq!(options.aggressiveness, StartUpAggressiveness::Highest);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "simulation:\n  seed: 7\n";
        let config = InequalityConfig::parse_yaml(yaml).unwrap();
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.population, 200);
        assert_eq!(config.model, ModelParams::default());
    }

    fn lookup_from(
        vars: &'static [(&'static str, &'static str)],
    ) -> impl Fn(&str) -> Option<String> {
        move |key: &str| {
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_owned())
        }
    }

    #[test]
    fn env_overrides_replace_seed_and_population() {
        let mut sim = SimulationConfig::default();
        sim.apply_overrides(lookup_from(&[
            ("INEQUALITY_SEED", " 1234 "),
            ("INEQUALITY_POPULATION", "80"),
        ]));
        assert_eq!(sim.seed, 1234);
        assert_eq!(sim.population, 80);
        assert_eq!(sim.steps, 50);
    }

    #[test]
    fn unparsable_env_overrides_are_ignored() {
        let mut sim = SimulationConfig::default();
        sim.apply_overrides(lookup_from(&[
            ("INEQUALITY_SEED", "not-a-seed"),
            ("INEQUALITY_POPULATION", "-3"),
        ]));
        assert_eq!(sim.seed, 42);
        assert_eq!(sim.population, 200);
    }

    #[test]
    fn missing_env_overrides_change_nothing() {
        let mut sim = SimulationConfig::default();
        sim.apply_overrides(|_| None);
        assert_eq!(sim, SimulationConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(InequalityConfig::parse_yaml("").is_ok());
    }

    #[test]
    fn unknown_policy_is_a_configuration_error() {
        let config = InequalityConfig::parse_yaml("simulation:\n  policy: anarchy\n").unwrap();
        assert!(config.simulation_options().is_err());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("inequality-config.yaml");
        if path.exists() {
            let config = InequalityConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
