//! Engine binary for the Inequality simulator.
//!
//! Loads configuration, builds either a single-policy simulation or the
//! four-policy comparison, runs it for the configured number of steps and
//! optionally writes a JSON report.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `inequality-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the simulation or comparison
//! 4. Run the bounded step loop
//! 5. Log the result
//! 6. Write the report, if an output path is configured

mod error;
mod progress_callback;

use std::path::Path;

use inequality_core::config::LoggingConfig;
use inequality_core::{
    ComparisonOrchestrator, ComparisonReport, InequalityConfig, Simulation, SimulationReport,
    log_run_end, run_with_callback, write_report,
};
use inequality_types::Bracket;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress_callback::ProgressCallback;

/// Steps between `info`-level progress lines.
const PROGRESS_INTERVAL: u64 = 10;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, construction or report output fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("inequality-engine starting");
    info!(
        policy = config.simulation.policy,
        population = config.simulation.population,
        start_up_required = config.simulation.start_up_required,
        patron_enabled = config.simulation.patron_enabled,
        seed = config.simulation.seed,
        steps = config.simulation.steps,
        comparison = config.comparison.enabled,
        "Configuration loaded"
    );

    // 3-6. Build, run, report.
    if config.comparison.enabled {
        run_comparison(&config)?;
    } else {
        run_single(&config)?;
    }

    info!("inequality-engine shutdown complete");
    Ok(())
}

fn run_single(config: &InequalityConfig) -> Result<(), EngineError> {
    let options = config.simulation_options()?;
    let mut sim = Simulation::from_options(&options)?;

    let steps = config.simulation.steps;
    let mut callback = ProgressCallback::new(PROGRESS_INTERVAL, steps);
    let result = run_with_callback(&mut sim, steps, &mut callback);
    log_run_end(&result);

    let churn = sim.churn();
    info!(
        policy = %sim.policy(),
        upper_pct = churn.share(Bracket::Upper),
        middle_pct = churn.share(Bracket::Middle),
        lower_pct = churn.share(Bracket::Lower),
        moving_up_pct = churn.moving_up_share(),
        moving_down_pct = churn.moving_down_share(),
        "Class churn"
    );

    if let Some(path) = &config.output.report_path {
        write_report(&SimulationReport::from_simulation(&sim), path)?;
        info!(path = %path.display(), "Report written");
    }
    Ok(())
}

fn run_comparison(config: &InequalityConfig) -> Result<(), EngineError> {
    let options = config.simulation_options()?;
    let mut cmp = ComparisonOrchestrator::from_options(&options)?;

    let steps = config.simulation.steps;
    let mut callback = ProgressCallback::new(PROGRESS_INTERVAL, steps);
    let result = run_with_callback(&mut cmp, steps, &mut callback);
    log_run_end(&result);

    if let Some(path) = &config.output.report_path {
        write_report(&ComparisonReport::from_orchestrator(&cmp), path)?;
        info!(path = %path.display(), "Report written");
    }
    Ok(())
}

/// Initialize the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load configuration from `inequality-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
fn load_config() -> Result<InequalityConfig, EngineError> {
    let config_path = Path::new("inequality-config.yaml");
    if config_path.exists() {
        let config = InequalityConfig::from_file(config_path)?;
        Ok(config)
    } else {
        InequalityConfig::parse("").map_err(EngineError::from)
    }
}
