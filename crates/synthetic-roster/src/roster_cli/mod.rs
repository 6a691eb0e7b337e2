//! CLI support for generating a roster report.
//!
//! The binary loads [`RosterSettings`] and delegates to [`run`], keeping the
//! whole flow testable without spawning a subprocess.

mod error;
mod logging;
mod settings;

use std::path::PathBuf;

use rand::Rng;
use tracing::{info, warn};

pub use error::CliError;
pub use logging::{LOG_DIR_ENV, LOG_LEVEL_ENV, LogFiles, init_tracing};
pub use settings::{RosterSettings, default_config_path, default_org_units_path};

use crate::config::RosterConfig;
use crate::generator::generate_roster_with_seed;
use crate::org_unit::OrgUnitTable;
use crate::report::{JsonFileSink, ReportSink, RosterReport};
use crate::summary::RosterSummary;

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Seed the roster was generated from.
    pub seed: u64,
    /// Word encoding of the seed.
    pub seed_name: String,
    /// Rows written, gray zone included.
    pub record_count: usize,
    /// Gray-zone rows written.
    pub gray_zone_count: usize,
    /// Warnings raised during generation.
    pub warning_count: usize,
    /// Invariant violations tolerated because of `allow_violations`.
    pub violation_count: usize,
    /// Where the report was written.
    pub output_path: PathBuf,
}

/// Loads the inputs, generates a roster, verifies it and writes the report.
///
/// # Errors
///
/// Returns [`CliError`] when an input fails to load, generation aborts,
/// invariant checks fail without `allow_violations`, or the report cannot be
/// written.
pub fn run(settings: &RosterSettings) -> Result<RunOutcome, CliError> {
    let config = RosterConfig::from_file(&settings.config_path())?;
    let table = OrgUnitTable::from_file(&settings.org_units_path())?;
    let seed = settings.seed.unwrap_or_else(random_seed);
    info!(
        seed,
        unit_count = table.units().len(),
        block_count = config.business_blocks().len(),
        "generating roster"
    );

    let roster = generate_roster_with_seed(&config, table.units(), seed)?;

    let summary = RosterSummary::from_records(roster.records());
    let violations = summary.violations(
        table.units(),
        config.business_blocks(),
        config.fixed_distribution(),
    );
    for violation in &violations {
        warn!(violation = %violation, "roster invariant violated");
    }
    if let Some(first) = violations.first()
        && !settings.allow_violations
    {
        return Err(CliError::InvariantViolations {
            count: violations.len(),
            first: first.to_string(),
        });
    }

    let report = RosterReport::new(&roster, seed)?;
    let output_path = settings.output_path();
    JsonFileSink::new(&output_path).write_report(&report)?;

    Ok(RunOutcome {
        seed,
        seed_name: report.seed_name,
        record_count: report.record_count,
        gray_zone_count: report.gray_zone_count,
        warning_count: roster.warnings().len(),
        violation_count: violations.len(),
        output_path,
    })
}

/// Formats the success message emitted by the CLI.
///
/// # Example
///
/// ```
/// use synthetic_roster::roster_cli::{RunOutcome, success_message};
/// use std::path::PathBuf;
///
/// let outcome = RunOutcome {
///     seed: 2026,
///     seed_name: "mossy-owl".to_owned(),
///     record_count: 12,
///     gray_zone_count: 3,
///     warning_count: 0,
///     violation_count: 0,
///     output_path: PathBuf::from("roster.json"),
/// };
///
/// assert!(success_message(&outcome).contains("mossy-owl"));
/// ```
#[must_use]
pub fn success_message(outcome: &RunOutcome) -> String {
    format!(
        "Wrote {} records ({} gray zone, {} warnings) for seed \"{}\" (seed={}) to {}",
        outcome.record_count,
        outcome.gray_zone_count,
        outcome.warning_count,
        outcome.seed_name,
        outcome.seed,
        outcome.output_path.display()
    )
}

fn random_seed() -> u64 {
    rand::rng().random()
}
