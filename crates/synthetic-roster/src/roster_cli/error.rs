//! Error types for the roster generation CLI.

use thiserror::Error;

use crate::error::{ConfigError, OrgUnitError, ReportError, RosterError};

/// Errors surfaced by the CLI run flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    /// Settings could not be loaded from flags or environment.
    #[error("invalid settings: {message}")]
    SettingsError {
        /// Loader error message.
        message: String,
    },
    /// The roster configuration failed to load.
    #[error("configuration error: {source}")]
    ConfigError {
        /// Underlying configuration error.
        #[from]
        #[source]
        source: ConfigError,
    },
    /// The organizational-unit table failed to load.
    #[error("organizational unit error: {source}")]
    OrgUnitError {
        /// Underlying unit table error.
        #[from]
        #[source]
        source: OrgUnitError,
    },
    /// Roster generation aborted.
    #[error("generation error: {source}")]
    GenerationError {
        /// Underlying engine error.
        #[from]
        #[source]
        source: RosterError,
    },
    /// The generated roster failed its invariant checks.
    #[error("generated roster failed {count} invariant checks; first: {first}")]
    InvariantViolations {
        /// Number of violations found.
        count: usize,
        /// Description of the first violation.
        first: String,
    },
    /// The report could not be written.
    #[error("report error: {source}")]
    ReportError {
        /// Underlying report error.
        #[from]
        #[source]
        source: ReportError,
    },
}
