//! Error types for the synthetic-roster crate.
//!
//! This module defines semantic error enums for configuration loading,
//! organizational-unit loading and roster generation, following the
//! project's error handling conventions with `thiserror`. Non-fatal
//! conditions raised during a run are modelled separately as
//! [`RosterWarning`] so callers can surface them without aborting.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::org_unit::OrgUnitId;

/// Errors that can occur when loading or validating a roster configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file at '{path}': {message}")]
    IoError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The configuration JSON is malformed or missing required fields.
    #[error("invalid configuration JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The configuration version is not supported.
    #[error("unsupported configuration version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Expected version number.
        expected: u32,
        /// Actual version found in the configuration.
        actual: u32,
    },

    /// The configuration declares no business blocks.
    #[error("configuration contains no business blocks")]
    NoBusinessBlocks,

    /// A business block code is empty or whitespace-only.
    #[error("business block at index {index} has a blank code")]
    BlankBusinessBlockCode {
        /// Index of the block in the configuration array.
        index: usize,
    },

    /// Two business blocks share the same code.
    #[error("business block code '{code}' is declared more than once")]
    DuplicateBusinessBlock {
        /// The repeated block code.
        code: String,
    },

    /// A male-selection probability is outside `[0, 1]` or not finite.
    #[error("business block '{code}' has invalid male probability {value}")]
    InvalidMaleProbability {
        /// Code of the offending block.
        code: String,
        /// The rejected probability, rendered as text.
        value: String,
    },

    /// The identifier digit bounds are inconsistent.
    #[error(
        "invalid identifier bounds: min digits {min}, max digits {max}, width {width} ({reason})"
    )]
    InvalidIdentifierBounds {
        /// Minimum number of significant digits.
        min: u32,
        /// Maximum number of significant digits.
        max: u32,
        /// Zero-padded output width.
        width: usize,
        /// Which constraint was violated.
        reason: &'static str,
    },

    /// A fixed-distribution entry names a block that is not configured.
    #[error("fixed distribution for unit '{unit}' references unknown business block '{code}'")]
    UnknownBusinessBlock {
        /// Unit the entry belongs to.
        unit: OrgUnitId,
        /// The unknown block code.
        code: String,
    },

    /// A gray-zone sentinel set has no options.
    #[error("gray zone sentinel set '{set}' is empty")]
    EmptySentinelSet {
        /// Name of the empty sentinel set.
        set: &'static str,
    },

    /// A name corpus list has no entries.
    #[error("{gender} name corpus has no {part}")]
    EmptyNameCorpus {
        /// Gender whose corpus is incomplete.
        gender: &'static str,
        /// Which list is empty.
        part: &'static str,
    },

    /// A retry limit was configured as zero.
    #[error("{setting} must be greater than zero")]
    ZeroRetryLimit {
        /// Name of the offending setting.
        setting: &'static str,
    },
}

/// Errors that can occur while loading the organizational-unit table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrgUnitError {
    /// The unit table could not be read.
    #[error("failed to read organizational units at '{path}': {message}")]
    IoError {
        /// Path to the unit table.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The unit table JSON is malformed.
    #[error("invalid organizational unit JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// A record lacks a required hierarchy field.
    #[error("organizational unit record {index} is missing required column '{column}'")]
    MissingRequiredColumn {
        /// Index of the record in the table.
        index: usize,
        /// Name of the missing column.
        column: &'static str,
    },

    /// A record carries a blank or unusable value for a required field.
    #[error("organizational unit record {index} has invalid '{column}': {reason}")]
    InvalidOrgUnitRecord {
        /// Index of the record in the table.
        index: usize,
        /// Name of the offending column.
        column: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Which quota a capacity check was evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapacityScope {
    /// Sum of remaining headcount across all blocks.
    AllBlocks,
    /// Remaining headcount of a single block.
    Block(String),
}

impl fmt::Display for CapacityScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllBlocks => f.write_str("all business blocks"),
            Self::Block(code) => write!(f, "business block '{code}'"),
        }
    }
}

/// Fatal errors raised by the allocation engine and gray-zone injector.
///
/// Any of these aborts the whole run; no partial roster is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    /// The engine was given no business blocks.
    #[error("no business blocks supplied for allocation")]
    NoBusinessBlocks,

    /// A fixed-distribution entry names a block that is not configured.
    #[error("fixed distribution for unit '{unit}' references unknown business block '{code}'")]
    UnknownBusinessBlock {
        /// Unit the entry belongs to.
        unit: OrgUnitId,
        /// The unknown block code.
        code: String,
    },

    /// Fixed counts for a block exceed its target total.
    #[error("fixed distribution assigns {fixed} users to business block '{code}' but its target is {target}")]
    FixedDistributionExceedsTarget {
        /// Block code.
        code: String,
        /// Sum of fixed counts for known units.
        fixed: usize,
        /// Configured target total.
        target: usize,
    },

    /// The minimum-coverage phase cannot be satisfied from remaining totals.
    #[error("insufficient capacity for {scope}: minimum coverage needs {required} users but only {available} remain")]
    InsufficientCapacity {
        /// Quota the check was evaluated against.
        scope: CapacityScope,
        /// Users needed to cover every eligible unit.
        required: usize,
        /// Headcount remaining after the fixed phase.
        available: usize,
    },

    /// The identifier space cannot hold the requested number of users.
    #[error("identifier space exhausted: {requested} identifiers requested but only {available} available")]
    IdentifierSpaceExhausted {
        /// Number of identifiers requested.
        requested: u64,
        /// Identifiers still available in the configured range.
        available: u64,
    },

    /// Random identifier draws kept colliding past the retry bound.
    #[error("failed to draw an unused identifier after {attempts} attempts ({issued} issued)")]
    IdentifierRetryLimitReached {
        /// Number of draws attempted.
        attempts: usize,
        /// Identifiers issued so far in this run.
        issued: usize,
    },

    /// A gray-zone sentinel set has no options.
    #[error("gray zone sentinel set '{set}' is empty")]
    EmptySentinelSet {
        /// Name of the empty sentinel set.
        set: &'static str,
    },
}

/// Non-fatal conditions recorded during a run.
///
/// Warnings are logged when raised and returned alongside the roster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterWarning {
    /// A fixed-distribution entry names a unit absent from the unit table.
    #[error("fixed distribution references unknown organizational unit '{unit}'; entry skipped")]
    UnknownOrgUnitInFixedDistribution {
        /// The unknown unit identifier.
        unit: OrgUnitId,
    },

    /// A name was made unique only by appending a counter suffix.
    #[error("name '{name}' was uniquified by suffix after {attempts} colliding attempts")]
    NameUniquenessDegraded {
        /// The suffixed name that was issued.
        name: String,
        /// Number of colliding attempts before the suffix was applied.
        attempts: usize,
    },

    /// Headcount was left unassigned because no unit was eligible.
    #[error("{remaining} users of business block '{code}' left unassigned: no eligible units")]
    UnassignedHeadcount {
        /// Block code.
        code: String,
        /// Headcount left over after the random phase.
        remaining: usize,
    },
}

/// Errors that can occur while rendering or writing a report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// The report file could not be written.
    #[error("failed to write report to '{path}': {message}")]
    WriteError {
        /// Target path of the report.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The report could not be serialized.
    #[error("failed to serialize report: {message}")]
    SerializeError {
        /// Description of the serialization error.
        message: String,
    },

    /// The EFF word list for the seed name could not be built.
    #[error("word list error: {message}")]
    WordListError {
        /// Error message describing the failure.
        message: String,
    },
}
