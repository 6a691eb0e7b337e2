//! Synthetic employee roster generation.
//!
//! This crate produces a reproducible roster of fictitious employees spread
//! over a table of organizational units. Each business block has a global
//! headcount target that is distributed in three ordered phases: explicit
//! fixed counts, a minimum-coverage guarantee for every remaining unit, and a
//! uniform random fill. Employee numbers and full names are unique within a
//! run, and every unit additionally receives one gray-zone sentinel record.
//!
//! # Overview
//!
//! The crate supports:
//!
//! - Loading and validating a JSON roster configuration
//! - Loading an organizational-unit table with normalized identifiers
//! - Seeded, deterministic roster generation over an injected RNG
//! - Post-generation invariant checks
//! - Sorted JSON reports written atomically
//!
//! # Example
//!
//! ```
//! use synthetic_roster::{OrgUnitTable, RosterConfig, RosterSummary, generate_roster_with_seed};
//!
//! let config = RosterConfig::from_json(r#"{
//!     "version": 1,
//!     "businessBlocks": [
//!         {"code": "KM", "name": "KM KKSB", "targetCount": 4, "maleProbability": 0.7},
//!         {"code": "MNS", "name": "MNS", "targetCount": 2, "maleProbability": 0.2}
//!     ],
//!     "identifier": {"minSignificantDigits": 6, "maxSignificantDigits": 8, "totalWidth": 8},
//!     "grayZone": {"tabNumberOptions": ["00000000"], "nameOptions": ["Gray Zone"]},
//!     "names": {
//!         "male": {"firstNames": ["Ivan", "Oleg"], "surnames": ["Petrov", "Ivanov"], "patronymics": ["Ilyich"]},
//!         "female": {"firstNames": ["Anna", "Olga"], "surnames": ["Petrova", "Ivanova"], "patronymics": ["Ilyinichna"]}
//!     }
//! }"#).expect("valid configuration");
//! let table = OrgUnitTable::from_json(r#"[
//!     {"id": 1, "topLevelCode": "38", "topLevelFullName": "Central bank", "topLevelShortName": "CB",
//!      "subdivisionCode": "9038", "subdivisionFullName": "Moscow office", "subdivisionShortName": "MO"},
//!     {"id": 2, "topLevelCode": "38", "topLevelFullName": "Central bank", "topLevelShortName": "CB",
//!      "subdivisionCode": "9039", "subdivisionFullName": "Tver office", "subdivisionShortName": "TO"}
//! ]"#).expect("valid units");
//!
//! let roster = generate_roster_with_seed(&config, table.units(), 42).expect("generated");
//! let summary = RosterSummary::from_records(roster.records());
//!
//! assert_eq!(summary.normal_count(), 6);
//! assert_eq!(summary.gray_zone_count(), 2);
//! assert!(summary
//!     .violations(table.units(), config.business_blocks(), config.fixed_distribution())
//!     .is_empty());
//! ```

mod allocation;
mod config;
mod error;
mod generator;
mod gray_zone;
mod identifier;
mod io;
mod names;
mod org_unit;
mod record;
mod report;
pub mod roster_cli;
mod summary;

pub use allocation::{AllocationContext, AllocationEngine};
pub use config::{BusinessBlock, DEFAULT_MINIMUM_PER_UNIT, FixedDistribution, RosterConfig};
pub use error::{CapacityScope, ConfigError, OrgUnitError, ReportError, RosterError, RosterWarning};
pub use generator::{Roster, generate_roster, generate_roster_with_seed};
pub use gray_zone::{GrayZoneInjector, GrayZoneSentinels};
pub use identifier::{DEFAULT_IDENTIFIER_RETRY_LIMIT, IdentifierBounds, IdentifierPool};
pub use names::{
    DEFAULT_NAME_RETRY_LIMIT, Gender, GeneratedName, NameCorpora, NameCorpus, NameGenerator,
};
pub use org_unit::{HierarchyLevel, OrgUnit, OrgUnitId, OrgUnitTable};
pub use record::{RecordSource, RosterRecord};
pub use report::{
    JsonFileSink, ReportRow, ReportSink, RosterReport, seed_name_for_seed, sort_for_presentation,
};
pub use summary::{InvariantViolation, RosterSummary};
