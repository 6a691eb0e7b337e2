//! End-to-end roster generation.
//!
//! Runs the allocation engine and then the gray-zone injector against a
//! single per-run context. The same seed, configuration and unit order
//! always produce the same roster.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::allocation::{AllocationContext, AllocationEngine};
use crate::config::RosterConfig;
use crate::error::{RosterError, RosterWarning};
use crate::gray_zone::GrayZoneInjector;
use crate::org_unit::OrgUnit;
use crate::record::RosterRecord;

/// A generated roster with the warnings raised while producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    records: Vec<RosterRecord>,
    warnings: Vec<RosterWarning>,
}

impl Roster {
    /// All records: normal users in allocation order, then gray-zone rows.
    #[must_use]
    pub fn records(&self) -> &[RosterRecord] {
        &self.records
    }

    /// Non-fatal conditions raised during the run.
    #[must_use]
    pub fn warnings(&self) -> &[RosterWarning] {
        &self.warnings
    }

    /// Iterates over normal users.
    pub fn normal_records(&self) -> impl Iterator<Item = &RosterRecord> {
        self.records.iter().filter(|record| !record.is_gray_zone())
    }

    /// Iterates over gray-zone sentinel records.
    pub fn gray_zone_records(&self) -> impl Iterator<Item = &RosterRecord> {
        self.records.iter().filter(|record| record.is_gray_zone())
    }
}

/// Generates a roster using the supplied random source.
///
/// # Errors
///
/// Returns [`RosterError`] if allocation or gray-zone injection fails. No
/// partial roster is returned.
pub fn generate_roster<R: Rng>(
    config: &RosterConfig,
    units: &[OrgUnit],
    rng: R,
) -> Result<Roster, RosterError> {
    let mut ctx = AllocationContext::from_config(config, rng);

    let engine = AllocationEngine::new(config.business_blocks(), config.fixed_distribution());
    let mut records = engine.allocate(units, &mut ctx)?;

    let injector = GrayZoneInjector::new(config.gray_zone(), config.business_blocks());
    records.extend(injector.inject(units, &mut ctx)?);

    let warnings = ctx.into_warnings();
    info!(
        records = records.len(),
        warnings = warnings.len(),
        "roster generated"
    );
    Ok(Roster { records, warnings })
}

/// Generates a roster from a `u64` seed with the crate's deterministic RNG.
///
/// # Errors
///
/// Returns [`RosterError`] if generation fails.
///
/// # Example
///
/// ```
/// use synthetic_roster::{OrgUnitTable, RosterConfig, generate_roster_with_seed};
///
/// let config = RosterConfig::from_json(r#"{
///     "version": 1,
///     "businessBlocks": [
///         {"code": "KM", "name": "KM KKSB", "targetCount": 3, "maleProbability": 0.5}
///     ],
///     "identifier": {"minSignificantDigits": 6, "maxSignificantDigits": 8, "totalWidth": 8},
///     "grayZone": {"tabNumberOptions": ["00000000"], "nameOptions": ["Gray Zone"]},
///     "names": {
///         "male": {"firstNames": ["Ivan", "Oleg"], "surnames": ["Petrov"], "patronymics": ["Ilyich"]},
///         "female": {"firstNames": ["Anna", "Olga"], "surnames": ["Petrova"], "patronymics": ["Ilyinichna"]}
///     }
/// }"#).expect("valid configuration");
/// let table = OrgUnitTable::from_json(r#"[
///     {"id": 1001, "topLevelCode": "38", "topLevelFullName": "Central bank",
///      "topLevelShortName": "CB", "subdivisionCode": "9038",
///      "subdivisionFullName": "Moscow office", "subdivisionShortName": "MO"}
/// ]"#).expect("valid units");
///
/// let first = generate_roster_with_seed(&config, table.units(), 42).expect("generated");
/// let second = generate_roster_with_seed(&config, table.units(), 42).expect("generated");
///
/// assert_eq!(first.records().len(), 4);
/// assert_eq!(first, second);
/// ```
pub fn generate_roster_with_seed(
    config: &RosterConfig,
    units: &[OrgUnit],
    seed: u64,
) -> Result<Roster, RosterError> {
    generate_roster(config, units, ChaCha8Rng::seed_from_u64(seed))
}
