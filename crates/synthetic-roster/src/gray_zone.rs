//! Gray-zone sentinel injection.
//!
//! Every organizational unit receives exactly one extra record whose
//! employee number and name are drawn from fixed sentinel sets. Downstream
//! consumers can tell these rows apart from generated users. Sentinel values
//! may repeat across units.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::debug;

use crate::allocation::AllocationContext;
use crate::config::BusinessBlock;
use crate::error::{ConfigError, RosterError};
use crate::org_unit::OrgUnit;
use crate::record::{RecordSource, RosterRecord};

const TAB_NUMBER_SET: &str = "tabNumberOptions";
const NAME_SET: &str = "nameOptions";

/// Sentinel employee numbers and names for gray-zone records.
///
/// # Example
///
/// ```
/// use synthetic_roster::GrayZoneSentinels;
///
/// let sentinels = GrayZoneSentinels::new(
///     vec!["00000000".to_owned(), "-".to_owned()],
///     vec!["Gray Zone".to_owned()],
/// )
/// .expect("non-empty sets");
/// assert_eq!(sentinels.tab_numbers().len(), 2);
/// assert!(GrayZoneSentinels::new(vec![], vec!["Gray Zone".to_owned()]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrayZoneSentinels {
    tab_numbers: Vec<String>,
    names: Vec<String>,
}

impl GrayZoneSentinels {
    /// Creates the sentinel sets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySentinelSet`] if either set is empty.
    pub fn new(tab_numbers: Vec<String>, names: Vec<String>) -> Result<Self, ConfigError> {
        if tab_numbers.is_empty() {
            return Err(ConfigError::EmptySentinelSet {
                set: TAB_NUMBER_SET,
            });
        }
        if names.is_empty() {
            return Err(ConfigError::EmptySentinelSet { set: NAME_SET });
        }
        Ok(Self { tab_numbers, names })
    }

    /// Sentinel employee numbers.
    #[must_use]
    pub fn tab_numbers(&self) -> &[String] {
        &self.tab_numbers
    }

    /// Sentinel full names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Produces one gray-zone record per unit.
#[derive(Debug, Clone, Copy)]
pub struct GrayZoneInjector<'a> {
    sentinels: &'a GrayZoneSentinels,
    blocks: &'a [BusinessBlock],
}

impl<'a> GrayZoneInjector<'a> {
    /// Creates an injector drawing blocks from `blocks`.
    #[must_use]
    pub const fn new(sentinels: &'a GrayZoneSentinels, blocks: &'a [BusinessBlock]) -> Self {
        Self { sentinels, blocks }
    }

    /// Draws a sentinel number, sentinel name and business block uniformly
    /// for every unit, in unit order.
    ///
    /// Gray-zone records do not consume headcount and bypass the identifier
    /// and name pools.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::EmptySentinelSet`] or
    /// [`RosterError::NoBusinessBlocks`] if there is nothing to draw from.
    pub fn inject<R: Rng>(
        &self,
        units: &[OrgUnit],
        ctx: &mut AllocationContext<'_, R>,
    ) -> Result<Vec<RosterRecord>, RosterError> {
        let records = units
            .iter()
            .map(|unit| {
                let rng = ctx.rng();
                let employee_number = self
                    .sentinels
                    .tab_numbers
                    .choose(rng)
                    .ok_or(RosterError::EmptySentinelSet {
                        set: TAB_NUMBER_SET,
                    })?;
                let full_name = self
                    .sentinels
                    .names
                    .choose(rng)
                    .ok_or(RosterError::EmptySentinelSet { set: NAME_SET })?;
                let block = self
                    .blocks
                    .choose(rng)
                    .ok_or(RosterError::NoBusinessBlocks)?;

                Ok(RosterRecord {
                    employee_number: employee_number.clone(),
                    full_name: full_name.clone(),
                    business_block_code: block.code().to_owned(),
                    business_block_name: block.name().to_owned(),
                    org_unit: unit.clone(),
                    source: RecordSource::GrayZone,
                })
            })
            .collect::<Result<Vec<_>, RosterError>>()?;

        debug!(records = records.len(), "gray zone injection complete");
        Ok(records)
    }
}
