//! Roster configuration types and JSON parsing.
//!
//! The configuration declares the business blocks with their headcount
//! targets, identifier bounds, the fixed distribution overrides, gray-zone
//! sentinel values and the name corpora. It is validated once at load time;
//! the engine only ever sees typed, checked values.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use rand::Rng;
use rand::distr::Bernoulli;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::gray_zone::GrayZoneSentinels;
use crate::identifier::{DEFAULT_IDENTIFIER_RETRY_LIMIT, IdentifierBounds};
use crate::io::read_text;
use crate::names::{DEFAULT_NAME_RETRY_LIMIT, Gender, NameCorpora, NameCorpus};
use crate::org_unit::OrgUnitId;

/// Current supported configuration version.
const SUPPORTED_VERSION: u32 = 1;

/// Default minimum number of users of each block per eligible unit.
pub const DEFAULT_MINIMUM_PER_UNIT: usize = 1;

/// A headcount category with its global target.
///
/// # Example
///
/// ```
/// use synthetic_roster::BusinessBlock;
///
/// let block = BusinessBlock::new("KM", "KM KKSB", 5, 0.7).expect("valid block");
/// assert_eq!(block.code(), "KM");
/// assert_eq!(block.minimum_per_unit(), 1);
/// assert!(BusinessBlock::new("KM", "KM KKSB", 5, 1.5).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessBlock {
    code: String,
    name: String,
    target_count: usize,
    male_probability: f64,
    minimum_per_unit: usize,
    gender: Bernoulli,
}

impl BusinessBlock {
    /// Creates a block, validating the male-selection probability.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMaleProbability`] unless the
    /// probability is a finite value in `[0, 1]`.
    pub fn new(
        code: &str,
        name: &str,
        target_count: usize,
        male_probability: f64,
    ) -> Result<Self, ConfigError> {
        let trimmed_code = code.trim().to_owned();
        let gender =
            Bernoulli::new(male_probability).map_err(|_| ConfigError::InvalidMaleProbability {
                code: trimmed_code.clone(),
                value: male_probability.to_string(),
            })?;

        Ok(Self {
            code: trimmed_code,
            name: name.trim().to_owned(),
            target_count,
            male_probability,
            minimum_per_unit: DEFAULT_MINIMUM_PER_UNIT,
            gender,
        })
    }

    /// Overrides the minimum number of users per eligible unit.
    #[must_use]
    pub const fn with_minimum_per_unit(mut self, minimum_per_unit: usize) -> Self {
        self.minimum_per_unit = minimum_per_unit;
        self
    }

    /// Returns the block code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the global headcount target.
    #[must_use]
    pub const fn target_count(&self) -> usize {
        self.target_count
    }

    /// Returns the probability that a generated user is male.
    #[must_use]
    pub const fn male_probability(&self) -> f64 {
        self.male_probability
    }

    /// Returns the minimum headcount guaranteed per eligible unit.
    #[must_use]
    pub const fn minimum_per_unit(&self) -> usize {
        self.minimum_per_unit
    }

    /// Draws a gender with the block's male-selection probability.
    pub fn draw_gender<R: Rng>(&self, rng: &mut R) -> Gender {
        if rng.sample(self.gender) {
            Gender::Male
        } else {
            Gender::Female
        }
    }
}

/// Explicit headcount overrides: unit → block code → count.
///
/// A unit listed here is exempt from minimum coverage for every block,
/// including blocks it does not list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedDistribution {
    entries: BTreeMap<OrgUnitId, BTreeMap<String, usize>>,
}

impl FixedDistribution {
    /// Creates an empty distribution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the count for a (unit, block) pair.
    #[must_use]
    pub fn with_entry(mut self, unit: OrgUnitId, code: &str, count: usize) -> Self {
        self.insert(unit, code, count);
        self
    }

    /// Adds or replaces the count for a (unit, block) pair.
    pub fn insert(&mut self, unit: OrgUnitId, code: &str, count: usize) {
        self.entries
            .entry(unit)
            .or_default()
            .insert(code.trim().to_owned(), count);
    }

    /// Returns `true` if the unit has an entry.
    #[must_use]
    pub fn contains_unit(&self, unit: &OrgUnitId) -> bool {
        self.entries.contains_key(unit)
    }

    /// Returns the per-block counts for a unit.
    #[must_use]
    pub fn counts_for(&self, unit: &OrgUnitId) -> Option<&BTreeMap<String, usize>> {
        self.entries.get(unit)
    }

    /// Returns the fixed count for a (unit, block) pair, zero when absent.
    #[must_use]
    pub fn count(&self, unit: &OrgUnitId, code: &str) -> usize {
        self.counts_for(unit)
            .and_then(|counts| counts.get(code))
            .copied()
            .unwrap_or(0)
    }

    /// Iterates over the units that have entries, in key order.
    pub fn units(&self) -> impl Iterator<Item = &OrgUnitId> {
        self.entries.keys()
    }

    /// Returns `true` if no unit has an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the first entry naming a block code absent from `blocks`.
    #[must_use]
    pub fn find_unknown_block<'a>(
        &'a self,
        blocks: &[BusinessBlock],
    ) -> Option<(&'a OrgUnitId, &'a str)> {
        self.entries.iter().find_map(|(unit, counts)| {
            counts
                .keys()
                .find(|code| !blocks.iter().any(|block| block.code() == code.as_str()))
                .map(|code| (unit, code.as_str()))
        })
    }
}

/// A validated roster configuration.
///
/// # Example
///
/// ```
/// use synthetic_roster::RosterConfig;
///
/// let json = r#"{
///     "version": 1,
///     "businessBlocks": [
///         {"code": "KM", "name": "KM KKSB", "targetCount": 5, "maleProbability": 0.7}
///     ],
///     "identifier": {"minSignificantDigits": 6, "maxSignificantDigits": 8, "totalWidth": 8},
///     "fixedDistribution": {"1001": {"KM": 2}},
///     "grayZone": {"tabNumberOptions": ["00000000"], "nameOptions": ["Gray Zone"]},
///     "names": {
///         "male": {"firstNames": ["Ivan"], "surnames": ["Petrov"], "patronymics": ["Ilyich"]},
///         "female": {"firstNames": ["Anna"], "surnames": ["Petrova"], "patronymics": ["Ilyinichna"]}
///     }
/// }"#;
///
/// let config = RosterConfig::from_json(json).expect("valid configuration");
/// assert_eq!(config.business_blocks().len(), 1);
/// assert_eq!(config.total_target(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RosterConfig {
    version: u32,
    business_blocks: Vec<BusinessBlock>,
    identifier_bounds: IdentifierBounds,
    fixed_distribution: FixedDistribution,
    gray_zone: GrayZoneSentinels,
    name_corpora: NameCorpora,
    name_retry_limit: usize,
    identifier_retry_limit: usize,
}

impl RosterConfig {
    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the JSON is malformed, the version is
    /// unsupported, or any section fails validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawRosterConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })?;

        Self::from_raw(raw)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = read_text(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_json(&contents)
    }

    fn from_raw(raw: RawRosterConfig) -> Result<Self, ConfigError> {
        if raw.version != SUPPORTED_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                expected: SUPPORTED_VERSION,
                actual: raw.version,
            });
        }

        let business_blocks = parse_business_blocks(raw.business_blocks)?;

        let identifier_bounds = IdentifierBounds::new(
            raw.identifier.min_significant_digits,
            raw.identifier.max_significant_digits,
            raw.identifier.total_width,
        )?;

        let mut fixed_distribution = FixedDistribution::new();
        for (unit, counts) in raw.fixed_distribution {
            let unit_id = OrgUnitId::new(unit);
            for (code, count) in counts {
                fixed_distribution.insert(unit_id.clone(), &code, count);
            }
        }
        if let Some((unit, code)) = fixed_distribution.find_unknown_block(&business_blocks) {
            return Err(ConfigError::UnknownBusinessBlock {
                unit: unit.clone(),
                code: code.to_owned(),
            });
        }

        let gray_zone =
            GrayZoneSentinels::new(raw.gray_zone.tab_number_options, raw.gray_zone.name_options)?;
        let name_corpora = NameCorpora::new(raw.names.male, raw.names.female)?;

        if raw.name_retry_limit == 0 {
            return Err(ConfigError::ZeroRetryLimit {
                setting: "nameRetryLimit",
            });
        }
        if raw.identifier_retry_limit == 0 {
            return Err(ConfigError::ZeroRetryLimit {
                setting: "identifierRetryLimit",
            });
        }

        Ok(Self {
            version: raw.version,
            business_blocks,
            identifier_bounds,
            fixed_distribution,
            gray_zone,
            name_corpora,
            name_retry_limit: raw.name_retry_limit,
            identifier_retry_limit: raw.identifier_retry_limit,
        })
    }

    /// Returns the configuration version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns the business blocks in declaration order.
    #[must_use]
    pub fn business_blocks(&self) -> &[BusinessBlock] {
        &self.business_blocks
    }

    /// Returns the employee number bounds.
    #[must_use]
    pub const fn identifier_bounds(&self) -> &IdentifierBounds {
        &self.identifier_bounds
    }

    /// Returns the fixed distribution overrides.
    #[must_use]
    pub const fn fixed_distribution(&self) -> &FixedDistribution {
        &self.fixed_distribution
    }

    /// Returns the gray-zone sentinel sets.
    #[must_use]
    pub const fn gray_zone(&self) -> &GrayZoneSentinels {
        &self.gray_zone
    }

    /// Returns the name corpora.
    #[must_use]
    pub const fn name_corpora(&self) -> &NameCorpora {
        &self.name_corpora
    }

    /// Returns the name retry bound.
    #[must_use]
    pub const fn name_retry_limit(&self) -> usize {
        self.name_retry_limit
    }

    /// Returns the identifier retry bound.
    #[must_use]
    pub const fn identifier_retry_limit(&self) -> usize {
        self.identifier_retry_limit
    }

    /// Sum of all block targets.
    #[must_use]
    pub fn total_target(&self) -> usize {
        self.business_blocks
            .iter()
            .map(BusinessBlock::target_count)
            .sum()
    }
}

fn parse_business_blocks(raw: Vec<RawBusinessBlock>) -> Result<Vec<BusinessBlock>, ConfigError> {
    if raw.is_empty() {
        return Err(ConfigError::NoBusinessBlocks);
    }

    let mut seen = HashSet::with_capacity(raw.len());
    raw.into_iter()
        .enumerate()
        .map(|(index, block)| {
            if block.code.trim().is_empty() {
                return Err(ConfigError::BlankBusinessBlockCode { index });
            }
            let parsed = BusinessBlock::new(
                &block.code,
                &block.name,
                block.target_count,
                block.male_probability,
            )?
            .with_minimum_per_unit(block.minimum_per_unit);
            if !seen.insert(parsed.code().to_owned()) {
                return Err(ConfigError::DuplicateBusinessBlock {
                    code: parsed.code().to_owned(),
                });
            }
            Ok(parsed)
        })
        .collect()
}

const fn default_minimum_per_unit() -> usize {
    DEFAULT_MINIMUM_PER_UNIT
}

const fn default_name_retry_limit() -> usize {
    DEFAULT_NAME_RETRY_LIMIT
}

const fn default_identifier_retry_limit() -> usize {
    DEFAULT_IDENTIFIER_RETRY_LIMIT
}

/// Raw JSON representation for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRosterConfig {
    version: u32,
    business_blocks: Vec<RawBusinessBlock>,
    identifier: RawIdentifierBounds,
    #[serde(default)]
    fixed_distribution: BTreeMap<String, BTreeMap<String, usize>>,
    gray_zone: RawGrayZone,
    names: RawNames,
    #[serde(default = "default_name_retry_limit")]
    name_retry_limit: usize,
    #[serde(default = "default_identifier_retry_limit")]
    identifier_retry_limit: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBusinessBlock {
    code: String,
    name: String,
    target_count: usize,
    male_probability: f64,
    #[serde(default = "default_minimum_per_unit")]
    minimum_per_unit: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIdentifierBounds {
    min_significant_digits: u32,
    max_significant_digits: u32,
    total_width: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGrayZone {
    tab_number_options: Vec<String>,
    name_options: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawNames {
    male: NameCorpus,
    female: NameCorpus,
}
