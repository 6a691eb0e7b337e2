//! Organizational units and the JSON unit-table loader.
//!
//! Units arrive from an upstream table in which identifiers and codes may be
//! typed as numbers or strings. Both forms are normalized to the same text
//! key so configuration overrides written as string literals match.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OrgUnitError;
use crate::io::read_text;

/// Normalized identifier of an organizational unit.
///
/// # Example
///
/// ```
/// use synthetic_roster::OrgUnitId;
///
/// assert_eq!(OrgUnitId::new(" 9038.0 "), OrgUnitId::new("9038"));
/// assert_eq!(OrgUnitId::new("9038").as_str(), "9038");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawKey", into = "String")]
pub struct OrgUnitId(String);

impl OrgUnitId {
    /// Creates a normalized identifier from raw text.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize_key(raw.as_ref()))
    }

    /// Returns the normalized identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrgUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<OrgUnitId> for String {
    fn from(id: OrgUnitId) -> Self {
        id.0
    }
}

impl From<RawKey> for OrgUnitId {
    fn from(raw: RawKey) -> Self {
        Self::new(raw.into_text())
    }
}

/// One tier of the unit hierarchy (top-level unit or subdivision).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyLevel {
    /// Tier code, normalized like unit identifiers.
    pub code: String,
    /// Full display name.
    pub full_name: String,
    /// Abbreviated display name.
    pub short_name: String,
}

impl HierarchyLevel {
    /// Creates a hierarchy level, normalizing the code.
    #[must_use]
    pub fn new(code: &str, full_name: &str, short_name: &str) -> Self {
        Self {
            code: normalize_key(code),
            full_name: full_name.trim().to_owned(),
            short_name: short_name.trim().to_owned(),
        }
    }
}

/// An organizational unit with its denormalized hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnit {
    id: OrgUnitId,
    top_level: HierarchyLevel,
    subdivision: HierarchyLevel,
}

impl OrgUnit {
    /// Creates a unit from its identifier and hierarchy tiers.
    #[must_use]
    pub const fn new(id: OrgUnitId, top_level: HierarchyLevel, subdivision: HierarchyLevel) -> Self {
        Self {
            id,
            top_level,
            subdivision,
        }
    }

    /// Returns the unit identifier.
    #[must_use]
    pub const fn id(&self) -> &OrgUnitId {
        &self.id
    }

    /// Returns the top-level unit ("TB") the unit belongs to.
    #[must_use]
    pub const fn top_level(&self) -> &HierarchyLevel {
        &self.top_level
    }

    /// Returns the regional subdivision ("GOSB") the unit belongs to.
    #[must_use]
    pub const fn subdivision(&self) -> &HierarchyLevel {
        &self.subdivision
    }
}

/// An ordered, deduplicated table of organizational units.
///
/// # Example
///
/// ```
/// use synthetic_roster::OrgUnitTable;
///
/// let json = r#"[{
///     "id": 1001,
///     "topLevelCode": 38, "topLevelFullName": "Central bank", "topLevelShortName": "CB",
///     "subdivisionCode": 9038, "subdivisionFullName": "Moscow office", "subdivisionShortName": "MO"
/// }]"#;
///
/// let table = OrgUnitTable::from_json(json).expect("valid table");
/// assert_eq!(table.units().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgUnitTable {
    units: Vec<OrgUnit>,
}

impl OrgUnitTable {
    /// Parses a unit table from a JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`OrgUnitError`] if the JSON is malformed or any record lacks
    /// a required field or carries a blank value.
    pub fn from_json(json: &str) -> Result<Self, OrgUnitError> {
        let raw: Vec<RawOrgUnit> =
            serde_json::from_str(json).map_err(|e| OrgUnitError::ParseError {
                message: e.to_string(),
            })?;

        Self::from_raw(raw)
    }

    /// Loads a unit table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`OrgUnitError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, OrgUnitError> {
        let contents = read_text(path).map_err(|e| OrgUnitError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_json(&contents)
    }

    /// Builds a table from already-constructed units, dropping duplicates.
    #[must_use]
    pub fn from_units(units: Vec<OrgUnit>) -> Self {
        let mut seen = HashSet::with_capacity(units.len());
        let deduplicated = units
            .into_iter()
            .filter(|unit| {
                let first = seen.insert(unit.id().clone());
                if !first {
                    debug!(unit = %unit.id(), "duplicate organizational unit dropped");
                }
                first
            })
            .collect();
        Self {
            units: deduplicated,
        }
    }

    fn from_raw(raw: Vec<RawOrgUnit>) -> Result<Self, OrgUnitError> {
        let units = raw
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.into_unit(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_units(units))
    }

    /// Returns the units in table order.
    #[must_use]
    pub fn units(&self) -> &[OrgUnit] {
        &self.units
    }

    /// Consumes the table, returning its units.
    #[must_use]
    pub fn into_units(self) -> Vec<OrgUnit> {
        self.units
    }
}

/// Normalizes a key: trims whitespace and drops a `.0` float artefact.
fn normalize_key(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.strip_suffix(".0") {
        Some(integral) if !integral.is_empty() && integral.chars().all(|c| c.is_ascii_digit()) => {
            integral.to_owned()
        }
        _ => trimmed.to_owned(),
    }
}

/// A JSON scalar that may be typed as a number or a string upstream.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawKey {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

impl RawKey {
    fn into_text(self) -> String {
        match self {
            Self::Unsigned(value) => value.to_string(),
            Self::Signed(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Text(value) => value,
        }
    }
}

/// Raw JSON representation of a unit record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOrgUnit {
    id: Option<RawKey>,
    top_level_code: Option<RawKey>,
    top_level_full_name: Option<RawKey>,
    top_level_short_name: Option<RawKey>,
    subdivision_code: Option<RawKey>,
    subdivision_full_name: Option<RawKey>,
    subdivision_short_name: Option<RawKey>,
}

impl RawOrgUnit {
    fn into_unit(self, index: usize) -> Result<OrgUnit, OrgUnitError> {
        let id = required(index, "id", self.id)?;
        let top_level = HierarchyLevel::new(
            &required(index, "topLevelCode", self.top_level_code)?,
            &required(index, "topLevelFullName", self.top_level_full_name)?,
            &required(index, "topLevelShortName", self.top_level_short_name)?,
        );
        let subdivision = HierarchyLevel::new(
            &required(index, "subdivisionCode", self.subdivision_code)?,
            &required(index, "subdivisionFullName", self.subdivision_full_name)?,
            &required(index, "subdivisionShortName", self.subdivision_short_name)?,
        );

        Ok(OrgUnit::new(OrgUnitId::new(id), top_level, subdivision))
    }
}

fn required(
    index: usize,
    column: &'static str,
    value: Option<RawKey>,
) -> Result<String, OrgUnitError> {
    let text = value
        .ok_or(OrgUnitError::MissingRequiredColumn { index, column })?
        .into_text();
    if text.trim().is_empty() {
        return Err(OrgUnitError::InvalidOrgUnitRecord {
            index,
            column,
            reason: "value is blank".to_owned(),
        });
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    //! Covers identifier normalization and unit-table validation.

    use rstest::rstest;

    use super::*;

    fn record(id: &str) -> String {
        format!(
            r#"{{"id": {id}, "topLevelCode": "38", "topLevelFullName": "Central bank",
                "topLevelShortName": "CB", "subdivisionCode": "9038",
                "subdivisionFullName": "Moscow office", "subdivisionShortName": "MO"}}"#
        )
    }

    #[rstest]
    #[case("1001", "1001")]
    #[case(" 1001 ", "1001")]
    #[case("1001.0", "1001")]
    #[case("A-17", "A-17")]
    #[case(".0", ".0")]
    #[case("10.5", "10.5")]
    fn normalizes_keys(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(OrgUnitId::new(raw).as_str(), expected);
    }

    #[rstest]
    #[case("1001")]
    #[case("1001.0")]
    #[case("\"1001\"")]
    #[case("\" 1001.0\"")]
    fn numeric_and_text_ids_match(#[case] id: &str) {
        let json = format!("[{}]", record(id));
        let table = OrgUnitTable::from_json(&json).expect("valid table");
        let unit = table.units().first().expect("one unit");

        assert_eq!(unit.id(), &OrgUnitId::new("1001"));
    }

    #[test]
    fn keeps_first_of_duplicate_units() {
        let json = format!("[{}, {}, {}]", record("1"), record("2"), record("\"1\""));
        let table = OrgUnitTable::from_json(&json).expect("valid table");
        let ids: Vec<&str> = table.units().iter().map(|u| u.id().as_str()).collect();

        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn into_units_preserves_table_order() {
        let json = format!("[{}, {}]", record("2"), record("1"));
        let table = OrgUnitTable::from_json(&json).expect("valid table");

        let units = table.into_units();

        let ids: Vec<&str> = units.iter().map(|u| u.id().as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn rejects_missing_column() {
        let json = r#"[{"id": 1, "topLevelCode": "38", "topLevelFullName": "Central bank",
            "topLevelShortName": "CB", "subdivisionCode": "9038", "subdivisionFullName": "Moscow office"}]"#;

        let result = OrgUnitTable::from_json(json);
        assert_eq!(
            result,
            Err(OrgUnitError::MissingRequiredColumn {
                index: 0,
                column: "subdivisionShortName",
            })
        );
    }

    #[test]
    fn rejects_null_identifier() {
        let json = format!("[{}, {}]", record("1"), record("null"));

        let result = OrgUnitTable::from_json(&json);
        assert_eq!(
            result,
            Err(OrgUnitError::MissingRequiredColumn {
                index: 1,
                column: "id",
            })
        );
    }

    #[test]
    fn rejects_blank_value() {
        let json = format!("[{}]", record("\"  \""));

        let result = OrgUnitTable::from_json(&json);
        assert!(matches!(
            result,
            Err(OrgUnitError::InvalidOrgUnitRecord {
                index: 0,
                column: "id",
                ..
            })
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        let result = OrgUnitTable::from_json("{not json");
        assert!(matches!(result, Err(OrgUnitError::ParseError { .. })));
    }

    #[test]
    fn hierarchy_codes_are_normalized() {
        let level = HierarchyLevel::new("38.0", " Central bank ", "CB");

        assert_eq!(level.code, "38");
        assert_eq!(level.full_name, "Central bank");
    }
}
