//! Generated roster record types.
//!
//! Records carry a denormalized copy of their unit's hierarchy so they can
//! be handed to a report sink without further lookups.

use serde::{Deserialize, Serialize};

use crate::org_unit::OrgUnit;

/// The allocation step that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordSource {
    /// Explicit count from the fixed distribution.
    Fixed,
    /// Minimum-coverage guarantee.
    Minimum,
    /// Random fill of the remaining headcount.
    Random,
    /// Sentinel record injected once per unit.
    GrayZone,
}

/// A generated employee, either a normal user or a gray-zone sentinel.
///
/// # Example
///
/// ```
/// use synthetic_roster::{HierarchyLevel, OrgUnit, OrgUnitId, RecordSource, RosterRecord};
///
/// let unit = OrgUnit::new(
///     OrgUnitId::new("1001"),
///     HierarchyLevel::new("38", "Central bank", "CB"),
///     HierarchyLevel::new("9038", "Moscow office", "MO"),
/// );
/// let record = RosterRecord {
///     employee_number: "00123456".to_owned(),
///     full_name: "Petrov Ivan Ilyich".to_owned(),
///     business_block_code: "KM".to_owned(),
///     business_block_name: "KM KKSB".to_owned(),
///     org_unit: unit,
///     source: RecordSource::Random,
/// };
///
/// assert!(!record.is_gray_zone());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRecord {
    /// Fixed-width employee number; opaque text, never renormalized.
    pub employee_number: String,
    /// `"Surname FirstName Patronymic"`, or a sentinel name.
    pub full_name: String,
    /// Code of the assigned business block.
    pub business_block_code: String,
    /// Display name of the assigned business block.
    pub business_block_name: String,
    /// Unit the employee is assigned to.
    pub org_unit: OrgUnit,
    /// Allocation step that produced the record.
    pub source: RecordSource,
}

impl RosterRecord {
    /// Returns `true` for gray-zone sentinel records.
    #[must_use]
    pub fn is_gray_zone(&self) -> bool {
        self.source == RecordSource::GrayZone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::org_unit::{HierarchyLevel, OrgUnitId};

    fn record(source: RecordSource) -> RosterRecord {
        RosterRecord {
            employee_number: "00012345".to_owned(),
            full_name: "Petrov Ivan Ilyich".to_owned(),
            business_block_code: "KM".to_owned(),
            business_block_name: "KM KKSB".to_owned(),
            org_unit: OrgUnit::new(
                OrgUnitId::new("1001"),
                HierarchyLevel::new("38", "Central bank", "CB"),
                HierarchyLevel::new("9038", "Moscow office", "MO"),
            ),
            source,
        }
    }

    #[test]
    fn only_gray_zone_source_is_gray_zone() {
        assert!(record(RecordSource::GrayZone).is_gray_zone());
        assert!(!record(RecordSource::Fixed).is_gray_zone());
        assert!(!record(RecordSource::Minimum).is_gray_zone());
        assert!(!record(RecordSource::Random).is_gray_zone());
    }

    #[test]
    fn employee_number_serializes_as_text() {
        let json = serde_json::to_string(&record(RecordSource::Fixed)).expect("serialize");

        assert!(json.contains("\"employeeNumber\":\"00012345\""));
        assert!(json.contains("\"source\":\"fixed\""));
        assert!(json.contains("\"topLevel\""));
    }
}
