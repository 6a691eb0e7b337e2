//! Post-generation statistics and invariant checks.
//!
//! [`RosterSummary`] counts a finished roster by block, unit and source and
//! can re-verify the allocation guarantees against the inputs that produced
//! it. The CLI refuses to write a report that fails these checks.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::config::{BusinessBlock, FixedDistribution};
use crate::org_unit::{OrgUnit, OrgUnitId};
use crate::record::{RecordSource, RosterRecord};

/// A broken roster guarantee found by [`RosterSummary::violations`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// Normal users of a block do not add up to its target.
    #[error("business block '{code}' has {actual} users but its target is {expected}")]
    QuotaMismatch {
        /// Block code.
        code: String,
        /// Configured target.
        expected: usize,
        /// Generated normal users.
        actual: usize,
    },

    /// An eligible unit has fewer users of a block than the minimum.
    #[error("unit '{unit}' has {actual} users of business block '{code}', below the minimum {minimum}")]
    CoverageGap {
        /// Unit identifier.
        unit: OrgUnitId,
        /// Block code.
        code: String,
        /// Required minimum.
        minimum: usize,
        /// Generated normal users.
        actual: usize,
    },

    /// A fixed unit's count for a block differs from its fixed entry.
    #[error("unit '{unit}' has {actual} users of business block '{code}' but its fixed count is {expected}")]
    FixedCountMismatch {
        /// Unit identifier.
        unit: OrgUnitId,
        /// Block code.
        code: String,
        /// Fixed count.
        expected: usize,
        /// Generated normal users.
        actual: usize,
    },

    /// A unit does not have exactly one gray-zone record.
    #[error("unit '{unit}' has {count} gray zone records instead of one")]
    GrayZoneCount {
        /// Unit identifier.
        unit: OrgUnitId,
        /// Gray-zone records found.
        count: usize,
    },

    /// A normal employee number is shared by several records.
    #[error("employee number '{value}' is not unique")]
    DuplicateEmployeeNumber {
        /// The repeated number.
        value: String,
    },

    /// A normal full name is shared by several records.
    #[error("full name '{value}' is not unique")]
    DuplicateFullName {
        /// The repeated name.
        value: String,
    },
}

/// Counts over a generated roster.
///
/// # Example
///
/// ```
/// use synthetic_roster::{RosterSummary, RecordSource};
///
/// let summary = RosterSummary::from_records(&[]);
/// assert_eq!(summary.normal_count(), 0);
/// assert_eq!(summary.source_count(RecordSource::GrayZone), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterSummary {
    block_totals: BTreeMap<String, usize>,
    unit_block_counts: BTreeMap<(OrgUnitId, String), usize>,
    gray_zone_per_unit: BTreeMap<OrgUnitId, usize>,
    source_counts: BTreeMap<RecordSource, usize>,
    duplicate_employee_numbers: BTreeSet<String>,
    duplicate_full_names: BTreeSet<String>,
}

impl RosterSummary {
    /// Tallies a set of records.
    #[must_use]
    pub fn from_records(records: &[RosterRecord]) -> Self {
        let mut summary = Self::default();
        let mut numbers = BTreeSet::new();
        let mut names = BTreeSet::new();
        let mut sentinel_numbers = BTreeSet::new();

        for record in records {
            *summary.source_counts.entry(record.source).or_default() += 1;
            if record.is_gray_zone() {
                *summary
                    .gray_zone_per_unit
                    .entry(record.org_unit.id().clone())
                    .or_default() += 1;
                sentinel_numbers.insert(record.employee_number.as_str());
                continue;
            }

            *summary
                .block_totals
                .entry(record.business_block_code.clone())
                .or_default() += 1;
            *summary
                .unit_block_counts
                .entry((
                    record.org_unit.id().clone(),
                    record.business_block_code.clone(),
                ))
                .or_default() += 1;
            if !numbers.insert(record.employee_number.as_str()) {
                summary
                    .duplicate_employee_numbers
                    .insert(record.employee_number.clone());
            }
            if !names.insert(record.full_name.as_str()) {
                summary.duplicate_full_names.insert(record.full_name.clone());
            }
        }

        summary.duplicate_employee_numbers.extend(
            numbers
                .intersection(&sentinel_numbers)
                .map(|&value| value.to_owned()),
        );
        summary
    }

    /// Number of normal users.
    #[must_use]
    pub fn normal_count(&self) -> usize {
        self.block_totals.values().sum()
    }

    /// Number of gray-zone records.
    #[must_use]
    pub fn gray_zone_count(&self) -> usize {
        self.gray_zone_per_unit.values().sum()
    }

    /// Normal users of a block.
    #[must_use]
    pub fn block_total(&self, code: &str) -> usize {
        self.block_totals.get(code).copied().unwrap_or(0)
    }

    /// Normal users of a block at a unit.
    #[must_use]
    pub fn unit_block_count(&self, unit: &OrgUnitId, code: &str) -> usize {
        self.unit_block_counts
            .get(&(unit.clone(), code.to_owned()))
            .copied()
            .unwrap_or(0)
    }

    /// Gray-zone records at a unit.
    #[must_use]
    pub fn gray_zone_at(&self, unit: &OrgUnitId) -> usize {
        self.gray_zone_per_unit.get(unit).copied().unwrap_or(0)
    }

    /// Records produced by an allocation step.
    #[must_use]
    pub fn source_count(&self, source: RecordSource) -> usize {
        self.source_counts.get(&source).copied().unwrap_or(0)
    }

    /// Re-checks the roster guarantees against the generation inputs.
    ///
    /// Every block total must equal its target, including headcount left
    /// unassigned because every unit was fixed.
    #[must_use]
    pub fn violations(
        &self,
        units: &[OrgUnit],
        blocks: &[BusinessBlock],
        fixed: &FixedDistribution,
    ) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        for block in blocks {
            let actual = self.block_total(block.code());
            if actual != block.target_count() {
                violations.push(InvariantViolation::QuotaMismatch {
                    code: block.code().to_owned(),
                    expected: block.target_count(),
                    actual,
                });
            }
        }

        for unit in units {
            for block in blocks {
                let actual = self.unit_block_count(unit.id(), block.code());
                if fixed.contains_unit(unit.id()) {
                    let expected = fixed.count(unit.id(), block.code());
                    if actual != expected {
                        violations.push(InvariantViolation::FixedCountMismatch {
                            unit: unit.id().clone(),
                            code: block.code().to_owned(),
                            expected,
                            actual,
                        });
                    }
                } else if actual < block.minimum_per_unit() {
                    violations.push(InvariantViolation::CoverageGap {
                        unit: unit.id().clone(),
                        code: block.code().to_owned(),
                        minimum: block.minimum_per_unit(),
                        actual,
                    });
                }
            }

            let count = self.gray_zone_at(unit.id());
            if count != 1 {
                violations.push(InvariantViolation::GrayZoneCount {
                    unit: unit.id().clone(),
                    count,
                });
            }
        }

        violations.extend(
            self.duplicate_employee_numbers
                .iter()
                .map(|value| InvariantViolation::DuplicateEmployeeNumber {
                    value: value.clone(),
                }),
        );
        violations.extend(
            self.duplicate_full_names
                .iter()
                .map(|value| InvariantViolation::DuplicateFullName {
                    value: value.clone(),
                }),
        );
        violations
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::org_unit::HierarchyLevel;

    fn unit(id: &str) -> OrgUnit {
        OrgUnit::new(
            OrgUnitId::new(id),
            HierarchyLevel::new("38", "Central bank", "CB"),
            HierarchyLevel::new("9038", "Moscow office", "MO"),
        )
    }

    fn record(id: &str, number: &str, name: &str, code: &str, source: RecordSource) -> RosterRecord {
        RosterRecord {
            employee_number: number.to_owned(),
            full_name: name.to_owned(),
            business_block_code: code.to_owned(),
            business_block_name: code.to_owned(),
            org_unit: unit(id),
            source,
        }
    }

    #[fixture]
    fn blocks() -> Vec<BusinessBlock> {
        vec![BusinessBlock::new("KM", "KM", 3, 0.5).expect("valid block")]
    }

    #[fixture]
    fn healthy() -> Vec<RosterRecord> {
        vec![
            record("A", "001", "Petrov Ivan Ilyich", "KM", RecordSource::Fixed),
            record("B", "002", "Ivanov Ivan Ilyich", "KM", RecordSource::Minimum),
            record("B", "003", "Sidorov Ivan Ilyich", "KM", RecordSource::Random),
            record("A", "000", "Gray Zone", "KM", RecordSource::GrayZone),
            record("B", "000", "Gray Zone", "KM", RecordSource::GrayZone),
        ]
    }

    fn fixed() -> FixedDistribution {
        FixedDistribution::new().with_entry(OrgUnitId::new("A"), "KM", 1)
    }

    #[rstest]
    fn counts_by_block_unit_and_source(healthy: Vec<RosterRecord>) {
        let summary = RosterSummary::from_records(&healthy);

        assert_eq!(summary.normal_count(), 3);
        assert_eq!(summary.gray_zone_count(), 2);
        assert_eq!(summary.block_total("KM"), 3);
        assert_eq!(summary.unit_block_count(&OrgUnitId::new("B"), "KM"), 2);
        assert_eq!(summary.source_count(RecordSource::Random), 1);
    }

    #[rstest]
    fn healthy_roster_has_no_violations(healthy: Vec<RosterRecord>, blocks: Vec<BusinessBlock>) {
        let summary = RosterSummary::from_records(&healthy);

        let violations = summary.violations(&[unit("A"), unit("B")], &blocks, &fixed());

        assert_eq!(violations, vec![]);
    }

    #[rstest]
    fn reports_broken_guarantees(blocks: Vec<BusinessBlock>) {
        let records = vec![
            record("A", "001", "Petrov Ivan Ilyich", "KM", RecordSource::Fixed),
            record("A", "001", "Petrov Ivan Ilyich", "KM", RecordSource::Fixed),
            record("B", "009", "Gray Zone", "KM", RecordSource::GrayZone),
            record("B", "009", "Gray Zone", "KM", RecordSource::GrayZone),
        ];
        let summary = RosterSummary::from_records(&records);

        let violations = summary.violations(&[unit("A"), unit("B")], &blocks, &fixed());

        assert_eq!(
            violations,
            vec![
                InvariantViolation::QuotaMismatch {
                    code: "KM".to_owned(),
                    expected: 3,
                    actual: 2,
                },
                InvariantViolation::FixedCountMismatch {
                    unit: OrgUnitId::new("A"),
                    code: "KM".to_owned(),
                    expected: 1,
                    actual: 2,
                },
                InvariantViolation::GrayZoneCount {
                    unit: OrgUnitId::new("A"),
                    count: 0,
                },
                InvariantViolation::CoverageGap {
                    unit: OrgUnitId::new("B"),
                    code: "KM".to_owned(),
                    minimum: 1,
                    actual: 0,
                },
                InvariantViolation::GrayZoneCount {
                    unit: OrgUnitId::new("B"),
                    count: 2,
                },
                InvariantViolation::DuplicateEmployeeNumber {
                    value: "001".to_owned(),
                },
                InvariantViolation::DuplicateFullName {
                    value: "Petrov Ivan Ilyich".to_owned(),
                },
            ]
        );
    }

    #[rstest]
    fn leftover_headcount_in_all_fixed_roster_is_a_quota_mismatch(blocks: Vec<BusinessBlock>) {
        let records = vec![
            record("A", "001", "Petrov Ivan Ilyich", "KM", RecordSource::Fixed),
            record("A", "000", "Gray Zone", "KM", RecordSource::GrayZone),
        ];
        let summary = RosterSummary::from_records(&records);

        let violations = summary.violations(&[unit("A")], &blocks, &fixed());

        assert_eq!(
            violations,
            vec![InvariantViolation::QuotaMismatch {
                code: "KM".to_owned(),
                expected: 3,
                actual: 1,
            }]
        );
    }

    #[test]
    fn normal_number_matching_a_sentinel_is_a_duplicate() {
        let records = vec![
            record("A", "000", "Petrov Ivan Ilyich", "KM", RecordSource::Random),
            record("A", "000", "Gray Zone", "KM", RecordSource::GrayZone),
        ];

        let summary = RosterSummary::from_records(&records);
        let blocks = vec![BusinessBlock::new("KM", "KM", 1, 0.5).expect("valid block")];

        assert_eq!(
            summary.violations(&[unit("A")], &blocks, &FixedDistribution::new()),
            vec![InvariantViolation::DuplicateEmployeeNumber {
                value: "000".to_owned(),
            }]
        );
    }
}
