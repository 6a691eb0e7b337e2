//! Three-phase headcount allocation.
//!
//! Each business block has a global target that is spread over the
//! organizational units in strictly ordered phases:
//!
//! 1. **Fixed**: explicit counts from the fixed distribution.
//! 2. **Minimum coverage**: every unit outside the fixed distribution gets at
//!    least `minimum_per_unit` users of every block.
//! 3. **Random**: the remainder of each block goes to eligible units drawn
//!    uniformly with replacement.
//!
//! All per-run mutable state (issued numbers and names, collected warnings
//! and the random source) lives in an [`AllocationContext`] owned by the
//! caller for the duration of one run.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info, warn};

use crate::config::{BusinessBlock, FixedDistribution, RosterConfig};
use crate::error::{CapacityScope, RosterError, RosterWarning};
use crate::gray_zone::GrayZoneSentinels;
use crate::identifier::{IdentifierBounds, IdentifierPool};
use crate::names::{NameCorpora, NameGenerator};
use crate::org_unit::{OrgUnit, OrgUnitId};
use crate::record::{RecordSource, RosterRecord};

/// Per-run state shared by the allocation engine and gray-zone injector.
///
/// A context must not outlive its run; create a fresh one for every roster.
#[derive(Debug)]
pub struct AllocationContext<'a, R> {
    rng: R,
    identifiers: IdentifierPool,
    names: NameGenerator<'a>,
    warnings: Vec<RosterWarning>,
}

impl<'a, R: Rng> AllocationContext<'a, R> {
    /// Creates a context with empty identifier and name pools.
    #[must_use]
    pub fn new(
        rng: R,
        bounds: IdentifierBounds,
        identifier_retry_limit: usize,
        corpora: &'a NameCorpora,
        name_retry_limit: usize,
    ) -> Self {
        Self {
            rng,
            identifiers: IdentifierPool::new(bounds, identifier_retry_limit),
            names: NameGenerator::new(corpora, name_retry_limit),
            warnings: Vec::new(),
        }
    }

    /// Creates a context from a configuration, reserving the gray-zone
    /// sentinel numbers so generated numbers never collide with them.
    #[must_use]
    pub fn from_config(config: &'a RosterConfig, rng: R) -> Self {
        let mut context = Self::new(
            rng,
            *config.identifier_bounds(),
            config.identifier_retry_limit(),
            config.name_corpora(),
            config.name_retry_limit(),
        );
        context.reserve_sentinels(config.gray_zone());
        context
    }

    /// Reserves every sentinel employee number in the identifier pool.
    pub fn reserve_sentinels(&mut self, sentinels: &GrayZoneSentinels) {
        for literal in sentinels.tab_numbers() {
            if self.identifiers.reserve(literal) {
                debug!(employee_number = %literal, "reserved gray zone employee number");
            }
        }
    }

    /// Returns the random source.
    pub const fn rng(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Returns the identifier pool.
    #[must_use]
    pub const fn identifiers(&self) -> &IdentifierPool {
        &self.identifiers
    }

    /// Records and logs a non-fatal condition.
    pub fn warn(&mut self, warning: RosterWarning) {
        warn!(warning = %warning, "roster warning");
        self.warnings.push(warning);
    }

    /// Returns the warnings raised so far.
    #[must_use]
    pub fn warnings(&self) -> &[RosterWarning] {
        &self.warnings
    }

    /// Ends the run, returning its warnings.
    #[must_use]
    pub fn into_warnings(self) -> Vec<RosterWarning> {
        self.warnings
    }

    /// Generates one normal user of `block` at `unit`.
    fn materialize(
        &mut self,
        block: &BusinessBlock,
        unit: &OrgUnit,
        source: RecordSource,
    ) -> Result<RosterRecord, RosterError> {
        let employee_number = self.identifiers.next(&mut self.rng)?;
        let gender = block.draw_gender(&mut self.rng);
        let name = self.names.next(&mut self.rng, gender);
        if let Some(attempts) = name.suffixed_after {
            self.warn(RosterWarning::NameUniquenessDegraded {
                name: name.full_name.clone(),
                attempts,
            });
        }

        Ok(RosterRecord {
            employee_number,
            full_name: name.full_name,
            business_block_code: block.code().to_owned(),
            business_block_name: block.name().to_owned(),
            org_unit: unit.clone(),
            source,
        })
    }
}

/// Remaining headcount of one block during a run.
#[derive(Debug)]
struct BlockQuota<'b> {
    block: &'b BusinessBlock,
    remaining: usize,
}

/// Assigned normal users per (unit, block).
#[derive(Debug, Default)]
struct Tally<'u> {
    counts: HashMap<(&'u OrgUnitId, usize), usize>,
}

impl<'u> Tally<'u> {
    fn get(&self, unit: &'u OrgUnitId, block_index: usize) -> usize {
        self.counts.get(&(unit, block_index)).copied().unwrap_or(0)
    }

    fn add(&mut self, unit: &'u OrgUnitId, block_index: usize, count: usize) {
        *self.counts.entry((unit, block_index)).or_default() += count;
    }
}

/// Distributes business-block headcount over organizational units.
///
/// # Example
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use synthetic_roster::{
///     AllocationContext, AllocationEngine, BusinessBlock, FixedDistribution, HierarchyLevel,
///     IdentifierBounds, NameCorpora, NameCorpus, OrgUnit, OrgUnitId,
/// };
///
/// let unit = |id: &str| {
///     OrgUnit::new(
///         OrgUnitId::new(id),
///         HierarchyLevel::new("38", "Central bank", "CB"),
///         HierarchyLevel::new("9038", "Moscow office", "MO"),
///     )
/// };
/// let units = vec![unit("A"), unit("B")];
/// let blocks = vec![BusinessBlock::new("KM", "KM KKSB", 5, 0.7).expect("valid block")];
/// let fixed = FixedDistribution::new();
/// let corpus = NameCorpus::new(
///     vec!["Ivan".to_owned(), "Pyotr".to_owned()],
///     vec!["Petrov".to_owned(), "Ivanov".to_owned()],
///     vec!["Ilyich".to_owned(), "Sergeevich".to_owned()],
/// );
/// let corpora = NameCorpora::new(corpus.clone(), corpus).expect("valid corpora");
/// let bounds = IdentifierBounds::new(4, 6, 6).expect("valid bounds");
/// let mut context =
///     AllocationContext::new(ChaCha8Rng::seed_from_u64(42), bounds, 1_000, &corpora, 100);
///
/// let records = AllocationEngine::new(&blocks, &fixed)
///     .allocate(&units, &mut context)
///     .expect("allocation succeeds");
///
/// assert_eq!(records.len(), 5);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AllocationEngine<'a> {
    blocks: &'a [BusinessBlock],
    fixed: &'a FixedDistribution,
}

impl<'a> AllocationEngine<'a> {
    /// Creates an engine over the given blocks and fixed distribution.
    #[must_use]
    pub const fn new(blocks: &'a [BusinessBlock], fixed: &'a FixedDistribution) -> Self {
        Self { blocks, fixed }
    }

    /// Allocates every block's target over `units`.
    ///
    /// Units are processed in the supplied order during the fixed and
    /// minimum-coverage phases. All fatal conditions are detected before the
    /// first record is generated, except identifier draws exceeding their
    /// retry bound.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] when no blocks are configured, the fixed
    /// distribution names an unknown block or exceeds a target, the
    /// identifier space is too small, or minimum coverage cannot be met.
    pub fn allocate<R: Rng>(
        &self,
        units: &[OrgUnit],
        ctx: &mut AllocationContext<'_, R>,
    ) -> Result<Vec<RosterRecord>, RosterError> {
        if self.blocks.is_empty() {
            return Err(RosterError::NoBusinessBlocks);
        }
        if let Some((unit, code)) = self.fixed.find_unknown_block(self.blocks) {
            return Err(RosterError::UnknownBusinessBlock {
                unit: unit.clone(),
                code: code.to_owned(),
            });
        }

        let total_target: usize = self.blocks.iter().map(BusinessBlock::target_count).sum();
        ctx.identifiers
            .ensure_capacity(u64::try_from(total_target).unwrap_or(u64::MAX))?;

        self.warn_unknown_fixed_units(units, ctx);

        let (fixed_units, eligible): (Vec<&OrgUnit>, Vec<&OrgUnit>) = units
            .iter()
            .partition(|unit| self.fixed.contains_unit(unit.id()));
        let mut quotas = self.quotas_after_fixed(&fixed_units)?;
        let mut tally = Tally::default();
        Self::check_minimum_capacity(&quotas, &eligible, &tally)?;

        let mut records = Vec::with_capacity(total_target);
        self.fixed_phase(&fixed_units, ctx, &mut tally, &mut records)?;
        Self::minimum_phase(&mut quotas, &eligible, ctx, &mut tally, &mut records)?;
        Self::random_phase(&mut quotas, &eligible, ctx, &mut records)?;

        info!(
            units = units.len(),
            fixed_units = fixed_units.len(),
            eligible_units = eligible.len(),
            users = records.len(),
            "allocation complete"
        );
        Ok(records)
    }

    fn warn_unknown_fixed_units<R: Rng>(
        &self,
        units: &[OrgUnit],
        ctx: &mut AllocationContext<'_, R>,
    ) {
        let known: HashSet<&OrgUnitId> = units.iter().map(OrgUnit::id).collect();
        for unit in self.fixed.units().filter(|unit| !known.contains(unit)) {
            ctx.warn(RosterWarning::UnknownOrgUnitInFixedDistribution { unit: unit.clone() });
        }
    }

    /// Deducts the fixed counts of known units from each block's target.
    fn quotas_after_fixed(&self, fixed_units: &[&OrgUnit]) -> Result<Vec<BlockQuota<'a>>, RosterError> {
        self.blocks
            .iter()
            .map(|block| {
                let fixed: usize = fixed_units
                    .iter()
                    .map(|unit| self.fixed.count(unit.id(), block.code()))
                    .sum();
                let remaining = block.target_count().checked_sub(fixed).ok_or_else(|| {
                    RosterError::FixedDistributionExceedsTarget {
                        code: block.code().to_owned(),
                        fixed,
                        target: block.target_count(),
                    }
                })?;
                Ok(BlockQuota { block, remaining })
            })
            .collect()
    }

    /// Verifies the minimum-coverage phase can be paid for, both in
    /// aggregate and per block.
    fn check_minimum_capacity(
        quotas: &[BlockQuota<'_>],
        eligible: &[&OrgUnit],
        tally: &Tally<'_>,
    ) -> Result<(), RosterError> {
        let needs: Vec<usize> = quotas
            .iter()
            .enumerate()
            .map(|(index, quota)| {
                eligible
                    .iter()
                    .map(|unit| {
                        quota
                            .block
                            .minimum_per_unit()
                            .saturating_sub(tally.get(unit.id(), index))
                    })
                    .sum()
            })
            .collect();

        let required: usize = needs.iter().sum();
        let available: usize = quotas.iter().map(|quota| quota.remaining).sum();
        if required > available {
            return Err(RosterError::InsufficientCapacity {
                scope: CapacityScope::AllBlocks,
                required,
                available,
            });
        }

        for (quota, &need) in quotas.iter().zip(&needs) {
            if need > quota.remaining {
                return Err(RosterError::InsufficientCapacity {
                    scope: CapacityScope::Block(quota.block.code().to_owned()),
                    required: need,
                    available: quota.remaining,
                });
            }
        }
        Ok(())
    }

    fn fixed_phase<'u, R: Rng>(
        &self,
        fixed_units: &[&'u OrgUnit],
        ctx: &mut AllocationContext<'_, R>,
        tally: &mut Tally<'u>,
        records: &mut Vec<RosterRecord>,
    ) -> Result<(), RosterError> {
        let before = records.len();
        for &unit in fixed_units {
            for (index, block) in self.blocks.iter().enumerate() {
                let count = self.fixed.count(unit.id(), block.code());
                for _ in 0..count {
                    records.push(ctx.materialize(block, unit, RecordSource::Fixed)?);
                }
                tally.add(unit.id(), index, count);
            }
        }
        debug!(users = records.len() - before, "fixed phase complete");
        Ok(())
    }

    fn minimum_phase<'u, R: Rng>(
        quotas: &mut [BlockQuota<'_>],
        eligible: &[&'u OrgUnit],
        ctx: &mut AllocationContext<'_, R>,
        tally: &mut Tally<'u>,
        records: &mut Vec<RosterRecord>,
    ) -> Result<(), RosterError> {
        let before = records.len();
        for &unit in eligible {
            for (index, quota) in quotas.iter_mut().enumerate() {
                let need = quota
                    .block
                    .minimum_per_unit()
                    .saturating_sub(tally.get(unit.id(), index));
                for _ in 0..need {
                    records.push(ctx.materialize(quota.block, unit, RecordSource::Minimum)?);
                }
                tally.add(unit.id(), index, need);
                quota.remaining = quota.remaining.saturating_sub(need);
            }
        }
        debug!(users = records.len() - before, "minimum coverage phase complete");
        Ok(())
    }

    fn random_phase<R: Rng>(
        quotas: &mut [BlockQuota<'_>],
        eligible: &[&OrgUnit],
        ctx: &mut AllocationContext<'_, R>,
        records: &mut Vec<RosterRecord>,
    ) -> Result<(), RosterError> {
        let before = records.len();
        for quota in quotas.iter_mut().filter(|quota| quota.remaining > 0) {
            if eligible.is_empty() {
                ctx.warn(RosterWarning::UnassignedHeadcount {
                    code: quota.block.code().to_owned(),
                    remaining: quota.remaining,
                });
                continue;
            }
            while quota.remaining > 0 {
                let Some(&unit) = eligible.choose(ctx.rng()) else {
                    break;
                };
                records.push(ctx.materialize(quota.block, unit, RecordSource::Random)?);
                quota.remaining -= 1;
            }
        }
        debug!(users = records.len() - before, "random phase complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for phase ordering and capacity checks; end-to-end
    //! properties live in `tests/allocation.rs`.

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::names::NameCorpus;
    use crate::org_unit::HierarchyLevel;
    use crate::summary::{InvariantViolation, RosterSummary};

    fn unit(id: &str) -> OrgUnit {
        OrgUnit::new(
            OrgUnitId::new(id),
            HierarchyLevel::new("38", "Central bank", "CB"),
            HierarchyLevel::new(&format!("90{id}"), "Office", "OF"),
        )
    }

    fn block(code: &str, target: usize) -> BusinessBlock {
        BusinessBlock::new(code, code, target, 0.5).expect("valid block")
    }

    #[fixture]
    fn corpora() -> NameCorpora {
        let words = |items: &[&str]| items.iter().map(|&s| s.to_owned()).collect::<Vec<_>>();
        let corpus = NameCorpus::new(
            words(&["Ivan", "Pyotr", "Sergey", "Oleg"]),
            words(&["Ivanov", "Petrov", "Sidorov"]),
            words(&["Ivanovich", "Petrovich"]),
        );
        NameCorpora::new(corpus.clone(), corpus).expect("valid corpora")
    }

    fn allocate(
        corpora: &NameCorpora,
        units: &[OrgUnit],
        blocks: &[BusinessBlock],
        fixed: &FixedDistribution,
    ) -> (Result<Vec<RosterRecord>, RosterError>, Vec<RosterWarning>) {
        let bounds = IdentifierBounds::new(5, 6, 6).expect("valid bounds");
        let mut ctx =
            AllocationContext::new(ChaCha8Rng::seed_from_u64(17), bounds, 1_000, corpora, 100);
        let result = AllocationEngine::new(blocks, fixed).allocate(units, &mut ctx);
        (result, ctx.into_warnings())
    }

    fn count(records: &[RosterRecord], unit: &str, code: &str, source: RecordSource) -> usize {
        records
            .iter()
            .filter(|r| {
                r.org_unit.id().as_str() == unit
                    && r.business_block_code == code
                    && r.source == source
            })
            .count()
    }

    #[rstest]
    fn phases_follow_fixed_then_minimum_then_random(corpora: NameCorpora) {
        let units = vec![unit("A"), unit("B"), unit("C")];
        let blocks = vec![block("KM", 5), block("MNS", 4)];
        let fixed = FixedDistribution::new().with_entry(OrgUnitId::new("A"), "KM", 2);

        let (result, warnings) = allocate(&corpora, &units, &blocks, &fixed);
        let records = result.expect("allocation succeeds");

        assert!(warnings.is_empty());
        assert_eq!(records.len(), 9);
        assert_eq!(count(&records, "A", "KM", RecordSource::Fixed), 2);
        assert_eq!(count(&records, "A", "MNS", RecordSource::Minimum), 0);
        for id in ["B", "C"] {
            assert_eq!(count(&records, id, "KM", RecordSource::Minimum), 1);
            assert_eq!(count(&records, id, "MNS", RecordSource::Minimum), 1);
        }
        let random_km: usize = ["B", "C"]
            .iter()
            .map(|id| count(&records, id, "KM", RecordSource::Random))
            .sum();
        let random_mns: usize = ["B", "C"]
            .iter()
            .map(|id| count(&records, id, "MNS", RecordSource::Random))
            .sum();
        assert_eq!((random_km, random_mns), (1, 2));
        assert!(
            records
                .iter()
                .filter(|r| r.org_unit.id().as_str() == "A")
                .all(|r| r.source == RecordSource::Fixed)
        );

        let sources: Vec<RecordSource> = records.iter().map(|r| r.source).collect();
        let mut ordered = sources.clone();
        ordered.sort();
        assert_eq!(sources, ordered, "phases must run in order");
    }

    #[rstest]
    fn reports_aggregate_capacity_shortfall(corpora: NameCorpora) {
        let units = vec![unit("A"), unit("B")];
        let blocks = vec![block("KM", 1), block("MNS", 0)];

        let (result, _) = allocate(&corpora, &units, &blocks, &FixedDistribution::new());

        assert_eq!(
            result,
            Err(RosterError::InsufficientCapacity {
                scope: CapacityScope::AllBlocks,
                required: 4,
                available: 1,
            })
        );
    }

    #[rstest]
    fn reports_per_block_capacity_shortfall(corpora: NameCorpora) {
        let units = vec![unit("A"), unit("B")];
        let blocks = vec![block("KM", 10), block("MNS", 1)];

        let (result, _) = allocate(&corpora, &units, &blocks, &FixedDistribution::new());

        assert_eq!(
            result,
            Err(RosterError::InsufficientCapacity {
                scope: CapacityScope::Block("MNS".to_owned()),
                required: 2,
                available: 1,
            })
        );
    }

    #[rstest]
    fn honours_minimum_per_unit_override(corpora: NameCorpora) {
        let units = vec![unit("A"), unit("B")];
        let blocks = vec![block("KM", 6).with_minimum_per_unit(3)];

        let (result, _) = allocate(&corpora, &units, &blocks, &FixedDistribution::new());
        let records = result.expect("allocation succeeds");

        assert_eq!(count(&records, "A", "KM", RecordSource::Minimum), 3);
        assert_eq!(count(&records, "B", "KM", RecordSource::Minimum), 3);
        assert!(records.iter().all(|r| r.source == RecordSource::Minimum));
    }

    #[rstest]
    fn unknown_fixed_unit_is_skipped_with_warning(corpora: NameCorpora) {
        let units = vec![unit("A")];
        let blocks = vec![block("KM", 3)];
        let fixed = FixedDistribution::new().with_entry(OrgUnitId::new("Z"), "KM", 2);

        let (result, warnings) = allocate(&corpora, &units, &blocks, &fixed);
        let records = result.expect("allocation succeeds");

        assert_eq!(records.len(), 3);
        assert_eq!(count(&records, "A", "KM", RecordSource::Minimum), 1);
        assert_eq!(count(&records, "A", "KM", RecordSource::Random), 2);
        assert_eq!(
            warnings,
            vec![RosterWarning::UnknownOrgUnitInFixedDistribution {
                unit: OrgUnitId::new("Z"),
            }]
        );
    }

    #[rstest]
    fn leftover_without_eligible_units_is_a_quota_violation(corpora: NameCorpora) {
        let units = vec![unit("A")];
        let blocks = vec![block("KM", 5)];
        let fixed = FixedDistribution::new().with_entry(OrgUnitId::new("A"), "KM", 2);

        let (result, warnings) = allocate(&corpora, &units, &blocks, &fixed);
        let records = result.expect("allocation succeeds");

        assert_eq!(records.len(), 2);
        assert_eq!(
            warnings,
            vec![RosterWarning::UnassignedHeadcount {
                code: "KM".to_owned(),
                remaining: 3,
            }]
        );
        assert!(
            RosterSummary::from_records(&records)
                .violations(&units, &blocks, &fixed)
                .contains(&InvariantViolation::QuotaMismatch {
                    code: "KM".to_owned(),
                    expected: 5,
                    actual: 2,
                })
        );
    }

    #[rstest]
    fn rejects_fixed_counts_above_target(corpora: NameCorpora) {
        let units = vec![unit("A"), unit("B")];
        let blocks = vec![block("KM", 2)];
        let fixed = FixedDistribution::new()
            .with_entry(OrgUnitId::new("A"), "KM", 2)
            .with_entry(OrgUnitId::new("B"), "KM", 1);

        let (result, _) = allocate(&corpora, &units, &blocks, &fixed);

        assert_eq!(
            result,
            Err(RosterError::FixedDistributionExceedsTarget {
                code: "KM".to_owned(),
                fixed: 3,
                target: 2,
            })
        );
    }

    #[rstest]
    fn rejects_unknown_fixed_block(corpora: NameCorpora) {
        let units = vec![unit("A")];
        let blocks = vec![block("KM", 2)];
        let fixed = FixedDistribution::new().with_entry(OrgUnitId::new("A"), "XX", 1);

        let (result, _) = allocate(&corpora, &units, &blocks, &fixed);

        assert_eq!(
            result,
            Err(RosterError::UnknownBusinessBlock {
                unit: OrgUnitId::new("A"),
                code: "XX".to_owned(),
            })
        );
    }

    #[rstest]
    fn rejects_targets_beyond_identifier_space(corpora: NameCorpora) {
        let units = vec![unit("A")];
        let blocks = vec![block("KM", 20)];
        let bounds = IdentifierBounds::new(1, 1, 2).expect("valid bounds");
        let mut ctx =
            AllocationContext::new(ChaCha8Rng::seed_from_u64(1), bounds, 1_000, &corpora, 100);
        let fixed = FixedDistribution::new();

        let result = AllocationEngine::new(&blocks, &fixed).allocate(&units, &mut ctx);

        assert_eq!(
            result,
            Err(RosterError::IdentifierSpaceExhausted {
                requested: 20,
                available: 9,
            })
        );
    }

    #[rstest]
    fn rejects_empty_block_list(corpora: NameCorpora) {
        let (result, _) = allocate(&corpora, &[unit("A")], &[], &FixedDistribution::new());

        assert_eq!(result, Err(RosterError::NoBusinessBlocks));
    }
}
