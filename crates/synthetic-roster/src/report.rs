//! Report rendering and output.
//!
//! The generator returns records unordered; this module flattens them into
//! presentation rows, applies the report sort order and hands the result to
//! a [`ReportSink`]. The bundled [`JsonFileSink`] writes the report
//! atomically.

use std::path::{Path, PathBuf};

use base_d::{WordDictionary, word, wordlists};
use camino::Utf8Path;
use serde::Serialize;
use tracing::info;

use crate::error::ReportError;
use crate::generator::Roster;
use crate::io::{open_parent_dir, write_atomic};
use crate::record::RosterRecord;

/// One flattened report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    /// Employee number, always rendered as text.
    pub employee_number: String,
    /// Full name.
    pub full_name: String,
    /// Business block code.
    pub business_block_code: String,
    /// Business block display name.
    pub business_block_name: String,
    /// Unit identifier.
    pub org_unit_id: String,
    /// Top-level unit code.
    pub top_level_code: String,
    /// Top-level unit full name.
    pub top_level_full_name: String,
    /// Top-level unit short name.
    pub top_level_short_name: String,
    /// Subdivision code.
    pub subdivision_code: String,
    /// Subdivision full name.
    pub subdivision_full_name: String,
    /// Subdivision short name.
    pub subdivision_short_name: String,
    /// `true` for gray-zone sentinel rows.
    pub is_gray_zone: bool,
}

impl From<&RosterRecord> for ReportRow {
    fn from(record: &RosterRecord) -> Self {
        let unit = &record.org_unit;
        Self {
            employee_number: record.employee_number.clone(),
            full_name: record.full_name.clone(),
            business_block_code: record.business_block_code.clone(),
            business_block_name: record.business_block_name.clone(),
            org_unit_id: unit.id().as_str().to_owned(),
            top_level_code: unit.top_level().code.clone(),
            top_level_full_name: unit.top_level().full_name.clone(),
            top_level_short_name: unit.top_level().short_name.clone(),
            subdivision_code: unit.subdivision().code.clone(),
            subdivision_full_name: unit.subdivision().full_name.clone(),
            subdivision_short_name: unit.subdivision().short_name.clone(),
            is_gray_zone: record.is_gray_zone(),
        }
    }
}

/// Sorts rows by block name, top-level code, normal before gray zone,
/// subdivision code, full name, then employee number.
pub fn sort_for_presentation(rows: &mut [ReportRow]) {
    rows.sort_by(|a, b| {
        a.business_block_name
            .cmp(&b.business_block_name)
            .then_with(|| a.top_level_code.cmp(&b.top_level_code))
            .then_with(|| a.is_gray_zone.cmp(&b.is_gray_zone))
            .then_with(|| a.subdivision_code.cmp(&b.subdivision_code))
            .then_with(|| a.full_name.cmp(&b.full_name))
            .then_with(|| a.employee_number.cmp(&b.employee_number))
    });
}

/// The complete report written for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterReport {
    /// Seed the roster was generated from.
    pub seed: u64,
    /// Human-readable encoding of the seed.
    pub seed_name: String,
    /// Total number of rows.
    pub record_count: usize,
    /// Number of gray-zone rows.
    pub gray_zone_count: usize,
    /// Rows in presentation order.
    pub records: Vec<ReportRow>,
}

impl RosterReport {
    /// Builds a sorted report from a roster.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::WordListError`] if the seed name cannot be
    /// derived.
    pub fn new(roster: &Roster, seed: u64) -> Result<Self, ReportError> {
        let mut records: Vec<ReportRow> = roster.records().iter().map(ReportRow::from).collect();
        sort_for_presentation(&mut records);

        Ok(Self {
            seed,
            seed_name: seed_name_for_seed(seed)?,
            record_count: records.len(),
            gray_zone_count: records.iter().filter(|row| row.is_gray_zone).count(),
            records,
        })
    }

    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::SerializeError`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ReportError> {
        serde_json::to_string_pretty(self).map_err(|e| ReportError::SerializeError {
            message: e.to_string(),
        })
    }
}

/// Destination for finished reports.
pub trait ReportSink {
    /// Emits a report.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the report cannot be emitted.
    fn write_report(&mut self, report: &RosterReport) -> Result<(), ReportError>;
}

/// Writes reports as JSON files, replacing the target atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// Creates a sink writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the target path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, message: &str) -> ReportError {
        ReportError::WriteError {
            path: self.path.clone(),
            message: message.to_owned(),
        }
    }
}

impl ReportSink for JsonFileSink {
    fn write_report(&mut self, report: &RosterReport) -> Result<(), ReportError> {
        let json = report.to_json()?;
        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| self.write_error("report path must name a UTF-8 file"))?;
        let dir = open_parent_dir(&self.path).map_err(|e| self.write_error(&e.to_string()))?;

        write_atomic(&dir, Utf8Path::new(file_name), &json)
            .map_err(|e| self.write_error(&e.to_string()))?;
        info!(
            path = %self.path.display(),
            records = report.record_count,
            "report written"
        );
        Ok(())
    }
}

/// Encodes a seed as hyphen-separated words from the EFF long list.
///
/// # Errors
///
/// Returns [`ReportError::WordListError`] if the word list cannot be loaded.
///
/// # Example
///
/// ```
/// use synthetic_roster::seed_name_for_seed;
///
/// let name = seed_name_for_seed(2026).expect("name should generate");
/// assert_eq!(name, seed_name_for_seed(2026).expect("name should generate"));
/// ```
pub fn seed_name_for_seed(seed: u64) -> Result<String, ReportError> {
    let dictionary = WordDictionary::builder()
        .words_from_str(wordlists::EFF_LONG)
        .delimiter("-")
        .case_sensitive(false)
        .build()
        .map_err(|err| ReportError::WordListError { message: err })?;
    Ok(word::encode(seed.to_string().as_bytes(), &dictionary))
}
