//! Cleaning pipeline
//!
//! Raw rows go through four steps, in order:
//! 1. missing-value census over the raw columns
//! 2. local buyer / contract-type filters
//! 3. drop rows without an amount or a contract type
//! 4. drop duplicate ids, keeping the first occurrence

use std::collections::HashSet;

use crate::records::contract::{Contract, NormalizedRecord};
use crate::records::raw::{RawRecord, RAW_COLUMNS};

/// Filters applied to the fetched rows before cleaning
#[derive(Debug, Clone, Default)]
pub struct LocalFilters {
    /// Kept rows have an upper-cased buyer containing this text (upper-cased)
    pub buyer: Option<String>,
    /// Kept rows have a contract type containing this text, ignoring case
    pub contract_type: Option<String>,
}

impl LocalFilters {
    /// Builds filters, treating blank strings as absent
    pub fn new(buyer: Option<&str>, contract_type: Option<&str>) -> Self {
        let clean = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            buyer: clean(buyer).map(|b| b.to_uppercase()),
            contract_type: clean(contract_type).map(|t| t.to_lowercase()),
        }
    }

    /// Returns true if the row passes every configured filter
    ///
    /// Rows with a missing buyer or type never match a filter on that column.
    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        if let Some(buyer) = &self.buyer {
            match &record.buyer {
                Some(value) if value.contains(buyer.as_str()) => {}
                _ => return false,
            }
        }

        if let Some(contract_type) = &self.contract_type {
            match &record.contract_type {
                Some(value) if value.to_lowercase().contains(contract_type.as_str()) => {}
                _ => return false,
            }
        }

        true
    }
}

/// What the cleaning pipeline did to the fetched rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningReport {
    /// Rows returned by the API
    pub raw_rows: usize,

    /// Columns extracted per row
    pub raw_columns: usize,

    /// Missing values per raw column; only columns with gaps are listed
    pub missing_by_column: Vec<(&'static str, usize)>,

    /// Rows left after the local filters
    pub after_filters: usize,

    /// Rows dropped for a missing amount or contract type
    pub dropped_missing: usize,

    /// Rows dropped as repeated ids
    pub duplicates_removed: usize,

    /// Rows in the final dataset
    pub final_rows: usize,
}

impl CleaningReport {
    /// Total rows removed between fetch and the final dataset
    pub fn total_removed(&self) -> usize {
        self.raw_rows - self.final_rows
    }
}

/// Counts missing values per column across raw rows
pub fn missing_values(rows: &[RawRecord]) -> Vec<(&'static str, usize)> {
    RAW_COLUMNS
        .iter()
        .filter_map(|&name| {
            let missing = rows.iter().filter(|r| r.column(name).is_none()).count();
            (missing > 0).then_some((name, missing))
        })
        .collect()
}

/// Runs the full cleaning pipeline over fetched rows
///
/// # Arguments
///
/// * `rows` - Rows exactly as the API returned them
/// * `filters` - Local buyer / contract-type filters
///
/// # Returns
///
/// The cleaned contracts, in fetch order, and a report of what was removed
pub fn clean_records(rows: &[RawRecord], filters: &LocalFilters) -> (Vec<Contract>, CleaningReport) {
    let mut report = CleaningReport {
        raw_rows: rows.len(),
        raw_columns: RAW_COLUMNS.len(),
        missing_by_column: missing_values(rows),
        ..CleaningReport::default()
    };

    let filtered: Vec<NormalizedRecord> = rows
        .iter()
        .map(NormalizedRecord::from_raw)
        .filter(|r| filters.matches(r))
        .collect();
    report.after_filters = filtered.len();

    let complete: Vec<Contract> = filtered
        .into_iter()
        .filter_map(NormalizedRecord::into_contract)
        .collect();
    report.dropped_missing = report.after_filters - complete.len();

    let contracts = dedupe_by_id(complete);
    report.duplicates_removed = report.after_filters - report.dropped_missing - contracts.len();
    report.final_rows = contracts.len();

    tracing::info!(
        "Cleaning: {} fetched, {} after filters, {} dropped for missing values, {} duplicates, {} kept",
        report.raw_rows,
        report.after_filters,
        report.dropped_missing,
        report.duplicates_removed,
        report.final_rows
    );

    (contracts, report)
}

/// Keeps the first contract for each id
///
/// A missing id is a key like any other: only the first contract without an
/// id survives.
fn dedupe_by_id(contracts: Vec<Contract>) -> Vec<Contract> {
    let mut seen: HashSet<Option<String>> = HashSet::new();
    contracts
        .into_iter()
        .filter(|c| seen.insert(c.id.clone()))
        .collect()
}
