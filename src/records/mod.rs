//! Procurement records
//!
//! This module contains:
//! - Raw API rows and the paged response envelope
//! - Type coercion into normalized records
//! - The cleaning pipeline producing typed contracts

mod clean;
mod contract;
mod raw;

pub use clean::{clean_records, missing_values, CleaningReport, LocalFilters};
pub use contract::{parse_date, title_case, Contract, NormalizedRecord};
pub use raw::{value_as_f64, value_as_i64, value_as_text, RawRecord, SearchPage, RAW_COLUMNS};
