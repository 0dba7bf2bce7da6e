//! Output module for rendering the dashboard
//!
//! This module handles:
//! - Generating the markdown dashboard report
//! - Rendering SVG charts
//! - Exporting processed data and summaries as CSV
//! - Printing the headline numbers to the console

pub mod charts;
mod console;
mod csv_export;
mod markdown;

pub use charts::{render_charts, ChartKind};
pub use console::print_overview;
pub use csv_export::{
    export_file_names, sanitize_for_file_name, write_contracts_csv, write_exports,
    write_type_summary_csv, write_yearly_summary_csv, ExportFiles,
};
pub use markdown::{format_markdown_report, format_money, generate_markdown_report};

use crate::analysis::Dashboard;
use crate::config::Config;
use crate::fetch::FetchReport;
use crate::records::{CleaningReport, Contract};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the markdown report inside the output directory
pub const REPORT_FILE: &str = "dashboard.md";

/// Sub-directory receiving the SVG charts
pub const CHARTS_DIR: &str = "charts";

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to render chart: {0}")]
    Chart(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Run metadata printed at the top of the report
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub generated_at: DateTime<Utc>,
    pub keyword: String,
    pub year_label: String,
    pub buyer: Option<String>,
    pub contract_type: Option<String>,
    pub config_hash: String,
    pub pages_fetched: u32,
    pub pages_reported: u32,
    pub rate_limit_retries: u32,
}

impl ReportContext {
    /// Collects report metadata from the configuration and fetch results
    pub fn new(config: &Config, fetch: &FetchReport, config_hash: &str) -> Self {
        Self {
            generated_at: Utc::now(),
            keyword: config.query.keyword.trim().to_string(),
            year_label: config.query.year_label(),
            buyer: config.query.buyer_filter().map(str::to_string),
            contract_type: config.query.contract_type_filter().map(str::to_string),
            config_hash: config_hash.to_string(),
            pages_fetched: fetch.pages_fetched,
            pages_reported: fetch.pages_reported,
            rate_limit_retries: fetch.rate_limit_retries,
        }
    }
}

/// Paths of everything written for one run
#[derive(Debug, Clone, Default)]
pub struct WrittenFiles {
    pub report: PathBuf,
    pub charts: Vec<PathBuf>,
    pub exports: Vec<PathBuf>,
}

impl WrittenFiles {
    /// Total number of files written
    pub fn count(&self) -> usize {
        1 + self.charts.len() + self.exports.len()
    }
}

/// Writes the report, charts and CSV exports into `directory`
///
/// With no contracts left after cleaning, only the report is written; it
/// explains that nothing matched the filters.
///
/// # Arguments
///
/// * `directory` - Output directory; created if missing
/// * `contracts` - Cleaned contracts
/// * `cleaning` - What cleaning removed
/// * `dashboard` - Aggregates over `contracts`
/// * `context` - Run metadata
/// * `with_charts` - Whether SVG charts are rendered
pub fn write_dashboard(
    directory: &Path,
    contracts: &[Contract],
    cleaning: &CleaningReport,
    dashboard: &Dashboard,
    context: &ReportContext,
    with_charts: bool,
) -> OutputResult<WrittenFiles> {
    std::fs::create_dir_all(directory)?;

    let mut written = WrittenFiles {
        report: directory.join(REPORT_FILE),
        ..WrittenFiles::default()
    };

    let mut rendered = Vec::new();
    let mut exports = None;

    if contracts.is_empty() {
        tracing::warn!("No records matched the filters; skipping charts and exports");
    } else {
        let files = write_exports(directory, contracts, dashboard, context)?;
        written.exports = files.paths();
        exports = Some(files);

        if with_charts {
            let charts_dir = directory.join(CHARTS_DIR);
            rendered = render_charts(&charts_dir, dashboard)?;
            written.charts = rendered
                .iter()
                .map(|kind| charts_dir.join(kind.file_name()))
                .collect();
        }
    }

    generate_markdown_report(
        &written.report,
        cleaning,
        dashboard,
        context,
        &rendered,
        exports.as_ref(),
    )?;

    tracing::info!(
        "Wrote {} files to {}",
        written.count(),
        directory.display()
    );

    Ok(written)
}
