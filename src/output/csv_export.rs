//! CSV exports of the processed dataset and its summaries

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::analysis::{Dashboard, TypeSummary, YearKpi};
use crate::output::{OutputResult, ReportContext};
use crate::records::Contract;

/// Locations of the three CSV exports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFiles {
    pub contracts: PathBuf,
    pub yearly: PathBuf,
    pub types: PathBuf,
}

impl ExportFiles {
    /// Builds export paths inside `directory` for a keyword and year label
    pub fn new(directory: &Path, keyword: &str, year_label: &str) -> Self {
        let [contracts, yearly, types] = export_file_names(keyword, year_label);
        Self {
            contracts: directory.join(contracts),
            yearly: directory.join(yearly),
            types: directory.join(types),
        }
    }

    /// All export paths, in the order they are written
    pub fn paths(&self) -> Vec<PathBuf> {
        vec![
            self.contracts.clone(),
            self.yearly.clone(),
            self.types.clone(),
        ]
    }
}

/// File names of the processed-data, yearly-summary and per-type exports
pub fn export_file_names(keyword: &str, year_label: &str) -> [String; 3] {
    let suffix = format!(
        "{}_{}",
        sanitize_for_file_name(keyword),
        sanitize_for_file_name(year_label)
    );
    [
        format!("contracts_processed_{}.csv", suffix),
        format!("yearly_summary_{}.csv", suffix),
        format!("contract_types_{}.csv", suffix),
    ]
}

/// Lower-cases and replaces anything but ASCII letters and digits with `_`
pub fn sanitize_for_file_name(input: &str) -> String {
    let sanitized: String = input
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        "query".to_string()
    } else {
        sanitized
    }
}

/// Writes all three exports
pub fn write_exports(
    directory: &Path,
    contracts: &[Contract],
    dashboard: &Dashboard,
    context: &ReportContext,
) -> OutputResult<ExportFiles> {
    let files = ExportFiles::new(directory, &context.keyword, &context.year_label);

    write_contracts_csv(File::create(&files.contracts)?, contracts)?;
    write_yearly_summary_csv(File::create(&files.yearly)?, &dashboard.yearly_kpis)?;
    write_type_summary_csv(File::create(&files.types)?, &dashboard.type_summary)?;

    tracing::debug!(
        "Exported {} contracts, {} years, {} contract types",
        contracts.len(),
        dashboard.yearly_kpis.len(),
        dashboard.type_summary.len()
    );

    Ok(files)
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Writes the processed contracts, one row per contract
pub fn write_contracts_csv<W: Write>(writer: W, contracts: &[Contract]) -> OutputResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "id",
        "ocid",
        "date",
        "year",
        "month",
        "method",
        "contract_type",
        "buyer",
        "locality",
        "region",
        "suppliers",
        "amount",
        "title",
        "description",
        "budget",
    ])?;

    for c in contracts {
        wtr.write_record([
            opt(&c.id),
            opt(&c.ocid),
            c.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            opt(&c.year),
            opt(&c.month),
            opt(&c.method),
            c.contract_type.clone(),
            opt(&c.buyer),
            opt(&c.locality),
            opt(&c.region),
            opt(&c.suppliers),
            c.amount.to_string(),
            opt(&c.title),
            opt(&c.description),
            opt(&c.budget),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the per-year KPI table
pub fn write_yearly_summary_csv<W: Write>(writer: W, kpis: &[YearKpi]) -> OutputResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "year",
        "contracts",
        "amount_total",
        "amount_mean",
        "amount_std",
        "unique_suppliers",
        "contract_types",
    ])?;

    for kpi in kpis {
        wtr.write_record([
            kpi.year.to_string(),
            kpi.contracts.to_string(),
            kpi.total.to_string(),
            kpi.mean.to_string(),
            opt(&kpi.std),
            kpi.unique_suppliers.to_string(),
            kpi.unique_types.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the per-type amount summary
pub fn write_type_summary_csv<W: Write>(writer: W, summary: &[TypeSummary]) -> OutputResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "contract_type",
        "amount_sum",
        "amount_mean",
        "count",
        "unique_suppliers",
    ])?;

    for row in summary {
        wtr.write_record([
            row.contract_type.clone(),
            row.total.to_string(),
            row.mean.to_string(),
            row.count.to_string(),
            row.unique_suppliers.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
