//! Markdown dashboard generation
//!
//! This module generates the human-readable dashboard: run information,
//! cleaning summary, statistics, embedded charts with short readings, the
//! yearly KPI table, findings and the list of exported files.

use crate::analysis::Dashboard;
use crate::output::charts::ChartKind;
use crate::output::csv_export::ExportFiles;
use crate::output::{OutputResult, ReportContext, CHARTS_DIR};
use crate::records::CleaningReport;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown dashboard
///
/// # Arguments
///
/// * `output_path` - Path where the markdown file should be written
/// * `cleaning` - What cleaning removed
/// * `dashboard` - Aggregates to report
/// * `context` - Run metadata
/// * `charts` - Charts that were rendered and should be embedded
/// * `exports` - CSV exports that were written, if any
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn generate_markdown_report(
    output_path: &Path,
    cleaning: &CleaningReport,
    dashboard: &Dashboard,
    context: &ReportContext,
    charts: &[ChartKind],
    exports: Option<&ExportFiles>,
) -> OutputResult<()> {
    let markdown = format_markdown_report(cleaning, dashboard, context, charts, exports);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats an amount as `$1,234,567.89`
pub fn format_money(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}${}.{}", sign, grouped, cents)
}

/// Escapes text for a markdown table cell
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn format_optional_money(value: Option<f64>) -> String {
    value.map(format_money).unwrap_or_else(|| "n/a".to_string())
}

/// Formats the dashboard as markdown
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_report(
    cleaning: &CleaningReport,
    dashboard: &Dashboard,
    context: &ReportContext,
    charts: &[ChartKind],
    exports: Option<&ExportFiles>,
) -> String {
    let mut md = String::new();

    md.push_str("# Public Procurement Dashboard\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        context.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("- **Keyword**: {}\n", context.keyword));
    md.push_str(&format!("- **Year**: {}\n", context.year_label));
    if let Some(buyer) = &context.buyer {
        md.push_str(&format!("- **Buyer filter**: {}\n", buyer));
    }
    if let Some(contract_type) = &context.contract_type {
        md.push_str(&format!("- **Contract type filter**: {}\n", contract_type));
    }
    md.push_str(&format!(
        "- **Pages fetched**: {} of {} reported\n",
        context.pages_fetched, context.pages_reported
    ));
    md.push_str(&format!(
        "- **Rate-limit retries**: {}\n",
        context.rate_limit_retries
    ));
    md.push_str(&format!("- **Config Hash**: {}\n\n", context.config_hash));

    push_cleaning(&mut md, cleaning);

    if cleaning.final_rows == 0 {
        md.push_str("## Results\n\n");
        md.push_str("No records matched the filters.\n");
        return md;
    }

    // Overview
    let overview = &dashboard.overview;
    md.push_str("## Overview\n\n");
    md.push_str(&format!("- **Contracts**: {}\n", overview.contracts));
    md.push_str(&format!(
        "- **Unique suppliers**: {}\n",
        overview.unique_suppliers
    ));
    md.push_str(&format!(
        "- **Contract types**: {}\n",
        overview.unique_types
    ));
    md.push_str(&format!("- **Buyers**: {}\n\n", overview.unique_buyers));

    if let Some(stats) = &dashboard.amounts {
        md.push_str("## Amount Statistics\n\n");
        md.push_str(&format!("- **Total**: {}\n", format_money(stats.sum)));
        md.push_str(&format!("- **Mean**: {}\n", format_money(stats.mean)));
        md.push_str(&format!("- **Median**: {}\n", format_money(stats.median)));
        md.push_str(&format!("- **Max**: {}\n", format_money(stats.max)));
        md.push_str(&format!("- **Min**: {}\n", format_money(stats.min)));
        md.push_str(&format!(
            "- **Std. deviation**: {}\n\n",
            format_optional_money(stats.std)
        ));

        md.push_str("| count | mean | std | min | 25% | 50% | 75% | max |\n");
        md.push_str("|-------|------|-----|-----|-----|-----|-----|-----|\n");
        md.push_str(&format!(
            "| {} | {:.2} | {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} |\n\n",
            stats.count,
            stats.mean,
            stats
                .std
                .map(|s| format!("{:.2}", s))
                .unwrap_or_else(|| "n/a".to_string()),
            stats.min,
            stats.q1,
            stats.median,
            stats.q3,
            stats.max
        ));
    }

    if !charts.is_empty() {
        md.push_str("## Charts\n\n");
        for kind in charts {
            md.push_str(&format!("### {}\n\n", kind.title()));
            md.push_str(&format!(
                "![{}]({}/{})\n\n",
                kind.title(),
                CHARTS_DIR,
                kind.file_name()
            ));
            if let Some(reading) = chart_reading(*kind, dashboard) {
                md.push_str(&reading);
                md.push_str("\n\n");
            }
        }
    }

    match (dashboard.correlation, dashboard.correlation_strength()) {
        (Some(r), Some(strength)) => md.push_str(&format!(
            "**Count/amount correlation across contract types**: {:.2} ({})\n\n",
            r, strength
        )),
        _ => md.push_str(
            "**Count/amount correlation across contract types**: not enough data\n\n",
        ),
    }

    if !dashboard.yearly_kpis.is_empty() {
        md.push_str("## Yearly KPIs\n\n");
        md.push_str("| Year | Contracts | Total | Mean | Std | Suppliers | Types |\n");
        md.push_str("|------|-----------|-------|------|-----|-----------|-------|\n");
        for kpi in &dashboard.yearly_kpis {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                kpi.year,
                kpi.contracts,
                format_money(kpi.total),
                format_money(kpi.mean),
                format_optional_money(kpi.std),
                kpi.unique_suppliers,
                kpi.unique_types
            ));
        }
        md.push('\n');
    }

    if let Some(findings) = &dashboard.findings {
        md.push_str("## Findings\n\n");
        md.push_str(&format!(
            "- **Highest total**: {}\n",
            findings.top_year
        ));
        md.push_str(&format!(
            "- **Lowest total**: {}\n",
            findings.bottom_year
        ));
        match (findings.growth_pct, findings.trend_label()) {
            (Some(pct), Some(label)) => md.push_str(&format!(
                "- **Change from first to last year**: {:+.1}% ({})\n\n",
                pct, label
            )),
            _ => md.push_str(
                "- **Change from first to last year**: undefined (first year total is zero)\n\n",
            ),
        }
    }

    if !dashboard.type_summary.is_empty() {
        md.push_str("## Contract Types\n\n");
        md.push_str("| Type | Total | Mean | Contracts | Suppliers |\n");
        md.push_str("|------|-------|------|-----------|-----------|\n");
        for row in &dashboard.type_summary {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                escape_cell(&row.contract_type),
                format_money(row.total),
                format_money(row.mean),
                row.count,
                row.unique_suppliers
            ));
        }
        md.push('\n');
    }

    if let Some(exports) = exports {
        md.push_str("## Exports\n\n");
        for path in exports.paths() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            md.push_str(&format!("- `{}`\n", name));
        }
        md.push('\n');
    }

    md
}

fn push_cleaning(md: &mut String, cleaning: &CleaningReport) {
    md.push_str("## Data Cleaning\n\n");
    md.push_str("| Step | Rows |\n");
    md.push_str("|------|------|\n");
    md.push_str(&format!("| Fetched | {} |\n", cleaning.raw_rows));
    md.push_str(&format!("| After filters | {} |\n", cleaning.after_filters));
    md.push_str(&format!(
        "| Dropped (missing amount or type) | {} |\n",
        cleaning.dropped_missing
    ));
    md.push_str(&format!(
        "| Duplicates removed | {} |\n",
        cleaning.duplicates_removed
    ));
    md.push_str(&format!("| Final | {} |\n\n", cleaning.final_rows));

    if !cleaning.missing_by_column.is_empty() {
        md.push_str(&format!(
            "Missing values across {} columns:\n\n",
            cleaning.raw_columns
        ));
        md.push_str("| Column | Missing |\n");
        md.push_str("|--------|---------|\n");
        for (column, missing) in &cleaning.missing_by_column {
            md.push_str(&format!("| {} | {} |\n", column, missing));
        }
        md.push('\n');
    }
}

/// One-line interpretation under a chart
fn chart_reading(kind: ChartKind, dashboard: &Dashboard) -> Option<String> {
    match kind {
        ChartKind::TypeCounts | ChartKind::TypeShare => {
            let (name, count) = dashboard.type_counts.first()?;
            let share = *count as f64 / dashboard.overview.contracts.max(1) as f64 * 100.0;
            Some(format!(
                "The most frequent contract type is **{}** with {} contracts ({:.1}%).",
                name, count, share
            ))
        }
        ChartKind::MonthlyTrend => {
            let (month, count) = dashboard
                .monthly_counts
                .iter()
                .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))?;
            Some(format!(
                "The busiest month was **{}** with {} contracts.",
                month, count
            ))
        }
        ChartKind::AmountVsCount => dashboard.correlation_strength().map(|strength| {
            format!(
                "Types with more contracts show a {} relationship with their total amount.",
                strength
            )
        }),
        ChartKind::YearlyAmounts => {
            let (year, total) = dashboard
                .yearly_totals
                .iter()
                .max_by(|a, b| a.1.total_cmp(&b.1))?;
            Some(format!(
                "The largest yearly total was **{}** in {}.",
                format_money(*total),
                year
            ))
        }
        ChartKind::MonthTypeStacked
        | ChartKind::MonthTypeAmounts
        | ChartKind::YearTypeStacked
        | ChartKind::YearMonthHeatmap => None,
    }
}
