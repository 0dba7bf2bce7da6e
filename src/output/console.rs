//! Console overview printed after a run

use crate::analysis::Dashboard;
use crate::output::markdown::format_money;
use crate::records::CleaningReport;

/// Prints the headline numbers to stdout
///
/// # Arguments
///
/// * `dashboard` - Aggregates of the run
/// * `cleaning` - What cleaning removed
pub fn print_overview(dashboard: &Dashboard, cleaning: &CleaningReport) {
    print!("{}", format_overview(dashboard, cleaning));
}

fn format_overview(dashboard: &Dashboard, cleaning: &CleaningReport) -> String {
    let mut out = String::from("=== Procurement Dashboard ===\n\n");

    out.push_str("Records:\n");
    out.push_str(&format!("  Fetched: {}\n", cleaning.raw_rows));
    out.push_str(&format!(
        "  Kept after cleaning: {} ({} removed)\n\n",
        cleaning.final_rows,
        cleaning.total_removed()
    ));

    if cleaning.final_rows == 0 {
        out.push_str("No records matched the filters.\n");
        return out;
    }

    let overview = &dashboard.overview;
    out.push_str("Overview:\n");
    out.push_str(&format!("  Contracts: {}\n", overview.contracts));
    out.push_str(&format!("  Unique suppliers: {}\n", overview.unique_suppliers));
    out.push_str(&format!("  Contract types: {}\n", overview.unique_types));
    out.push_str(&format!("  Buyers: {}\n", overview.unique_buyers));

    if let Some(stats) = &dashboard.amounts {
        out.push_str(&format!("  Total amount: {}\n", format_money(stats.sum)));
        out.push_str(&format!("  Mean amount: {}\n", format_money(stats.mean)));
    }
    out.push('\n');

    if !dashboard.type_counts.is_empty() {
        out.push_str("Top contract types:\n");
        for (contract_type, count) in dashboard.top_types(5) {
            let percentage = *count as f64 / overview.contracts.max(1) as f64 * 100.0;
            out.push_str(&format!(
                "  {}: {} ({:.1}%)\n",
                contract_type, count, percentage
            ));
        }
        out.push('\n');
    }

    if let (Some(r), Some(strength)) = (dashboard.correlation, dashboard.correlation_strength()) {
        out.push_str(&format!("Count/amount correlation: {:.2} ({})\n", r, strength));
    }

    out
}
