//! Aggregations behind the dashboard
//!
//! This module turns cleaned contracts into every table and series the
//! report, charts and exports need:
//! - Headline counts and amount statistics
//! - Frequency and amount breakdowns by type, month and year
//! - Count/amount correlation across contract types
//! - Year-over-year findings

mod grouping;
pub mod stats;

pub use grouping::{
    count_amount_correlation, month_type_amounts, month_type_counts, monthly_counts, overview,
    type_counts, type_summary, type_totals, year_month_heatmap, year_type_counts, yearly_kpis,
    yearly_totals, Breakdown, Overview, TypeSummary, TypeTotals, YearKpi, YearMonth,
};
pub use stats::{describe, AmountStats};

use crate::records::Contract;
use std::fmt;

/// Types shown in the frequency bar chart
pub const TOP_TYPES_BAR: usize = 10;

/// Types shown in the share chart
pub const TOP_TYPES_SHARE: usize = 8;

/// Qualitative reading of a correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationStrength {
    StrongPositive,
    ModeratePositive,
    WeakPositive,
    Negative,
}

impl CorrelationStrength {
    /// Classifies a coefficient: above 0.7 strong, above 0.3 moderate,
    /// above 0 weak, otherwise negative
    pub fn classify(r: f64) -> Self {
        if r > 0.7 {
            Self::StrongPositive
        } else if r > 0.3 {
            Self::ModeratePositive
        } else if r > 0.0 {
            Self::WeakPositive
        } else {
            Self::Negative
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::StrongPositive => "strong positive",
            Self::ModeratePositive => "moderate positive",
            Self::WeakPositive => "weak positive",
            Self::Negative => "negative",
        };
        f.write_str(label)
    }
}

/// Year-over-year observations; only produced with more than one year
#[derive(Debug, Clone, PartialEq)]
pub struct Findings {
    /// Year with the largest amount total
    pub top_year: i32,

    /// Year with the smallest amount total
    pub bottom_year: i32,

    /// Percentage change from the first to the last year's total;
    /// undefined when the first year's total is zero
    pub growth_pct: Option<f64>,
}

impl Findings {
    /// Derives findings from the yearly KPI table (ascending by year)
    pub fn from_kpis(kpis: &[YearKpi]) -> Option<Self> {
        if kpis.len() < 2 {
            return None;
        }

        // first maximum / minimum wins on ties
        let mut top = &kpis[0];
        let mut bottom = &kpis[0];
        for kpi in &kpis[1..] {
            if kpi.total > top.total {
                top = kpi;
            }
            if kpi.total < bottom.total {
                bottom = kpi;
            }
        }

        let first = kpis[0].total;
        let last = kpis[kpis.len() - 1].total;
        let growth_pct = (first != 0.0).then(|| (last - first) / first * 100.0);

        Some(Self {
            top_year: top.year,
            bottom_year: bottom.year,
            growth_pct,
        })
    }

    /// "growth" or "decline" depending on the sign of the change
    pub fn trend_label(&self) -> Option<&'static str> {
        self.growth_pct
            .map(|g| if g > 0.0 { "growth" } else { "decline" })
    }
}

/// Every aggregate the outputs render
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub overview: Overview,
    pub amounts: Option<AmountStats>,
    pub type_counts: Vec<(String, usize)>,
    pub monthly_counts: Vec<(YearMonth, usize)>,
    pub month_type_counts: Breakdown<u32, usize>,
    pub type_totals: Vec<TypeTotals>,
    pub correlation: Option<f64>,
    pub month_type_amounts: Breakdown<u32, f64>,
    pub yearly_kpis: Vec<YearKpi>,
    pub year_type_counts: Breakdown<i32, usize>,
    pub yearly_totals: Vec<(i32, f64)>,
    pub heatmap: Vec<(i32, [usize; 12])>,
    pub findings: Option<Findings>,
    pub type_summary: Vec<TypeSummary>,
}

impl Dashboard {
    /// Reading of the count/amount correlation, if defined
    pub fn correlation_strength(&self) -> Option<CorrelationStrength> {
        self.correlation.map(CorrelationStrength::classify)
    }

    /// The most frequent types, at most `n`
    pub fn top_types(&self, n: usize) -> &[(String, usize)] {
        &self.type_counts[..self.type_counts.len().min(n)]
    }
}

/// Computes every aggregate over the cleaned contracts
pub fn analyze(contracts: &[Contract]) -> Dashboard {
    let amounts: Vec<f64> = contracts.iter().map(|c| c.amount).collect();
    let type_totals = type_totals(contracts);
    let correlation = count_amount_correlation(&type_totals);
    let yearly_kpis = yearly_kpis(contracts);
    let findings = Findings::from_kpis(&yearly_kpis);

    tracing::debug!(
        "Analyzed {} contracts across {} types and {} years",
        contracts.len(),
        type_totals.len(),
        yearly_kpis.len()
    );

    Dashboard {
        overview: overview(contracts),
        amounts: describe(&amounts),
        type_counts: type_counts(contracts),
        monthly_counts: monthly_counts(contracts),
        month_type_counts: month_type_counts(contracts),
        type_totals,
        correlation,
        month_type_amounts: month_type_amounts(contracts),
        yearly_kpis,
        year_type_counts: year_type_counts(contracts),
        yearly_totals: yearly_totals(contracts),
        heatmap: year_month_heatmap(contracts),
        findings,
        type_summary: type_summary(contracts),
    }
}
