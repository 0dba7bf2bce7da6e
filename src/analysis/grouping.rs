//! Group-by aggregations over cleaned contracts

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use chrono::Datelike;

use crate::analysis::stats::{mean, pearson, round2, sample_std};
use crate::records::Contract;

/// Counts or sums keyed by a row value, then by contract type
pub type Breakdown<K, V> = BTreeMap<K, BTreeMap<String, V>>;

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// The following calendar month
    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Headline counts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overview {
    pub contracts: usize,
    pub unique_suppliers: usize,
    pub unique_types: usize,
    pub unique_buyers: usize,
}

/// Contract count and amount total for one type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeTotals {
    pub contract_type: String,
    pub count: usize,
    pub total: f64,
}

/// Per-year KPI row, amounts rounded to two decimals
#[derive(Debug, Clone, PartialEq)]
pub struct YearKpi {
    pub year: i32,
    pub contracts: usize,
    pub total: f64,
    pub mean: f64,
    pub std: Option<f64>,
    pub unique_suppliers: usize,
    pub unique_types: usize,
}

/// Per-type export row, amounts rounded to two decimals
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSummary {
    pub contract_type: String,
    pub total: f64,
    pub mean: f64,
    pub count: usize,
    pub unique_suppliers: usize,
}

fn count_unique<'a>(values: impl Iterator<Item = Option<&'a str>>) -> usize {
    values.flatten().collect::<HashSet<_>>().len()
}

/// Computes the headline counts
pub fn overview(contracts: &[Contract]) -> Overview {
    Overview {
        contracts: contracts.len(),
        unique_suppliers: count_unique(contracts.iter().map(|c| c.suppliers.as_deref())),
        unique_types: count_unique(contracts.iter().map(|c| Some(c.contract_type.as_str()))),
        unique_buyers: count_unique(contracts.iter().map(|c| c.buyer.as_deref())),
    }
}

/// Contracts per type, most frequent first; ties ordered by name
pub fn type_counts(contracts: &[Contract]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for contract in contracts {
        *counts.entry(contract.contract_type.as_str()).or_default() += 1;
    }

    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(t, n)| (t.to_string(), n))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// Contracts per calendar month of the contract date
///
/// The series runs from the first to the last month seen, with empty
/// months filled with zero. Contracts without a date are not counted.
pub fn monthly_counts(contracts: &[Contract]) -> Vec<(YearMonth, usize)> {
    let mut counts: BTreeMap<YearMonth, usize> = BTreeMap::new();
    for date in contracts.iter().filter_map(|c| c.date) {
        let key = YearMonth {
            year: date.year(),
            month: date.month(),
        };
        *counts.entry(key).or_default() += 1;
    }

    let (first, last) = match (counts.keys().next(), counts.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Vec::new(),
    };

    let mut series = Vec::new();
    let mut current = first;
    while current <= last {
        series.push((current, counts.get(&current).copied().unwrap_or(0)));
        current = current.next();
    }
    series
}

/// Contract counts by the month column, then by type
pub fn month_type_counts(contracts: &[Contract]) -> Breakdown<u32, usize> {
    let mut breakdown: Breakdown<u32, usize> = BTreeMap::new();
    for contract in contracts {
        if let Some(month) = contract.month {
            *breakdown
                .entry(month)
                .or_default()
                .entry(contract.contract_type.clone())
                .or_default() += 1;
        }
    }
    breakdown
}

/// Amount sums by the month column, then by type
pub fn month_type_amounts(contracts: &[Contract]) -> Breakdown<u32, f64> {
    let mut breakdown: Breakdown<u32, f64> = BTreeMap::new();
    for contract in contracts {
        if let Some(month) = contract.month {
            *breakdown
                .entry(month)
                .or_default()
                .entry(contract.contract_type.clone())
                .or_default() += contract.amount;
        }
    }
    breakdown
}

/// Contract counts by year, then by type
pub fn year_type_counts(contracts: &[Contract]) -> Breakdown<i32, usize> {
    let mut breakdown: Breakdown<i32, usize> = BTreeMap::new();
    for contract in contracts {
        if let Some(year) = contract.year {
            *breakdown
                .entry(year)
                .or_default()
                .entry(contract.contract_type.clone())
                .or_default() += 1;
        }
    }
    breakdown
}

/// Count and amount total per type, keeping only positive totals
///
/// Ordered by type name.
pub fn type_totals(contracts: &[Contract]) -> Vec<TypeTotals> {
    let mut totals: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for contract in contracts {
        let entry = totals.entry(contract.contract_type.as_str()).or_default();
        entry.0 += 1;
        entry.1 += contract.amount;
    }

    totals
        .into_iter()
        .filter(|(_, (_, total))| *total > 0.0)
        .map(|(contract_type, (count, total))| TypeTotals {
            contract_type: contract_type.to_string(),
            count,
            total,
        })
        .collect()
}

/// Correlation between contract count and amount total across types
pub fn count_amount_correlation(totals: &[TypeTotals]) -> Option<f64> {
    let counts: Vec<f64> = totals.iter().map(|t| t.count as f64).collect();
    let amounts: Vec<f64> = totals.iter().map(|t| t.total).collect();
    pearson(&counts, &amounts)
}

fn group_by_year(contracts: &[Contract]) -> BTreeMap<i32, Vec<&Contract>> {
    let mut groups: BTreeMap<i32, Vec<&Contract>> = BTreeMap::new();
    for contract in contracts {
        if let Some(year) = contract.year {
            groups.entry(year).or_default().push(contract);
        }
    }
    groups
}

/// KPI table per year, ascending; contracts without a year are excluded
pub fn yearly_kpis(contracts: &[Contract]) -> Vec<YearKpi> {
    group_by_year(contracts)
        .into_iter()
        .map(|(year, group)| {
            let amounts: Vec<f64> = group.iter().map(|c| c.amount).collect();
            YearKpi {
                year,
                contracts: group.len(),
                total: round2(amounts.iter().sum()),
                mean: mean(&amounts).map(round2).unwrap_or(0.0),
                std: sample_std(&amounts).map(round2),
                unique_suppliers: count_unique(group.iter().map(|c| c.suppliers.as_deref())),
                unique_types: count_unique(group.iter().map(|c| Some(c.contract_type.as_str()))),
            }
        })
        .collect()
}

/// Amount total per year, ascending
pub fn yearly_totals(contracts: &[Contract]) -> Vec<(i32, f64)> {
    group_by_year(contracts)
        .into_iter()
        .map(|(year, group)| (year, group.iter().map(|c| c.amount).sum()))
        .collect()
}

/// Contract counts per year (rows) and month 1..=12 (columns), zero-filled
pub fn year_month_heatmap(contracts: &[Contract]) -> Vec<(i32, [usize; 12])> {
    let mut grid: BTreeMap<i32, [usize; 12]> = BTreeMap::new();
    for contract in contracts {
        if let (Some(year), Some(month)) = (contract.year, contract.month) {
            if (1..=12).contains(&month) {
                grid.entry(year).or_insert([0; 12])[(month - 1) as usize] += 1;
            }
        }
    }
    grid.into_iter().collect()
}

/// Per-type amount summary, ordered by type name
pub fn type_summary(contracts: &[Contract]) -> Vec<TypeSummary> {
    let mut groups: BTreeMap<&str, Vec<&Contract>> = BTreeMap::new();
    for contract in contracts {
        groups
            .entry(contract.contract_type.as_str())
            .or_default()
            .push(contract);
    }

    groups
        .into_iter()
        .map(|(contract_type, group)| {
            let amounts: Vec<f64> = group.iter().map(|c| c.amount).collect();
            TypeSummary {
                contract_type: contract_type.to_string(),
                total: round2(amounts.iter().sum()),
                mean: mean(&amounts).map(round2).unwrap_or(0.0),
                count: group.len(),
                unique_suppliers: count_unique(group.iter().map(|c| c.suppliers.as_deref())),
            }
        })
        .collect()
}
