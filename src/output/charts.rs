//! SVG chart rendering
//!
//! Every chart is a standalone SVG file drawn with plotters. Category axes
//! (types, months, years) are laid out on an `f64` axis with one unit per
//! category so bars, stacks and lines share the same mesh helper.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;
use std::path::Path;

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::analysis::{Breakdown, Dashboard, TypeTotals, TOP_TYPES_BAR, TOP_TYPES_SHARE};
use crate::output::{OutputError, OutputResult};

const CHART_SIZE: (u32, u32) = (1024, 576);

const LABEL_WIDTH: usize = 18;

const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 73, 94),
    RGBColor(26, 188, 156),
    RGBColor(52, 152, 219),
    RGBColor(155, 89, 182),
    RGBColor(241, 196, 15),
    RGBColor(230, 126, 34),
    RGBColor(231, 76, 60),
    RGBColor(149, 165, 166),
    RGBColor(39, 174, 96),
    RGBColor(127, 140, 141),
];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

type CategoryChart<'a, 'b> =
    ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

impl From<DrawingAreaErrorKind<std::io::Error>> for OutputError {
    fn from(e: DrawingAreaErrorKind<std::io::Error>) -> Self {
        OutputError::Chart(e.to_string())
    }
}

/// The charts a dashboard can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    TypeCounts,
    MonthlyTrend,
    MonthTypeStacked,
    TypeShare,
    AmountVsCount,
    MonthTypeAmounts,
    YearTypeStacked,
    YearlyAmounts,
    YearMonthHeatmap,
}

impl ChartKind {
    /// Every chart, in report order
    pub const ALL: [ChartKind; 9] = [
        ChartKind::TypeCounts,
        ChartKind::MonthlyTrend,
        ChartKind::MonthTypeStacked,
        ChartKind::TypeShare,
        ChartKind::AmountVsCount,
        ChartKind::MonthTypeAmounts,
        ChartKind::YearTypeStacked,
        ChartKind::YearlyAmounts,
        ChartKind::YearMonthHeatmap,
    ];

    /// SVG file name inside the charts directory
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::TypeCounts => "type_counts.svg",
            Self::MonthlyTrend => "monthly_trend.svg",
            Self::MonthTypeStacked => "month_type_stacked.svg",
            Self::TypeShare => "type_share.svg",
            Self::AmountVsCount => "amount_vs_count.svg",
            Self::MonthTypeAmounts => "month_type_amounts.svg",
            Self::YearTypeStacked => "year_type_stacked.svg",
            Self::YearlyAmounts => "yearly_amounts.svg",
            Self::YearMonthHeatmap => "year_month_heatmap.svg",
        }
    }

    /// Chart caption
    pub fn title(&self) -> &'static str {
        match self {
            Self::TypeCounts => "Top 10 contract types",
            Self::MonthlyTrend => "Contracts per month",
            Self::MonthTypeStacked => "Monthly distribution by contract type",
            Self::TypeShare => "Share of contracts by type",
            Self::AmountVsCount => "Total amount vs. number of contracts",
            Self::MonthTypeAmounts => "Monthly amount by contract type",
            Self::YearTypeStacked => "Contract types per year",
            Self::YearlyAmounts => "Total amount per year",
            Self::YearMonthHeatmap => "Activity by year and month",
        }
    }

    /// Whether the dashboard holds data for this chart
    pub fn has_data(&self, dashboard: &Dashboard) -> bool {
        match self {
            Self::TypeCounts | Self::TypeShare => !dashboard.type_counts.is_empty(),
            Self::MonthlyTrend => !dashboard.monthly_counts.is_empty(),
            Self::MonthTypeStacked => !dashboard.month_type_counts.is_empty(),
            Self::AmountVsCount => !dashboard.type_totals.is_empty(),
            Self::MonthTypeAmounts => !dashboard.month_type_amounts.is_empty(),
            Self::YearTypeStacked => !dashboard.year_type_counts.is_empty(),
            Self::YearlyAmounts => !dashboard.yearly_totals.is_empty(),
            Self::YearMonthHeatmap => !dashboard.heatmap.is_empty(),
        }
    }
}

/// Renders every chart that has data into `directory`
///
/// # Returns
///
/// The charts that were written, in report order
pub fn render_charts(directory: &Path, dashboard: &Dashboard) -> OutputResult<Vec<ChartKind>> {
    std::fs::create_dir_all(directory)?;

    let mut rendered = Vec::new();
    for kind in ChartKind::ALL {
        if !kind.has_data(dashboard) {
            tracing::debug!("Skipping chart '{}': no data", kind.title());
            continue;
        }
        let path = directory.join(kind.file_name());
        render_chart(kind, &path, dashboard)?;
        tracing::debug!("Rendered {}", path.display());
        rendered.push(kind);
    }

    Ok(rendered)
}

fn render_chart(kind: ChartKind, path: &Path, d: &Dashboard) -> OutputResult<()> {
    let title = kind.title();
    match kind {
        ChartKind::TypeCounts => {
            let top = d.top_types(TOP_TYPES_BAR);
            let labels: Vec<String> = top.iter().map(|(t, _)| t.clone()).collect();
            let values: Vec<f64> = top.iter().map(|(_, n)| *n as f64).collect();
            bar_chart(path, title, &labels, &values, "Contract type", "Contracts")
        }
        ChartKind::MonthlyTrend => {
            let labels: Vec<String> = d.monthly_counts.iter().map(|(m, _)| m.to_string()).collect();
            let values: Vec<Option<f64>> =
                d.monthly_counts.iter().map(|(_, n)| Some(*n as f64)).collect();
            line_chart(
                path,
                title,
                &labels,
                &[("Contracts".to_string(), values)],
                "Month",
                "Contracts",
            )
        }
        ChartKind::MonthTypeStacked => {
            let (labels, stacks) =
                stacks_from(&d.month_type_counts, |m| month_name(*m), |n| n as f64);
            stacked_bar_chart(path, title, &labels, &stacks, "Month", "Contracts")
        }
        ChartKind::TypeShare => donut_chart(path, title, d.top_types(TOP_TYPES_SHARE)),
        ChartKind::AmountVsCount => {
            let caption = match d.correlation {
                Some(r) => format!("{} (correlation: {:.2})", title, r),
                None => title.to_string(),
            };
            scatter_chart(path, &caption, &d.type_totals)
        }
        ChartKind::MonthTypeAmounts => {
            let (labels, series) = series_from(&d.month_type_amounts, |m| month_name(*m));
            line_chart(path, title, &labels, &series, "Month", "Total amount (USD)")
        }
        ChartKind::YearTypeStacked => {
            let (labels, stacks) =
                stacks_from(&d.year_type_counts, |y| y.to_string(), |n| n as f64);
            stacked_bar_chart(path, title, &labels, &stacks, "Year", "Contracts")
        }
        ChartKind::YearlyAmounts => {
            let labels: Vec<String> = d.yearly_totals.iter().map(|(y, _)| y.to_string()).collect();
            let values: Vec<Option<f64>> = d.yearly_totals.iter().map(|(_, t)| Some(*t)).collect();
            line_chart(
                path,
                title,
                &labels,
                &[("Total amount".to_string(), values)],
                "Year",
                "Total amount (USD)",
            )
        }
        ChartKind::YearMonthHeatmap => heatmap_chart(path, title, &d.heatmap),
    }
}

fn palette(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

fn month_name(month: u32) -> String {
    month
        .checked_sub(1)
        .and_then(|i| MONTHS.get(i as usize))
        .map(|m| m.to_string())
        .unwrap_or_else(|| month.to_string())
}

fn truncate(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        label.to_string()
    } else {
        let mut short: String = label.chars().take(width.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

/// Label for a category axis tick; blank between categories
fn category_label(labels: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels
        .get(index as usize)
        .map(|l| truncate(l, LABEL_WIDTH))
        .unwrap_or_default()
}

/// Short axis number: 1.5M, 12k, 3
fn compact_number(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Axis upper bound with headroom; 1 for empty or non-positive data
fn upper_bound(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Converts a breakdown into category labels and per-category stacks
fn stacks_from<K, V: Copy>(
    breakdown: &Breakdown<K, V>,
    label: impl Fn(&K) -> String,
    value: impl Fn(V) -> f64,
) -> (Vec<String>, Vec<BTreeMap<String, f64>>) {
    breakdown
        .iter()
        .map(|(key, row)| {
            let stack = row.iter().map(|(t, v)| (t.clone(), value(*v))).collect();
            (label(key), stack)
        })
        .unzip()
}

/// Converts a breakdown into category labels and one series per type
fn series_from<K>(
    breakdown: &Breakdown<K, f64>,
    label: impl Fn(&K) -> String,
) -> (Vec<String>, Vec<(String, Vec<Option<f64>>)>) {
    let labels = breakdown.keys().map(label).collect();
    let types: BTreeSet<&String> = breakdown.values().flat_map(|row| row.keys()).collect();
    let series = types
        .into_iter()
        .map(|t| {
            let values = breakdown.values().map(|row| row.get(t).copied()).collect();
            (t.clone(), values)
        })
        .collect();
    (labels, series)
}

fn category_chart<'a, 'b>(
    root: &'a DrawingArea<SVGBackend<'b>, plotters::coord::Shift>,
    title: &str,
    categories: usize,
    y_max: f64,
) -> OutputResult<CategoryChart<'a, 'b>> {
    let chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..(categories as f64 - 0.5), 0f64..upper_bound(y_max))?;
    Ok(chart)
}

fn draw_category_mesh(
    chart: &mut CategoryChart<'_, '_>,
    labels: &[String],
    x_desc: &str,
    y_desc: &str,
) -> OutputResult<()> {
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len().max(2))
        .x_label_formatter(&|x| category_label(labels, *x))
        .y_label_formatter(&|y| compact_number(*y))
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;
    Ok(())
}

fn draw_legend<'a, 'b: 'a>(chart: &mut CategoryChart<'a, 'b>) -> OutputResult<()> {
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn bar_chart(
    path: &Path,
    title: &str,
    labels: &[String],
    values: &[f64],
    x_desc: &str,
    y_desc: &str,
) -> OutputResult<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let max = values.iter().copied().fold(0.0, f64::max);
    let mut chart = category_chart(&root, title, labels.len(), max)?;
    draw_category_mesh(&mut chart, labels, x_desc, y_desc)?;

    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *v)], palette(i).filled())
    }))?;

    let label_style = TextStyle::from(("sans-serif", 14).into_font())
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Text::new(compact_number(*v), (i as f64, *v), label_style.clone())),
    )?;

    root.present()?;
    Ok(())
}

fn stacked_bar_chart(
    path: &Path,
    title: &str,
    labels: &[String],
    stacks: &[BTreeMap<String, f64>],
    x_desc: &str,
    y_desc: &str,
) -> OutputResult<()> {
    let types: BTreeSet<&String> = stacks.iter().flat_map(|s| s.keys()).collect();
    let max = stacks
        .iter()
        .map(|s| s.values().sum::<f64>())
        .fold(0.0, f64::max);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = category_chart(&root, title, labels.len(), max)?;
    draw_category_mesh(&mut chart, labels, x_desc, y_desc)?;

    let mut bases = vec![0.0; stacks.len()];
    for (ti, contract_type) in types.into_iter().enumerate() {
        let color = palette(ti);
        let mut bars = Vec::new();
        for (i, stack) in stacks.iter().enumerate() {
            let value = stack.get(contract_type).copied().unwrap_or(0.0);
            if value > 0.0 {
                let x = i as f64;
                bars.push(Rectangle::new(
                    [(x - 0.4, bases[i]), (x + 0.4, bases[i] + value)],
                    color.filled(),
                ));
                bases[i] += value;
            }
        }

        chart
            .draw_series(bars)?
            .label(truncate(contract_type, LABEL_WIDTH * 2))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    draw_legend(&mut chart)?;
    root.present()?;
    Ok(())
}

fn line_chart(
    path: &Path,
    title: &str,
    labels: &[String],
    series: &[(String, Vec<Option<f64>>)],
    x_desc: &str,
    y_desc: &str,
) -> OutputResult<()> {
    let max = series
        .iter()
        .flat_map(|(_, values)| values.iter().flatten())
        .copied()
        .fold(0.0, f64::max);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = category_chart(&root, title, labels.len(), max)?;
    draw_category_mesh(&mut chart, labels, x_desc, y_desc)?;

    for (si, (name, values)) in series.iter().enumerate() {
        let color = palette(si);
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
            .label(truncate(name, LABEL_WIDTH * 2))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart.draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))?;
    }

    if series.len() > 1 {
        draw_legend(&mut chart)?;
    }
    root.present()?;
    Ok(())
}

fn scatter_chart(path: &Path, title: &str, totals: &[TypeTotals]) -> OutputResult<()> {
    let max_count = totals.iter().map(|t| t.count).max().unwrap_or(0) as f64;
    let max_total = totals.iter().map(|t| t.total).fold(0.0, f64::max);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..upper_bound(max_count), 0f64..upper_bound(max_total))?;

    chart
        .configure_mesh()
        .y_label_formatter(&|y| compact_number(*y))
        .x_desc("Contracts")
        .y_desc("Total amount (USD)")
        .draw()?;

    for (i, t) in totals.iter().enumerate() {
        let color = palette(i);
        let radius = 4 + ((t.total / upper_bound(max_total)).sqrt() * 24.0) as i32;
        chart
            .draw_series(std::iter::once(Circle::new(
                (t.count as f64, t.total),
                radius,
                color.mix(0.7).filled(),
            )))?
            .label(truncate(&t.contract_type, LABEL_WIDTH * 2))
            .legend(move |(x, y)| Circle::new((x + 5, y), 5, color.filled()));
    }

    draw_legend(&mut chart)?;
    root.present()?;
    Ok(())
}

fn donut_chart(path: &Path, title: &str, slices: &[(String, usize)]) -> OutputResult<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(title, ("sans-serif", 24))?;

    let (_, height) = area.dim_in_pixel();
    let outer = height as f64 * 0.42;
    let inner = outer * 0.6;
    let center = (outer + 40.0, height as f64 / 2.0);
    let total: usize = slices.iter().map(|(_, n)| *n).sum();
    if total == 0 {
        root.present()?;
        return Ok(());
    }

    let arc_point = |angle: f64, radius: f64| {
        (
            (center.0 + radius * angle.cos()).round() as i32,
            (center.1 + radius * angle.sin()).round() as i32,
        )
    };

    let mut start = -PI / 2.0;
    for (i, (name, count)) in slices.iter().enumerate() {
        let sweep = *count as f64 / total as f64 * 2.0 * PI;
        let steps = ((sweep / (PI / 90.0)).ceil() as usize).max(2);

        let mut points: Vec<(i32, i32)> = (0..=steps)
            .map(|s| arc_point(start + sweep * s as f64 / steps as f64, outer))
            .collect();
        points.extend(
            (0..=steps)
                .rev()
                .map(|s| arc_point(start + sweep * s as f64 / steps as f64, inner)),
        );
        area.draw(&Polygon::new(points, palette(i).filled()))?;

        let legend_x = (center.0 + outer + 60.0) as i32;
        let legend_y = 40 + i as i32 * 28;
        area.draw(&Rectangle::new(
            [(legend_x, legend_y), (legend_x + 16, legend_y + 16)],
            palette(i).filled(),
        ))?;
        area.draw(&Text::new(
            format!(
                "{} ({:.1}%)",
                truncate(name, LABEL_WIDTH * 2),
                *count as f64 / total as f64 * 100.0
            ),
            (legend_x + 24, legend_y),
            ("sans-serif", 16).into_font(),
        ))?;

        start += sweep;
    }

    root.present()?;
    Ok(())
}

/// Linear blend from a pale to a dark blue by `value / max`
fn heat_color(value: usize, max: usize) -> RGBColor {
    let t = if max == 0 {
        0.0
    } else {
        value as f64 / max as f64
    };
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(lerp(236, 8), lerp(240, 48), lerp(241, 107))
}

fn heatmap_chart(path: &Path, title: &str, rows: &[(i32, [usize; 12])]) -> OutputResult<()> {
    let max = rows
        .iter()
        .flat_map(|(_, counts)| counts.iter())
        .copied()
        .max()
        .unwrap_or(0);
    let year_labels: Vec<String> = rows.iter().map(|(y, _)| y.to_string()).collect();
    let month_labels: Vec<String> = MONTHS.iter().map(|m| m.to_string()).collect();

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..11.5f64, -0.5f64..(rows.len() as f64 - 0.5))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(12)
        .y_labels(rows.len().max(2))
        .x_label_formatter(&|x| category_label(&month_labels, *x))
        .y_label_formatter(&|y| category_label(&year_labels, *y))
        .x_desc("Month")
        .y_desc("Year")
        .draw()?;

    let cells = rows.iter().enumerate().flat_map(|(r, (_, counts))| {
        counts.iter().enumerate().map(move |(m, count)| (m as f64, r as f64, *count))
    });

    chart.draw_series(cells.clone().map(|(x, y, count)| {
        Rectangle::new(
            [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
            heat_color(count, max).filled(),
        )
    }))?;

    let centered = Pos::new(HPos::Center, VPos::Center);
    let dark = TextStyle::from(("sans-serif", 13).into_font()).pos(centered);
    let light = dark.color(&WHITE);
    chart.draw_series(cells.filter(|(_, _, count)| *count > 0).map(|(x, y, count)| {
        let style = if count * 2 > max { light.clone() } else { dark.clone() };
        Text::new(count.to_string(), (x, y), style)
    }))?;

    root.present()?;
    Ok(())
}
