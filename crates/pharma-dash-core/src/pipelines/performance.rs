//! Performance section: sales volume, top sellers, margin gauge and revenue target.

use serde::Serialize;

use super::{group_first_seen, sum_by_key, top_n_desc, LabeledValue};
use crate::config::DashboardConfig;
use crate::models::{InventoryRow, Panel};
use crate::stats::{mean, mean_present, round_to, DegenerateInput, StatsResult};
use crate::store::TableView;

/// Units sold on a single row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesEntry {
    pub medicine: String,
    pub units_sold: u32,
}

/// Row share of one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub label: String,
    pub rows: usize,
    pub fraction: f64,
}

/// Qualitative band of a value against two ascending band edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Low,
    Medium,
    High,
}

impl Band {
    pub fn classify(value: f64, edges: [f64; 2]) -> Self {
        if value < edges[0] {
            Band::Low
        } else if value < edges[1] {
            Band::Medium
        } else {
            Band::High
        }
    }
}

/// A value on a fixed-scale gauge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauge {
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub bands: [f64; 2],
    pub band: Band,
}

/// Total revenue against the configured target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueTarget {
    pub total_revenue: f64,
    pub target: f64,
    /// (total − target) / target
    pub relative_delta: f64,
    pub band: Band,
}

impl RevenueTarget {
    pub fn new(total_revenue: f64, target: f64, bands: [f64; 2]) -> Self {
        let attainment = total_revenue / target;
        Self {
            total_revenue,
            target,
            relative_delta: attainment - 1.0,
            band: Band::classify(attainment, bands),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub total_units_sold: u64,
    /// Medicines whose summed units sold exceed the high-demand threshold
    pub high_demand_medicines: usize,
    /// Mean units sold per row, rounded to an integer
    pub avg_units_sold: Panel<f64>,
    pub top_seller: Panel<String>,
    /// Rows with the most units sold, largest first
    pub top_sellers: Vec<SalesEntry>,
    pub dosage_form_share: Vec<Share>,
    pub margin_gauge: Panel<Gauge>,
    pub revenue_by_category: Vec<LabeledValue>,
    pub revenue_target: RevenueTarget,
}

/// Compute the performance report.
pub fn performance(view: &TableView<'_>, config: &DashboardConfig) -> PerformanceReport {
    let total_units_sold: u64 = view.rows().map(|r| u64::from(r.record.units_sold)).sum();

    let high_demand_medicines = sum_by_key(
        view.rows(),
        |r| r.record.medicine_name.as_str(),
        |r| f64::from(r.record.units_sold),
    )
    .into_iter()
    .filter(|(_, units)| *units > config.high_demand_threshold)
    .count();

    let avg_units_sold = Panel::from_result(
        "avg_units_sold",
        mean("units sold", view.rows().map(|r| f64::from(r.record.units_sold)))
            .map(|m| round_to(m, 0)),
    );

    let margin_gauge = Panel::from_result(
        "margin_gauge",
        mean_present("profit margin", view.rows().map(|r| r.margin_pct())).map(|value| Gauge {
            value,
            min: 0.0,
            max: 100.0,
            bands: config.gauge_bands,
            band: Band::classify(value, config.gauge_bands),
        }),
    );

    let total_revenue: f64 = view.rows().map(|r| r.derived.total_revenue).sum();

    PerformanceReport {
        total_units_sold,
        high_demand_medicines,
        avg_units_sold,
        top_seller: Panel::from_result("top_seller", top_seller(view)),
        top_sellers: top_sellers(view, config.top_n),
        dosage_form_share: dosage_form_share(view),
        margin_gauge,
        revenue_by_category: sum_by_key(
            view.rows(),
            |r| r.record.category.as_str(),
            |r| r.derived.total_revenue,
        )
        .into_iter()
        .map(|(category, revenue)| LabeledValue::new(category, revenue))
        .collect(),
        revenue_target: RevenueTarget::new(
            total_revenue,
            config.revenue_target,
            config.revenue_bands,
        ),
    }
}

/// Medicine on the row with the most units sold. Ties go to the earliest row.
pub fn top_seller(view: &TableView<'_>) -> StatsResult<String> {
    let mut best: Option<&InventoryRow> = None;
    for row in view.rows() {
        if best.map_or(true, |b| row.record.units_sold > b.record.units_sold) {
            best = Some(row);
        }
    }
    best.map(|row| row.record.medicine_name.clone())
        .ok_or(DegenerateInput::EmptyInput("units sold"))
}

/// The `n` rows with the most units sold; ties keep row order.
pub fn top_sellers(view: &TableView<'_>, n: usize) -> Vec<SalesEntry> {
    let entries = view
        .rows()
        .map(|r| SalesEntry {
            medicine: r.record.medicine_name.clone(),
            units_sold: r.record.units_sold,
        })
        .collect();
    top_n_desc(entries, n, |e| f64::from(e.units_sold))
}

fn dosage_form_share(view: &TableView<'_>) -> Vec<Share> {
    let total = view.len();
    group_first_seen(view.rows(), |r| r.record.dosage_form.as_str(), |_| ())
        .into_iter()
        .map(|(form, rows)| Share {
            label: form.to_string(),
            rows: rows.len(),
            fraction: rows.len() as f64 / total as f64,
        })
        .collect()
}
