//! Operational section: expiry horizon, stock distribution and prescriptions.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{group_first_seen, sum_by_key, DatedValue, GroupSummary, LabeledValue};
use crate::config::DashboardConfig;
use crate::models::Panel;
use crate::stats::{gaussian_kde, mean, round_to, BoxSummary, DensityCurve, StatsResult};
use crate::store::TableView;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationalReport {
    /// Mean days to expiry, rounded to an integer
    pub avg_days_to_expiry: Panel<f64>,
    pub stock_in_warehouses: u64,
    pub prescription_medicines: usize,
    /// Mean of the per-category mean stock counts, rounded to an integer
    pub avg_stock_per_category: Panel<f64>,
    pub stock_by_medicine: Vec<LabeledValue>,
    /// Stock summed per expiry date, earliest first
    pub stock_by_expiry_date: Vec<DatedValue>,
    pub days_to_expiry_by_warehouse: Vec<GroupSummary>,
    pub expiry_density: Panel<DensityCurve>,
}

/// Compute the operational report.
pub fn operational(view: &TableView<'_>, config: &DashboardConfig) -> OperationalReport {
    let avg_days_to_expiry = Panel::from_result(
        "avg_days_to_expiry",
        mean(
            "days to expiry",
            view.rows().map(|r| r.record.days_to_expiry as f64),
        )
        .map(|m| round_to(m, 0)),
    );

    let stock_in_warehouses: u64 = view.rows().map(|r| u64::from(r.record.count)).sum();
    let prescription_medicines = view
        .rows()
        .filter(|r| r.record.prescription_required)
        .count();

    let days: Vec<f64> = view
        .rows()
        .map(|r| r.record.days_to_expiry as f64)
        .collect();

    OperationalReport {
        avg_days_to_expiry,
        stock_in_warehouses,
        prescription_medicines,
        avg_stock_per_category: Panel::from_result(
            "avg_stock_per_category",
            category_mean_of_means(view).map(|m| round_to(m, 0)),
        ),
        stock_by_medicine: sum_by_key(
            view.rows(),
            |r| r.record.medicine_name.as_str(),
            |r| f64::from(r.record.count),
        )
        .into_iter()
        .map(|(medicine, stock)| LabeledValue::new(medicine, stock))
        .collect(),
        stock_by_expiry_date: stock_by_expiry_date(view),
        days_to_expiry_by_warehouse: days_to_expiry_by_warehouse(view),
        expiry_density: Panel::from_result(
            "expiry_density",
            gaussian_kde("days to expiry", &days, config.density_points),
        ),
    }
}

/// Average stock per category: the mean count of each category first, then
/// the unweighted mean of those means. A category with one row weighs the
/// same as a category with a hundred.
pub fn category_mean_of_means(view: &TableView<'_>) -> StatsResult<f64> {
    let per_category = group_first_seen(
        view.rows(),
        |r| r.record.category.as_str(),
        |r| f64::from(r.record.count),
    )
    .into_iter()
    .map(|(_, counts)| mean("stock count", counts))
    .collect::<StatsResult<Vec<f64>>>()?;
    mean("category mean stock", per_category)
}

fn stock_by_expiry_date(view: &TableView<'_>) -> Vec<DatedValue> {
    let mut totals = BTreeMap::new();
    for row in view.rows() {
        *totals.entry(row.record.expiry_date).or_insert(0.0) += f64::from(row.record.count);
    }
    totals
        .into_iter()
        .map(|(date, value)| DatedValue { date, value })
        .collect()
}

fn days_to_expiry_by_warehouse(view: &TableView<'_>) -> Vec<GroupSummary> {
    group_first_seen(
        view.rows(),
        |r| r.record.warehouse_location.as_str(),
        |r| r.record.days_to_expiry as f64,
    )
    .into_iter()
    .filter_map(|(warehouse, days)| {
        let summary = BoxSummary::from_values("days to expiry", days).ok()?;
        Some(GroupSummary {
            label: warehouse.to_string(),
            summary,
        })
    })
    .collect()
}
