//! Overview section: stock levels, revenue leaders and expiring items.

use std::collections::HashSet;

use serde::Serialize;

use super::{group_first_seen, sum_by_key, top_n_desc, GroupSummary, LabeledValue};
use crate::config::DashboardConfig;
use crate::models::Panel;
use crate::stats::{mean, round_to, BoxSummary};
use crate::store::TableView;

/// A row expiring within the configured window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpiringItem {
    pub medicine: String,
    pub days_to_expiry: i64,
    pub category: String,
}

/// Stock against reorder level for one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockLevel {
    pub medicine: String,
    pub count: u32,
    pub reorder_level: u32,
    pub stock_gap: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewReport {
    pub unique_medicines: usize,
    /// Mean stock count, rounded to an integer
    pub avg_units_in_stock: Panel<f64>,
    /// Stock count of rows expiring within the window
    pub expiring_soon_stock: u64,
    pub total_batches: usize,
    /// Medicines ranked by summed revenue, largest first
    pub top_medicines_by_revenue: Vec<LabeledValue>,
    /// Rows expiring within the window, soonest first
    pub expiring_soon: Vec<ExpiringItem>,
    pub selling_price_by_category: Vec<GroupSummary>,
    pub stock_vs_reorder: Vec<StockLevel>,
    pub profit_margin_distribution: Panel<BoxSummary>,
}

/// Compute the overview report.
pub fn overview(view: &TableView<'_>, config: &DashboardConfig) -> OverviewReport {
    let window = config.expiry_window_days;

    let unique_medicines = view
        .rows()
        .map(|r| r.record.medicine_name.as_str())
        .collect::<HashSet<_>>()
        .len();
    let total_batches = view
        .rows()
        .map(|r| r.record.batch_number.as_str())
        .collect::<HashSet<_>>()
        .len();

    let avg_units_in_stock = Panel::from_result(
        "avg_units_in_stock",
        mean("stock count", view.rows().map(|r| f64::from(r.record.count)))
            .map(|m| round_to(m, 0)),
    );

    let expiring_soon_stock: u64 = view
        .rows()
        .filter(|r| r.record.days_to_expiry <= window)
        .map(|r| u64::from(r.record.count))
        .sum();

    OverviewReport {
        unique_medicines,
        avg_units_in_stock,
        expiring_soon_stock,
        total_batches,
        top_medicines_by_revenue: top_medicines_by_revenue(view, config.top_n),
        expiring_soon: expiring_soon(view, window),
        selling_price_by_category: selling_price_by_category(view),
        stock_vs_reorder: view
            .rows()
            .map(|r| StockLevel {
                medicine: r.record.medicine_name.clone(),
                count: r.record.count,
                reorder_level: r.record.reorder_level,
                stock_gap: r.derived.stock_gap,
            })
            .collect(),
        profit_margin_distribution: Panel::from_result(
            "profit_margin_distribution",
            BoxSummary::from_values("profit margin", view.rows().filter_map(|r| r.margin_pct())),
        ),
    }
}

/// Revenue summed per medicine, the `n` largest in descending order.
/// Equal totals keep medicine-name order.
pub fn top_medicines_by_revenue(view: &TableView<'_>, n: usize) -> Vec<LabeledValue> {
    let totals = sum_by_key(
        view.rows(),
        |r| r.record.medicine_name.as_str(),
        |r| r.derived.total_revenue,
    );
    top_n_desc(totals, n, |(_, total)| *total)
        .into_iter()
        .map(|(name, total)| LabeledValue::new(name, total))
        .collect()
}

/// Rows with days to expiry within `window`, sorted soonest first.
pub fn expiring_soon(view: &TableView<'_>, window: i64) -> Vec<ExpiringItem> {
    let mut items: Vec<ExpiringItem> = view
        .rows()
        .filter(|r| r.record.days_to_expiry <= window)
        .map(|r| ExpiringItem {
            medicine: r.record.medicine_name.clone(),
            days_to_expiry: r.record.days_to_expiry,
            category: r.record.category.clone(),
        })
        .collect();
    items.sort_by_key(|item| item.days_to_expiry);
    items
}

fn selling_price_by_category(view: &TableView<'_>) -> Vec<GroupSummary> {
    group_first_seen(
        view.rows(),
        |r| r.record.category.as_str(),
        |r| r.record.selling_price,
    )
    .into_iter()
    .filter_map(|(category, prices)| {
        // Groups are never empty, so the summary always exists.
        let summary = BoxSummary::from_values("selling price", prices).ok()?;
        Some(GroupSummary {
            label: category.to_string(),
            summary,
        })
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::fixtures::{item, sale};
    use crate::store::Table;

    fn expiring(name: &str, days: i64, count: u32) -> crate::models::InventoryRecord {
        let mut record = item(name, "Analgesic");
        record.days_to_expiry = days;
        record.count = count;
        record
    }

    #[test]
    fn test_kpis() {
        let mut a = expiring("Paracetamol", 10, 100);
        a.batch_number = "BATCH-1".into();
        let mut b = expiring("Paracetamol", 200, 51);
        b.batch_number = "BATCH-2".into();
        let mut c = expiring("Aspirin", 30, 20);
        c.batch_number = "BATCH-1".into();
        let table = Table::from_records(vec![a, b, c]);

        let report = overview(&table.view(), &DashboardConfig::default());
        assert_eq!(report.unique_medicines, 2);
        assert_eq!(report.total_batches, 2);
        // (100 + 51 + 20) / 3 = 57
        assert_eq!(report.avg_units_in_stock.value(), Some(&57.0));
        assert_eq!(report.expiring_soon_stock, 120);
    }

    #[test]
    fn test_top_medicines_sorted_descending_and_capped() {
        let records: Vec<_> = (0..12)
            .map(|i| sale(&format!("Med{i:02}"), "X", 1.0, 2.0, i))
            .chain([sale("Med03", "X", 1.0, 2.0, 20)])
            .collect();
        let table = Table::from_records(records);

        let top = top_medicines_by_revenue(&table.view(), 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0], LabeledValue::new("Med03", 46.0));
        assert_eq!(top[1], LabeledValue::new("Med11", 22.0));
        assert!(top.windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn test_top_medicines_short_when_few_medicines() {
        let table = Table::from_records(vec![
            sale("A", "X", 1.0, 2.0, 5),
            sale("B", "X", 1.0, 2.0, 5),
            sale("A", "X", 1.0, 2.0, 1),
        ]);
        let top = top_medicines_by_revenue(&table.view(), 10);
        assert_eq!(
            top,
            vec![LabeledValue::new("A", 12.0), LabeledValue::new("B", 10.0)]
        );
    }

    #[test]
    fn test_expiring_soon_sorted_ascending() {
        let table = Table::from_records(vec![
            expiring("A", 25, 1),
            expiring("B", 31, 1),
            expiring("C", 0, 1),
            expiring("D", 30, 1),
        ]);
        let items = expiring_soon(&table.view(), 30);
        let names: Vec<_> = items.iter().map(|i| i.medicine.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "D"]);
    }

    #[test]
    fn test_distributions() {
        let mut a = sale("A", "Analgesic", 1.0, 10.0, 1);
        a.listed_margin_pct = Some(20.0);
        let mut b = sale("B", "Antibiotic", 1.0, 30.0, 1);
        b.listed_margin_pct = Some(40.0);
        let c = sale("C", "Analgesic", 1.0, 20.0, 0);
        let table = Table::from_records(vec![a, b, c]);

        let report = overview(&table.view(), &DashboardConfig::default());
        let labels: Vec<_> = report
            .selling_price_by_category
            .iter()
            .map(|g| g.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Analgesic", "Antibiotic"]);
        assert_eq!(report.selling_price_by_category[0].summary.median, 15.0);

        // C has no revenue and no listed margin, so it is left out.
        let margins = report.profit_margin_distribution.value().unwrap();
        assert_eq!(margins.count, 2);
        assert_eq!(margins.median, 30.0);

        assert_eq!(report.stock_vs_reorder.len(), 3);
    }

    #[test]
    fn test_empty_view_degrades_to_placeholders() {
        let table = Table::default();
        let report = overview(&table.view(), &DashboardConfig::default());
        assert_eq!(report.unique_medicines, 0);
        assert!(!report.avg_units_in_stock.is_ready());
        assert!(!report.profit_margin_distribution.is_ready());
        assert!(report.top_medicines_by_revenue.is_empty());
    }
}
