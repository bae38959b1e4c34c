//! Financial section: prices, discounts, margins and revenue breakdowns.

use serde::Serialize;

use super::{group_first_seen, LabeledValue};
use crate::models::Panel;
use crate::stats::{mean, mean_present, round_to, StatsResult};
use crate::store::TableView;

/// Revenue and profit summed for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryFinancials {
    pub category: String,
    pub total_revenue: f64,
    pub total_profit: f64,
}

/// One scatter point per row, sized by units sold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueProfitPoint {
    pub medicine: String,
    pub category: String,
    pub total_revenue: f64,
    pub profit: f64,
    pub units_sold: u32,
}

/// Summed margin of one category and of its medicines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginBranch {
    pub category: String,
    pub total_margin: f64,
    pub medicines: Vec<LabeledValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialReport {
    pub avg_cost_price: Panel<f64>,
    pub avg_selling_price: Panel<f64>,
    pub avg_discount_pct: Panel<f64>,
    pub avg_profit_margin_pct: Panel<f64>,
    pub category_breakdown: Vec<CategoryFinancials>,
    pub avg_selling_price_by_category: Vec<LabeledValue>,
    pub revenue_vs_profit: Vec<RevenueProfitPoint>,
    pub margin_hierarchy: Vec<MarginBranch>,
}

/// Compute the financial report. KPI means are rounded to 2 decimals.
pub fn financial(view: &TableView<'_>) -> FinancialReport {
    let kpi = |name: &str, result: StatsResult<f64>| {
        Panel::from_result(name, result).map(|m| round_to(m, 2))
    };

    FinancialReport {
        avg_cost_price: kpi(
            "avg_cost_price",
            mean("cost price", view.rows().map(|r| r.record.cost_price)),
        ),
        avg_selling_price: kpi(
            "avg_selling_price",
            mean("selling price", view.rows().map(|r| r.record.selling_price)),
        ),
        avg_discount_pct: kpi(
            "avg_discount_pct",
            mean("discount", view.rows().map(|r| r.record.discount_pct)),
        ),
        avg_profit_margin_pct: kpi(
            "avg_profit_margin_pct",
            mean_present("profit margin", view.rows().map(|r| r.margin_pct())),
        ),
        category_breakdown: category_breakdown(view),
        avg_selling_price_by_category: group_first_seen(
            view.rows(),
            |r| r.record.category.as_str(),
            |r| r.record.selling_price,
        )
        .into_iter()
        .filter_map(|(category, prices)| {
            mean("selling price", prices)
                .ok()
                .map(|avg| LabeledValue::new(category, avg))
        })
        .collect(),
        revenue_vs_profit: view
            .rows()
            .map(|r| RevenueProfitPoint {
                medicine: r.record.medicine_name.clone(),
                category: r.record.category.clone(),
                total_revenue: r.derived.total_revenue,
                profit: r.derived.profit,
                units_sold: r.record.units_sold,
            })
            .collect(),
        margin_hierarchy: margin_hierarchy(view),
    }
}

fn category_breakdown(view: &TableView<'_>) -> Vec<CategoryFinancials> {
    group_first_seen(
        view.rows(),
        |r| r.record.category.as_str(),
        |r| (r.derived.total_revenue, r.derived.profit),
    )
    .into_iter()
    .map(|(category, values)| CategoryFinancials {
        category: category.to_string(),
        total_revenue: values.iter().map(|(revenue, _)| revenue).sum(),
        total_profit: values.iter().map(|(_, profit)| profit).sum(),
    })
    .collect()
}

/// Category → medicine margin sums. Rows without a margin are skipped,
/// and a category with no margins at all is left out.
pub fn margin_hierarchy(view: &TableView<'_>) -> Vec<MarginBranch> {
    group_first_seen(
        view.rows().filter(|r| r.margin_pct().is_some()),
        |r| r.record.category.as_str(),
        |r| r,
    )
    .into_iter()
    .map(|(category, rows)| {
        let medicines: Vec<LabeledValue> = group_first_seen(
            rows.into_iter(),
            |r| r.record.medicine_name.as_str(),
            |r| r.margin_pct().unwrap_or(0.0),
        )
        .into_iter()
        .map(|(medicine, margins)| LabeledValue::new(medicine, margins.iter().sum()))
        .collect();

        MarginBranch {
            category: category.to_string(),
            total_margin: medicines.iter().map(|m| m.value).sum(),
            medicines,
        }
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::fixtures::sale;
    use crate::store::Table;

    #[test]
    fn test_kpis_rounded_to_two_decimals() {
        let mut a = sale("A", "X", 1.111, 10.0, 1);
        a.discount_pct = 5.0;
        let mut b = sale("B", "Y", 2.222, 20.005, 1);
        b.discount_pct = 10.0;
        let table = Table::from_records(vec![a, b]);

        let report = financial(&table.view());
        assert_eq!(report.avg_cost_price.value(), Some(&1.67));
        assert_eq!(report.avg_discount_pct.value(), Some(&7.5));
        assert!(report.avg_selling_price.is_ready());
    }

    #[test]
    fn test_mean_margin_skips_missing() {
        // Revenue 500, profit 250: 50%. The zero-revenue row has no margin.
        let table = Table::from_records(vec![
            sale("A", "X", 5.0, 10.0, 50),
            sale("C", "X", 1.0, 1.0, 0),
        ]);
        let report = financial(&table.view());
        assert_eq!(report.avg_profit_margin_pct.value(), Some(&50.0));
    }

    #[test]
    fn test_margin_kpi_placeholder_when_all_missing() {
        let table = Table::from_records(vec![sale("C", "X", 1.0, 1.0, 0)]);
        let report = financial(&table.view());
        assert!(!report.avg_profit_margin_pct.is_ready());
        assert!(report.avg_cost_price.is_ready());
    }

    #[test]
    fn test_category_breakdown() {
        let table = Table::from_records(vec![
            sale("A", "X", 5.0, 10.0, 50),
            sale("B", "Y", 2.0, 3.0, 5),
            sale("C", "X", 1.0, 2.0, 10),
        ]);
        let report = financial(&table.view());
        assert_eq!(
            report.category_breakdown,
            vec![
                CategoryFinancials {
                    category: "X".into(),
                    total_revenue: 520.0,
                    total_profit: 260.0,
                },
                CategoryFinancials {
                    category: "Y".into(),
                    total_revenue: 15.0,
                    total_profit: 5.0,
                },
            ]
        );
        assert_eq!(
            report.avg_selling_price_by_category,
            vec![LabeledValue::new("X", 6.0), LabeledValue::new("Y", 3.0)]
        );
        assert_eq!(report.revenue_vs_profit.len(), 3);
        assert_eq!(report.revenue_vs_profit[1].units_sold, 5);
    }

    #[test]
    fn test_margin_hierarchy() {
        let mut a1 = sale("A", "X", 1.0, 2.0, 1);
        a1.listed_margin_pct = Some(10.0);
        let mut a2 = sale("A", "X", 1.0, 2.0, 1);
        a2.listed_margin_pct = Some(15.0);
        let mut b = sale("B", "X", 1.0, 2.0, 1);
        b.listed_margin_pct = Some(5.0);
        let missing = sale("Z", "Y", 1.0, 1.0, 0);
        let table = Table::from_records(vec![a1, b, a2, missing]);

        let tree = margin_hierarchy(&table.view());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].category, "X");
        assert_eq!(tree[0].total_margin, 30.0);
        assert_eq!(
            tree[0].medicines,
            vec![LabeledValue::new("A", 25.0), LabeledValue::new("B", 5.0)]
        );
    }
}
