//! Inventory record models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the pharmacy inventory dataset, as read from the source file.
///
/// `units_sold <= count` is not enforced. The dataset is synthetic and
/// unchecked, so rows that sold more than they hold are kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryRecord {
    /// Medicine display name (e.g., "Paracetamol")
    pub medicine_name: String,
    /// Batch identifier (e.g., "BATCH-0042317")
    pub batch_number: String,
    /// Therapeutic category (e.g., "Analgesic")
    pub category: String,
    /// Dosage form (e.g., "Tablet", "Syrup")
    pub dosage_form: String,
    pub supplier_name: String,
    pub warehouse_location: String,
    pub target_ailment: String,
    /// Units currently in stock
    pub count: u32,
    /// Stock level at which the item should be reordered
    pub reorder_level: u32,
    /// Unit cost in dollars
    pub cost_price: f64,
    /// Unit selling price in dollars
    pub selling_price: f64,
    pub units_sold: u32,
    pub discount_pct: f64,
    /// Days until expiry as recorded in the dataset. Not derived from the
    /// expiry date, and the two may disagree in synthetic data.
    pub days_to_expiry: i64,
    pub manufacture_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub prescription_required: bool,
    /// Margin listed in the dataset's optional `Profit Margin (%)` column
    pub listed_margin_pct: Option<f64>,
}

impl InventoryRecord {
    /// Create a record with the identifying fields set and zeroed quantities.
    pub fn new(medicine_name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            medicine_name: medicine_name.into(),
            batch_number: String::new(),
            category: category.into(),
            dosage_form: String::new(),
            supplier_name: String::new(),
            warehouse_location: String::new(),
            target_ailment: String::new(),
            count: 0,
            reorder_level: 0,
            cost_price: 0.0,
            selling_price: 0.0,
            units_sold: 0,
            discount_pct: 0.0,
            days_to_expiry: 0,
            manufacture_date: NaiveDate::default(),
            expiry_date: NaiveDate::default(),
            prescription_required: false,
            listed_margin_pct: None,
        }
    }
}

/// Columns computed once when the table is loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DerivedMetrics {
    /// cost price × units sold
    pub total_cost: f64,
    /// selling price × units sold
    pub total_revenue: f64,
    /// total revenue − total cost
    pub profit: f64,
    /// profit / total revenue × 100, absent when revenue is zero
    pub total_profit_margin_pct: Option<f64>,
    /// total cost / total revenue × 100, absent when revenue is zero
    pub cost_efficiency_pct: Option<f64>,
    /// reorder level − count; positive means stock is below the reorder point
    pub stock_gap: i64,
}

impl DerivedMetrics {
    /// Compute the derived columns for a record.
    pub fn compute(record: &InventoryRecord) -> Self {
        let units = f64::from(record.units_sold);
        let total_cost = record.cost_price * units;
        let total_revenue = record.selling_price * units;
        let profit = total_revenue - total_cost;

        Self {
            total_cost,
            total_revenue,
            profit,
            total_profit_margin_pct: percent_of(profit, total_revenue),
            cost_efficiency_pct: percent_of(total_cost, total_revenue),
            stock_gap: i64::from(record.reorder_level) - i64::from(record.count),
        }
    }
}

/// `part / whole × 100`, or `None` when the ratio is undefined.
fn percent_of(part: f64, whole: f64) -> Option<f64> {
    if whole == 0.0 || !whole.is_finite() {
        return None;
    }
    Some(part / whole * 100.0)
}

/// A loaded record together with its derived columns.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InventoryRow {
    pub record: InventoryRecord,
    pub derived: DerivedMetrics,
}

impl InventoryRow {
    pub fn new(record: InventoryRecord) -> Self {
        let derived = DerivedMetrics::compute(&record);
        Self { record, derived }
    }

    /// Margin used by the margin charts: the listed margin when the dataset
    /// carries one, otherwise the derived total profit margin.
    pub fn margin_pct(&self) -> Option<f64> {
        self.record
            .listed_margin_pct
            .or(self.derived.total_profit_margin_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(cost: f64, sell: f64, units: u32) -> InventoryRecord {
        let mut record = InventoryRecord::new("MedA", "X");
        record.cost_price = cost;
        record.selling_price = sell;
        record.units_sold = units;
        record
    }

    #[test]
    fn test_derived_columns() {
        let mut record = priced(5.0, 10.0, 50);
        record.count = 100;
        record.reorder_level = 20;

        let derived = DerivedMetrics::compute(&record);
        assert_eq!(derived.total_cost, 250.0);
        assert_eq!(derived.total_revenue, 500.0);
        assert_eq!(derived.profit, 250.0);
        assert_eq!(derived.total_profit_margin_pct, Some(50.0));
        assert_eq!(derived.cost_efficiency_pct, Some(50.0));
        assert_eq!(derived.stock_gap, -80);
    }

    #[test]
    fn test_zero_revenue_margin_is_missing() {
        let derived = DerivedMetrics::compute(&priced(1.0, 1.0, 0));
        assert_eq!(derived.total_revenue, 0.0);
        assert_eq!(derived.profit, 0.0);
        assert_eq!(derived.total_profit_margin_pct, None);
        assert_eq!(derived.cost_efficiency_pct, None);
    }

    #[test]
    fn test_stock_gap_positive_when_under_reorder_level() {
        let mut record = priced(2.0, 3.0, 5);
        record.count = 10;
        record.reorder_level = 50;
        assert_eq!(DerivedMetrics::compute(&record).stock_gap, 40);
    }

    #[test]
    fn test_margin_prefers_listed_value() {
        let mut record = priced(5.0, 10.0, 50);
        let row = InventoryRow::new(record.clone());
        assert_eq!(row.margin_pct(), Some(50.0));

        record.listed_margin_pct = Some(12.5);
        let row = InventoryRow::new(record);
        assert_eq!(row.margin_pct(), Some(12.5));
    }

    #[test]
    fn test_units_sold_above_count_is_accepted() {
        let mut record = priced(1.0, 2.0, 90);
        record.count = 10;
        let row = InventoryRow::new(record);
        assert_eq!(row.derived.total_revenue, 180.0);
    }
}
