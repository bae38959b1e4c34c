//! CSV row decoding for the inventory dataset.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use super::{DataLoadError, LoadResult};
use crate::models::InventoryRecord;

/// Columns the dashboard cannot work without.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Medicine Name",
    "Batch Number",
    "Category",
    "Dosage Form",
    "Supplier Name",
    "Warehouse Location",
    "Target Ailment",
    "Count",
    "Reorder Level",
    "Cost Price ($)",
    "Selling Price ($)",
    "Units Sold",
    "Discount (%)",
    "Days to Expiry",
    "Manufacture Date",
    "Expiry Date",
    "Prescription Required",
];

/// Optional column carrying the dataset's listed margin.
pub const LISTED_MARGIN_COLUMN: &str = "Profit Margin (%)";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A raw dataset row. Dates stay textual until [`CsvRow::into_record`]
/// so a bad date can be reported with its line and column.
#[derive(Debug, Deserialize)]
pub(crate) struct CsvRow {
    #[serde(rename = "Medicine Name")]
    medicine_name: String,
    #[serde(rename = "Batch Number")]
    batch_number: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Dosage Form")]
    dosage_form: String,
    #[serde(rename = "Supplier Name")]
    supplier_name: String,
    #[serde(rename = "Warehouse Location")]
    warehouse_location: String,
    #[serde(rename = "Target Ailment")]
    target_ailment: String,
    #[serde(rename = "Count")]
    count: u32,
    #[serde(rename = "Reorder Level")]
    reorder_level: u32,
    #[serde(rename = "Cost Price ($)")]
    cost_price: f64,
    #[serde(rename = "Selling Price ($)")]
    selling_price: f64,
    #[serde(rename = "Units Sold")]
    units_sold: u32,
    #[serde(rename = "Discount (%)")]
    discount_pct: f64,
    #[serde(rename = "Days to Expiry")]
    days_to_expiry: i64,
    #[serde(rename = "Manufacture Date")]
    manufacture_date: String,
    #[serde(rename = "Expiry Date")]
    expiry_date: String,
    #[serde(rename = "Prescription Required", deserialize_with = "deserialize_bool")]
    prescription_required: bool,
    #[serde(rename = "Profit Margin (%)", default)]
    listed_margin_pct: Option<f64>,
}

impl CsvRow {
    pub(crate) fn into_record(self, line: u64) -> LoadResult<InventoryRecord> {
        let manufacture_date = parse_date(&self.manufacture_date, line, "Manufacture Date")?;
        let expiry_date = parse_date(&self.expiry_date, line, "Expiry Date")?;

        Ok(InventoryRecord {
            medicine_name: self.medicine_name,
            batch_number: self.batch_number,
            category: self.category,
            dosage_form: self.dosage_form,
            supplier_name: self.supplier_name,
            warehouse_location: self.warehouse_location,
            target_ailment: self.target_ailment,
            count: self.count,
            reorder_level: self.reorder_level,
            cost_price: self.cost_price,
            selling_price: self.selling_price,
            units_sold: self.units_sold,
            discount_pct: self.discount_pct,
            days_to_expiry: self.days_to_expiry,
            manufacture_date,
            expiry_date,
            prescription_required: self.prescription_required,
            listed_margin_pct: self.listed_margin_pct,
        })
    }
}

/// Parse a date in one of the accepted layouts; a time part is dropped.
pub(crate) fn parse_date(value: &str, line: u64, column: &'static str) -> LoadResult<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
                .ok()
                .map(|dt| dt.date())
        })
        .ok_or_else(|| DataLoadError::InvalidDate {
            line,
            column,
            value: value.to_string(),
        })
}

/// Flexible bool deserializer: handles "true"/"false", "1"/"0", "yes"/"no".
fn deserialize_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match s.to_lowercase().trim() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected bool value, got '{}'",
            other
        ))),
    }
}
