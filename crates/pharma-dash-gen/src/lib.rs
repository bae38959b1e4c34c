//! Synthetic inventory dataset generator.
//!
//! Produces rows with the same columns and value domains as the dataset the
//! dashboard reads, and writes them as a Windows-1252 encoded CSV.

use std::io::Write;

use chrono::{Duration, Months, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub const MEDICINE_NAMES: &[&str] = &[
    "Paracetamol",
    "Amoxicillin",
    "Ibuprofen",
    "Cetirizine",
    "Metformin",
    "Ranitidine",
    "Ciprofloxacin",
    "Omeprazole",
    "Insulin",
    "Aspirin",
];
pub const CATEGORIES: &[&str] = &[
    "Analgesic",
    "Antibiotic",
    "Antipyretic",
    "Antidiabetic",
    "Antacid",
    "Antihistamine",
];
pub const DOSAGE_FORMS: &[&str] = &["Tablet", "Capsule", "Syrup", "Injection", "Ointment", "Drops"];
pub const STRENGTHS: &[&str] = &["250mg", "500mg", "10mg/ml", "100mg", "1g", "5ml"];
pub const STORAGE_TEMPERATURES: &[&str] = &["Room Temperature", "2–8°C", "Below 25°C"];
pub const WAREHOUSES: &[&str] = &["Warehouse A", "Warehouse B", "Warehouse C"];
pub const SUPPLIERS: &[&str] = &["Supplier X", "Supplier Y", "Supplier Z", "Supplier W"];
pub const USAGE_INSTRUCTIONS: &[&str] = &["Take after meals", "Take before meals", "Use as directed"];
pub const TARGET_AILMENTS: &[&str] = &["Pain", "Infection", "Fever", "Diabetes", "Allergy", "Acidity"];

/// Default output file name, the one the dashboard reads.
pub const DEFAULT_OUTPUT: &str = "enhanced_medicine_inventory_dataset.csv";

#[derive(Error, Debug)]
pub enum GenError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Text not representable in Windows-1252")]
    Unmappable,
}

pub type GenResult<T> = Result<T, GenError>;

/// One generated dataset row, in output column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRow {
    #[serde(rename = "Medicine Name")]
    pub medicine_name: &'static str,
    #[serde(rename = "Category")]
    pub category: &'static str,
    #[serde(rename = "Dosage Form")]
    pub dosage_form: &'static str,
    #[serde(rename = "Strength")]
    pub strength: &'static str,
    #[serde(rename = "Batch Number")]
    pub batch_number: String,
    #[serde(rename = "Count")]
    pub count: u32,
    #[serde(rename = "Reorder Level")]
    pub reorder_level: u32,
    #[serde(rename = "Cost Price ($)")]
    pub cost_price: f64,
    #[serde(rename = "Selling Price ($)")]
    pub selling_price: f64,
    #[serde(rename = "Profit Margin (%)")]
    pub profit_margin_pct: f64,
    #[serde(rename = "Discount (%)")]
    pub discount_pct: u32,
    #[serde(rename = "Expiry Date")]
    pub expiry_date: NaiveDate,
    #[serde(rename = "Manufacture Date")]
    pub manufacture_date: NaiveDate,
    #[serde(rename = "Storage Temperature")]
    pub storage_temperature: &'static str,
    #[serde(rename = "Supplier Name")]
    pub supplier_name: &'static str,
    #[serde(rename = "Warehouse Location")]
    pub warehouse_location: &'static str,
    #[serde(rename = "Regulatory Approval Number")]
    pub regulatory_approval_number: String,
    #[serde(rename = "Prescription Required")]
    pub prescription_required: bool,
    /// Drawn on its own, so it does not agree with the expiry date.
    #[serde(rename = "Days to Expiry")]
    pub days_to_expiry: u32,
    #[serde(rename = "Units Sold")]
    pub units_sold: u32,
    #[serde(rename = "Usage Instructions")]
    pub usage_instructions: &'static str,
    #[serde(rename = "Target Ailment")]
    pub target_ailment: &'static str,
}

fn pick<R: Rng + ?Sized>(rng: &mut R, values: &'static [&'static str]) -> &'static str {
    values.choose(rng).copied().unwrap_or_default()
}

/// `prefix` followed by `len` random digits.
fn digits<R: Rng + ?Sized>(rng: &mut R, prefix: &str, len: usize) -> String {
    let mut out = String::with_capacity(prefix.len() + len);
    out.push_str(prefix);
    out.extend((0..len).map(|_| char::from(b'0' + rng.gen_range(0..10u8))));
    out
}

fn money<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    (rng.gen_range(low..=high) * 100.0).round() / 100.0
}

/// A date drawn uniformly from `start..=end`.
fn date_between<R: Rng + ?Sized>(rng: &mut R, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let span = (end - start).num_days().max(0);
    start + Duration::days(rng.gen_range(0..=span))
}

impl DatasetRow {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> Self {
        let two_years = Months::new(24);
        let horizon = today
            .checked_add_months(two_years)
            .unwrap_or(today + Duration::days(730));
        let history = today
            .checked_sub_months(two_years)
            .unwrap_or(today - Duration::days(730));

        Self {
            medicine_name: pick(rng, MEDICINE_NAMES),
            category: pick(rng, CATEGORIES),
            dosage_form: pick(rng, DOSAGE_FORMS),
            strength: pick(rng, STRENGTHS),
            batch_number: digits(rng, "BATCH-", 7),
            count: rng.gen_range(10..=500),
            reorder_level: rng.gen_range(10..=50),
            cost_price: money(rng, 2.0, 250.0),
            selling_price: money(rng, 10.0, 600.0),
            profit_margin_pct: money(rng, 5.0, 50.0),
            discount_pct: rng.gen_range(0..=30),
            expiry_date: date_between(rng, today, horizon),
            manufacture_date: date_between(rng, history, today),
            storage_temperature: pick(rng, STORAGE_TEMPERATURES),
            supplier_name: pick(rng, SUPPLIERS),
            warehouse_location: pick(rng, WAREHOUSES),
            regulatory_approval_number: digits(rng, "FDA-", 8),
            prescription_required: rng.gen_bool(0.5),
            days_to_expiry: rng.gen_range(0..=730),
            units_sold: rng.gen_range(0..=100),
            usage_instructions: pick(rng, USAGE_INSTRUCTIONS),
            target_ailment: pick(rng, TARGET_AILMENTS),
        }
    }
}

/// Generate `count` rows relative to `today`.
pub fn generate_rows<R: Rng + ?Sized>(rng: &mut R, count: usize, today: NaiveDate) -> Vec<DatasetRow> {
    (0..count).map(|_| DatasetRow::random(rng, today)).collect()
}

/// Write rows with a header line as Windows-1252 CSV.
pub fn write_dataset<W: Write>(rows: &[DatasetRow], mut writer: W) -> GenResult<()> {
    let mut csv_writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        csv_writer.serialize(row)?;
    }
    let utf8 = csv_writer
        .into_inner()
        .map_err(|e| GenError::Io(e.into_error()))?;
    let text = String::from_utf8_lossy(&utf8);

    let (bytes, _, unmappable) = encoding_rs::WINDOWS_1252.encode(&text);
    if unmappable {
        return Err(GenError::Unmappable);
    }
    writer.write_all(&bytes)?;
    writer.flush()?;
    debug!(rows = rows.len(), bytes = bytes.len(), "wrote dataset");
    Ok(())
}
