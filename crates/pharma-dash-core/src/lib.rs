//! Pharma-Dash Core Library
//!
//! Filterable aggregation pipeline behind the pharmacy inventory dashboard.
//!
//! # Architecture
//!
//! ```text
//! inventory CSV (Windows-1252)
//!          │
//!          ▼
//!    Record Store ── derived columns computed once, table cached
//!          │
//!          ▼
//!  Section Selector ── active section + its own filter selection
//!          │
//!          ▼
//!    Filter Engine ── AND across fields, OR within a field
//!          │            (no match → full table)
//!          ▼
//!  ┌───────┴────────┬─────────────────┬──────────────────┐
//!  ▼                ▼                 ▼                  ▼
//! Overview      Financial        Performance        Operational
//!  └───────┬────────┴─────────────────┴──────────────────┘
//!          ▼
//!   SectionReport (JSON) → rendering host
//! ```
//!
//! # Modules
//!
//! - [`store`]: CSV loading, derived columns and the cached table
//! - [`models`]: Domain types (InventoryRecord, DerivedMetrics, Panel)
//! - [`filter`]: Filter selections and view resolution
//! - [`pipelines`]: One aggregation pipeline per section
//! - [`session`]: Active section and per-section filter state
//! - [`stats`]: Means, box summaries and kernel density estimates
//! - [`config`]: Thresholds and targets

pub mod config;
pub mod filter;
pub mod models;
pub mod pipelines;
pub mod session;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use config::DashboardConfig;
pub use filter::{apply_filters, filter_options, resolve_view, FilterField, FilterSelection};
pub use models::{DerivedMetrics, InventoryRecord, InventoryRow, Panel};
pub use pipelines::{run_section, SectionReport};
pub use session::{DashboardSession, Section};
pub use store::{load_table, load_table_file, RecordStore, Table, TableView};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PharmaDashError {
    #[error("Data load error: {0}")]
    DataLoadError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<store::DataLoadError> for PharmaDashError {
    fn from(e: store::DataLoadError) -> Self {
        PharmaDashError::DataLoadError(e.to_string())
    }
}

impl From<session::SessionError> for PharmaDashError {
    fn from(e: session::SessionError) -> Self {
        PharmaDashError::InvalidInput(e.to_string())
    }
}

impl From<config::ConfigError> for PharmaDashError {
    fn from(e: config::ConfigError) -> Self {
        PharmaDashError::ConfigError(e.to_string())
    }
}

impl From<serde_json::Error> for PharmaDashError {
    fn from(e: serde_json::Error) -> Self {
        PharmaDashError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PharmaDashError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PharmaDashError::Internal(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open a dashboard over the inventory CSV at the given path, with default
/// thresholds.
#[uniffi::export]
pub fn open_dashboard(path: String) -> Result<Arc<PharmaDashCore>, PharmaDashError> {
    let table = load_table_file(&path)?;
    Ok(PharmaDashCore::new(table, DashboardConfig::default()))
}

/// Open a dashboard from a JSON config file; the dataset is read from the
/// config's `data_path`.
#[uniffi::export]
pub fn open_dashboard_with_config(
    config_path: String,
) -> Result<Arc<PharmaDashCore>, PharmaDashError> {
    let config = DashboardConfig::from_json_file(&config_path)?;
    let store = RecordStore::new(config.data_path.clone());
    let table = store.load()?;
    Ok(Arc::new(PharmaDashCore {
        table,
        config,
        session: Mutex::new(DashboardSession::new()),
    }))
}

/// Open a dashboard over CSV text already in memory (for testing).
#[uniffi::export]
pub fn open_dashboard_from_csv(text: String) -> Result<Arc<PharmaDashCore>, PharmaDashError> {
    let table = load_table(text.as_bytes())?;
    Ok(PharmaDashCore::new(table, DashboardConfig::default()))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe dashboard handle for FFI.
#[derive(uniffi::Object)]
pub struct PharmaDashCore {
    table: Arc<Table>,
    config: DashboardConfig,
    session: Mutex<DashboardSession>,
}

impl PharmaDashCore {
    fn new(table: Table, config: DashboardConfig) -> Arc<Self> {
        Arc::new(Self {
            table: Arc::new(table),
            config,
            session: Mutex::new(DashboardSession::new()),
        })
    }
}

#[uniffi::export]
impl PharmaDashCore {
    // =========================================================================
    // Section Operations
    // =========================================================================

    /// Switch the active section by name or label.
    pub fn select_section(&self, name: String) -> Result<FfiSectionState, PharmaDashError> {
        let section = Section::from_name(&name)?;
        let mut session = self.session.lock()?;
        session.select(section);
        Ok(FfiSectionState::of(&session))
    }

    /// The active section with its current filters.
    pub fn active_section(&self) -> Result<FfiSectionState, PharmaDashError> {
        let session = self.session.lock()?;
        Ok(FfiSectionState::of(&session))
    }

    /// Column names of the pickers the active section shows.
    pub fn offered_fields(&self) -> Result<Vec<String>, PharmaDashError> {
        let session = self.session.lock()?;
        Ok(session
            .active()
            .filter_fields()
            .iter()
            .map(|f| f.column_name().to_string())
            .collect())
    }

    // =========================================================================
    // Filter Operations
    // =========================================================================

    /// Distinct values of a field over the full table, first-seen order.
    pub fn filter_options(&self, field: String) -> Result<Vec<String>, PharmaDashError> {
        let field = parse_field(&field)?;
        Ok(filter::filter_options(&self.table, field))
    }

    /// Replace the accepted values of a field on the active section.
    pub fn set_filter(
        &self,
        field: String,
        values: Vec<String>,
    ) -> Result<FfiSectionState, PharmaDashError> {
        let field = parse_field(&field)?;
        let mut session = self.session.lock()?;
        session.set_filter(field, values)?;
        Ok(FfiSectionState::of(&session))
    }

    /// Drop every filter of the active section.
    pub fn clear_filters(&self) -> Result<(), PharmaDashError> {
        let mut session = self.session.lock()?;
        session.clear_filters();
        Ok(())
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Report of the active section as JSON.
    pub fn render_json(&self) -> Result<String, PharmaDashError> {
        let session = self.session.lock()?;
        let report = session.render(&self.table, &self.config);
        Ok(report.to_json()?)
    }

    /// Number of rows in the loaded table.
    pub fn row_count(&self) -> u64 {
        self.table.len() as u64
    }
}

fn parse_field(name: &str) -> Result<FilterField, PharmaDashError> {
    FilterField::from_name(name)
        .ok_or_else(|| session::SessionError::UnknownField(name.to_string()).into())
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe section state.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSectionState {
    pub name: String,
    pub label: String,
    pub filters: Vec<FfiFieldFilter>,
}

impl FfiSectionState {
    fn of(session: &DashboardSession) -> Self {
        let section = session.active();
        let selection = session.selection(section);
        Self {
            name: section.name().to_string(),
            label: section.label().to_string(),
            filters: selection
                .active()
                .map(|(field, values)| FfiFieldFilter {
                    field: field.column_name().to_string(),
                    values: values.iter().cloned().collect(),
                })
                .collect(),
        }
    }
}

/// FFI-safe filter on one field.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFieldFilter {
    pub field: String,
    pub values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Medicine Name,Batch Number,Category,Dosage Form,Count,Reorder Level,Cost Price ($),Selling Price ($),Expiry Date,Manufacture Date,Supplier Name,Warehouse Location,Prescription Required,Days to Expiry,Units Sold,Discount (%),Target Ailment
MedA,BATCH-0000001,X,Tablet,100,20,5.00,10.00,2026-01-01,2024-01-01,Supplier W,Warehouse A,Yes,200,50,5,Pain
MedB,BATCH-0000002,Y,Syrup,40,30,2.00,3.00,2026-02-01,2024-02-01,Supplier X,Warehouse B,No,20,5,0,Fever
MedC,BATCH-0000003,X,Capsule,10,50,1.00,2.00,2025-12-01,2024-03-01,Supplier W,Warehouse A,Yes,10,0,10,Pain
";

    #[test]
    fn test_facade_flow() {
        let core = open_dashboard_from_csv(CSV.to_string()).unwrap();
        assert_eq!(core.row_count(), 3);
        assert_eq!(core.active_section().unwrap().name, "overview");
        assert_eq!(
            core.filter_options("category".into()).unwrap(),
            vec!["X".to_string(), "Y".to_string()]
        );

        let state = core
            .set_filter("Category".into(), vec!["X".into()])
            .unwrap();
        assert_eq!(state.filters.len(), 1);

        let json: serde_json::Value = serde_json::from_str(&core.render_json().unwrap()).unwrap();
        assert_eq!(json["section"], "overview");
        assert_eq!(json["unique_medicines"], 2);
    }

    #[test]
    fn test_facade_rejects_bad_input() {
        let core = open_dashboard_from_csv(CSV.to_string()).unwrap();
        assert!(matches!(
            core.select_section("inventory".into()),
            Err(PharmaDashError::InvalidInput(_))
        ));
        assert!(core.filter_options("colour".into()).is_err());

        let state = core.select_section("performance".into()).unwrap();
        assert_eq!(state.label, "Performance Metrics");
        assert!(!core
            .offered_fields()
            .unwrap()
            .contains(&"Dosage Form".to_string()));
        assert!(core
            .set_filter("dosage_form".into(), vec!["Tablet".into()])
            .is_err());
    }

    #[test]
    fn test_missing_column_is_a_load_error() {
        let result = open_dashboard_from_csv("Medicine Name,Category\nA,X\n".to_string());
        assert!(matches!(result, Err(PharmaDashError::DataLoadError(_))));
    }

    #[test]
    fn test_open_with_config() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("inventory.csv");
        std::fs::write(&data, CSV).unwrap();
        let config = dir.path().join("dashboard.json");
        std::fs::write(
            &config,
            serde_json::json!({ "data_path": data, "top_n": 2 }).to_string(),
        )
        .unwrap();

        let core = open_dashboard_with_config(config.display().to_string()).unwrap();
        assert_eq!(core.row_count(), 3);
        assert_eq!(core.config.top_n, 2);
    }
}
