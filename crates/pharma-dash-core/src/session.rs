//! Dashboard session: the active section and each section's filter state.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::DashboardConfig;
use crate::filter::{resolve_view, FilterField, FilterSelection};
use crate::pipelines::{run_section, SectionReport};
use crate::store::Table;

/// Session errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Unknown section: {0}")]
    UnknownSection(String),

    #[error("Unknown filter field: {0}")]
    UnknownField(String),

    #[error("{section} does not offer a {field} filter")]
    FieldNotOffered { section: Section, field: FilterField },
}

pub type SessionResult<T> = Result<T, SessionError>;

/// A dashboard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Overview,
    Financial,
    Performance,
    Operational,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Overview,
        Section::Financial,
        Section::Performance,
        Section::Operational,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Section::Overview => "overview",
            Section::Financial => "financial",
            Section::Performance => "performance",
            Section::Operational => "operational",
        }
    }

    /// Page title shown in the sidebar.
    pub fn label(&self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::Financial => "Financial Metrics",
            Section::Performance => "Performance Metrics",
            Section::Operational => "Operational Metrics",
        }
    }

    /// Parse a section from its name or its label, ignoring case.
    pub fn from_name(name: &str) -> SessionResult<Self> {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(wanted) || s.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SessionError::UnknownSection(name.to_string()))
    }

    /// The filter pickers this section shows, in display order.
    pub fn filter_fields(&self) -> &'static [FilterField] {
        use FilterField::*;
        match self {
            Section::Overview | Section::Financial => {
                &[Category, DosageForm, WarehouseLocation, TargetAilment, SupplierName]
            }
            Section::Performance => &[Category, SupplierName, WarehouseLocation, TargetAilment],
            Section::Operational => &[Category, DosageForm, WarehouseLocation, TargetAilment],
        }
    }

    pub fn offers(&self, field: FilterField) -> bool {
        self.filter_fields().contains(&field)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One user's view of the dashboard.
///
/// Each section keeps its own selection, so switching pages and back
/// restores the pickers as they were left.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    active: Section,
    selections: HashMap<Section, FilterSelection>,
}

impl Default for DashboardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardSession {
    pub fn new() -> Self {
        Self {
            active: Section::Overview,
            selections: HashMap::new(),
        }
    }

    pub fn active(&self) -> Section {
        self.active
    }

    pub fn select(&mut self, section: Section) {
        if section != self.active {
            info!(from = %self.active, to = %section, "switched section");
        }
        self.active = section;
    }

    /// Selection of the given section; empty when never touched.
    pub fn selection(&self, section: Section) -> FilterSelection {
        self.selections.get(&section).cloned().unwrap_or_default()
    }

    /// Replace the accepted values of one field on the active section.
    /// An empty value list clears the field.
    pub fn set_filter<I, S>(&mut self, field: FilterField, values: I) -> SessionResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.active.offers(field) {
            return Err(SessionError::FieldNotOffered {
                section: self.active,
                field,
            });
        }
        self.selections
            .entry(self.active)
            .or_default()
            .set(field, values);
        Ok(())
    }

    /// Drop every filter of the active section.
    pub fn clear_filters(&mut self) {
        if let Some(selection) = self.selections.get_mut(&self.active) {
            selection.clear_all();
        }
    }

    /// Run the active section against its resolved view.
    pub fn render(&self, table: &Table, config: &DashboardConfig) -> SectionReport {
        let selection = self.selection(self.active);
        let view = resolve_view(table, &selection);
        run_section(self.active, &view, config)
    }
}
