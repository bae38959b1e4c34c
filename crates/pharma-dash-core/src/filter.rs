//! Filter engine: multi-valued field filters combined with logical AND.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::InventoryRecord;
use crate::store::{Table, TableView};

/// A field the dashboard pickers can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Category,
    DosageForm,
    WarehouseLocation,
    TargetAilment,
    SupplierName,
}

impl FilterField {
    pub const ALL: [FilterField; 5] = [
        FilterField::Category,
        FilterField::DosageForm,
        FilterField::WarehouseLocation,
        FilterField::TargetAilment,
        FilterField::SupplierName,
    ];

    /// Dataset column header for this field.
    pub fn column_name(&self) -> &'static str {
        match self {
            FilterField::Category => "Category",
            FilterField::DosageForm => "Dosage Form",
            FilterField::WarehouseLocation => "Warehouse Location",
            FilterField::TargetAilment => "Target Ailment",
            FilterField::SupplierName => "Supplier Name",
        }
    }

    /// Parse a field from its column header or snake_case name.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_lowercase().replace(['_', '-'], " ");
        Self::ALL
            .into_iter()
            .find(|field| field.column_name().to_lowercase() == wanted)
    }

    /// The value of this field on a record.
    pub fn value_of<'r>(&self, record: &'r InventoryRecord) -> &'r str {
        match self {
            FilterField::Category => &record.category,
            FilterField::DosageForm => &record.dosage_form,
            FilterField::WarehouseLocation => &record.warehouse_location,
            FilterField::TargetAilment => &record.target_ailment,
            FilterField::SupplierName => &record.supplier_name,
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Accepted values per field. A field with no values is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSelection {
    constraints: BTreeMap<FilterField, BTreeSet<String>>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterSelection::set`].
    pub fn with<I, S>(mut self, field: FilterField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(field, values);
        self
    }

    /// Replace the accepted values for a field. An empty set clears it.
    pub fn set<I, S>(&mut self, field: FilterField, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.constraints.remove(&field);
        } else {
            self.constraints.insert(field, values);
        }
    }

    pub fn clear(&mut self, field: FilterField) {
        self.constraints.remove(&field);
    }

    pub fn clear_all(&mut self) {
        self.constraints.clear();
    }

    /// Accepted values for a field, if it is constrained.
    pub fn values(&self, field: FilterField) -> Option<&BTreeSet<String>> {
        self.constraints.get(&field)
    }

    /// Constrained fields with their accepted values.
    pub fn active(&self) -> impl Iterator<Item = (FilterField, &BTreeSet<String>)> {
        self.constraints.iter().map(|(field, values)| (*field, values))
    }

    pub fn is_unconstrained(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Whether a record satisfies every active field constraint.
    pub fn matches(&self, record: &InventoryRecord) -> bool {
        self.constraints
            .iter()
            .all(|(field, accepted)| accepted.contains(field.value_of(record)))
    }
}

/// Rows of `view` that satisfy `selection`, in original order.
pub fn filter_view<'a>(view: &TableView<'a>, selection: &FilterSelection) -> TableView<'a> {
    if selection.is_unconstrained() {
        return view.clone();
    }
    view.retain_where(|row| selection.matches(&row.record))
}

/// Rows of `table` that satisfy `selection`, in original order.
pub fn apply_filters<'a>(table: &'a Table, selection: &FilterSelection) -> TableView<'a> {
    let view = filter_view(&table.view(), selection);
    debug!(
        kept = view.len(),
        total = table.len(),
        fields = selection.constraints.len(),
        "applied filters"
    );
    view
}

/// The view every section pipeline runs against.
///
/// A selection that matches no rows falls back to the full table, so the
/// dashboard shows unfiltered figures rather than empty charts.
pub fn resolve_view<'a>(table: &'a Table, selection: &FilterSelection) -> TableView<'a> {
    let view = apply_filters(table, selection);
    if view.is_empty() && !table.is_empty() {
        warn!("filter selection matched no rows, showing the full table");
        return table.view();
    }
    view
}

/// Picker options for a field: distinct values in first-appearance order.
pub fn filter_options(table: &Table, field: FilterField) -> Vec<String> {
    let mut seen = HashSet::new();
    table
        .rows()
        .iter()
        .map(|row| field.value_of(&row.record))
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}
