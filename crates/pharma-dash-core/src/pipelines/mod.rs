//! Section pipelines.
//!
//! Each pipeline is a pure function from a table view to a report of KPI
//! values and chart-ready aggregates. The caller resolves the view first
//! (see [`crate::filter::resolve_view`]); pipelines never re-filter.

mod financial;
mod operational;
mod overview;
mod performance;

pub use financial::*;
pub use operational::*;
pub use overview::*;
pub use performance::*;

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::models::InventoryRow;
use crate::session::Section;
use crate::stats::BoxSummary;
use crate::store::TableView;

/// A label with a single aggregated value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: f64,
}

impl LabeledValue {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// A date with a single aggregated value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: f64,
}

/// A box plot summary for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub label: String,
    pub summary: BoxSummary,
}

/// The report of whichever section ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum SectionReport {
    Overview(OverviewReport),
    Financial(FinancialReport),
    Performance(PerformanceReport),
    Operational(OperationalReport),
}

impl SectionReport {
    pub fn section(&self) -> Section {
        match self {
            SectionReport::Overview(_) => Section::Overview,
            SectionReport::Financial(_) => Section::Financial,
            SectionReport::Performance(_) => Section::Performance,
            SectionReport::Operational(_) => Section::Operational,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Run the pipeline of one section against a resolved view.
pub fn run_section(section: Section, view: &TableView<'_>, config: &DashboardConfig) -> SectionReport {
    tracing::debug!(section = %section, rows = view.len(), "running section pipeline");
    match section {
        Section::Overview => SectionReport::Overview(overview(view, config)),
        Section::Financial => SectionReport::Financial(financial(view)),
        Section::Performance => SectionReport::Performance(performance(view, config)),
        Section::Operational => SectionReport::Operational(operational(view, config)),
    }
}

/// Group rows by key in first-appearance order.
pub(crate) fn group_first_seen<'a, K, V>(
    rows: impl Iterator<Item = &'a InventoryRow>,
    key: impl Fn(&'a InventoryRow) -> K,
    value: impl Fn(&'a InventoryRow) -> V,
) -> Vec<(K, Vec<V>)>
where
    K: Eq + Hash + Clone,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<V>)> = Vec::new();
    for row in rows {
        let k = key(row);
        let at = *positions.entry(k.clone()).or_insert_with(|| {
            groups.push((k, Vec::new()));
            groups.len() - 1
        });
        groups[at].1.push(value(row));
    }
    groups
}

/// Sum a value per key, keys in ascending order.
pub(crate) fn sum_by_key<'a, K: Ord>(
    rows: impl Iterator<Item = &'a InventoryRow>,
    key: impl Fn(&'a InventoryRow) -> K,
    value: impl Fn(&'a InventoryRow) -> f64,
) -> Vec<(K, f64)> {
    let mut totals: BTreeMap<K, f64> = BTreeMap::new();
    for row in rows {
        *totals.entry(key(row)).or_insert(0.0) += value(row);
    }
    totals.into_iter().collect()
}

/// Stable sort by value, largest first, then keep the first `n`.
pub(crate) fn top_n_desc<T>(mut items: Vec<T>, n: usize, value: impl Fn(&T) -> f64) -> Vec<T> {
    items.sort_by(|a, b| value(b).total_cmp(&value(a)));
    items.truncate(n);
    items
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Table;
    use fixtures::item;

    #[test]
    fn test_group_first_seen_order() {
        let table = Table::from_records(vec![
            item("B", "Y"),
            item("A", "X"),
            item("C", "Y"),
        ]);
        let groups = group_first_seen(
            table.view().rows(),
            |r| r.record.category.as_str(),
            |r| r.record.medicine_name.as_str(),
        );
        assert_eq!(groups, vec![("Y", vec!["B", "C"]), ("X", vec!["A"])]);
    }

    #[test]
    fn test_sum_by_key_sorted() {
        let mut a = item("A", "X");
        a.count = 5;
        let mut b = item("B", "X");
        b.count = 7;
        let mut a2 = item("A", "X");
        a2.count = 1;
        let table = Table::from_records(vec![b, a, a2]);

        let totals = sum_by_key(
            table.view().rows(),
            |r| r.record.medicine_name.as_str(),
            |r| f64::from(r.record.count),
        );
        assert_eq!(totals, vec![("A", 6.0), ("B", 7.0)]);
    }

    #[test]
    fn test_top_n_desc_is_stable() {
        let items = vec![("a", 1.0), ("b", 3.0), ("c", 3.0), ("d", 2.0)];
        let top = top_n_desc(items, 3, |(_, v)| *v);
        assert_eq!(top, vec![("b", 3.0), ("c", 3.0), ("d", 2.0)]);
    }

    #[test]
    fn test_run_section_dispatch() {
        let table = Table::from_records(vec![item("A", "X")]);
        let config = DashboardConfig::default();
        for section in Section::ALL {
            let report = run_section(section, &table.view(), &config);
            assert_eq!(report.section(), section);
        }
    }

    #[test]
    fn test_report_json_is_tagged() {
        let table = Table::from_records(vec![item("A", "X")]);
        let report = run_section(Section::Financial, &table.view(), &DashboardConfig::default());
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["section"], "financial");
    }
}
