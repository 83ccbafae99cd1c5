//! Filter state and the filter engine.
//!
//! A [`FilteredView`] is a list of row indices into a shared
//! [`RecordTable`]; filtering never copies records.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::preprocess::DateBounds;
use crate::record::{Dimension, Record, RecordTable};

/// The user's current constraints on the dataset.
///
/// Empty selection sets mean "no restriction". `start > end` is allowed and
/// simply matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub regions: BTreeSet<String>,
    #[serde(default)]
    pub states: BTreeSet<String>,
    #[serde(default)]
    pub cities: BTreeSet<String>,
}

impl FilterState {
    /// Full date range, nothing selected.
    ///
    /// Without bounds (empty table) both dates default to today.
    pub fn defaults(bounds: Option<DateBounds>) -> Self {
        let (start, end) = match bounds {
            Some(b) => (b.min, b.max),
            None => {
                let today = chrono::Local::now().date_naive();
                (today, today)
            }
        };
        Self::with_range(start, end)
    }

    /// Date range only, nothing selected.
    pub fn with_range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            regions: BTreeSet::new(),
            states: BTreeSet::new(),
            cities: BTreeSet::new(),
        }
    }

    pub fn in_range(&self, record: &Record) -> bool {
        self.start <= record.order_date && record.order_date <= self.end
    }

    /// Selection set for a categorical dimension, if it is filterable.
    pub fn selection(&self, dimension: Dimension) -> Option<&BTreeSet<String>> {
        match dimension {
            Dimension::Region => Some(&self.regions),
            Dimension::State => Some(&self.states),
            Dimension::City => Some(&self.cities),
            _ => None,
        }
    }

    /// Whether a record passes the selection for one dimension.
    pub fn selects(&self, dimension: Dimension, record: &Record) -> bool {
        match self.selection(dimension) {
            Some(set) if !set.is_empty() => set.contains(record.dimension(dimension).as_ref()),
            _ => true,
        }
    }

    /// The full predicate conjunction.
    pub fn matches(&self, record: &Record) -> bool {
        self.in_range(record)
            && FILTER_ORDER.iter().all(|d| self.selects(*d, record))
    }

    /// Whether any categorical selection is active.
    pub fn has_selection(&self) -> bool {
        !(self.regions.is_empty() && self.states.is_empty() && self.cities.is_empty())
    }
}

/// Order in which the categorical filters narrow the view.
pub const FILTER_ORDER: [Dimension; 3] = [Dimension::Region, Dimension::State, Dimension::City];

/// A read-only projection of a record table.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a RecordTable,
    rows: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every row of the table.
    pub fn all(table: &'a RecordTable) -> Self {
        Self {
            table,
            rows: (0..table.len()).collect(),
        }
    }

    /// Keep only the rows satisfying `predicate`.
    pub fn retain(mut self, mut predicate: impl FnMut(&Record) -> bool) -> Self {
        let records = self.table.records();
        self.rows.retain(|i| predicate(&records[*i]));
        self
    }

    /// Re-apply a filter state to this view.
    pub fn apply(self, state: &FilterState) -> Self {
        self.retain(|r| state.matches(r))
    }

    pub fn table(&self) -> &'a RecordTable {
        self.table
    }

    /// Indices of the included rows, in table order.
    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.table.records();
        self.rows.iter().map(move |i| &records[*i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of sales across the view.
    pub fn total_sales(&self) -> f64 {
        self.iter().map(|r| r.sales).sum()
    }

    /// Distinct values of a dimension, in order of first appearance.
    pub fn distinct(&self, dimension: Dimension) -> Vec<String> {
        let mut seen = FxHashSet::default();
        let mut values = Vec::new();
        for record in self.iter() {
            let value = record.dimension(dimension);
            if !seen.contains(value.as_ref()) {
                seen.insert(value.to_string());
                values.push(value.into_owned());
            }
        }
        values
    }

    /// Copy the included records out, e.g. for building a standalone table.
    pub fn to_records(&self) -> Vec<Record> {
        self.iter().cloned().collect()
    }
}

/// Apply a filter state to a table.
pub fn filter<'a>(table: &'a RecordTable, state: &FilterState) -> FilteredView<'a> {
    FilteredView::all(table).apply(state)
}

/// The filtered view together with the option list of each multi-select.
///
/// Options for each control come from the view narrowed by every filter
/// before it: regions from the date-filtered rows, states after the region
/// filter, cities after the state filter.
#[derive(Debug, Clone)]
pub struct Cascade<'a> {
    pub region_options: Vec<String>,
    pub state_options: Vec<String>,
    pub city_options: Vec<String>,
    pub view: FilteredView<'a>,
}

impl Cascade<'_> {
    pub fn options(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::Region => &self.region_options,
            Dimension::State => &self.state_options,
            Dimension::City => &self.city_options,
            _ => &[],
        }
    }
}

/// Run the filters in order, collecting each control's options on the way.
pub fn cascade<'a>(table: &'a RecordTable, state: &FilterState) -> Cascade<'a> {
    let mut view = FilteredView::all(table).retain(|r| state.in_range(r));
    let mut options: Vec<Vec<String>> = Vec::with_capacity(FILTER_ORDER.len());

    for dimension in FILTER_ORDER {
        options.push(view.distinct(dimension));
        view = view.retain(|r| state.selects(dimension, r));
    }

    let city_options = options.pop().unwrap_or_default();
    let state_options = options.pop().unwrap_or_default();
    let region_options = options.pop().unwrap_or_default();

    tracing::debug!(
        "Filtered {} of {} rows ({} regions, {} states, {} cities available)",
        view.len(),
        table.len(),
        region_options.len(),
        state_options.len(),
        city_options.len()
    );

    Cascade {
        region_options,
        state_options,
        city_options,
        view,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::test_support::record;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn table() -> RecordTable {
        RecordTable::from_records(vec![
            record("2023-01-05", "East", "Tech", 100.0),
            record("2023-02-10", "West", "Tech", 50.0),
            record("2023-01-20", "West", "Furniture", 30.0),
            record("2023-03-01", "South", "Office", 5.0),
        ])
    }

    #[test]
    fn test_date_range_only() {
        let table = table();
        let state = FilterState::with_range(date("2023-01-01"), date("2023-01-31"));
        let view = filter(&table, &state);
        assert_eq!(view.row_indices(), &[0, 2]);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let table = table();
        let state = FilterState::with_range(date("2023-03-01"), date("2023-01-01"));
        let view = filter(&table, &state);
        assert!(view.is_empty());
        assert_eq!(view.total_sales(), 0.0);
    }

    #[test]
    fn test_empty_selection_means_no_restriction() {
        let table = table();
        let state = FilterState::with_range(date("2023-01-01"), date("2023-12-31"));
        assert_eq!(filter(&table, &state).len(), 4);
        assert!(!state.has_selection());
    }

    #[test]
    fn test_region_selection() {
        let table = table();
        let mut state = FilterState::with_range(date("2023-01-01"), date("2023-12-31"));
        state.regions.insert("West".to_string());
        let view = filter(&table, &state);
        assert_eq!(view.row_indices(), &[1, 2]);
        assert!(view.iter().all(|r| r.region == "West"));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let table = table();
        let mut state = FilterState::with_range(date("2023-01-01"), date("2023-02-28"));
        state.regions.insert("West".to_string());
        let once = filter(&table, &state);
        let twice = once.clone().apply(&state);
        assert_eq!(once.row_indices(), twice.row_indices());
    }

    #[test]
    fn test_cascade_options_follow_upstream_filters() {
        let table = table();
        let mut state = FilterState::with_range(date("2023-01-01"), date("2023-02-28"));

        let c = cascade(&table, &state);
        assert_eq!(c.region_options, vec!["East", "West"]);
        assert_eq!(c.state_options, vec!["East State", "West State"]);

        state.regions.insert("West".to_string());
        let c = cascade(&table, &state);
        // region list is still computed before the region filter
        assert_eq!(c.region_options, vec!["East", "West"]);
        assert_eq!(c.state_options, vec!["West State"]);
        assert_eq!(c.city_options, vec!["West City"]);
        assert_eq!(c.view.row_indices(), filter(&table, &state).row_indices());
    }

    #[test]
    fn test_distinct_keeps_first_appearance_order() {
        let table = table();
        let view = FilteredView::all(&table);
        assert_eq!(view.distinct(Dimension::Region), vec!["East", "West", "South"]);
        assert_eq!(view.distinct(Dimension::Month), vec!["2023-01", "2023-02", "2023-03"]);
    }
}
