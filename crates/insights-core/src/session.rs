//! Per-session dashboard context.
//!
//! A session holds one immutable [`RecordTable`] (shared through an `Arc`)
//! and one mutable [`FilterState`]. Nothing else is stored: filtered views and
//! aggregates are derived on demand and dropped after each render.

use std::sync::Arc;

use crate::controls::{ControlId, ControlValue, apply_control};
use crate::error::Result;
use crate::export::{Export, export};
use crate::filter::{Cascade, FilterState, FilteredView, cascade, filter};
use crate::load::{self, DatasetSource};
use crate::preprocess::{DateBounds, DatePolicy, normalize};
use crate::record::RecordTable;

/// A loaded, normalized dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub table: Arc<RecordTable>,
    pub bounds: Option<DateBounds>,
    /// Whether this dataset was uploaded by the user (vs. the fallback).
    pub uploaded: bool,
}

impl Dataset {
    /// Load and normalize a dataset from a local path or uploaded bytes.
    pub fn open(source: &DatasetSource, policy: DatePolicy) -> Result<Self> {
        let raw = load::load(source)?;
        let normalized = normalize(raw, policy)?;
        Ok(Self {
            table: Arc::new(normalized.table),
            bounds: normalized.bounds,
            uploaded: matches!(source, DatasetSource::Upload { .. }),
        })
    }

    /// Wrap an already-built table.
    pub fn from_table(table: RecordTable) -> Self {
        let bounds = DateBounds::of(&table);
        Self {
            table: Arc::new(table),
            bounds,
            uploaded: false,
        }
    }
}

/// Explicit state of one dashboard session.
#[derive(Debug, Clone)]
pub struct DashboardContext {
    dataset: Dataset,
    filter: FilterState,
}

impl DashboardContext {
    /// Start a session on a dataset with default filters.
    pub fn new(dataset: Dataset) -> Self {
        let filter = FilterState::defaults(dataset.bounds);
        Self { dataset, filter }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn table(&self) -> &RecordTable {
        &self.dataset.table
    }

    pub fn bounds(&self) -> Option<DateBounds> {
        self.dataset.bounds
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Name of the uploaded file, if the session is on an upload.
    pub fn upload_name(&self) -> Option<&str> {
        if self.dataset.uploaded {
            self.dataset.table.source_name()
        } else {
            None
        }
    }

    /// Apply a control change. On error the filter state is unchanged.
    pub fn apply(&mut self, id: ControlId, value: &ControlValue) -> Result<()> {
        let mut next = self.filter.clone();
        apply_control(&mut next, id, value)?;
        tracing::debug!("Control {:?} updated", id);
        self.filter = next;
        Ok(())
    }

    /// Replace the whole filter state.
    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    /// Back to the full date range with nothing selected.
    pub fn reset(&mut self) {
        self.filter = FilterState::defaults(self.dataset.bounds);
    }

    /// Swap in a new dataset (e.g. an upload) and reset the filters.
    pub fn replace_dataset(&mut self, dataset: Dataset) {
        tracing::info!(
            "Session dataset replaced: {} rows from {}",
            dataset.table.len(),
            dataset.table.source_name().unwrap_or("<unnamed>")
        );
        self.dataset = dataset;
        self.reset();
    }

    /// The current filtered view.
    pub fn view(&self) -> FilteredView<'_> {
        filter(&self.dataset.table, &self.filter)
    }

    /// The current view plus control options.
    pub fn cascade(&self) -> Cascade<'_> {
        cascade(&self.dataset.table, &self.filter)
    }

    /// CSV export of the current view.
    pub fn export(&self) -> Result<Export> {
        export(&self.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::test_support::record;
    use chrono::NaiveDate;

    fn context() -> DashboardContext {
        DashboardContext::new(Dataset::from_table(RecordTable::from_records(vec![
            record("2023-01-05", "East", "Tech", 100.0),
            record("2023-02-10", "West", "Tech", 50.0),
        ])))
    }

    #[test]
    fn test_defaults_cover_full_range() {
        let ctx = context();
        assert_eq!(ctx.filter().start, NaiveDate::from_ymd_opt(2023, 1, 5).unwrap());
        assert_eq!(ctx.filter().end, NaiveDate::from_ymd_opt(2023, 2, 10).unwrap());
        assert_eq!(ctx.view().len(), 2);
        assert_eq!(ctx.upload_name(), None);
    }

    #[test]
    fn test_apply_and_reset() {
        let mut ctx = context();
        ctx.apply(
            ControlId::Regions,
            &ControlValue::Selection(vec!["West".to_string()]),
        )
        .unwrap();
        assert_eq!(ctx.view().len(), 1);

        ctx.reset();
        assert_eq!(ctx.view().len(), 2);
        assert!(!ctx.filter().has_selection());
    }

    #[test]
    fn test_failed_apply_keeps_state() {
        let mut ctx = context();
        let before = ctx.filter().clone();
        assert!(ctx.apply(ControlId::Upload, &ControlValue::Selection(vec![])).is_err());
        assert_eq!(ctx.filter(), &before);
    }

    #[test]
    fn test_replace_dataset_resets_filter() {
        let mut ctx = context();
        ctx.apply(
            ControlId::Regions,
            &ControlValue::Selection(vec!["West".to_string()]),
        )
        .unwrap();

        let csv = "Order Date,Region,State,City,Category,Sub-Category,Segment,Sales,Profit,Quantity\n\
                   2024-05-01,North,A,B,Tech,Phones,Consumer,10,1,1\n";
        let upload = DatasetSource::Upload {
            file_name: "mine.csv".to_string(),
            bytes: csv.as_bytes().to_vec(),
        };
        ctx.replace_dataset(Dataset::open(&upload, DatePolicy::Strict).unwrap());

        assert_eq!(ctx.upload_name(), Some("mine.csv"));
        assert!(!ctx.filter().has_selection());
        assert_eq!(ctx.view().len(), 1);
    }
}
