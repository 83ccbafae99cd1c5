//! Core data pipeline for the Market Insights sales dashboard.
//!
//! This crate provides:
//! - Dataset loading from CSV and spreadsheet files
//! - Normalization of order dates and numeric columns
//! - The filter engine (date range plus region/state/city selections)
//! - Group-by-sum aggregation
//! - CSV export of the filtered view
//! - Dashboard controls and the explicit per-session context

pub mod aggregate;
pub mod config;
pub mod controls;
pub mod error;
pub mod export;
pub mod filter;
pub mod load;
pub mod preprocess;
pub mod record;
pub mod session;

pub use aggregate::{Aggregate, HierarchyNode, aggregate_by, hierarchy, sales_by_category, sales_by_month};
pub use config::{DashboardConfig, ServerSettings};
pub use controls::{ControlDef, ControlId, ControlValue};
pub use error::{Error, Result};
pub use export::{EXPORT_FILE_NAME, EXPORT_MIME_TYPE, Export, export};
pub use filter::{Cascade, FilterState, FilteredView, cascade, filter};
pub use load::{DatasetFormat, DatasetSource, RawTable, load, load_bytes};
pub use preprocess::{DateBounds, DatePolicy, Normalized, normalize};
pub use record::{Column, ColumnSlot, Dimension, Measure, Record, RecordTable};
pub use session::{DashboardContext, Dataset};
