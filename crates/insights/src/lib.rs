//! Market Insights: the presentation layer of the sales dashboard.
//!
//! This crate turns a [`DashboardContext`](insights_core::DashboardContext)
//! into a [`DashboardView`]:
//! - **Charts**: bar, pie/donut, line, treemap and scatter, rendered as SVG
//! - **Gradient tables**: numeric cells shaded by magnitude
//! - **Controls**: the upload, date and multi-select inputs with their options
//!
//! Rendering is a pure function of the session context, so each control
//! change re-derives the filtered view, every aggregate and every chart.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use insights::prelude::*;
//!
//! let dataset = Dataset::open(&DatasetSource::parse("Sample - Superstore.xls"), DatePolicy::Strict)?;
//! let ctx = DashboardContext::new(dataset);
//! let view = render_dashboard(&ctx, &RenderOptions::default());
//! std::fs::write("dashboard.html", view.to_standalone_html())?;
//! ```

pub mod charts;
pub mod dashboard;
pub mod render;
pub mod style;
pub mod table;

pub use dashboard::{DASHBOARD_TITLE, DashboardView, Panel, PanelWidth, RenderOptions, render_dashboard};

pub mod prelude {
    //! Common imports for building dashboards.
    //!
    //! ```rust,ignore
    //! use insights::prelude::*;
    //! ```

    pub use crate::charts::{BarChart, LineChart, PieChart, ScatterChart, ScatterPoint, Treemap};
    pub use crate::dashboard::{DashboardView, RenderOptions, render_dashboard};
    pub use crate::render::Render;
    pub use crate::table::{Colormap, GradientTable};

    pub use insights_core::{
        ControlId, ControlValue, DashboardConfig, DashboardContext, Dataset, DatasetSource, DatePolicy,
        FilterState,
    };
}
