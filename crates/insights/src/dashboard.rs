//! The full dashboard as a pure function of a session context.
//!
//! Every call re-derives the filtered view, the aggregates and every chart
//! from the context; nothing is cached between renders.

use insights_core::config::DEFAULT_MAX_TABLE_ROWS;
use insights_core::controls::build_controls;
use insights_core::{
    ControlDef, DashboardConfig, DashboardContext, Dimension, FilteredView, Measure, aggregate_by, hierarchy,
    sales_by_category, sales_by_month,
};
use serde::Serialize;

use crate::charts::{BarChart, LineChart, PieChart, ScatterChart, ScatterPoint, Treemap};
use crate::render::Render;
use crate::style::escape;
use crate::table::{Colormap, GradientTable};

pub const DASHBOARD_TITLE: &str = "Market Insights Dashboard";

/// Donut hole of the region chart.
const REGION_HOLE: f64 = 0.5;

/// Treemap levels.
const HIERARCHY: [Dimension; 3] = [Dimension::Region, Dimension::Category, Dimension::SubCategory];

/// Rendering knobs that don't belong to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Cap on rows shown in the raw data table.
    pub max_table_rows: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_table_rows: DEFAULT_MAX_TABLE_ROWS,
        }
    }
}

impl From<&DashboardConfig> for RenderOptions {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            max_table_rows: config.max_table_rows,
        }
    }
}

/// How much horizontal space a panel takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelWidth {
    Full,
    Half,
}

/// One rendered dashboard section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub id: String,
    pub title: String,
    pub width: PanelWidth,
    /// Rendered inside an expander.
    pub collapsible: bool,
    pub html: String,
    pub data: Option<serde_json::Value>,
    #[serde(skip)]
    pub text: String,
}

impl Panel {
    fn new(id: &str, title: &str, width: PanelWidth, content: &dyn Render) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            width,
            collapsible: false,
            html: crate::render::to_html(content),
            data: content.render_data(),
            text: content.render_text(),
        }
    }

    fn collapsed(mut self) -> Self {
        self.collapsible = true;
        self
    }
}

/// Everything the frontend needs to draw one state of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub title: String,
    /// File the data came from.
    pub source_name: Option<String>,
    /// Set when the session is on an uploaded file.
    pub upload_name: Option<String>,
    /// Rows in the filtered view.
    pub row_count: usize,
    /// Rows in the whole dataset.
    pub total_rows: usize,
    pub total_sales: f64,
    pub controls: Vec<ControlDef>,
    pub panels: Vec<Panel>,
}

impl DashboardView {
    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.id == id)
    }

    /// A self-contained HTML page with every panel expanded.
    pub fn to_standalone_html(&self) -> String {
        let mut body = String::new();
        body.push_str(&format!("<h1>{}</h1>", escape(&self.title)));
        body.push_str(&format!(
            r#"<p class="meta">{} of {} rows from {}, total sales {:.2}</p>"#,
            self.row_count,
            self.total_rows,
            escape(self.source_name.as_deref().unwrap_or("unnamed dataset")),
            self.total_sales
        ));
        body.push_str(r#"<div class="panels">"#);
        for panel in &self.panels {
            let class = match panel.width {
                PanelWidth::Full => "panel full",
                PanelWidth::Half => "panel half",
            };
            if panel.collapsible {
                body.push_str(&format!(
                    r#"<details class="{class}" open><summary>{}</summary>{}</details>"#,
                    escape(&panel.title),
                    panel.html
                ));
            } else {
                body.push_str(&format!(
                    r#"<section class="{class}"><h2>{}</h2>{}</section>"#,
                    escape(&panel.title),
                    panel.html
                ));
            }
        }
        body.push_str("</div>");
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head><body>{}</body></html>\n",
            escape(&self.title),
            REPORT_CSS,
            body
        )
    }
}

const REPORT_CSS: &str = "body{font-family:sans-serif;margin:24px;color:#222}\
.meta{color:#666}.panels{display:flex;flex-wrap:wrap;gap:16px}\
.panel{box-sizing:border-box;border:1px solid #ddd;border-radius:6px;padding:8px}\
.full{flex:1 1 100%}.half{flex:1 1 calc(50% - 8px)}\
svg{max-width:100%;height:auto}.table-wrap{overflow:auto;max-height:480px}\
.gradient-table{border-collapse:collapse;font-size:12px}\
.gradient-table td,.gradient-table th{padding:2px 8px;border-bottom:1px solid #eee;white-space:nowrap}\
.num{text-align:right}";

impl Render for DashboardView {
    fn render_text(&self) -> String {
        let mut out = format!(
            "{}\n{} of {} rows, total sales {:.2}",
            self.title, self.row_count, self.total_rows, self.total_sales
        );
        for panel in &self.panels {
            out.push_str("\n\n");
            out.push_str(&panel.text);
        }
        out
    }

    fn render_html(&self) -> Option<String> {
        Some(self.to_standalone_html())
    }

    fn render_data(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self).ok()
    }
}

fn scatter_points(view: &FilteredView<'_>) -> Vec<ScatterPoint> {
    view.iter()
        .map(|r| ScatterPoint {
            x: r.sales,
            y: r.profit,
            size: r.quantity as f64,
            group: r.category.clone(),
        })
        .collect()
}

/// Derive the whole dashboard from the session context.
pub fn render_dashboard(ctx: &DashboardContext, options: &RenderOptions) -> DashboardView {
    let cascade = ctx.cascade();
    let controls = build_controls(ctx.upload_name(), ctx.bounds(), ctx.filter(), &cascade);
    let view = cascade.view;

    let by_category = sales_by_category(&view);
    let by_region = aggregate_by(&view, Dimension::Region, Measure::Sales);
    let by_month = sales_by_month(&view);
    let by_segment = aggregate_by(&view, Dimension::Segment, Measure::Sales);
    let tree = hierarchy(&view, &HIERARCHY, Measure::Sales);

    let bar = BarChart::new("Sales by Category", Dimension::Category.label(), Measure::Sales.label())
        .with_bars(by_category.to_vec());
    let region_pie = PieChart::new("Sales Distribution by Region")
        .with_hole(REGION_HOLE)
        .with_slices(by_region.to_vec());
    let trend = LineChart::new("Monthly Sales Trend", Dimension::Month.label(), Measure::Sales.label())
        .with_points(by_month.to_vec());
    let treemap = Treemap::new("Region / Category / Sub-Category", tree);
    let segment_pie = PieChart::new("Sales by Segment").with_slices(by_segment.to_vec());
    let category_pie = PieChart::new("Sales by Category").with_slices(by_category.to_vec());
    let scatter = ScatterChart::new(
        "Relationship between Sales and Profit",
        Measure::Sales.label(),
        Measure::Profit.label(),
    )
    .with_points(scatter_points(&view));
    let raw = GradientTable::from_view("Filtered Data", &view, Colormap::Coolwarm)
        .with_max_rows(options.max_table_rows);
    let summary = GradientTable::from_aggregate("Sales Summary by Category", &by_category, Colormap::Viridis);

    let panels = vec![
        Panel::new("sales_by_category", "Sales by Category", PanelWidth::Half, &bar),
        Panel::new("sales_by_region", "Sales by Region", PanelWidth::Half, &region_pie),
        Panel::new("monthly_trend", "Time-Series Sales Analysis", PanelWidth::Full, &trend),
        Panel::new("sales_hierarchy", "Hierarchical Sales Analysis", PanelWidth::Full, &treemap),
        Panel::new("sales_by_segment", "Sales by Segment", PanelWidth::Half, &segment_pie),
        Panel::new("category_share", "Sales by Category", PanelWidth::Half, &category_pie),
        Panel::new("sales_vs_profit", "Sales vs. Profit", PanelWidth::Full, &scatter),
        Panel::new("filtered_data", "View Filtered Data", PanelWidth::Full, &raw).collapsed(),
        Panel::new("category_summary", "View Sales Summary by Category", PanelWidth::Full, &summary).collapsed(),
    ];

    tracing::debug!("Rendered dashboard: {} of {} rows", view.len(), ctx.table().len());

    DashboardView {
        title: DASHBOARD_TITLE.to_string(),
        source_name: ctx.table().source_name().map(str::to_string),
        upload_name: ctx.upload_name().map(str::to_string),
        row_count: view.len(),
        total_rows: ctx.table().len(),
        total_sales: view.total_sales(),
        controls,
        panels,
    }
}
