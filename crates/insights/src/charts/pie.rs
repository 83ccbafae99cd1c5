use plotters::element::Pie;
use plotters::prelude::*;
use serde::Serialize;

use super::{ChartResult, draw_no_data, render_svg, svg_or_none};
use crate::render::Render;
use crate::style::{FONT, series_color};

/// Outer radius as a fraction of the shorter side of the drawing area.
const RADIUS: f64 = 0.32;

/// Share-of-total chart; a non-zero `hole` makes it a donut.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<(String, f64)>,
    /// Inner radius as a fraction of the outer radius.
    pub hole: f64,
}

impl PieChart {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slices: Vec::new(),
            hole: 0.0,
        }
    }

    pub fn with_slices(mut self, slices: Vec<(String, f64)>) -> Self {
        self.slices = slices;
        self
    }

    pub fn with_hole(mut self, hole: f64) -> Self {
        self.hole = hole.clamp(0.0, 0.95);
        self
    }

    /// Slices with a positive value, paired with their share of the total.
    pub fn shares(&self) -> Vec<(&str, f64, f64)> {
        let total: f64 = self.slices.iter().map(|(_, v)| *v).filter(|v| *v > 0.0).sum();
        if total <= 0.0 {
            return vec![];
        }
        self.slices
            .iter()
            .filter(|(_, v)| *v > 0.0)
            .map(|(k, v)| (k.as_str(), *v, *v / total))
            .collect()
    }

    pub fn to_svg(&self) -> ChartResult<String> {
        render_svg(&self.title, |area| {
            let shares = self.shares();
            if shares.is_empty() {
                return draw_no_data(area);
            }

            let (w, h) = area.dim_in_pixel();
            let center = ((w / 2) as i32, (h / 2) as i32);
            let radius = f64::from(w.min(h)) * RADIUS;
            let sizes: Vec<f64> = shares.iter().map(|(_, value, _)| *value).collect();
            let colors: Vec<RGBColor> = (0..shares.len()).map(series_color).collect();
            let labels: Vec<String> = shares
                .iter()
                .map(|(label, _, share)| format!("{label} ({:.1}%)", share * 100.0))
                .collect();

            let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
            // first slice starts at twelve o'clock
            pie.start_angle(-90.0);
            pie.label_style((FONT, 13).into_font().color(&BLACK));
            area.draw(&pie)?;

            if self.hole > 0.0 {
                let inner = (radius * self.hole).round() as i32;
                area.draw(&Circle::new(center, inner, WHITE.filled()))?;
            }
            Ok(())
        })
    }
}

impl Render for PieChart {
    fn render_text(&self) -> String {
        let shares = self.shares();
        let mut out = format!("{}\n", self.title);
        if shares.is_empty() {
            out.push_str("  No data");
        }
        for (label, value, share) in shares {
            out.push_str(&format!("  {label}: {value:.2} ({:.1}%)\n", share * 100.0));
        }
        out.trim_end().to_string()
    }

    fn render_html(&self) -> Option<String> {
        svg_or_none(&self.title, self.to_svg())
    }

    fn render_data(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self).ok()
    }
}
