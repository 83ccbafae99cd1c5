use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::Serialize;

use super::{ChartResult, draw_no_data, render_svg, segment_label, svg_or_none, value_range};
use crate::render::Render;
use crate::style::{FONT, format_value, series_color};

/// Vertical bar chart with one bar per category and a value label on each bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<(String, f64)>,
}

impl BarChart {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            bars: Vec::new(),
        }
    }

    pub fn with_bars(mut self, bars: Vec<(String, f64)>) -> Self {
        self.bars = bars;
        self
    }

    pub fn to_svg(&self) -> ChartResult<String> {
        render_svg(&self.title, |area| {
            if self.bars.is_empty() {
                return draw_no_data(area);
            }

            let labels: Vec<String> = self.bars.iter().map(|(k, _)| k.clone()).collect();
            let (lo, hi) = value_range(self.bars.iter().map(|(_, v)| *v));
            let n = self.bars.len() as i32;

            let mut chart = ChartBuilder::on(area)
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d((0..n).into_segmented(), lo..hi)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(self.bars.len())
                .x_label_formatter(&|x| segment_label(x, &labels))
                .y_label_formatter(&|y| format_value(*y))
                .x_desc(self.x_label.as_str())
                .y_desc(self.y_label.as_str())
                .draw()?;

            for (i, (_, value)) in self.bars.iter().enumerate() {
                chart.draw_series(
                    Histogram::vertical(&chart)
                        .style(series_color(i).filled())
                        .margin(12)
                        .data(std::iter::once((i as i32, *value))),
                )?;
            }

            let label_style = (FONT, 13)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            chart.draw_series(self.bars.iter().enumerate().map(|(i, (_, value))| {
                Text::new(
                    format_value(*value),
                    (SegmentValue::CenterOf(i as i32), *value),
                    label_style.clone(),
                )
            }))?;
            Ok(())
        })
    }
}

impl Render for BarChart {
    fn render_text(&self) -> String {
        let mut out = format!("{}\n", self.title);
        if self.bars.is_empty() {
            out.push_str("  No data");
        }
        for (label, value) in &self.bars {
            out.push_str(&format!("  {label}: {value:.2}\n"));
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
