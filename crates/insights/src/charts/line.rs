use plotters::prelude::*;
use serde::Serialize;

use super::{ChartResult, draw_no_data, render_svg, segment_label, svg_or_none, value_range};
use crate::render::Render;
use crate::style::{format_value, series_color};

const POINT_RADIUS: i32 = 4;

/// Single-series line chart over ordered categorical x values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Points in drawing order.
    pub points: Vec<(String, f64)>,
}

impl LineChart {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            points: Vec::new(),
        }
    }

    pub fn with_points(mut self, points: Vec<(String, f64)>) -> Self {
        self.points = points;
        self
    }

    pub fn to_svg(&self) -> ChartResult<String> {
        render_svg(&self.title, |area| {
            if self.points.is_empty() {
                return draw_no_data(area);
            }

            let labels: Vec<String> = self.points.iter().map(|(k, _)| k.clone()).collect();
            let (lo, hi) = value_range(self.points.iter().map(|(_, v)| *v));
            let n = self.points.len() as i32;

            let mut chart = ChartBuilder::on(area)
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d((0..n).into_segmented(), lo..hi)?;

            chart
                .configure_mesh()
                .x_labels(self.points.len())
                .x_label_formatter(&|x| segment_label(x, &labels))
                .y_label_formatter(&|y| format_value(*y))
                .x_desc(self.x_label.as_str())
                .y_desc(self.y_label.as_str())
                .draw()?;

            let color = series_color(0);
            let coords: Vec<(SegmentValue<i32>, f64)> = self
                .points
                .iter()
                .enumerate()
                .map(|(i, (_, v))| (SegmentValue::CenterOf(i as i32), *v))
                .collect();
            chart.draw_series(LineSeries::new(coords.clone(), color.stroke_width(2)))?;
            chart.draw_series(
                coords
                    .into_iter()
                    .map(|c| Circle::new(c, POINT_RADIUS, color.filled())),
            )?;
            Ok(())
        })
    }
}

impl Render for LineChart {
    fn render_text(&self) -> String {
        let mut out = format!("{}\n", self.title);
        if self.points.is_empty() {
            out.push_str("  No data");
        }
        for (label, value) in &self.points {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_in_order() {
        let chart = LineChart::new("Monthly Sales Trend", "Month-Year", "Sales").with_points(vec![
            ("2023-01".to_string(), 10.0),
            ("2023-02".to_string(), 30.0),
            ("2023-03".to_string(), 20.0),
        ]);
        let svg = chart.to_svg().unwrap();
        assert_eq!(svg.matches("<circle").count(), 3);
        assert!(svg.contains("<polyline"));
        let first = svg.find("2023-01").unwrap();
        let last = svg.find("2023-03").unwrap();
        assert!(first < last);
    }

    #[test]
    fn test_empty_line_chart() {
        let chart = LineChart::new("Monthly Sales Trend", "Month-Year", "Sales");
        assert!(chart.to_svg().unwrap().contains("No data"));
        assert_eq!(chart.render_data().unwrap()["points"], serde_json::json!([]));
    }
}
