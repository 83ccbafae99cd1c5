use plotters::prelude::*;
use serde::Serialize;

use super::{ChartResult, draw_no_data, render_svg, svg_or_none, value_range};
use crate::render::Render;
use crate::style::{format_value, series_color};

const MIN_RADIUS: f64 = 3.0;
const MAX_RADIUS: f64 = 14.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Marker size input; radius grows with its square root.
    pub size: f64,
    /// Color group.
    pub group: String,
}

/// Scatter plot with marker size and color channels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ScatterPoint>,
}

impl ScatterChart {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            points: Vec::new(),
        }
    }

    pub fn with_points(mut self, points: Vec<ScatterPoint>) -> Self {
        self.points = points;
        self
    }

    /// Color groups in first-appearance order.
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for p in &self.points {
            if !groups.contains(&p.group.as_str()) {
                groups.push(&p.group);
            }
        }
        groups
    }

    /// Marker radius in pixels; the largest size gets [`MAX_RADIUS`].
    pub fn marker_radius(&self, size: f64) -> f64 {
        let max_size = self.points.iter().map(|p| p.size).fold(0.0, f64::max);
        if max_size > 0.0 {
            MIN_RADIUS + (MAX_RADIUS - MIN_RADIUS) * (size.max(0.0) / max_size).sqrt()
        } else {
            MIN_RADIUS
        }
    }

    pub fn to_svg(&self) -> ChartResult<String> {
        render_svg(&self.title, |area| {
            if self.points.is_empty() {
                return draw_no_data(area);
            }

            let (x_lo, x_hi) = value_range(self.points.iter().map(|p| p.x));
            let (y_lo, y_hi) = value_range(self.points.iter().map(|p| p.y));
            let mut chart = ChartBuilder::on(area)
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

            chart
                .configure_mesh()
                .x_label_formatter(&|x| format_value(*x))
                .y_label_formatter(&|y| format_value(*y))
                .x_desc(self.x_label.as_str())
                .y_desc(self.y_label.as_str())
                .draw()?;

            for (i, group) in self.groups().into_iter().enumerate() {
                let color = series_color(i);
                chart
                    .draw_series(self.points.iter().filter(|p| p.group == group).map(|p| {
                        let radius = self.marker_radius(p.size).round() as i32;
                        Circle::new((p.x, p.y), radius, color.mix(0.7).filled())
                    }))?
                    .label(group)
                    .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
            Ok(())
        })
    }
}

impl Render for ScatterChart {
    fn render_text(&self) -> String {
        if self.points.is_empty() {
            return format!("{}\n  No data", self.title);
        }
        let groups = self.groups();
        let mut out = format!("{} ({} points)\n", self.title, self.points.len());
        for group in groups {
            let n = self.points.iter().filter(|p| p.group == group).count();
            out.push_str(&format!("  {group}: {n} points\n"));
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

    fn point(x: f64, y: f64, size: f64, group: &str) -> ScatterPoint {
        ScatterPoint {
            x,
            y,
            size,
            group: group.to_string(),
        }
    }

    fn chart() -> ScatterChart {
        ScatterChart::new("Sales vs. Profit", "Sales", "Profit").with_points(vec![
            point(100.0, 10.0, 2.0, "Technology"),
            point(50.0, -5.0, 8.0, "Furniture"),
            point(70.0, 3.0, 1.0, "Technology"),
        ])
    }

    #[test]
    fn test_groups_and_legend() {
        let chart = chart();
        assert_eq!(chart.groups(), vec!["Technology", "Furniture"]);
        let svg = chart.to_svg().unwrap();
        assert!(svg.matches("<circle").count() >= chart.points.len());
        assert!(svg.contains("Technology"));
        assert!(svg.contains("Furniture"));
        assert!(chart.render_text().contains("Technology: 2 points"));
    }

    #[test]
    fn test_radius_grows_with_size() {
        let chart = chart();
        assert_eq!(chart.marker_radius(8.0), MAX_RADIUS);
        assert!(chart.marker_radius(2.0) < chart.marker_radius(8.0));
        assert_eq!(chart.marker_radius(0.0), MIN_RADIUS);
    }

    #[test]
    fn test_zero_sizes_use_min_radius() {
        let chart = ScatterChart::new("s", "x", "y").with_points(vec![point(1.0, 1.0, 0.0, "a")]);
        assert_eq!(chart.marker_radius(0.0), MIN_RADIUS);
    }

    #[test]
    fn test_empty_scatter() {
        let chart = ScatterChart::new("Sales vs. Profit", "Sales", "Profit");
        assert!(chart.to_svg().unwrap().contains("No data"));
        assert!(chart.render_text().ends_with("No data"));
    }
}
