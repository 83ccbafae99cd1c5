//! Tables whose numeric cells are shaded by magnitude.

use insights_core::{Aggregate, ColumnSlot, FilteredView};
use serde::Serialize;

use crate::render::Render;
use crate::style::escape;

/// Color scale for cell backgrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Colormap {
    /// Diverging blue → white → red.
    Coolwarm,
    /// Sequential purple → green → yellow.
    Viridis,
}

const COOLWARM: [(f64, [u8; 3]); 5] = [
    (0.0, [59, 76, 192]),
    (0.25, [141, 176, 254]),
    (0.5, [221, 221, 221]),
    (0.75, [245, 156, 125]),
    (1.0, [180, 4, 38]),
];

const VIRIDIS: [(f64, [u8; 3]); 5] = [
    (0.0, [68, 1, 84]),
    (0.25, [59, 82, 139]),
    (0.5, [33, 145, 140]),
    (0.75, [94, 201, 98]),
    (1.0, [253, 231, 37]),
];

impl Colormap {
    /// RGB for `t` in `[0, 1]` (clamped).
    pub fn rgb(self, t: f64) -> [u8; 3] {
        let stops: &[(f64, [u8; 3])] = match self {
            Colormap::Coolwarm => &COOLWARM,
            Colormap::Viridis => &VIRIDIS,
        };
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
        for pair in stops.windows(2) {
            let ((t0, c0), (t1, c1)) = (pair[0], pair[1]);
            if t <= t1 {
                let f = (t - t0) / (t1 - t0);
                let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
                return [mix(c0[0], c1[0]), mix(c0[1], c1[1]), mix(c0[2], c1[2])];
            }
        }
        stops[stops.len() - 1].1
    }

    /// CSS hex color for `t`.
    pub fn hex(self, t: f64) -> String {
        let [r, g, b] = self.rgb(t);
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Black or white, whichever reads better on `rgb`.
pub fn text_color(rgb: [u8; 3]) -> &'static str {
    let [r, g, b] = rgb.map(|c| c as f64 / 255.0);
    let luminance = 0.2126 * r + 0.7152 * g + 0.0722 * b;
    if luminance > 0.5 { "#000000" } else { "#ffffff" }
}

/// One table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TableCell {
    Number(f64),
    Text(String),
}

impl TableCell {
    fn display(&self) -> String {
        match self {
            TableCell::Number(n) => format!("{n:.2}"),
            TableCell::Text(s) => s.clone(),
        }
    }
}

/// A table with per-column gradient shading of numeric cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<TableCell>>,
    pub colormap: Colormap,
    /// Rows beyond this are left out of the rendering.
    pub max_rows: Option<usize>,
}

impl GradientTable {
    pub fn new(title: impl Into<String>, headers: Vec<String>, colormap: Colormap) -> Self {
        Self {
            title: title.into(),
            headers,
            rows: Vec::new(),
            colormap,
            max_rows: None,
        }
    }

    /// The filtered records in their source column layout.
    ///
    /// Numeric columns are shaded; text and date columns are not.
    pub fn from_view(title: impl Into<String>, view: &FilteredView<'_>, colormap: Colormap) -> Self {
        let table = view.table();
        let numeric: Vec<bool> = table
            .slots()
            .iter()
            .map(|slot| matches!(slot, ColumnSlot::Required(c) if c.is_numeric()))
            .collect();
        let rows = view
            .iter()
            .map(|record| {
                table
                    .row_text(record)
                    .into_iter()
                    .zip(&numeric)
                    .map(|(text, is_numeric)| match text.parse::<f64>() {
                        Ok(n) if *is_numeric => TableCell::Number(n),
                        _ => TableCell::Text(text),
                    })
                    .collect()
            })
            .collect();
        Self {
            rows,
            ..Self::new(title, table.headers().to_vec(), colormap)
        }
    }

    /// Two-column summary (key, value) of an aggregate.
    pub fn from_aggregate(title: impl Into<String>, aggregate: &Aggregate, colormap: Colormap) -> Self {
        let key = aggregate.dimension.map(|d| d.label()).unwrap_or("Key");
        let value = aggregate.measure.map(|m| m.label()).unwrap_or("Value");
        let rows = aggregate
            .iter()
            .map(|(k, v)| vec![TableCell::Text(k.to_string()), TableCell::Number(v)])
            .collect();
        Self {
            rows,
            ..Self::new(title, vec![key.to_string(), value.to_string()], colormap)
        }
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Rows that will be rendered.
    pub fn visible_rows(&self) -> &[Vec<TableCell>] {
        let n = self.max_rows.map_or(self.rows.len(), |m| m.min(self.rows.len()));
        &self.rows[..n]
    }

    /// Rows left out by `max_rows`.
    pub fn hidden_rows(&self) -> usize {
        self.rows.len() - self.visible_rows().len()
    }

    /// `(min, max)` of each column's numbers over all rows.
    fn column_ranges(&self) -> Vec<Option<(f64, f64)>> {
        (0..self.headers.len())
            .map(|col| {
                self.rows
                    .iter()
                    .filter_map(|row| match row.get(col) {
                        Some(TableCell::Number(n)) if n.is_finite() => Some(*n),
                        _ => None,
                    })
                    .fold(None, |acc, n| match acc {
                        None => Some((n, n)),
                        Some((lo, hi)) => Some((f64::min(lo, n), f64::max(hi, n))),
                    })
            })
            .collect()
    }

    /// Background color of a numeric cell, if it is shaded.
    pub fn cell_color(&self, row: usize, col: usize) -> Option<String> {
        let Some(TableCell::Number(n)) = self.rows.get(row).and_then(|r| r.get(col)) else {
            return None;
        };
        let (lo, hi) = self.column_ranges().get(col).copied().flatten()?;
        let t = if hi > lo { (n - lo) / (hi - lo) } else { 0.5 };
        Some(self.colormap.hex(t))
    }

    pub fn to_html(&self) -> String {
        let ranges = self.column_ranges();
        let mut html = String::from(r#"<div class="table-wrap"><table class="gradient-table"><thead><tr>"#);
        for header in &self.headers {
            html.push_str(&format!("<th>{}</th>", escape(header)));
        }
        html.push_str("</tr></thead><tbody>");
        for row in self.visible_rows() {
            html.push_str("<tr>");
            for (col, cell) in row.iter().enumerate() {
                match (cell, ranges.get(col).copied().flatten()) {
                    (TableCell::Number(n), Some((lo, hi))) => {
                        let t = if hi > lo { (n - lo) / (hi - lo) } else { 0.5 };
                        let rgb = self.colormap.rgb(t);
                        html.push_str(&format!(
                            r#"<td class="num" style="background:#{:02x}{:02x}{:02x};color:{}">{}</td>"#,
                            rgb[0],
                            rgb[1],
                            rgb[2],
                            text_color(rgb),
                            cell.display()
                        ));
                    }
                    _ => html.push_str(&format!("<td>{}</td>", escape(&cell.display()))),
                }
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
        if self.rows.is_empty() {
            html.push_str(r#"<p class="empty">No data</p>"#);
        }
        let hidden = self.hidden_rows();
        if hidden > 0 {
            html.push_str(&format!(r#"<p class="more-rows">... {hidden} more rows</p>"#));
        }
        html.push_str("</div>");
        html
    }
}

impl Render for GradientTable {
    fn render_text(&self) -> String {
        let visible = self.visible_rows();
        let cells: Vec<Vec<String>> = visible
            .iter()
            .map(|row| row.iter().map(TableCell::display).collect())
            .collect();
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(col, h)| {
                cells
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |row: &[String]| {
            row.iter()
                .zip(&widths)
                .map(|(c, w)| format!("{c:<w$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = vec![self.title.clone(), line(&self.headers)];
        out.extend(cells.iter().map(|row| line(row)));
        if self.rows.is_empty() {
            out.push("No data".to_string());
        }
        let hidden = self.hidden_rows();
        if hidden > 0 {
            out.push(format!("... {hidden} more rows"));
        }
        out.join("\n")
    }

    fn render_html(&self) -> Option<String> {
        Some(self.to_html())
    }

    fn render_data(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> GradientTable {
        let agg: Aggregate = vec![
            ("Furniture".to_string(), 10.0),
            ("Office Supplies".to_string(), 20.0),
            ("Technology".to_string(), 30.0),
        ]
        .into_iter()
        .collect();
        GradientTable::from_aggregate("Category Summary", &agg, Colormap::Viridis)
    }

    #[test]
    fn test_colormap_endpoints() {
        assert_eq!(Colormap::Viridis.hex(0.0), "#440154");
        assert_eq!(Colormap::Viridis.hex(1.0), "#fde725");
        assert_eq!(Colormap::Coolwarm.hex(0.5), "#dddddd");
        assert_eq!(Colormap::Coolwarm.rgb(-3.0), Colormap::Coolwarm.rgb(0.0));
        assert_eq!(Colormap::Coolwarm.rgb(f64::NAN), Colormap::Coolwarm.rgb(0.5));
    }

    #[test]
    fn test_text_color_contrast() {
        assert_eq!(text_color([253, 231, 37]), "#000000");
        assert_eq!(text_color([68, 1, 84]), "#ffffff");
    }

    #[test]
    fn test_cells_shaded_by_column_range() {
        let table = summary();
        assert_eq!(table.cell_color(0, 1).as_deref(), Some("#440154"));
        assert_eq!(table.cell_color(1, 1).as_deref(), Some("#21918c"));
        assert_eq!(table.cell_color(2, 1).as_deref(), Some("#fde725"));
        assert_eq!(table.cell_color(0, 0), None);
    }

    #[test]
    fn test_truncation_footer() {
        let table = summary().with_max_rows(1);
        assert_eq!(table.visible_rows().len(), 1);
        assert_eq!(table.hidden_rows(), 2);
        assert!(table.to_html().contains("... 2 more rows"));
        assert!(table.render_text().ends_with("... 2 more rows"));
        // shading still spans every row, not just the visible ones
        assert!(table.to_html().contains("background:#440154"));
    }

    #[test]
    fn test_empty_table() {
        let agg = Aggregate::default();
        let table = GradientTable::from_aggregate("Empty", &agg, Colormap::Coolwarm);
        assert_eq!(table.headers, vec!["Key", "Value"]);
        assert!(table.to_html().contains("No data"));
    }
}
