use insights_core::HierarchyNode;
use plotters::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;

use super::{ChartArea, ChartResult, draw_no_data, render_svg, svg_or_none};
use crate::render::Render;
use crate::style::{FONT, format_value, series_color};

const HEADER: f64 = 16.0;
const PAD: f64 = 2.0;
const MARGIN: f64 = 10.0;
const BRANCH_FILL: RGBColor = RGBColor(0xee, 0xee, 0xee);

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    fn corners(&self) -> [(i32, i32); 2] {
        [
            (self.x.round() as i32, self.y.round() as i32),
            ((self.x + self.w).round() as i32, (self.y + self.h).round() as i32),
        ]
    }
}

/// One laid-out treemap node.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell<'a> {
    pub node: &'a HierarchyNode,
    pub rect: Rect,
    /// `None` for branch nodes.
    pub color: Option<RGBColor>,
}

/// Nested rectangles sized by value. Leaves share a color when they share a label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Treemap {
    pub title: String,
    pub roots: Vec<HierarchyNode>,
}

impl Treemap {
    pub fn new(title: impl Into<String>, roots: Vec<HierarchyNode>) -> Self {
        Self {
            title: title.into(),
            roots,
        }
    }

    /// Leaf label → color, in first-appearance order.
    pub fn leaf_colors(&self) -> FxHashMap<&str, RGBColor> {
        let mut colors = FxHashMap::default();
        for root in &self.roots {
            for leaf in root.leaves() {
                let next = colors.len();
                colors.entry(leaf.label.as_str()).or_insert_with(|| series_color(next));
            }
        }
        colors
    }

    /// Squarified layout of every node inside `area`, parents before children.
    pub fn layout(&self, area: Rect) -> Vec<Cell<'_>> {
        let colors = self.leaf_colors();
        let mut cells = Vec::new();
        layout_nodes(&self.roots, area, &colors, &mut cells);
        cells
    }

    pub fn to_svg(&self) -> ChartResult<String> {
        render_svg(&self.title, |area| {
            if self.roots.iter().all(|r| r.value <= 0.0) {
                return draw_no_data(area);
            }
            let (w, h) = area.dim_in_pixel();
            let bounds = Rect::new(
                MARGIN,
                0.0,
                (f64::from(w) - 2.0 * MARGIN).max(0.0),
                (f64::from(h) - MARGIN).max(0.0),
            );
            for cell in self.layout(bounds) {
                draw_cell(area, &cell)?;
            }
            Ok(())
        })
    }
}

fn layout_nodes<'a>(
    nodes: &'a [HierarchyNode],
    area: Rect,
    colors: &FxHashMap<&str, RGBColor>,
    cells: &mut Vec<Cell<'a>>,
) {
    let values: Vec<f64> = nodes.iter().map(|n| n.value).collect();
    for (node, rect) in nodes.iter().zip(squarify(&values, area)) {
        if rect.area() <= 0.0 {
            continue;
        }
        if node.is_leaf() {
            let color = colors.get(node.label.as_str()).copied();
            cells.push(Cell { node, rect, color });
        } else {
            cells.push(Cell {
                node,
                rect,
                color: None,
            });
            let inner = Rect::new(
                rect.x + PAD,
                rect.y + HEADER,
                (rect.w - 2.0 * PAD).max(0.0),
                (rect.h - HEADER - PAD).max(0.0),
            );
            layout_nodes(&node.children, inner, colors, cells);
        }
    }
}

fn draw_cell(area: &ChartArea<'_>, cell: &Cell<'_>) -> ChartResult<()> {
    let rect = cell.rect;
    let corners = cell.rect.corners();
    let fill = cell.color.unwrap_or(BRANCH_FILL);
    area.draw(&Rectangle::new(corners, fill.filled()))?;
    area.draw(&Rectangle::new(corners, WHITE.stroke_width(1)))?;

    let x = (rect.x + 4.0).round() as i32;
    let y = rect.y.round() as i32;
    match cell.color {
        Some(_) if rect.w > 40.0 && rect.h > 28.0 => {
            let style = (FONT, 12).into_font().color(&WHITE);
            area.draw(&Text::new(cell.node.label.clone(), (x, y + 3), style.clone()))?;
            area.draw(&Text::new(format_value(cell.node.value), (x, y + 16), style))?;
        }
        None if rect.w > 30.0 && rect.h > HEADER => {
            let style = (FONT, 12).into_font().color(&BLACK);
            area.draw(&Text::new(cell.node.label.clone(), (x, y + 2), style))?;
        }
        _ => {}
    }
    Ok(())
}

/// Squarified treemap layout (Bruls, Huizing, van Wijk).
///
/// Returns one rectangle per input value, in input order. Non-positive values
/// get an empty rectangle.
pub fn squarify(values: &[f64], rect: Rect) -> Vec<Rect> {
    let mut out = vec![Rect::new(rect.x, rect.y, 0.0, 0.0); values.len()];
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 || rect.area() <= 0.0 {
        return out;
    }

    let scale = rect.area() / total;
    let mut order: Vec<usize> = (0..values.len()).filter(|i| values[*i] > 0.0).collect();
    order.sort_by(|a, b| values[*b].total_cmp(&values[*a]));
    let areas: Vec<(usize, f64)> = order.iter().map(|i| (*i, values[*i] * scale)).collect();

    let mut free = rect;
    let mut row: Vec<(usize, f64)> = Vec::new();
    let mut next = 0;
    while next < areas.len() {
        let side = free.w.min(free.h);
        let mut extended = row.clone();
        extended.push(areas[next]);
        if row.is_empty() || worst(&extended, side) <= worst(&row, side) {
            row = extended;
            next += 1;
        } else {
            free = place_row(&row, free, &mut out);
            row.clear();
        }
    }
    if !row.is_empty() {
        place_row(&row, free, &mut out);
    }
    out
}

fn worst(row: &[(usize, f64)], side: f64) -> f64 {
    let sum: f64 = row.iter().map(|(_, a)| a).sum();
    if sum <= 0.0 || side <= 0.0 {
        return f64::INFINITY;
    }
    let side2 = side * side;
    let sum2 = sum * sum;
    row.iter()
        .map(|(_, a)| (side2 * a / sum2).max(sum2 / (side2 * a)))
        .fold(0.0, f64::max)
}

/// Lay a row along the shorter side of `free`; returns the remaining space.
fn place_row(row: &[(usize, f64)], free: Rect, out: &mut [Rect]) -> Rect {
    let sum: f64 = row.iter().map(|(_, a)| a).sum();
    if free.w >= free.h {
        let col_w = if free.h > 0.0 { sum / free.h } else { 0.0 };
        let mut y = free.y;
        for (i, a) in row {
            let h = if col_w > 0.0 { a / col_w } else { 0.0 };
            out[*i] = Rect::new(free.x, y, col_w, h);
            y += h;
        }
        Rect::new(free.x + col_w, free.y, (free.w - col_w).max(0.0), free.h)
    } else {
        let row_h = if free.w > 0.0 { sum / free.w } else { 0.0 };
        let mut x = free.x;
        for (i, a) in row {
            let w = if row_h > 0.0 { a / row_h } else { 0.0 };
            out[*i] = Rect::new(x, free.y, w, row_h);
            x += w;
        }
        Rect::new(free.x, free.y + row_h, free.w, (free.h - row_h).max(0.0))
    }
}

fn describe(node: &HierarchyNode, depth: usize, out: &mut String) {
    out.push_str(&format!("{}{}: {:.2}\n", "  ".repeat(depth + 1), node.label, node.value));
    for child in &node.children {
        describe(child, depth + 1, out);
    }
}

impl Render for Treemap {
    fn render_text(&self) -> String {
        let mut out = format!("{}\n", self.title);
        if self.roots.is_empty() {
            out.push_str("  No data");
        }
        for root in &self.roots {
            describe(root, 0, &mut out);
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
