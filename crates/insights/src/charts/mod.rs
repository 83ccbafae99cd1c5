//! Chart models and their SVG rendering.
//!
//! Every chart is plain data (serializable for the frontend) and implements
//! [`Render`](crate::render::Render). Drawing goes through plotters'
//! [`SVGBackend`]; a chart with no data still renders a titled, empty frame.

mod bar;
mod line;
mod pie;
mod scatter;
mod treemap;

pub use bar::BarChart;
pub use line::LineChart;
pub use pie::PieChart;
pub use scatter::{ScatterChart, ScatterPoint};
pub use treemap::Treemap;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::style::{FONT, MUTED};

/// Default chart size in pixels.
pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 400;

/// Drawing area of one chart, below its title.
pub(crate) type ChartArea<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Errors raised while drawing a chart.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("chart drawing failed: {0}")]
    Draw(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        ChartError::Draw(e.to_string())
    }
}

pub type ChartResult<T> = Result<T, ChartError>;

/// Render one chart to an SVG document.
///
/// `draw` receives the area under the title.
pub(crate) fn render_svg<F>(title: &str, draw: F) -> ChartResult<String>
where
    F: FnOnce(&ChartArea<'_>) -> ChartResult<()>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;
        let area = root.titled(title, (FONT, 18))?;
        draw(&area)?;
        root.present()?;
    }
    Ok(svg)
}

/// Centered placeholder for charts with nothing to draw.
pub(crate) fn draw_no_data(area: &ChartArea<'_>) -> ChartResult<()> {
    let (w, h) = area.dim_in_pixel();
    let style = (FONT, 16)
        .into_font()
        .color(&MUTED)
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new("No data", ((w / 2) as i32, (h / 2) as i32), style))?;
    Ok(())
}

/// Value axis range covering zero and every value, with headroom for labels.
pub(crate) fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = hi - lo;
    if span <= 0.0 {
        return (0.0, 1.0);
    }
    let lo = if lo < 0.0 { lo - span * 0.1 } else { lo };
    let hi = if hi > 0.0 { hi + span * 0.1 } else { hi };
    (lo, hi)
}

/// Label of the category under a segmented x value.
pub(crate) fn segment_label(value: &SegmentValue<i32>, labels: &[String]) -> String {
    match value {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| labels.get(i))
            .cloned()
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    }
}

/// Log a drawing failure and fall back to text rendering.
pub(crate) fn svg_or_none(chart: &str, result: ChartResult<String>) -> Option<String> {
    match result {
        Ok(svg) => Some(svg),
        Err(e) => {
            tracing::warn!("Failed to draw {}: {}", chart, e);
            None
        }
    }
}
