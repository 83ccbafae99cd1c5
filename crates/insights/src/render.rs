//! Rich output rendering for dashboard panels.
//!
//! The [`Render`] trait lets charts and tables provide the representations
//! the dashboard needs: plain text for the terminal, HTML for the browser
//! and structured data for programmatic access.

use crate::style::escape;

/// Types that can render rich output on the dashboard.
///
/// # Example
///
/// ```rust
/// use insights::render::Render;
///
/// struct Headline {
///     total: f64,
/// }
///
/// impl Render for Headline {
///     fn render_text(&self) -> String {
///         format!("Total sales: {:.2}", self.total)
///     }
///
///     fn render_html(&self) -> Option<String> {
///         Some(format!("<strong>{:.2}</strong>", self.total))
///     }
/// }
/// ```
pub trait Render {
    /// Plain text representation (for terminals).
    fn render_text(&self) -> String;

    /// Rich HTML representation (for the browser).
    ///
    /// Return `None` to fall back to text rendering.
    fn render_html(&self) -> Option<String> {
        None
    }

    /// Structured data for programmatic access.
    ///
    /// Return `None` if no structured data is available.
    fn render_data(&self) -> Option<serde_json::Value> {
        None
    }
}

/// HTML for any renderable value, falling back to escaped preformatted text.
pub fn to_html<R: Render + ?Sized>(value: &R) -> String {
    value
        .render_html()
        .unwrap_or_else(|| format!("<pre>{}</pre>", escape(&value.render_text())))
}

impl Render for insights_core::Aggregate {
    fn render_text(&self) -> String {
        let width = self.keys().map(|k| k.chars().count()).max().unwrap_or(0);
        self.iter()
            .map(|(key, value)| format!("{key:<width$}  {value:>14.2}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_data(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self).ok()
    }
}
