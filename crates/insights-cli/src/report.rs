//! Report command: the full dashboard as one HTML file.

use std::fs;
use std::path::Path;

use insights::{RenderOptions, render_dashboard};
use insights_core::DashboardContext;

use crate::colors;
use crate::dataset::{self, FilterArgs};

pub async fn execute(config_path: Option<&Path>, args: &FilterArgs, output: &Path) -> anyhow::Result<()> {
    let config = dataset::resolve_config(config_path, args.dataset.clone())?;
    let data = dataset::open(&config).await?;

    let state = args.filter_state(data.bounds);
    let mut ctx = DashboardContext::new(data);
    ctx.set_filter(state);

    let view = render_dashboard(&ctx, &RenderOptions::from(&config));
    fs::write(output, view.to_standalone_html())
        .map_err(|e| anyhow::anyhow!("cannot write {}: {}", output.display(), e))?;

    println!(
        "{}✓{} Dashboard for {} of {} rows written to {}",
        colors::GREEN,
        colors::RESET,
        view.row_count,
        view.total_rows,
        output.display()
    );
    Ok(())
}
