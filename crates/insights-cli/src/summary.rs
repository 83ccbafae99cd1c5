//! Summary command: category and monthly sales totals.

use std::path::Path;

use insights::render::Render;
use insights_core::{filter, sales_by_category, sales_by_month};

use crate::colors;
use crate::dataset::{self, FilterArgs};

pub async fn execute(config_path: Option<&Path>, args: &FilterArgs) -> anyhow::Result<()> {
    let config = dataset::resolve_config(config_path, args.dataset.clone())?;
    let data = dataset::open(&config).await?;

    let state = args.filter_state(data.bounds);
    let view = filter(&data.table, &state);

    println!(
        "\n{}Sales Summary{} {}{} to {}{}",
        colors::BOLD,
        colors::RESET,
        colors::DIM,
        state.start,
        state.end,
        colors::RESET
    );
    println!("{}", "─".repeat(50));
    println!("Rows:        {} of {}", view.len(), data.table.len());
    println!("Total sales: {:.2}", view.total_sales());

    if view.is_empty() {
        println!("\nNo rows match the current filters.");
        return Ok(());
    }

    println!("\n{}By Category{}", colors::BOLD, colors::RESET);
    println!("{}", sales_by_category(&view).render_text());

    println!("\n{}By Month{}", colors::BOLD, colors::RESET);
    println!("{}", sales_by_month(&view).render_text());

    Ok(())
}
