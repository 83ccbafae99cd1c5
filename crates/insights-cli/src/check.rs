//! Check command: load and normalize a dataset, then describe it.

use std::path::Path;

use insights_core::{Dimension, FilteredView, load, normalize};

use crate::colors;
use crate::dataset;

pub async fn execute(config_path: Option<&Path>, dataset: Option<String>) -> anyhow::Result<()> {
    let config = dataset::resolve_config(config_path, dataset)?;
    let source = insights_server::resolve_source(config.dataset_source()?).await?;

    let raw = load(&source)?;
    let columns = raw.headers.len();
    let normalized = normalize(raw, config.date_policy)?;
    let table = &normalized.table;

    println!(
        "{}✓{} {}: {} rows, {} columns",
        colors::GREEN,
        colors::RESET,
        table.source_name().unwrap_or("dataset"),
        table.len(),
        columns
    );
    match normalized.bounds {
        Some(bounds) => println!("  Order dates: {} to {}", bounds.min, bounds.max),
        None => println!("  Order dates: none"),
    }
    if normalized.skipped_rows > 0 {
        println!("  Skipped rows with unreadable dates: {}", normalized.skipped_rows);
    }

    let all = FilteredView::all(table);
    for dimension in [Dimension::Region, Dimension::State, Dimension::City, Dimension::Category] {
        println!("  {}: {} distinct", dimension.label(), all.distinct(dimension).len());
    }
    Ok(())
}
