//! Export command: write the filtered view as CSV.

use std::fs;
use std::path::Path;

use insights_core::{export, filter};

use crate::colors;
use crate::dataset::{self, FilterArgs};

pub async fn execute(config_path: Option<&Path>, args: &FilterArgs, output: &Path) -> anyhow::Result<()> {
    let config = dataset::resolve_config(config_path, args.dataset.clone())?;
    let data = dataset::open(&config).await?;

    let state = args.filter_state(data.bounds);
    let view = filter(&data.table, &state);
    let out = export(&view)?;

    fs::write(output, &out.bytes)
        .map_err(|e| anyhow::anyhow!("cannot write {}: {}", output.display(), e))?;
    tracing::info!("Exported {} bytes to {}", out.bytes.len(), output.display());

    println!(
        "{}✓{} Wrote {} of {} rows to {}",
        colors::GREEN,
        colors::RESET,
        view.len(),
        data.table.len(),
        output.display()
    );
    Ok(())
}
