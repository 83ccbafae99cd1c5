//! Shared dataset and filter handling for the batch commands.

use std::path::Path;

use chrono::NaiveDate;
use clap::Args;
use insights_core::{DashboardConfig, Dataset, DateBounds, FilterState};

/// Dataset and filter options shared by export, summary and report.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Dataset (path or http(s) URL)
    #[arg(short, long)]
    pub dataset: Option<String>,

    /// First order date to include (YYYY-MM-DD, default: earliest in the data)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last order date to include (YYYY-MM-DD, default: latest in the data)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Keep only this region (repeatable)
    #[arg(long = "region", value_name = "REGION")]
    pub regions: Vec<String>,

    /// Keep only this state (repeatable)
    #[arg(long = "state", value_name = "STATE")]
    pub states: Vec<String>,

    /// Keep only this city (repeatable)
    #[arg(long = "city", value_name = "CITY")]
    pub cities: Vec<String>,
}

impl FilterArgs {
    /// Filter state over the dataset's bounds with these options applied.
    pub fn filter_state(&self, bounds: Option<DateBounds>) -> FilterState {
        let mut state = FilterState::defaults(bounds);
        if let Some(start) = self.start {
            state.start = start;
        }
        if let Some(end) = self.end {
            state.end = end;
        }
        state.regions = self.regions.iter().cloned().collect();
        state.states = self.states.iter().cloned().collect();
        state.cities = self.cities.iter().cloned().collect();
        state
    }
}

/// Configuration with the `--dataset` override applied.
pub fn resolve_config(config_path: Option<&Path>, dataset: Option<String>) -> anyhow::Result<DashboardConfig> {
    let config = DashboardConfig::load(config_path)?.with_dataset(dataset);
    tracing::debug!("Resolved configuration: {:?}", config);
    Ok(config)
}

/// Load the configured dataset.
pub async fn open(config: &DashboardConfig) -> anyhow::Result<Dataset> {
    let source = config.dataset_source()?;
    let dataset = insights_server::open_dataset(source, config.date_policy).await?;
    Ok(dataset)
}
