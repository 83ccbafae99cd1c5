//! Dashboard configuration.
//!
//! Resolution order, later wins:
//! 1. Built-in defaults
//! 2. `insights.toml` (explicit path, or next to the executable)
//! 3. `INSIGHTS_DATASET` environment variable
//! 4. Command-line overrides applied by the caller

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::load::DatasetSource;
use crate::preprocess::DatePolicy;

/// Environment variable naming the fallback dataset.
pub const DATASET_ENV: &str = "INSIGHTS_DATASET";

/// Config file looked up next to the executable.
pub const CONFIG_FILE_NAME: &str = "insights.toml";

/// Default cap on rows shown in the raw data panel.
pub const DEFAULT_MAX_TABLE_ROWS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Fallback dataset: a file path or an http(s) URL.
    pub dataset: Option<String>,
    /// Handling of rows with unparsable order dates.
    pub date_policy: DatePolicy,
    /// Maximum rows rendered in the raw data panel.
    pub max_table_rows: usize,
    pub server: ServerSettings,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset: None,
            date_policy: DatePolicy::default(),
            max_table_rows: DEFAULT_MAX_TABLE_ROWS,
            server: ServerSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl DashboardConfig {
    /// Parse a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from `path`, or from `insights.toml` next to the
    /// executable, falling back to defaults. Environment overrides are applied.
    ///
    /// An explicit `path` that does not exist is an error; a missing default
    /// file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(found) => Self::read_file(&found)?,
                None => {
                    tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                    Self::default()
                }
            },
        };
        config.apply_env();
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        tracing::info!("Loading config from: {}", path.display());
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let mut config = Self::from_toml(&contents)?;

        // relative dataset paths are relative to the config file
        if let (Some(dataset), Some(dir)) = (config.dataset.as_mut(), path.parent()) {
            if !is_url(dataset) && Path::new(dataset.as_str()).is_relative() {
                *dataset = dir.join(dataset.as_str()).display().to_string();
            }
        }
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(DATASET_ENV) {
            if !value.trim().is_empty() {
                tracing::debug!("Dataset overridden by {}", DATASET_ENV);
                self.dataset = Some(value);
            }
        }
    }

    /// Override the dataset location (e.g. from a CLI flag).
    pub fn with_dataset(mut self, dataset: Option<String>) -> Self {
        if dataset.is_some() {
            self.dataset = dataset;
        }
        self
    }

    /// The configured fallback dataset.
    ///
    /// Fails with [`Error::Config`] when none is set; reading the source
    /// later fails with [`Error::DataLoad`].
    pub fn dataset_source(&self) -> Result<DatasetSource> {
        self.dataset
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(DatasetSource::parse)
            .ok_or_else(|| Error::Config("no fallback dataset configured".to_string()))
    }
}

fn is_url(location: &str) -> bool {
    matches!(DatasetSource::parse(location), DatasetSource::Url(_))
}

fn default_config_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(CONFIG_FILE_NAME))
}
