//! Error types for insights-core.

use thiserror::Error;

/// Result type for insights-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in insights-core.
#[derive(Debug, Error)]
pub enum Error {
    /// Dataset could not be read, parsed, or is missing required columns.
    #[error("failed to load dataset: {0}")]
    DataLoad(String),

    /// File extension is not one of the supported dataset formats.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Configuration file or value is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A control update did not match the control it targets.
    #[error("invalid control update: {0}")]
    InvalidControl(String),

    /// CSV encoding or decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::DataLoad`] with a formatted message.
    pub(crate) fn data_load(message: impl Into<String>) -> Self {
        Self::DataLoad(message.into())
    }

    /// Format the error together with a recovery hint for end users.
    pub fn with_hint(&self) -> String {
        let hint = match self {
            Error::DataLoad(_) => Some(
                "check that the file exists and has the columns Order Date, Region, State, City, \
                 Category, Sub-Category, Segment, Sales, Profit, Quantity",
            ),
            Error::UnsupportedFormat(_) => Some("supported formats are .csv, .xlsx and .xls"),
            Error::Config(_) => Some(
                "set the dataset with --dataset, the INSIGHTS_DATASET environment variable, \
                 or `dataset = ...` in insights.toml",
            ),
            Error::InvalidControl(_) | Error::Csv(_) | Error::Io(_) => None,
        };

        match hint {
            Some(hint) => format!("{self}\n  hint: {hint}"),
            None => self.to_string(),
        }
    }
}
