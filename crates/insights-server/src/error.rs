//! Error types for the dashboard server.

use std::path::PathBuf;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// IO error.
    #[error("IO error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Dataset pipeline error.
    #[error(transparent)]
    Core(#[from] insights_core::Error),

    /// Remote dataset could not be downloaded.
    #[error("failed to load dataset: cannot fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// Uploaded payload could not be decoded.
    #[error("invalid upload: {0}")]
    Upload(String),
}

impl ServerError {
    /// Error text with a recovery hint where one exists.
    pub fn with_hint(&self) -> String {
        match self {
            ServerError::Core(e) => e.with_hint(),
            ServerError::Fetch { .. } => format!("{self}\n  hint: check the URL and your network connection"),
            _ => self.to_string(),
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            message: e.to_string(),
        }
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints() {
        let fetch = ServerError::Fetch {
            url: "https://example.com/orders.csv".to_string(),
            message: "timed out".to_string(),
        };
        assert!(fetch.with_hint().contains("hint: check the URL"));

        let upload = ServerError::Upload("orders.csv: invalid base64".to_string());
        assert_eq!(upload.with_hint(), "invalid upload: orders.csv: invalid base64");

        let core = ServerError::from(insights_core::Error::UnsupportedFormat("orders.pdf".to_string()));
        assert_eq!(core.with_hint(), insights_core::Error::UnsupportedFormat("orders.pdf".to_string()).with_hint());
    }
}
