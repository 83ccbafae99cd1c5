//! Opening datasets, including ones behind an HTTP(S) URL.

use insights_core::load::url_file_name;
use insights_core::{Dataset, DatasetSource, DatePolicy};

use crate::error::{ServerError, ServerResult};

/// Download a remote dataset.
pub async fn fetch_bytes(url: &str) -> ServerResult<Vec<u8>> {
    let fetch_error = |e: reqwest::Error| ServerError::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    };

    tracing::info!("Fetching dataset from {}", url);
    let response = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(fetch_error)?;
    let bytes = response.bytes().await.map_err(fetch_error)?;
    tracing::debug!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}

/// Turn a URL source into uploaded bytes; other sources pass through.
pub async fn resolve_source(source: DatasetSource) -> ServerResult<DatasetSource> {
    match source {
        DatasetSource::Url(url) => {
            let bytes = fetch_bytes(&url).await?;
            let file_name = url_file_name(&url).to_string();
            Ok(DatasetSource::Upload { file_name, bytes })
        }
        other => Ok(other),
    }
}

/// Load and normalize a dataset from a path or URL.
///
/// URL datasets are downloaded, then parsed like an upload. Parsing runs on
/// the blocking pool.
pub async fn open_dataset(source: DatasetSource, policy: DatePolicy) -> ServerResult<Dataset> {
    let remote = matches!(source, DatasetSource::Url(_));
    let source = resolve_source(source).await?;

    let mut dataset = tokio::task::spawn_blocking(move || Dataset::open(&source, policy))
        .await
        .map_err(|e| ServerError::Io {
            path: Default::default(),
            message: format!("dataset loader task failed: {e}"),
        })??;

    if remote {
        // a configured URL is the fallback dataset, not a user upload
        dataset.uploaded = false;
    }
    Ok(dataset)
}
