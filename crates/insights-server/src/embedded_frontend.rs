//! Embedded frontend assets for the dashboard server.
//!
//! Only available when the `embedded-frontend` feature is enabled.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

/// Embedded frontend assets.
#[derive(Embed)]
#[folder = "src/frontend/"]
pub struct FrontendAssets;

/// Serve an embedded frontend file.
pub fn serve_static(path: &str) -> Response {
    let path = path.strip_prefix('/').unwrap_or(path);

    match FrontendAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream().to_string();
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime),
                    (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
                ],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// Serve the main index.html file.
pub fn serve_index() -> Response {
    serve_static("index.html")
}

/// Check if the frontend assets are available.
pub fn is_available() -> bool {
    FrontendAssets::get("index.html").is_some()
}

/// List all embedded files (for debugging).
pub fn list_files() -> Vec<String> {
    FrontendAssets::iter().map(|s| s.to_string()).collect()
}
