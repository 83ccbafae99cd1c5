//! Market Insights dashboard server.
//!
//! Serves the dashboard over HTTP and a WebSocket.
//!
//! # Architecture
//!
//! The server consists of:
//! - **Session**: One [`DashboardSession`] per connection, owning its filters and uploads
//! - **Protocol**: Defines client/server message types
//! - **Routes**: HTTP and WebSocket handlers
//! - **Fetch**: Loading the fallback dataset from a path or URL
//!
//! # Features
//!
//! - `embedded-frontend` (default): Embeds the web UI for standalone use

#[cfg(feature = "embedded-frontend")]
pub mod embedded_frontend;
pub mod error;
pub mod fetch;
pub mod protocol;
pub mod routes;
pub mod session;

use std::net::SocketAddr;
use std::sync::Arc;

use insights::RenderOptions;
use insights_core::{DashboardConfig, Dataset, DatePolicy};

pub use error::{ServerError, ServerResult};
pub use fetch::{open_dataset, resolve_source};
pub use protocol::{ClientMessage, ServerMessage};
pub use routes::{AppState, create_router};
pub use session::DashboardSession;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    pub options: RenderOptions,
    /// Date handling for uploads.
    pub date_policy: DatePolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

impl From<&DashboardConfig> for ServerConfig {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            options: RenderOptions::from(config),
            date_policy: config.date_policy,
        }
    }
}

/// Start the dashboard server on a loaded fallback dataset.
pub async fn serve(fallback: Dataset, config: ServerConfig) -> ServerResult<()> {
    let state = Arc::new(AppState {
        fallback,
        options: config.options,
        date_policy: config.date_policy,
    });

    // Create router
    let app = create_router(state);

    // Build address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|_| ServerError::Io {
            path: std::path::PathBuf::new(),
            message: format!("Invalid address: {}:{}", config.host, config.port),
        })?;

    tracing::info!("Starting dashboard server at http://{}", addr);

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Create shutdown signal channel
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    // Handle Ctrl+C for graceful shutdown
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
        }
    });

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
