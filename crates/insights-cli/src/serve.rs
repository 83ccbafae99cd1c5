//! Serve command implementation.
//!
//! Loads the fallback dataset once and starts the dashboard server.

use std::path::Path;

use insights_server::ServerConfig;

use crate::colors;
use crate::dataset;

/// Start the interactive dashboard server.
pub async fn execute(
    config_path: Option<&Path>,
    dataset: Option<String>,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut config = dataset::resolve_config(config_path, dataset)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let fallback = dataset::open(&config).await?;

    println!("\n{}Market Insights{} - Sales Dashboard", colors::BOLD, colors::RESET);
    println!("{}", "─".repeat(50));
    println!(
        "{}  ◆ Dataset:{} {} ({} rows)",
        colors::CYAN,
        colors::RESET,
        fallback.table.source_name().unwrap_or("unnamed"),
        fallback.table.len()
    );

    let server_config = ServerConfig::from(&config);

    println!(
        "{}  ◆ Server:{} http://{}:{}",
        colors::CYAN,
        colors::RESET,
        server_config.host,
        server_config.port
    );
    println!(
        "{}  ◆ WebSocket:{} ws://{}:{}/ws",
        colors::CYAN,
        colors::RESET,
        server_config.host,
        server_config.port
    );
    println!("{}", "─".repeat(50));
    println!("{}Press Ctrl+C to stop{}", colors::GREEN, colors::RESET);
    println!();

    insights_server::serve(fallback, server_config).await?;

    Ok(())
}
