//! Market Insights CLI - sales dashboard server and batch tools.

mod check;
mod colors;
mod dataset;
mod export;
mod report;
mod serve;
mod summary;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::dataset::FilterArgs;

#[derive(Parser)]
#[command(name = "insights")]
#[command(about = "Interactive sales dashboard over CSV and Excel datasets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: insights.toml next to the executable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive dashboard server
    Serve {
        /// Fallback dataset (path or http(s) URL)
        #[arg(short, long)]
        dataset: Option<String>,

        /// Host address to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write the filtered dataset as CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output path
        #[arg(short, long, default_value = insights_core::EXPORT_FILE_NAME)]
        output: PathBuf,
    },

    /// Print sales totals by category and by month
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Load a dataset and report what was found
    Check {
        /// Dataset (path or http(s) URL)
        #[arg(short, long)]
        dataset: Option<String>,
    },

    /// Render the dashboard as a standalone HTML file
    Report {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output path for the HTML file
        #[arg(short, long, default_value = "dashboard.html")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Attach recovery hints to dataset and server errors
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(core_err) = err.downcast_ref::<insights_core::Error>() {
            anyhow::anyhow!("{}", core_err.with_hint())
        } else if let Some(server_err) = err.downcast_ref::<insights_server::ServerError>() {
            anyhow::anyhow!("{}", server_err.with_hint())
        } else {
            err
        }
    };

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve { dataset, host, port } => {
            serve::execute(config_path, dataset, host, port)
                .await
                .map_err(format_error)?;
        }

        Commands::Export { filters, output } => {
            export::execute(config_path, &filters, &output)
                .await
                .map_err(format_error)?;
        }

        Commands::Summary { filters } => {
            summary::execute(config_path, &filters).await.map_err(format_error)?;
        }

        Commands::Check { dataset } => {
            check::execute(config_path, dataset).await.map_err(format_error)?;
        }

        Commands::Report { filters, output } => {
            report::execute(config_path, &filters, &output)
                .await
                .map_err(format_error)?;
        }
    }

    Ok(())
}
