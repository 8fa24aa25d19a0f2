//! Dataset Manager - Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dataset_manager::{
    DatasetDownloader, DatasetOutcome, ProjectConfig, Setup, api, datasets::inventory, metrics,
    setup,
};
use std::path::PathBuf;
use tokio::signal;

#[derive(Parser, Debug)]
#[command(name = "dataset-manager")]
#[command(about = "Traffic-sign CV workspace bootstrap and dataset manager", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log format (json or pretty)
    #[arg(long, default_value = "pretty", global = true)]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check Docker tooling, create data/models/logs and build the image
    Setup,

    /// Download and extract the datasets into the data directory
    Download {
        /// Only fetch these datasets (repeatable)
        #[arg(long = "only", value_name = "NAME")]
        only: Vec<String>,
    },

    /// Show which datasets are present on disk
    Status {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Serve a directory over HTTP
    Serve {
        /// Override serve port
        #[arg(long)]
        port: Option<u16>,

        /// Override the directory to serve
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    match cli.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(&cli.log_level)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(&cli.log_level)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    let mut config = ProjectConfig::load(cli.config)?;

    if let Command::Serve { port, dir } = &cli.command {
        if let Some(port) = port {
            config.serve_port = *port;
        }
        if let Some(dir) = dir {
            config.serve_dir = dir.clone();
        }
    }

    config.validate()?;

    tracing::debug!(
        project_root = ?config.project_root,
        data_dir = ?config.data_dir,
        datasets = config.datasets.len(),
        "Configuration loaded"
    );

    match cli.command {
        Command::Setup => run_setup(&config).await,
        Command::Download { only } => run_download(&config, &only).await,
        Command::Status { json } => run_status(&config, json),
        Command::Serve { .. } => run_serve(&config).await,
    }
}

async fn run_setup(config: &ProjectConfig) -> Result<()> {
    match Setup::new(config).run().await {
        Ok(report) => {
            for dir in &report.layout.created {
                println!("Created {}", dir.display());
            }
            println!("Built image {}\n", report.image_tag);
            print!("{}", setup::help_text(config));
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Setup failed");
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

async fn run_download(config: &ProjectConfig, only: &[String]) -> Result<()> {
    let prometheus_handle = metrics::setup_metrics()?;
    let downloader = DatasetDownloader::new(config).context("Failed to prepare data directory")?;
    let only = (!only.is_empty()).then_some(only);

    let report = downloader.run(only).await?;

    let present = inventory::scan(&report.data_dir, &config.datasets)
        .iter()
        .filter(|s| s.present)
        .count();
    metrics::update_datasets_present(present);
    if let Err(e) = metrics::write_snapshot(&prometheus_handle, &config.metrics_path()).await {
        tracing::warn!(error = %e, "Could not write metrics snapshot");
    }

    println!("Data directory: {}", report.data_dir.display());
    for (name, outcome) in &report.outcomes {
        match outcome {
            DatasetOutcome::Skipped => println!("  {:<8} already present, skipped", name),
            DatasetOutcome::Downloaded { bytes, files } => {
                println!("  {:<8} downloaded {} bytes, {} files", name, bytes, files)
            }
            DatasetOutcome::Failed { reason, manual_url } => {
                println!("  {:<8} FAILED: {}", name, reason);
                println!("  {:<8} download manually from {}", "", manual_url);
            }
        }
    }
    println!("See README.md in the data directory for dataset details.");

    if report.failures() > 0 {
        anyhow::bail!("{} dataset(s) failed to download", report.failures());
    }
    Ok(())
}

fn run_status(config: &ProjectConfig, json: bool) -> Result<()> {
    let data_dir = config.data_path();
    let statuses = inventory::scan(&data_dir, &config.datasets);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&statuses).context("Failed to encode status")?
        );
        return Ok(());
    }

    println!("Data directory: {}", data_dir.display());
    for status in statuses {
        if status.present {
            println!(
                "  {:<8} present  {:>14} bytes  {:>8} files",
                status.name, status.size_bytes, status.file_count
            );
        } else {
            println!("  {:<8} missing", status.name);
        }
    }
    Ok(())
}

async fn run_serve(config: &ProjectConfig) -> Result<()> {
    let prometheus_handle = metrics::setup_metrics()?;
    let app = api::create_router(api::AppState::from_config(config, prometheus_handle));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.serve_port));
    tracing::info!(addr = %addr, dir = ?config.serve_path(), "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind HTTP server")?;

    // Graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}
