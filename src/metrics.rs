//! Prometheus metrics

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::Path;

/// Setup Prometheus metrics exporter
/// Returns a handle that can be used to retrieve metrics
pub fn setup_metrics() -> Result<metrics_exporter_prometheus::PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    tracing::info!("Prometheus metrics exporter installed");

    Ok(handle)
}

/// Write the current metrics in Prometheus text format to `path`
///
/// Used by one-shot commands that never serve `/metrics`.
pub async fn write_snapshot(handle: &PrometheusHandle, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create metrics directory: {:?}", parent))?;
    }
    tokio::fs::write(path, handle.render())
        .await
        .with_context(|| format!("Failed to write metrics snapshot: {:?}", path))?;

    tracing::info!(path = ?path, "Metrics snapshot written");
    Ok(())
}

/// Record the result of processing one dataset
pub fn record_dataset_outcome(name: &str, outcome: &'static str) {
    metrics::counter!("dataset_manager_datasets_total",
        "dataset" => name.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record bytes fetched over HTTP
pub fn record_bytes_downloaded(bytes: u64) {
    metrics::counter!("dataset_manager_downloaded_bytes_total").increment(bytes);
}

/// Update the number of datasets present on disk
pub fn update_datasets_present(count: usize) {
    metrics::gauge!("dataset_manager_datasets_present").set(count as f64);
}
