//! API route definitions

use crate::config::ProjectConfig;
use crate::datasets::DatasetSpec;
use axum::{Router, routing::get};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, listing};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Root of the static file tree
    pub serve_dir: PathBuf,
    pub data_dir: PathBuf,
    pub datasets: Arc<Vec<DatasetSpec>>,
    pub prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl AppState {
    pub fn from_config(
        config: &ProjectConfig,
        prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        Self {
            serve_dir: config.serve_path(),
            data_dir: config.data_path(),
            datasets: Arc::new(config.datasets.clone()),
            prometheus_handle,
        }
    }
}

/// Create the main router
///
/// Any path not matched by an API route is served from `serve_dir`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and status
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        // Dataset inventory
        .route("/datasets", get(handlers::list_datasets))
        .route("/datasets/{name}", get(handlers::get_dataset))
        .fallback(listing::static_files)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
