//! API request handlers

use super::models::{DatasetInfo, HealthResponse};
use super::routes::AppState;
use crate::datasets::inventory;
use crate::error::{ManagerError, ManagerResult};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// GET /health - Server health check
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now(),
        }),
    )
}

/// GET /metrics - Prometheus metrics
pub async fn metrics(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}

/// GET /datasets - Catalog with on-disk status
pub async fn list_datasets(
    State(state): State<AppState>,
) -> Result<Json<Vec<DatasetInfo>>, ManagerError> {
    let info = scan_datasets(&state).await?;

    crate::metrics::update_datasets_present(info.iter().filter(|d| d.present).count());

    Ok(Json(info))
}

/// GET /datasets/{name} - Single dataset details
pub async fn get_dataset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DatasetInfo>, ManagerError> {
    scan_datasets(&state)
        .await?
        .into_iter()
        .find(|d| d.name.eq_ignore_ascii_case(&name))
        .map(Json)
        .ok_or(ManagerError::UnknownDataset { name })
}

/// Directory walks are blocking, keep them off the async workers
async fn scan_datasets(state: &AppState) -> ManagerResult<Vec<DatasetInfo>> {
    let data_dir = state.data_dir.clone();
    let datasets = state.datasets.clone();

    tokio::task::spawn_blocking(move || {
        let statuses = inventory::scan(&data_dir, &datasets);
        datasets
            .iter()
            .zip(statuses.iter())
            .map(|(spec, status)| DatasetInfo::from_status(spec, status))
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| ManagerError::io(state.data_dir.clone(), std::io::Error::other(e)))
}
