//! API response models

use crate::datasets::{DatasetSpec, DatasetStatus};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Dataset information response
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetInfo {
    pub name: String,
    pub description: String,
    pub approx_size: String,
    pub method: String,
    pub manual_url: String,
    pub present: bool,
    pub size_bytes: u64,
    pub file_count: u64,
}

impl DatasetInfo {
    /// Combine catalog metadata with what was found on disk
    pub fn from_status(spec: &DatasetSpec, status: &DatasetStatus) -> Self {
        Self {
            name: spec.name.clone(),
            description: spec.description.clone(),
            approx_size: spec.approx_size.clone(),
            method: spec.source.method().to_string(),
            manual_url: spec.manual_url.clone(),
            present: status.present,
            size_bytes: status.size_bytes,
            file_count: status.file_count,
        }
    }
}
