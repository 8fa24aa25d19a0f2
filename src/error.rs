//! Error types for setup, download and serving

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::path::PathBuf;

pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors surfaced by the library
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error(
        "Docker is not installed or not on PATH. Install it from https://docs.docker.com/get-docker/"
    )]
    DockerMissing,

    #[error(
        "Docker Compose is not available. Install it from https://docs.docker.com/compose/install/"
    )]
    ComposeMissing,

    #[error("Image build for '{tag}' failed: {message}")]
    ImageBuild { tag: String, message: String },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("Hash verification failed for {path:?}: expected {expected}, got {actual}")]
    HashMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Unsupported archive format: {path:?}")]
    UnsupportedArchive { path: PathBuf },

    #[error("Archive entry '{entry}' escapes the extraction directory")]
    UnsafeArchiveEntry { entry: String },

    #[error("Unknown dataset: {name}")]
    UnknownDataset { name: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ManagerError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManagerError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn http(url: &str, err: impl std::fmt::Display) -> Self {
        ManagerError::Http {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl IntoResponse for ManagerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ManagerError::UnknownDataset { .. } => StatusCode::NOT_FOUND,
            ManagerError::InvalidConfig { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Internal error");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            timestamp: chrono::Utc::now(),
        });

        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    timestamp: chrono::DateTime<chrono::Utc>,
}
