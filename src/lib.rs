//! Dataset Manager - bootstrap tooling for the traffic-sign CV workspace
//!
//! Checks the container toolchain, lays out the project directories, fetches
//! the GTSDB and LISA datasets, and serves the workspace over HTTP.

pub mod api;
pub mod config;
pub mod datasets;
pub mod error;
pub mod metrics;
pub mod setup;

pub use config::ProjectConfig;
pub use datasets::{DatasetDownloader, DatasetOutcome, DatasetSpec, DownloadReport};
pub use error::{ManagerError, ManagerResult};
pub use setup::{Setup, SetupReport};
