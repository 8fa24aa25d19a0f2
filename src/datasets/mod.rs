//! Dataset management
//!
//! Provides functionality for:
//! - Describing the datasets the project needs (catalog)
//! - Streaming archives over HTTP with checksum verification
//! - Fetching Kaggle-hosted datasets
//! - Extracting zip and tar archives safely
//! - Reporting which datasets are already on disk

pub mod archive;
pub mod catalog;
pub mod checksum;
pub mod fetch;
pub mod inventory;
pub mod kaggle;
pub mod readme;

pub use archive::ArchiveFormat;
pub use catalog::{DatasetSource, DatasetSpec};
pub use inventory::DatasetStatus;

use crate::config::ProjectConfig;
use crate::error::{ManagerError, ManagerResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Result of processing a single dataset
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DatasetOutcome {
    /// Directory already existed, nothing fetched
    Skipped,
    Downloaded { bytes: u64, files: usize },
    Failed { reason: String, manual_url: String },
}

impl DatasetOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            DatasetOutcome::Skipped => "skipped",
            DatasetOutcome::Downloaded { .. } => "downloaded",
            DatasetOutcome::Failed { .. } => "failed",
        }
    }
}

/// Per-dataset outcomes of one download run, in catalog order
#[derive(Debug, Clone, Serialize, Default)]
pub struct DownloadReport {
    pub data_dir: PathBuf,
    pub outcomes: Vec<(String, DatasetOutcome)>,
}

impl DownloadReport {
    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, DatasetOutcome::Failed { .. }))
            .count()
    }
}

/// Downloads and unpacks the configured datasets into the data directory
pub struct DatasetDownloader {
    data_dir: PathBuf,
    datasets: Vec<DatasetSpec>,
    client: reqwest::Client,
    kaggle_auth: Option<fetch::BasicAuth>,
    kaggle_api_base: String,
}

impl DatasetDownloader {
    /// Create a downloader; the data directory is created if missing
    pub fn new(config: &ProjectConfig) -> ManagerResult<Self> {
        let data_dir = config.data_path();
        std::fs::create_dir_all(&data_dir).map_err(|e| ManagerError::io(&data_dir, e))?;

        let client = fetch::build_client(
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.read_timeout_secs),
        )?;

        // Resolved once here so no download path touches the filesystem synchronously
        let needs_kaggle = config
            .datasets
            .iter()
            .any(|d| matches!(d.source, DatasetSource::Kaggle { .. }));
        let kaggle_auth = if needs_kaggle {
            kaggle::credentials(config.kaggle_config_dir.as_deref())
        } else {
            None
        };

        Ok(Self {
            data_dir,
            datasets: config.datasets.clone(),
            client,
            kaggle_auth,
            kaggle_api_base: kaggle::API_BASE.to_string(),
        })
    }

    /// Point Kaggle downloads at a different API root
    pub fn with_kaggle_api_base(mut self, base: impl Into<String>) -> Self {
        self.kaggle_api_base = base.into();
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Resolve the datasets to process. `None` selects the whole catalog.
    pub fn select(&self, only: Option<&[String]>) -> ManagerResult<Vec<&DatasetSpec>> {
        let Some(names) = only.filter(|n| !n.is_empty()) else {
            return Ok(self.datasets.iter().collect());
        };

        for name in names {
            if !self.datasets.iter().any(|d| d.name.eq_ignore_ascii_case(name)) {
                return Err(ManagerError::UnknownDataset { name: name.clone() });
            }
        }

        Ok(self
            .datasets
            .iter()
            .filter(|d| names.iter().any(|n| d.name.eq_ignore_ascii_case(n)))
            .collect())
    }

    /// Main download process
    ///
    /// Writes the dataset README, then processes each selected dataset in
    /// catalog order. A failing dataset is reported and does not stop the
    /// rest.
    pub async fn run(&self, only: Option<&[String]>) -> ManagerResult<DownloadReport> {
        let selected = self.select(only)?;

        tracing::info!(
            data_dir = ?self.data_dir,
            count = selected.len(),
            "Starting dataset download process"
        );

        readme::write(&self.data_dir, &self.datasets).await?;

        let mut report = DownloadReport {
            data_dir: self.data_dir.clone(),
            outcomes: Vec::with_capacity(selected.len()),
        };

        for dataset in selected {
            let outcome = self.download_one(dataset).await;
            crate::metrics::record_dataset_outcome(&dataset.name, outcome.label());
            report.outcomes.push((dataset.name.clone(), outcome));
        }

        tracing::info!(
            failures = report.failures(),
            "Download process complete"
        );

        Ok(report)
    }

    /// Fetch a single dataset unless it is already present
    pub async fn download_one(&self, dataset: &DatasetSpec) -> DatasetOutcome {
        if inventory::is_present(&self.data_dir, &dataset.name) {
            tracing::info!(dataset = %dataset.name, "Dataset already exists, skipping download");
            return DatasetOutcome::Skipped;
        }

        tracing::info!(
            dataset = %dataset.name,
            size = %dataset.approx_size,
            method = dataset.source.method(),
            "Downloading dataset"
        );

        let dest = self.data_dir.join(&dataset.name);
        let result = match &dataset.source {
            DatasetSource::Http {
                url,
                archive_name,
                sha256,
            } => {
                let archive = self.data_dir.join(archive_name);
                self.fetch_and_extract(url, &archive, &dest, sha256.as_deref(), None)
                    .await
            }
            DatasetSource::Kaggle { handle } => {
                let url = kaggle::download_url(&self.kaggle_api_base, handle);
                let archive = self.data_dir.join(format!("{}.zip", dataset.name));
                let auth = self.kaggle_auth.as_ref();
                if auth.is_none() {
                    tracing::info!(
                        dataset = %dataset.name,
                        "No Kaggle credentials found, trying anonymous download"
                    );
                }
                self.fetch_and_extract(&url, &archive, &dest, None, auth)
                    .await
            }
        };

        match result {
            Ok((bytes, files)) => {
                tracing::info!(dataset = %dataset.name, bytes = bytes, files = files, "Dataset ready");
                DatasetOutcome::Downloaded { bytes, files }
            }
            Err(e) => {
                tracing::error!(
                    dataset = %dataset.name,
                    error = %e,
                    manual_url = %dataset.manual_url,
                    "Dataset download failed, download it manually"
                );
                DatasetOutcome::Failed {
                    reason: e.to_string(),
                    manual_url: dataset.manual_url.clone(),
                }
            }
        }
    }

    async fn fetch_and_extract(
        &self,
        url: &str,
        archive: &Path,
        dest: &Path,
        sha256: Option<&str>,
        auth: Option<&fetch::BasicAuth>,
    ) -> ManagerResult<(u64, usize)> {
        let bytes = fetch::download_file(&self.client, url, archive, sha256, auth).await?;

        let extracted = archive::extract(archive, dest).await;

        if let Err(e) = tokio::fs::remove_file(archive).await {
            tracing::warn!(archive = ?archive, error = %e, "Failed to remove archive");
        }

        match extracted {
            Ok(files) => Ok((bytes, files)),
            Err(e) => {
                // Leave no half-populated directory behind, it would be skipped next run
                let _ = tokio::fs::remove_dir_all(dest).await;
                Err(e)
            }
        }
    }
}
