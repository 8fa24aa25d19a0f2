//! README written next to the raw datasets

use super::catalog::{DatasetSource, DatasetSpec};
use crate::error::{ManagerError, ManagerResult};
use std::fmt::Write;
use std::path::{Path, PathBuf};

pub const README_FILE: &str = "README.md";

/// Render the dataset README as markdown
pub fn render(datasets: &[DatasetSpec]) -> String {
    let mut out = String::from(
        "# Datasets\n\nThis directory contains the computer vision datasets for this project.\n",
    );

    for dataset in datasets {
        let _ = writeln!(out, "\n## {}", dataset.name);
        let _ = writeln!(out, "- Source: {}", dataset.homepage);
        let _ = writeln!(out, "- Size: {}", dataset.approx_size);
        let _ = writeln!(out, "- Contains: {}", dataset.description);
        match &dataset.source {
            DatasetSource::Http { url, .. } => {
                let _ = writeln!(out, "- Downloaded via: {} ({})", dataset.source.method(), url);
            }
            DatasetSource::Kaggle { handle } => {
                let _ = writeln!(out, "- Downloaded via: {} ({})", dataset.source.method(), handle);
            }
        }
        let _ = writeln!(out, "- Manual download: {}", dataset.manual_url);
    }

    out.push_str(
        "\n## Setup\nTo download the datasets, run:\n```bash\ndataset-manager download\n```\n\n\
         Note: Some datasets require manual download due to license agreements.\n",
    );
    out
}

/// Write the README into `data_dir`, replacing any previous copy
pub async fn write(data_dir: &Path, datasets: &[DatasetSpec]) -> ManagerResult<PathBuf> {
    let path = data_dir.join(README_FILE);
    tokio::fs::write(&path, render(datasets))
        .await
        .map_err(|e| ManagerError::io(&path, e))?;
    tracing::debug!(path = ?path, "Dataset README written");
    Ok(path)
}
