//! Configuration structures and loading logic

use crate::datasets::archive::safe_relative_path;
use crate::datasets::catalog::{self, DatasetSource, DatasetSpec};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Project-wide configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub project_root: PathBuf,
    pub layout_dirs: Vec<String>,
    pub data_dir: PathBuf,
    pub image_tag: String,
    pub dockerfile: PathBuf,
    pub serve_port: u16,
    pub serve_dir: PathBuf,
    /// Limit on establishing a connection
    pub connect_timeout_secs: u64,
    /// Idle limit between body reads; there is no cap on total transfer time
    pub read_timeout_secs: u64,
    /// Prometheus text snapshot written after each `download` run
    pub metrics_file: PathBuf,

    /// Overrides `~/.kaggle` when looking up `kaggle.json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kaggle_config_dir: Option<PathBuf>,

    #[serde(default = "catalog::builtin")]
    pub datasets: Vec<DatasetSpec>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            layout_dirs: default_layout_dirs(),
            data_dir: PathBuf::from("data/raw"),
            image_tag: default_image_tag(),
            dockerfile: PathBuf::from("Dockerfile"),
            serve_port: default_serve_port(),
            serve_dir: PathBuf::from("."),
            connect_timeout_secs: 30,
            read_timeout_secs: 300,
            metrics_file: PathBuf::from("logs/download-metrics.prom"),
            kaggle_config_dir: None,
            datasets: catalog::builtin(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content).context("Failed to parse TOML config")?
        } else {
            Self::default()
        };

        if let Ok(root) = std::env::var("DATASET_MANAGER_ROOT") {
            config.project_root = PathBuf::from(root);
        }
        if let Ok(data_dir) = std::env::var("DATASET_MANAGER_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(port) = std::env::var("DATASET_MANAGER_PORT") {
            config.serve_port = port
                .parse()
                .context("Invalid DATASET_MANAGER_PORT value")?;
        }
        if let Ok(tag) = std::env::var("DATASET_MANAGER_IMAGE_TAG") {
            config.image_tag = tag;
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.serve_port == 0 {
            anyhow::bail!("Serve port must be non-zero");
        }
        if self.image_tag.trim().is_empty() {
            anyhow::bail!("Image tag cannot be empty");
        }
        if self.connect_timeout_secs == 0 || self.read_timeout_secs == 0 {
            anyhow::bail!("Download timeouts must be non-zero");
        }

        // Layout directories must stay inside the project root
        for dir in &self.layout_dirs {
            if !matches!(safe_relative_path(dir), Ok(Some(_))) {
                anyhow::bail!(
                    "Layout directory '{}' must be a relative path inside the project root",
                    dir
                );
            }
        }

        let mut names = HashSet::new();
        for dataset in &self.datasets {
            if dataset.name.is_empty() {
                anyhow::bail!("Dataset name cannot be empty");
            }
            if dataset.name.contains('/') || dataset.name.contains('\\') || dataset.name == ".."
            {
                anyhow::bail!(
                    "Dataset name '{}' cannot contain path separators",
                    dataset.name
                );
            }
            if !names.insert(dataset.name.as_str()) {
                anyhow::bail!("Duplicate dataset name: {}", dataset.name);
            }

            match &dataset.source {
                DatasetSource::Http {
                    archive_name,
                    sha256,
                    ..
                } => {
                    if archive_name.contains('/') || archive_name.contains('\\') {
                        anyhow::bail!(
                            "Archive name '{}' for dataset '{}' must be a bare file name",
                            archive_name,
                            dataset.name
                        );
                    }
                    if let Some(hash) = sha256
                        && (hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()))
                    {
                        anyhow::bail!(
                            "Dataset '{}' sha256 must be 64 hex characters",
                            dataset.name
                        );
                    }
                }
                DatasetSource::Kaggle { handle } => {
                    if handle.split('/').filter(|p| !p.is_empty()).count() != 2 {
                        anyhow::bail!(
                            "Kaggle handle '{}' must look like owner/dataset",
                            handle
                        );
                    }
                }
            }
        }

        Ok(())
    }

    /// Resolve a possibly-relative path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    pub fn data_path(&self) -> PathBuf {
        self.resolve(&self.data_dir)
    }

    pub fn serve_path(&self) -> PathBuf {
        self.resolve(&self.serve_dir)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.resolve(&self.metrics_file)
    }
}

fn default_layout_dirs() -> Vec<String> {
    vec!["data".to_string(), "models".to_string(), "logs".to_string()]
}
fn default_image_tag() -> String {
    "traffic-sign-cv:latest".to_string()
}
fn default_serve_port() -> u16 {
    8000
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = ProjectConfig::default();
        assert_eq!(config.serve_port, 8000);
        assert_eq!(config.layout_dirs, vec!["data", "models", "logs"]);
        assert_eq!(config.datasets.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_port_validation() {
        let config = ProjectConfig {
            serve_port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_dataset_detection() {
        let mut config = ProjectConfig::default();
        let first = config.datasets[0].clone();
        config.datasets.push(first);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dataset_name_validation() {
        let mut config = ProjectConfig::default();
        config.datasets[0].name = "raw/GTSDB".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_sha256_rejected() {
        let mut config = ProjectConfig::default();
        if let DatasetSource::Http { sha256, .. } = &mut config.datasets[0].source {
            *sha256 = Some("abc123".to_string());
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_kaggle_handle_rejected() {
        let mut config = ProjectConfig::default();
        config.datasets[1].source = DatasetSource::Kaggle {
            handle: "no-owner".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layout_dirs_must_stay_inside_root() {
        for bad in ["../outside", "/abs", "data/../../x", "", "."] {
            let config = ProjectConfig {
                layout_dirs: vec!["data".to_string(), bad.to_string()],
                ..Default::default()
            };
            assert!(config.validate().is_err(), "accepted {:?}", bad);
        }

        let config = ProjectConfig {
            layout_dirs: vec!["data/raw".to_string(), "./logs".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let config = ProjectConfig {
            read_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    fn clear_env() {
        unsafe {
            std::env::remove_var("DATASET_MANAGER_ROOT");
            std::env::remove_var("DATASET_MANAGER_DATA_DIR");
            std::env::remove_var("DATASET_MANAGER_PORT");
            std::env::remove_var("DATASET_MANAGER_IMAGE_TAG");
        }
    }

    #[test]
    #[serial]
    fn test_load_without_file_uses_defaults() {
        clear_env();
        let config = ProjectConfig::load(None).unwrap();
        assert_eq!(config.serve_port, 8000);
        assert_eq!(config.project_root, PathBuf::from("."));
    }

    #[test]
    #[serial]
    fn test_load_env_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("DATASET_MANAGER_ROOT", "/srv/cv");
            std::env::set_var("DATASET_MANAGER_DATA_DIR", "/mnt/datasets");
            std::env::set_var("DATASET_MANAGER_PORT", "8123");
            std::env::set_var("DATASET_MANAGER_IMAGE_TAG", "signs:dev");
        }

        let config = ProjectConfig::load(None).unwrap();
        clear_env();

        assert_eq!(config.project_root, PathBuf::from("/srv/cv"));
        assert_eq!(config.data_path(), PathBuf::from("/mnt/datasets"));
        assert_eq!(config.serve_port, 8123);
        assert_eq!(config.image_tag, "signs:dev");
    }

    #[test]
    #[serial]
    fn test_load_invalid_port_env() {
        clear_env();
        unsafe {
            std::env::set_var("DATASET_MANAGER_PORT", "not-a-port");
        }

        let result = ProjectConfig::load(None);
        clear_env();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("DATASET_MANAGER_PORT"));
    }

    #[test]
    #[serial]
    fn test_load_from_file_then_env() {
        clear_env();
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("dataset-manager.toml");
        std::fs::write(
            &path,
            r#"
            image_tag = "from-file:1"
            serve_port = 9001
            layout_dirs = ["data", "models"]
            "#,
        )
        .unwrap();
        unsafe {
            std::env::set_var("DATASET_MANAGER_PORT", "9002");
        }

        let result = ProjectConfig::load(Some(path));
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.image_tag, "from-file:1");
        assert_eq!(config.serve_port, 9002);
        assert_eq!(config.layout_dirs, vec!["data", "models"]);
        assert_eq!(config.datasets.len(), 2);
    }

    #[test]
    #[serial]
    fn test_load_missing_or_malformed_file() {
        clear_env();
        let temp_dir = tempfile::tempdir().unwrap();

        let missing = ProjectConfig::load(Some(temp_dir.path().join("absent.toml")));
        assert!(missing.is_err());

        let bad = temp_dir.path().join("bad.toml");
        std::fs::write(&bad, "serve_port = \"eighty\"").unwrap();
        let err = ProjectConfig::load(Some(bad)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML config"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ProjectConfig = toml::from_str(
            r#"
            project_root = "/srv/cv"
            serve_port = 9100
            "#,
        )
        .unwrap();
        assert_eq!(config.serve_port, 9100);
        assert_eq!(config.image_tag, "traffic-sign-cv:latest");
        assert_eq!(config.data_path(), PathBuf::from("/srv/cv/data/raw"));
        assert_eq!(config.datasets.len(), 2);
    }

    #[test]
    fn test_resolve_keeps_absolute_paths() {
        let config = ProjectConfig {
            project_root: PathBuf::from("/srv/cv"),
            data_dir: PathBuf::from("/mnt/datasets"),
            ..Default::default()
        };
        assert_eq!(config.data_path(), PathBuf::from("/mnt/datasets"));
        assert_eq!(config.serve_path(), PathBuf::from("/srv/cv/."));
        assert_eq!(
            config.metrics_path(),
            PathBuf::from("/srv/cv/logs/download-metrics.prom")
        );
    }
}
