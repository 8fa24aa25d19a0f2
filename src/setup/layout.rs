//! Project directory layout

use crate::error::{ManagerError, ManagerResult};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct LayoutReport {
    pub created: Vec<PathBuf>,
    pub existing: Vec<PathBuf>,
}

/// Create each directory under `root`. Safe to call repeatedly.
pub fn ensure_layout(root: &Path, dirs: &[String]) -> ManagerResult<LayoutReport> {
    let mut report = LayoutReport::default();

    for dir in dirs {
        let path = root.join(dir);
        if path.is_dir() {
            report.existing.push(path);
            continue;
        }

        std::fs::create_dir_all(&path).map_err(|e| ManagerError::io(&path, e))?;
        tracing::info!(path = ?path, "Created directory");
        report.created.push(path);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs() -> Vec<String> {
        vec!["data".to_string(), "models".to_string(), "logs".to_string()]
    }

    #[test]
    fn test_creates_missing_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let report = ensure_layout(temp_dir.path(), &dirs()).unwrap();

        assert_eq!(report.created.len(), 3);
        assert!(report.existing.is_empty());
        for dir in dirs() {
            assert!(temp_dir.path().join(dir).is_dir());
        }
    }

    #[test]
    fn test_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp_dir.path().join("models")).unwrap();

        let first = ensure_layout(temp_dir.path(), &dirs()).unwrap();
        assert_eq!(first.created.len(), 2);
        assert_eq!(first.existing, vec![temp_dir.path().join("models")]);

        let second = ensure_layout(temp_dir.path(), &dirs()).unwrap();
        assert!(second.created.is_empty());
        assert_eq!(second.existing.len(), 3);
    }

    #[test]
    fn test_file_in_the_way_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("logs"), "not a dir").unwrap();

        let err = ensure_layout(temp_dir.path(), &dirs()).unwrap_err();
        assert!(matches!(err, ManagerError::Io { .. }));
    }
}
