//! On-disk dataset detection
//!
//! Layout under the data directory:
//! ```text
//! data/raw/
//! ├── README.md
//! ├── GTSDB/
//! │   ├── 00/ ... 42/
//! │   └── gt.txt
//! └── LISA/
//!     └── ...
//! ```

use super::catalog::DatasetSpec;
use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

/// Presence and footprint of one dataset
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DatasetStatus {
    pub name: String,
    pub present: bool,
    pub size_bytes: u64,
    pub file_count: u64,
}

/// Check whether a dataset directory exists
pub fn is_present(data_dir: &Path, name: &str) -> bool {
    data_dir.join(name).is_dir()
}

/// Total size and file count below `path`
pub fn dir_usage(path: &Path) -> (u64, u64) {
    let mut size = 0;
    let mut files = 0;

    for entry in WalkDir::new(path).into_iter().flatten() {
        if entry.file_type().is_file()
            && let Ok(metadata) = entry.metadata()
        {
            size += metadata.len();
            files += 1;
        }
    }

    (size, files)
}

/// Status of every dataset in catalog order
pub fn scan(data_dir: &Path, datasets: &[DatasetSpec]) -> Vec<DatasetStatus> {
    datasets
        .iter()
        .map(|dataset| {
            let dir = data_dir.join(&dataset.name);
            if dir.is_dir() {
                let (size_bytes, file_count) = dir_usage(&dir);
                DatasetStatus {
                    name: dataset.name.clone(),
                    present: true,
                    size_bytes,
                    file_count,
                }
            } else {
                DatasetStatus {
                    name: dataset.name.clone(),
                    present: false,
                    size_bytes: 0,
                    file_count: 0,
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::catalog;

    #[test]
    fn test_dir_usage_empty_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert_eq!(dir_usage(temp_dir.path()), (0, 0));
    }

    #[test]
    fn test_dir_usage_nested_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();

        let subdir = temp_dir.path().join("subdir");
        std::fs::create_dir(&subdir).unwrap();
        std::fs::write(subdir.join("file1.txt"), "abc").unwrap();
        std::fs::write(temp_dir.path().join("file2.txt"), "defgh").unwrap();

        assert_eq!(dir_usage(temp_dir.path()), (8, 2));
    }

    #[test]
    fn test_scan_reports_presence() {
        let temp_dir = tempfile::tempdir().unwrap();
        let gtsdb = temp_dir.path().join("GTSDB");
        std::fs::create_dir(&gtsdb).unwrap();
        std::fs::write(gtsdb.join("gt.txt"), "hello world").unwrap();

        let statuses = scan(temp_dir.path(), &catalog::builtin());

        assert_eq!(statuses.len(), 2);
        assert_eq!(
            statuses[0],
            DatasetStatus {
                name: "GTSDB".to_string(),
                present: true,
                size_bytes: 11,
                file_count: 1,
            }
        );
        assert!(!statuses[1].present);
        assert!(is_present(temp_dir.path(), "GTSDB"));
        assert!(!is_present(temp_dir.path(), "LISA"));
    }
}
