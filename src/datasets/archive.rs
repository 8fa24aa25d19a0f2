//! Archive extraction for downloaded datasets
//!
//! Supports `.zip`, `.tar` and gzip-compressed tarballs (`.tar.gz`, `.tgz`,
//! `.gz`). Extraction runs on the blocking pool because both `zip` and `tar`
//! are synchronous readers.

use crate::error::{ManagerError, ManagerResult};
use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
}

impl ArchiveFormat {
    /// Detect the format from the file name suffix (case-insensitive)
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        if name.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") || name.ends_with(".gz") {
            Some(ArchiveFormat::TarGz)
        } else if name.ends_with(".tar") {
            Some(ArchiveFormat::Tar)
        } else {
            None
        }
    }
}

/// Extract `archive` into `dest`, creating `dest` if needed.
///
/// Returns the number of regular files written.
pub async fn extract(archive: &Path, dest: &Path) -> ManagerResult<usize> {
    let format = ArchiveFormat::detect(archive).ok_or_else(|| ManagerError::UnsupportedArchive {
        path: archive.to_path_buf(),
    })?;

    tracing::info!(archive = ?archive, dest = ?dest, format = ?format, "Extracting archive");

    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();
    let count = tokio::task::spawn_blocking(move || extract_blocking(format, &archive, &dest))
        .await
        .map_err(|e| ManagerError::io(PathBuf::new(), std::io::Error::other(e)))??;

    tracing::info!(files = count, "Extraction complete");
    Ok(count)
}

fn extract_blocking(format: ArchiveFormat, archive: &Path, dest: &Path) -> ManagerResult<usize> {
    std::fs::create_dir_all(dest).map_err(|e| ManagerError::io(dest, e))?;
    let file = File::open(archive).map_err(|e| ManagerError::io(archive, e))?;
    let reader = BufReader::new(file);

    match format {
        ArchiveFormat::Zip => extract_zip(reader, archive, dest),
        ArchiveFormat::Tar => extract_tar(tar::Archive::new(reader), archive, dest),
        ArchiveFormat::TarGz => extract_tar(
            tar::Archive::new(flate2::read::GzDecoder::new(reader)),
            archive,
            dest,
        ),
    }
}

fn extract_zip(reader: BufReader<File>, archive: &Path, dest: &Path) -> ManagerResult<usize> {
    let mut zip = zip::ZipArchive::new(reader)
        .map_err(|e| ManagerError::io(archive, std::io::Error::other(e)))?;

    let mut written = 0;
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| ManagerError::io(archive, std::io::Error::other(e)))?;

        let Some(relative) = safe_relative_path(entry.name())? else {
            continue;
        };
        let target = dest.join(&relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| ManagerError::io(&target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ManagerError::io(parent, e))?;
        }
        let mut out = File::create(&target).map_err(|e| ManagerError::io(&target, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| ManagerError::io(&target, e))?;
        written += 1;
    }

    Ok(written)
}

fn extract_tar<R: std::io::Read>(
    mut tar: tar::Archive<R>,
    archive: &Path,
    dest: &Path,
) -> ManagerResult<usize> {
    let entries = tar.entries().map_err(|e| ManagerError::io(archive, e))?;

    let mut written = 0;
    for entry in entries {
        let mut entry = entry.map_err(|e| ManagerError::io(archive, e))?;
        let path = entry.path().map_err(|e| ManagerError::io(archive, e))?;
        if safe_relative_path(&path.to_string_lossy())?.is_none() {
            continue;
        }

        let is_file = entry.header().entry_type().is_file();
        entry
            .unpack_in(dest)
            .map_err(|e| ManagerError::io(dest, e))?;
        if is_file {
            written += 1;
        }
    }

    Ok(written)
}

/// Reject entries that are absolute or climb out of the destination.
///
/// Returns `None` for entries naming the destination itself (`.`, `./`).
pub(crate) fn safe_relative_path(entry: &str) -> ManagerResult<Option<PathBuf>> {
    let unsafe_entry = || ManagerError::UnsafeArchiveEntry {
        entry: entry.to_string(),
    };

    let mut relative = PathBuf::new();
    for component in Path::new(entry).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(unsafe_entry());
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Ok(None);
    }
    Ok(Some(relative))
}
