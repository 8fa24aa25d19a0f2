//! SHA-256 checksums for downloaded archives.

use crate::error::{ManagerError, ManagerResult};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

const CHUNK_SIZE: usize = 64 * 1024;

/// Calculate the SHA-256 of a file, streaming it in fixed-size chunks.
///
/// # Returns
/// Lowercase hexadecimal digest.
pub async fn sha256_file(path: &Path) -> ManagerResult<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| ManagerError::io(path, e))?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| ManagerError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Hash of an in-memory buffer
pub fn sha256_bytes(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Check a file against an expected digest (case-insensitive)
pub async fn verify_file(path: &Path, expected: &str) -> ManagerResult<()> {
    let actual = sha256_file(path).await?;
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(ManagerError::HashMismatch {
            path: path.to_path_buf(),
            expected: expected.to_lowercase(),
            actual,
        })
    }
}
