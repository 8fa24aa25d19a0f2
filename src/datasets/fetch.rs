//! Streaming HTTP downloads
//!
//! Bodies are streamed to `<dest>.part` and renamed into place only after
//! the optional checksum matches, so an interrupted or corrupt download never
//! leaves a file that looks complete.

use super::checksum;
use crate::error::{ManagerError, ManagerResult};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Basic-auth credentials attached to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// Build the HTTP client used for every dataset download
///
/// Only connecting and each body read are bounded. A multi-gigabyte archive
/// may take as long as it needs while data keeps arriving.
pub fn build_client(
    connect_timeout: Duration,
    read_timeout: Duration,
) -> ManagerResult<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .read_timeout(read_timeout)
        .user_agent(concat!("dataset-manager/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ManagerError::http("<client>", e))
}

/// Download `url` to `dest`.
///
/// # Arguments
/// * `expected_sha256` - When set, the file is verified before it is moved into place
/// * `auth` - Optional basic-auth credentials
///
/// # Returns
/// Number of bytes written.
pub async fn download_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    expected_sha256: Option<&str>,
    auth: Option<&BasicAuth>,
) -> ManagerResult<u64> {
    let part = part_path(dest);

    let result = stream_to(client, url, &part, auth).await;
    let bytes = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }
    };

    if let Some(expected) = expected_sha256
        && let Err(e) = checksum::verify_file(&part, expected).await
    {
        tracing::warn!(url = %url, error = %e, "Checksum verification failed");
        let _ = tokio::fs::remove_file(&part).await;
        return Err(match e {
            ManagerError::HashMismatch {
                expected, actual, ..
            } => ManagerError::HashMismatch {
                path: dest.to_path_buf(),
                expected,
                actual,
            },
            other => other,
        });
    }

    tokio::fs::rename(&part, dest)
        .await
        .map_err(|e| ManagerError::io(dest, e))?;

    tracing::info!(url = %url, dest = ?dest, bytes = bytes, "Download complete");
    crate::metrics::record_bytes_downloaded(bytes);

    Ok(bytes)
}

async fn stream_to(
    client: &reqwest::Client,
    url: &str,
    part: &Path,
    auth: Option<&BasicAuth>,
) -> ManagerResult<u64> {
    tracing::info!(url = %url, "Starting download");

    let mut request = client.get(url);
    if let Some(auth) = auth {
        request = request.basic_auth(&auth.username, Some(&auth.password));
    }

    let response = request
        .send()
        .await
        .map_err(|e| ManagerError::http(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ManagerError::Http {
            url: url.to_string(),
            message: format!("unexpected status {}", status),
        });
    }

    if let Some(len) = response.content_length() {
        tracing::debug!(url = %url, content_length = len, "Response headers received");
    }

    if let Some(parent) = part.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ManagerError::io(parent, e))?;
    }
    let mut file = tokio::fs::File::create(part)
        .await
        .map_err(|e| ManagerError::io(part, e))?;

    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ManagerError::http(url, e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| ManagerError::io(part, e))?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| ManagerError::io(part, e))?;
    Ok(written)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_path() {
        assert_eq!(
            part_path(Path::new("/data/raw/FullIJCNN2013.zip")),
            PathBuf::from("/data/raw/FullIJCNN2013.zip.part")
        );
    }

    #[test]
    fn test_client_creation() {
        assert!(build_client(Duration::from_secs(5), Duration::from_secs(30)).is_ok());
    }

    #[tokio::test]
    async fn test_slow_body_outlives_read_timeout_total() {
        use axum::{Router, body::Body, routing::get};

        // Five chunks 150ms apart: 750ms in total, but never idle for 400ms
        async fn trickle() -> Body {
            let chunks = futures::stream::unfold(0u8, |i| async move {
                if i == 5 {
                    return None;
                }
                tokio::time::sleep(Duration::from_millis(150)).await;
                Some((Ok::<_, std::io::Error>(vec![b'x'; 16]), i + 1))
            });
            Body::from_stream(chunks)
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, Router::new().route("/slow.bin", get(trickle)))
                .await
                .unwrap();
        });

        let temp_dir = tempfile::tempdir().unwrap();
        let dest = temp_dir.path().join("slow.bin");
        let client = build_client(Duration::from_secs(2), Duration::from_millis(400)).unwrap();

        let bytes = download_file(
            &client,
            &format!("http://{}/slow.bin", addr),
            &dest,
            None,
            None,
        )
        .await
        .unwrap();

        assert_eq!(bytes, 80);
        assert!(dest.exists());
    }

    #[tokio::test]
    async fn test_connection_refused_leaves_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dest = temp_dir.path().join("a.zip");
        let client = build_client(Duration::from_secs(5), Duration::from_secs(5)).unwrap();

        // Port 9 (discard) is not expected to accept HTTP on loopback
        let err = download_file(&client, "http://127.0.0.1:9/a.zip", &dest, None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ManagerError::Http { .. }));
        assert!(!dest.exists());
        assert!(!part_path(&dest).exists());
    }
}
