//! Kaggle dataset access
//!
//! Credentials are looked up the same way the Kaggle tooling does:
//! 1. `$KAGGLE_USERNAME` and `$KAGGLE_KEY`
//! 2. `kaggle.json` in the configured directory, `$KAGGLE_CONFIG_DIR`, or `~/.kaggle`
//!
//! Public datasets download without credentials, so a missing token is not
//! an error.

use super::fetch::BasicAuth;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const API_BASE: &str = "https://www.kaggle.com/api/v1";

#[derive(Debug, Deserialize)]
struct KaggleJson {
    username: String,
    key: String,
}

/// Archive download URL for an `owner/dataset` handle
pub fn download_url(api_base: &str, handle: &str) -> String {
    format!(
        "{}/datasets/download/{}",
        api_base.trim_end_matches('/'),
        handle.trim_matches('/')
    )
}

/// Directory holding `kaggle.json`
pub fn config_dir(override_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = override_dir {
        return Some(dir.to_path_buf());
    }
    if let Ok(dir) = std::env::var("KAGGLE_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    dirs::home_dir().map(|h| h.join(".kaggle"))
}

/// Resolve API credentials, if any are configured
pub fn credentials(override_dir: Option<&Path>) -> Option<BasicAuth> {
    if let (Ok(username), Ok(key)) = (
        std::env::var("KAGGLE_USERNAME"),
        std::env::var("KAGGLE_KEY"),
    ) {
        tracing::debug!("Using Kaggle credentials from environment");
        return Some(BasicAuth {
            username,
            password: key,
        });
    }

    let path = config_dir(override_dir)?.join("kaggle.json");
    let content = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str::<KaggleJson>(&content) {
        Ok(parsed) => {
            tracing::debug!(path = ?path, "Using Kaggle credentials from file");
            Some(BasicAuth {
                username: parsed.username,
                password: parsed.key,
            })
        }
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "Ignoring malformed kaggle.json");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        unsafe {
            std::env::remove_var("KAGGLE_USERNAME");
            std::env::remove_var("KAGGLE_KEY");
            std::env::remove_var("KAGGLE_CONFIG_DIR");
        }
    }

    #[test]
    fn test_download_url() {
        assert_eq!(
            download_url(API_BASE, "mbornoe/lisa-traffic-light-dataset"),
            "https://www.kaggle.com/api/v1/datasets/download/mbornoe/lisa-traffic-light-dataset"
        );
        assert_eq!(
            download_url("http://127.0.0.1:1234/", "/owner/data/"),
            "http://127.0.0.1:1234/datasets/download/owner/data"
        );
    }

    #[test]
    #[serial]
    fn test_credentials_from_env() {
        clear_env();
        unsafe {
            std::env::set_var("KAGGLE_USERNAME", "alice");
            std::env::set_var("KAGGLE_KEY", "secret");
        }

        let temp_dir = tempfile::tempdir().unwrap();
        let auth = credentials(Some(temp_dir.path())).unwrap();
        assert_eq!(auth.username, "alice");
        assert_eq!(auth.password, "secret");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_credentials_from_file() {
        clear_env();
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join("kaggle.json"),
            r#"{"username":"bob","key":"k3y"}"#,
        )
        .unwrap();

        let auth = credentials(Some(temp_dir.path())).unwrap();
        assert_eq!(auth.username, "bob");
        assert_eq!(auth.password, "k3y");
    }

    #[test]
    #[serial]
    fn test_missing_or_malformed_credentials() {
        clear_env();
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(credentials(Some(temp_dir.path())).is_none());

        std::fs::write(temp_dir.path().join("kaggle.json"), "not json").unwrap();
        assert!(credentials(Some(temp_dir.path())).is_none());
    }
}
