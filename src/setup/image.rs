//! Container image build

use crate::error::{ManagerError, ManagerResult};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

/// What to build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub tag: String,
    pub dockerfile: PathBuf,
    pub context: PathBuf,
}

/// Trait for building the project image
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    async fn build(&self, request: &BuildRequest) -> ManagerResult<()>;
}

/// Builder that shells out to `docker build`, streaming its output to the terminal
pub struct DockerImageBuilder {
    docker_binary: String,
}

impl DockerImageBuilder {
    pub fn new() -> Self {
        Self {
            docker_binary: "docker".to_string(),
        }
    }

    pub fn with_binary(docker: impl Into<String>) -> Self {
        Self {
            docker_binary: docker.into(),
        }
    }

    fn command(&self, request: &BuildRequest) -> Command {
        let mut cmd = Command::new(&self.docker_binary);
        cmd.arg("build")
            .arg("-t")
            .arg(&request.tag)
            .arg("-f")
            .arg(&request.dockerfile)
            .arg(&request.context);
        cmd
    }
}

impl Default for DockerImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageBuilder for DockerImageBuilder {
    async fn build(&self, request: &BuildRequest) -> ManagerResult<()> {
        tracing::info!(
            tag = %request.tag,
            dockerfile = ?request.dockerfile,
            context = ?request.context,
            "Building container image"
        );

        let status = self
            .command(request)
            .status()
            .await
            .map_err(|e| ManagerError::ImageBuild {
                tag: request.tag.clone(),
                message: format!("failed to run {}: {}", self.docker_binary, e),
            })?;

        if !status.success() {
            return Err(ManagerError::ImageBuild {
                tag: request.tag.clone(),
                message: format!("{} build exited with {}", self.docker_binary, status),
            });
        }

        tracing::info!(tag = %request.tag, "Image built");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BuildRequest {
        BuildRequest {
            tag: "traffic-sign-cv:latest".to_string(),
            dockerfile: PathBuf::from("/srv/cv/Dockerfile"),
            context: PathBuf::from("/srv/cv"),
        }
    }

    #[test]
    fn test_command_arguments() {
        let builder = DockerImageBuilder::new();
        let cmd = builder.command(&request());
        let std_cmd = cmd.as_std();

        assert_eq!(std_cmd.get_program(), "docker");
        let args: Vec<_> = std_cmd
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert_eq!(
            args,
            vec![
                "build",
                "-t",
                "traffic-sign-cv:latest",
                "-f",
                "/srv/cv/Dockerfile",
                "/srv/cv"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_fails_build() {
        let builder = DockerImageBuilder::with_binary("no-such-docker-xyz");
        let err = builder.build(&request()).await.unwrap_err();
        assert!(matches!(err, ManagerError::ImageBuild { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_fails_build() {
        let builder = DockerImageBuilder::with_binary("false");
        let err = builder.build(&request()).await.unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }
}
