//! Detection of the container tooling required by the project

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

// ============================================================================
// Trait Definitions
// ============================================================================

/// Trait for probing installed tools
#[async_trait]
pub trait ToolProbe: Send + Sync {
    /// Docker CLI is installed and runnable
    async fn docker_available(&self) -> bool;

    /// Either the `docker compose` plugin or standalone `docker-compose` works
    async fn compose_available(&self) -> bool;
}

// ============================================================================
// Production Implementation
// ============================================================================

/// Probe that runs the real binaries found on PATH
pub struct SystemToolProbe {
    docker_binary: String,
    compose_binary: String,
}

impl SystemToolProbe {
    pub fn new() -> Self {
        Self {
            docker_binary: "docker".to_string(),
            compose_binary: "docker-compose".to_string(),
        }
    }

    /// Use alternative binary names (e.g. `podman`)
    pub fn with_binaries(docker: impl Into<String>, compose: impl Into<String>) -> Self {
        Self {
            docker_binary: docker.into(),
            compose_binary: compose.into(),
        }
    }
}

impl Default for SystemToolProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolProbe for SystemToolProbe {
    async fn docker_available(&self) -> bool {
        command_succeeds(&self.docker_binary, &["--version"]).await
    }

    async fn compose_available(&self) -> bool {
        if command_succeeds(&self.docker_binary, &["compose", "version"]).await {
            return true;
        }
        command_succeeds(&self.compose_binary, &["--version"]).await
    }
}

/// Run a command silently and report whether it exited 0.
/// A binary that cannot be spawned counts as absent.
pub async fn command_succeeds(program: &str, args: &[&str]) -> bool {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) => {
            tracing::debug!(program = %program, args = ?args, success = status.success(), "Tool probe finished");
            status.success()
        }
        Err(e) => {
            tracing::debug!(program = %program, error = %e, "Tool probe could not spawn");
            false
        }
    }
}
