//! Project bootstrap
//!
//! Checks for Docker and Docker Compose, creates the working directory
//! layout and builds the project image once.

pub mod image;
pub mod layout;
pub mod toolchain;

pub use image::{BuildRequest, DockerImageBuilder, ImageBuilder};
pub use layout::{LayoutReport, ensure_layout};
pub use toolchain::{SystemToolProbe, ToolProbe};

use crate::config::ProjectConfig;
use crate::error::{ManagerError, ManagerResult};
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct SetupReport {
    pub layout: LayoutReport,
    pub image_tag: String,
}

/// Runs the bootstrap steps against pluggable tool backends
pub struct Setup {
    project_root: PathBuf,
    layout_dirs: Vec<String>,
    build: BuildRequest,
    probe: Arc<dyn ToolProbe>,
    builder: Arc<dyn ImageBuilder>,
}

impl Setup {
    /// Setup using the real `docker` binaries
    pub fn new(config: &ProjectConfig) -> Self {
        Self::with_backends(
            config,
            Arc::new(SystemToolProbe::new()),
            Arc::new(DockerImageBuilder::new()),
        )
    }

    pub fn with_backends(
        config: &ProjectConfig,
        probe: Arc<dyn ToolProbe>,
        builder: Arc<dyn ImageBuilder>,
    ) -> Self {
        Self {
            project_root: config.project_root.clone(),
            layout_dirs: config.layout_dirs.clone(),
            build: BuildRequest {
                tag: config.image_tag.clone(),
                dockerfile: config.resolve(&config.dockerfile),
                context: config.project_root.clone(),
            },
            probe,
            builder,
        }
    }

    /// Run every step in order, stopping at the first failure.
    ///
    /// Tool checks happen before anything touches the filesystem.
    pub async fn run(&self) -> ManagerResult<SetupReport> {
        tracing::info!(root = ?self.project_root, "Setting up project");

        if !self.probe.docker_available().await {
            tracing::error!("Docker not found");
            return Err(ManagerError::DockerMissing);
        }
        if !self.probe.compose_available().await {
            tracing::error!("Docker Compose not found");
            return Err(ManagerError::ComposeMissing);
        }
        tracing::info!("Docker and Docker Compose detected");

        let layout = ensure_layout(&self.project_root, &self.layout_dirs)?;
        tracing::info!(
            created = layout.created.len(),
            existing = layout.existing.len(),
            "Directory layout ready"
        );

        self.builder.build(&self.build).await?;

        Ok(SetupReport {
            layout,
            image_tag: self.build.tag.clone(),
        })
    }
}

/// Next steps printed after a successful setup
pub fn help_text(config: &ProjectConfig) -> String {
    let mut out = String::from("Setup complete!\n\nNext steps:\n");
    let _ = writeln!(out, "  1. Download datasets:   dataset-manager download");
    let _ = writeln!(out, "  2. Check datasets:      dataset-manager status");
    let _ = writeln!(
        out,
        "  3. Run the container:   docker run -p {port}:{port} -v \"$(pwd)\":/workspace {tag}",
        port = config.serve_port,
        tag = config.image_tag
    );
    let _ = writeln!(
        out,
        "  4. Browse files:        http://localhost:{}/",
        config.serve_port
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_text_mentions_port_and_tag() {
        let config = ProjectConfig::default();
        let text = help_text(&config);
        assert!(text.contains("dataset-manager download"));
        assert!(text.contains("-p 8000:8000"));
        assert!(text.contains("traffic-sign-cv:latest"));
    }

    #[test]
    fn test_build_request_resolves_dockerfile() {
        let config = ProjectConfig {
            project_root: PathBuf::from("/srv/cv"),
            ..Default::default()
        };
        let setup = Setup::new(&config);
        assert_eq!(setup.build.dockerfile, PathBuf::from("/srv/cv/Dockerfile"));
        assert_eq!(setup.build.context, PathBuf::from("/srv/cv"));
    }
}
