//! Detection traits and artifact kinds.

use std::path::Path;

/// An output artifact the pipeline can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    /// `Dockerfile`, always produced.
    Dockerfile,
    /// `service.yml`.
    ServiceDescriptor,
    /// `docker-compose.yml`.
    ComposeFile,
}

impl Artifact {
    /// Every artifact kind, in generation order.
    pub const ALL: [Artifact; 3] = [
        Artifact::Dockerfile,
        Artifact::ServiceDescriptor,
        Artifact::ComposeFile,
    ];

    /// File name of the artifact inside the project.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Dockerfile => "Dockerfile",
            Self::ServiceDescriptor => "service.yml",
            Self::ComposeFile => "docker-compose.yml",
        }
    }

    /// Suffix of the template file that renders this artifact.
    pub fn template_suffix(&self) -> &'static str {
        match self {
            Self::Dockerfile => "dockerfile.template",
            Self::ServiceDescriptor => "service.yml.template",
            Self::ComposeFile => "docker-compose.yml.template",
        }
    }
}

/// Identifies the stack of a project.
pub trait Detector: Send + Sync {
    /// Return the pack matching the project at `project_root`.
    fn detect(&self, project_root: &Path) -> anyhow::Result<Box<dyn StackPack>>;
}

/// A detected stack: analyzes the project and renders its artifacts.
///
/// A pack is owned by a single pipeline run.
pub trait StackPack {
    /// Language name, e.g. `Ruby`.
    fn name(&self) -> &str;

    /// Framework name, empty when none was found.
    fn framework(&self) -> &str;

    /// Framework version, empty when unknown.
    fn framework_version(&self) -> &str;

    /// Inspect the project before anything is written.
    fn analyze(
        &mut self,
        project_root: &Path,
        environment: &str,
        interactive: bool,
    ) -> anyhow::Result<()>;

    /// Write `Dockerfile` using templates from `template_dir`.
    fn write_dockerfile(
        &mut self,
        template_dir: &Path,
        project_root: &Path,
        interactive: bool,
    ) -> anyhow::Result<()>;

    /// Write `service.yml` using templates from `template_dir`.
    fn write_service_descriptor(
        &mut self,
        template_dir: &Path,
        project_root: &Path,
        interactive: bool,
    ) -> anyhow::Result<()>;

    /// Write `docker-compose.yml` using templates from `template_dir`.
    fn write_compose_file(
        &mut self,
        template_dir: &Path,
        project_root: &Path,
        interactive: bool,
    ) -> anyhow::Result<()>;

    /// Non-fatal findings, in the order they were produced.
    fn messages(&self) -> &[String];
}
