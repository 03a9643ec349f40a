//! Per-run pipeline configuration.

use std::fmt;
use std::path::PathBuf;

use crate::detection::Artifact;
use crate::registry::DEFAULT_BRANCH;

/// Default environment passed to the packs.
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Default generator list.
pub const DEFAULT_GENERATORS: &str = "dockerfile";

/// The artifacts selected for one run.
///
/// The Dockerfile is always part of the set; the service descriptor and the
/// compose file are opt-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorSet {
    service: bool,
    compose: bool,
}

impl GeneratorSet {
    /// A set holding only the Dockerfile.
    pub fn dockerfile_only() -> Self {
        Self::default()
    }

    /// Parse a comma-separated generator list such as `dockerfile,service`.
    ///
    /// Tokens are trimmed and compared case-insensitively against
    /// `dockerfile`, `service` and `docker-compose`. A token must match
    /// exactly, so `nonservice` selects nothing. Unknown tokens are logged
    /// and ignored.
    pub fn parse(list: &str) -> Self {
        let mut set = Self::default();

        for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.to_ascii_lowercase().as_str() {
                "dockerfile" => {}
                "service" => set.service = true,
                "docker-compose" => set.compose = true,
                _ => tracing::warn!("Ignoring unknown generator '{}'", token),
            }
        }

        set
    }

    /// Whether `artifact` will be written.
    pub fn includes(&self, artifact: Artifact) -> bool {
        match artifact {
            Artifact::Dockerfile => true,
            Artifact::ServiceDescriptor => self.service,
            Artifact::ComposeFile => self.compose,
        }
    }

    /// Selected artifacts in generation order.
    pub fn artifacts(&self) -> impl Iterator<Item = Artifact> + '_ {
        Artifact::ALL.into_iter().filter(|a| self.includes(*a))
    }
}

impl fmt::Display for GeneratorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = self
            .artifacts()
            .map(|a| match a {
                Artifact::Dockerfile => "dockerfile",
                Artifact::ServiceDescriptor => "service",
                Artifact::ComposeFile => "docker-compose",
            })
            .collect();
        write!(f, "{}", tokens.join(","))
    }
}

/// Everything one pipeline run needs, built once by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Project to generate into; the current directory when unset.
    pub project_path: Option<PathBuf>,
    /// Explicit template directory. When set, the cache is not synced.
    pub template_source: Option<PathBuf>,
    pub environment: String,
    pub generators: GeneratorSet,
    /// Replace existing artifacts instead of failing.
    pub overwrite: bool,
    /// Allow packs to ask questions on the terminal.
    pub interactive: bool,
    /// Template branch to sync from.
    pub branch: String,
    /// Sync the template cache before generating. Callers that keep the
    /// cache warm themselves turn this off.
    pub sync_templates: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            project_path: None,
            template_source: None,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            generators: GeneratorSet::dockerfile_only(),
            overwrite: false,
            interactive: true,
            branch: DEFAULT_BRANCH.to_string(),
            sync_templates: true,
        }
    }
}
