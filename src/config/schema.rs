//! Daemon configuration schema.
//!
//! ```yaml
//! environment: staging
//! generators: dockerfile,service
//! overwrite: false
//! no_prompt: true
//! branch: master
//! templates: /srv/berth/templates
//! refresh_interval_secs: 3600
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::pipeline::{GeneratorSet, PipelineConfig, DEFAULT_ENVIRONMENT, DEFAULT_GENERATORS};
use crate::registry::DEFAULT_BRANCH;

/// Default interval between template refreshes, in seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600;

/// Configuration loaded once when the daemon starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    /// Environment passed to the packs.
    pub environment: String,

    /// Generator list, as accepted by `-g`.
    pub generators: String,

    /// Replace existing artifacts.
    pub overwrite: bool,

    /// Never prompt. Defaults to true since a daemon has no terminal.
    pub no_prompt: bool,

    /// Template branch.
    pub branch: String,

    /// Explicit template directory. Disables template syncing.
    pub templates: Option<PathBuf>,

    /// Seconds between template cache refreshes.
    pub refresh_interval_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            generators: DEFAULT_GENERATORS.to_string(),
            overwrite: false,
            no_prompt: true,
            branch: DEFAULT_BRANCH.to_string(),
            templates: None,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
        }
    }
}

impl DaemonConfig {
    /// The pipeline configuration requests start from.
    ///
    /// Syncing is off because the daemon keeps the cache fresh itself.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            project_path: None,
            template_source: self
                .templates
                .clone()
                .filter(|dir| !dir.as_os_str().is_empty()),
            environment: self.environment.clone(),
            generators: GeneratorSet::parse(&self.generators),
            overwrite: self.overwrite,
            interactive: !self.no_prompt,
            branch: self.branch.clone(),
            sync_templates: false,
        }
    }

    /// Interval between template refreshes, at least one second.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}
