//! Shared state handed to request handlers.

use anyhow::anyhow;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::cache::SyncOutcome;
use crate::error::{BerthError, Result};
use crate::pipeline::{AnalysisResult, Pipeline, PipelineConfig};

use super::shutdown::Shutdown;

/// Runs pipelines on behalf of a request handler.
///
/// Pipeline runs and template syncs share one lock, so at most one of them
/// touches the template cache and a project at any time. Once shutdown has
/// been requested new runs are rejected with
/// [`BerthError::ServiceStopped`]; runs already in progress finish.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    pipeline: Arc<Pipeline>,
    defaults: PipelineConfig,
    run_lock: Arc<Mutex<()>>,
    shutdown: Shutdown,
}

impl ServiceContext {
    pub fn new(pipeline: Arc<Pipeline>, defaults: PipelineConfig, shutdown: Shutdown) -> Self {
        Self {
            pipeline,
            defaults,
            run_lock: Arc::new(Mutex::new(())),
            shutdown,
        }
    }

    /// The configuration every run starts from.
    pub fn defaults(&self) -> &PipelineConfig {
        &self.defaults
    }

    /// Generate artifacts for `project_path` with the service defaults.
    pub async fn run_pipeline(&self, project_path: impl Into<PathBuf>) -> Result<AnalysisResult> {
        let config = PipelineConfig {
            project_path: Some(project_path.into()),
            ..self.defaults.clone()
        };
        self.run_with(config).await
    }

    /// Run the pipeline with an explicit configuration.
    ///
    /// Template syncing is always skipped; the service keeps the cache
    /// fresh on its own schedule.
    pub async fn run_with(&self, mut config: PipelineConfig) -> Result<AnalysisResult> {
        config.sync_templates = false;

        let guard = self.acquire().await?;
        let pipeline = Arc::clone(&self.pipeline);

        // The guard moves into the task so a cancelled caller does not
        // release the lock while the run is still going.
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            pipeline.run(&config)
        })
        .await
        .map_err(|e| anyhow!("pipeline task failed: {}", e))?
    }

    /// Sync the template cache with the configured branch.
    ///
    /// Returns `None` when an explicit template directory is configured.
    pub async fn sync_templates(&self) -> Result<Option<SyncOutcome>> {
        if self.defaults.template_source.is_some() {
            return Ok(None);
        }

        let guard = self.acquire().await?;
        let pipeline = Arc::clone(&self.pipeline);
        let branch = self.defaults.branch.clone();

        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            pipeline.sync_templates(&branch)
        })
        .await
        .map_err(|e| anyhow!("template sync task failed: {}", e))?
        .map(Some)
    }

    /// Wait until no run is in progress.
    pub async fn drain(&self) {
        let _guard = self.run_lock.lock().await;
    }

    async fn acquire(&self) -> Result<OwnedMutexGuard<()>> {
        if self.shutdown.is_triggered() {
            return Err(BerthError::ServiceStopped);
        }

        let guard = Arc::clone(&self.run_lock).lock_owned().await;

        // Shutdown may have been requested while waiting for the lock.
        if self.shutdown.is_triggered() {
            return Err(BerthError::ServiceStopped);
        }

        Ok(guard)
    }
}
