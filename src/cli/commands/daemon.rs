//! Daemon mode.
//!
//! Loads the daemon configuration, starts the service with the template
//! refresher and runs until SIGINT or SIGTERM.

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::load_daemon_config;
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::service::{listen_for_signals, Service, Shutdown, TemplateRefresher};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The daemon command implementation.
pub struct DaemonCommand {
    pipeline: Arc<Pipeline>,
    config_path: Option<PathBuf>,
    templates: Option<PathBuf>,
}

impl DaemonCommand {
    /// Create a new daemon command.
    ///
    /// `templates` overrides the template directory of the config file.
    pub fn new(
        pipeline: Arc<Pipeline>,
        config_path: Option<PathBuf>,
        templates: Option<PathBuf>,
    ) -> Self {
        Self {
            pipeline,
            config_path,
            templates,
        }
    }
}

impl Command for DaemonCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.show_header(&format!("berth {} service", env!("CARGO_PKG_VERSION")));
        let config = load_daemon_config(self.config_path.as_deref())?;

        let mut defaults = config.pipeline_config();
        if let Some(dir) = &self.templates {
            defaults.template_source = Some(dir.clone());
        }

        let handler = Arc::new(TemplateRefresher::new(config.refresh_interval()));
        let service = Service::new(defaults, Arc::clone(&self.pipeline), handler);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to start the async runtime")?;

        runtime.block_on(async {
            let (trigger, shutdown) = Shutdown::new();
            let _signals = listen_for_signals(trigger)?;

            let running = service.start(shutdown).await?;
            ui.success("Service ready");

            running.wait().await
        })?;

        ui.message("Service stopped");
        Ok(CommandResult::success())
    }
}
