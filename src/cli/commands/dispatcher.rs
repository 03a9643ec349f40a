//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing to the right command

use std::sync::Arc;

use crate::cache::TemplateCache;
use crate::cli::args::Cli;
use crate::error::Result;
use crate::packs::PackDetector;
use crate::pipeline::Pipeline;
use crate::registry::{HttpFetcher, RegistryClient, DEFAULT_MANIFEST_URL};
use crate::ui::UserInterface;

use super::daemon::DaemonCommand;
use super::generate::GenerateCommand;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches the parsed command line to a command.
#[derive(Debug, Default)]
pub struct CommandDispatcher;

impl CommandDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Build and execute the command selected by `cli`.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let pipeline = build_pipeline(cli)?;

        if cli.daemon {
            let cmd = DaemonCommand::new(
                Arc::new(pipeline),
                cli.config.clone(),
                cli.templates_dir(),
            );
            cmd.execute(ui)
        } else {
            let cmd = GenerateCommand::new(pipeline, cli.pipeline_config());
            cmd.execute(ui)
        }
    }
}

/// Build the pipeline described by the global flags.
pub fn build_pipeline(cli: &Cli) -> Result<Pipeline> {
    let manifest_url = cli
        .manifest_url
        .clone()
        .unwrap_or_else(|| DEFAULT_MANIFEST_URL.to_string());
    let client = RegistryClient::with_manifest_url(HttpFetcher::new()?, manifest_url);

    let pipeline = Pipeline::new(TemplateCache::new(client), Box::new(PackDetector::new()));
    Ok(match &cli.cache_dir {
        Some(dir) => pipeline.with_cache_dir(dir),
        None => pipeline,
    })
}
