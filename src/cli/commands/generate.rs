//! One-shot generation.
//!
//! Runs the pipeline once for the project given with `-p` (or the current
//! directory) and reports what was written.

use crate::detection::Artifact;
use crate::error::{BerthError, Result};
use crate::pipeline::{Pipeline, PipelineConfig};
use crate::ui::{hints, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The generate command implementation.
pub struct GenerateCommand {
    pipeline: Pipeline,
    config: PipelineConfig,
}

impl GenerateCommand {
    /// Create a new generate command.
    pub fn new(pipeline: Pipeline, config: PipelineConfig) -> Self {
        Self { pipeline, config }
    }
}

impl Command for GenerateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.show_header(&format!("berth {}", env!("CARGO_PKG_VERSION")));

        // Packs only prompt when someone is there to answer.
        let config = PipelineConfig {
            interactive: self.config.interactive && ui.is_interactive(),
            ..self.config.clone()
        };

        let result = match self.pipeline.run(&config) {
            Ok(result) => result,
            Err(e) if matches!(e.root(), BerthError::AlreadyExists { .. }) => {
                ui.error(&e.to_string());
                ui.show_hint(hints::after_already_exists());
                return Ok(CommandResult::failure(1));
            }
            Err(e) => return Err(e),
        };

        let files: Vec<&str> = config
            .generators
            .artifacts()
            .map(|a: Artifact| a.file_name())
            .collect();

        ui.success(&format!(
            "Generated {} for {}",
            files.join(", "),
            result.describe()
        ));

        if !result.warnings.is_empty() {
            ui.warning("Warnings:");
            for warning in &result.warnings {
                ui.message(&format!("  - {}", warning));
            }
        }

        ui.show_hint(&hints::after_generate(&files));
        if config.generators.includes(Artifact::ServiceDescriptor) {
            ui.show_hint(&hints::after_service(&config.environment));
        }

        ui.show_header("Done");
        Ok(CommandResult::success())
    }
}
