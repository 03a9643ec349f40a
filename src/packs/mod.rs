//! Built-in stack packs.
//!
//! [`PackDetector`] recognises a project by its marker files and hands back
//! a [`Pack`] for the matching [`Stack`]. The pack reads the stack's
//! framework details from the project and renders each artifact from the
//! `<stack>.<artifact>.template` files of the template directory.

pub mod node;
pub mod python;
pub mod render;
pub mod ruby;

pub use render::{render, Vars};

use anyhow::{anyhow, Context};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::detection::{Artifact, Detector, StackPack};
use crate::ui::prompts::prompt_text;

/// A supported language stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stack {
    Ruby,
    Node,
    Python,
}

impl Stack {
    /// Stacks in detection priority order.
    pub const ALL: [Stack; 3] = [Stack::Ruby, Stack::Node, Stack::Python];

    /// Files whose presence marks a project of this stack.
    pub fn markers(&self) -> &'static [&'static str] {
        match self {
            Self::Ruby => ruby::MARKERS,
            Self::Node => node::MARKERS,
            Self::Python => python::MARKERS,
        }
    }

    /// Prefix of this stack's template file names.
    pub fn template_prefix(&self) -> &'static str {
        match self {
            Self::Ruby => "ruby",
            Self::Node => "node",
            Self::Python => "python",
        }
    }

    /// First stack whose markers exist in `project_root`.
    pub fn detect(project_root: &Path) -> Option<Stack> {
        Self::ALL.into_iter().find(|stack| {
            stack
                .markers()
                .iter()
                .any(|marker| project_root.join(marker).is_file())
        })
    }

    fn analyze(&self, project_root: &Path) -> anyhow::Result<Analysis> {
        match self {
            Self::Ruby => ruby::analyze(project_root),
            Self::Node => node::analyze(project_root),
            Self::Python => python::analyze(project_root),
        }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ruby => "Ruby",
            Self::Node => "Node.js",
            Self::Python => "Python",
        };
        write!(f, "{}", name)
    }
}

/// What a stack analyzer found in a project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    pub framework: Option<String>,
    pub framework_version: Option<String>,
    /// Non-fatal findings.
    pub messages: Vec<String>,
}

/// Detects the built-in stacks by marker file.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackDetector;

impl PackDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for PackDetector {
    fn detect(&self, project_root: &Path) -> anyhow::Result<Box<dyn StackPack>> {
        let stack = Stack::detect(project_root).ok_or_else(|| {
            anyhow!(
                "could not detect a supported stack in {} (looked for {})",
                project_root.display(),
                Stack::ALL
                    .iter()
                    .flat_map(|s| s.markers().iter().copied())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })?;

        tracing::debug!("Detected {} project", stack);
        Ok(Box::new(Pack::new(stack)))
    }
}

/// A detected project of one [`Stack`].
#[derive(Debug, Clone)]
pub struct Pack {
    stack: Stack,
    language: String,
    framework: String,
    framework_version: String,
    environment: String,
    messages: Vec<String>,
}

impl Pack {
    pub fn new(stack: Stack) -> Self {
        Self {
            stack,
            language: stack.to_string(),
            framework: String::new(),
            framework_version: String::new(),
            environment: String::new(),
            messages: Vec::new(),
        }
    }

    fn vars(&self) -> Vars<'_> {
        Vars {
            language: &self.language,
            framework: &self.framework,
            framework_version: &self.framework_version,
            environment: &self.environment,
        }
    }

    fn write(&self, artifact: Artifact, template_dir: &Path, project_root: &Path) -> anyhow::Result<()> {
        let template_name = format!(
            "{}.{}",
            self.stack.template_prefix(),
            artifact.template_suffix()
        );
        let template_path = template_dir.join(&template_name);
        let template = fs::read_to_string(&template_path)
            .with_context(|| format!("Missing template {}", template_path.display()))?;

        let output_path = project_root.join(artifact.file_name());
        fs::write(&output_path, render(&template, &self.vars()))
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        tracing::debug!("Wrote {} from {}", output_path.display(), template_name);
        Ok(())
    }

    fn ask_framework_version(&mut self) {
        let question = format!("Which version of {} does this project use?", self.framework);
        match prompt_text(&question) {
            Ok(answer) if !answer.trim().is_empty() => {
                self.framework_version = answer.trim().to_string();
            }
            Ok(_) => {}
            Err(e) => self
                .messages
                .push(format!("Could not ask for the {} version: {}", self.framework, e)),
        }
    }
}

impl StackPack for Pack {
    fn name(&self) -> &str {
        &self.language
    }

    fn framework(&self) -> &str {
        &self.framework
    }

    fn framework_version(&self) -> &str {
        &self.framework_version
    }

    fn analyze(
        &mut self,
        project_root: &Path,
        environment: &str,
        interactive: bool,
    ) -> anyhow::Result<()> {
        let analysis = self.stack.analyze(project_root)?;

        self.environment = environment.to_string();
        self.framework = analysis.framework.unwrap_or_default();
        self.framework_version = analysis.framework_version.unwrap_or_default();
        self.messages.extend(analysis.messages);

        if interactive
            && !self.framework.is_empty()
            && self.framework_version.is_empty()
            && console::user_attended()
        {
            self.ask_framework_version();
        }

        Ok(())
    }

    fn write_dockerfile(
        &mut self,
        template_dir: &Path,
        project_root: &Path,
        _interactive: bool,
    ) -> anyhow::Result<()> {
        self.write(Artifact::Dockerfile, template_dir, project_root)
    }

    fn write_service_descriptor(
        &mut self,
        template_dir: &Path,
        project_root: &Path,
        _interactive: bool,
    ) -> anyhow::Result<()> {
        self.write(Artifact::ServiceDescriptor, template_dir, project_root)
    }

    fn write_compose_file(
        &mut self,
        template_dir: &Path,
        project_root: &Path,
        _interactive: bool,
    ) -> anyhow::Result<()> {
        self.write(Artifact::ComposeFile, template_dir, project_root)
    }

    fn messages(&self) -> &[String] {
        &self.messages
    }
}
