//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct, parsed with [`parse_args`]
//! so the single-dash long flags older scripts use (`-overwrite`,
//! `-templates DIR`, ...) keep working.

use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::{GeneratorSet, PipelineConfig, DEFAULT_ENVIRONMENT, DEFAULT_GENERATORS};
use crate::registry::DEFAULT_BRANCH;

/// Long flags also accepted with a single dash.
const LEGACY_LONG_FLAGS: &[&str] = &["overwrite", "templates", "branch", "daemon", "debug"];

/// Berth - Scaffold Dockerfile, service.yml and docker-compose.yml for a project.
#[derive(Debug, Parser)]
#[command(name = "berth")]
#[command(author, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Project directory (defaults to the current directory)
    #[arg(short = 'p', long = "path", value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Environment the artifacts are generated for
    #[arg(short = 'e', long, default_value = DEFAULT_ENVIRONMENT)]
    pub environment: String,

    /// Never prompt
    #[arg(short = 'y', long = "yes")]
    pub no_prompt: bool,

    /// Replace existing Dockerfile, service.yml and docker-compose.yml
    #[arg(long)]
    pub overwrite: bool,

    /// Use templates from this directory instead of the synced cache
    #[arg(long, value_name = "DIR")]
    pub templates: Option<String>,

    /// Template branch to sync from
    #[arg(long, default_value = DEFAULT_BRANCH)]
    pub branch: String,

    /// Artifacts to generate: dockerfile, service, docker-compose (comma separated)
    #[arg(short = 'g', long = "generator", default_value = DEFAULT_GENERATORS)]
    pub generator: String,

    /// Run as a long-lived service
    #[arg(long)]
    pub daemon: bool,

    /// Daemon configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Manifest URL template; `{{.branch}}` is replaced with the branch
    #[arg(long, env = "BERTH_MANIFEST_URL", hide = true)]
    pub manifest_url: Option<String>,

    /// Template cache directory (defaults to ~/.berth)
    #[arg(long, env = "BERTH_CACHE_DIR", value_name = "DIR", hide = true)]
    pub cache_dir: Option<PathBuf>,
}

impl Cli {
    /// The `--templates` directory; an empty value means the synced cache.
    pub fn templates_dir(&self) -> Option<PathBuf> {
        self.templates
            .as_deref()
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
    }

    /// The pipeline configuration for a one-shot run.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            project_path: self.path.clone(),
            template_source: self.templates_dir(),
            environment: self.environment.clone(),
            generators: GeneratorSet::parse(&self.generator),
            overwrite: self.overwrite,
            interactive: !self.no_prompt,
            branch: self.branch.clone(),
            sync_templates: true,
        }
    }
}

/// Commands answered before any flag is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyExit {
    Help,
    Version,
}

/// Check the first argument (after the program name) for `help`/`-h` or
/// `version`/`-v`.
pub fn early_exit<S: AsRef<str>>(args: &[S]) -> Option<EarlyExit> {
    match args.get(1).map(|a| a.as_ref()) {
        Some("help" | "-h" | "--help") => Some(EarlyExit::Help),
        Some("version" | "-v" | "--version") => Some(EarlyExit::Version),
        _ => None,
    }
}

/// Rewrite `-overwrite` style flags to `--overwrite`.
pub fn normalize_legacy_flags<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let Some(rest) = arg.strip_prefix('-') else {
                return arg;
            };
            if rest.starts_with('-') {
                return arg;
            }
            let name = rest.split('=').next().unwrap_or(rest);
            if LEGACY_LONG_FLAGS.contains(&name) {
                format!("-{}", arg)
            } else {
                arg
            }
        })
        .collect()
}

/// Parse command-line arguments, accepting legacy single-dash long flags.
pub fn parse_args<I, S>(args: I) -> Cli
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Cli::parse_from(normalize_legacy_flags(args))
}

/// Like [`parse_args`] but returns clap's error instead of exiting.
pub fn try_parse_args<I, S>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Cli::try_parse_from(normalize_legacy_flags(args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::Artifact;

    fn parse(args: &[&str]) -> Cli {
        try_parse_args(args.iter().copied()).unwrap()
    }

    #[test]
    fn defaults() {
        let cli = parse(&["berth"]);

        assert_eq!(cli.environment, "production");
        assert_eq!(cli.branch, "master");
        assert_eq!(cli.generator, "dockerfile");
        assert!(!cli.overwrite);
        assert!(!cli.daemon);
        assert!(cli.path.is_none());
    }

    #[test]
    fn short_flags() {
        let cli = parse(&["berth", "-p", "/srv/app", "-e", "staging", "-y", "-g", "service"]);

        assert_eq!(cli.path, Some(PathBuf::from("/srv/app")));
        assert_eq!(cli.environment, "staging");
        assert!(cli.no_prompt);
        assert_eq!(cli.generator, "service");
    }

    #[test]
    fn legacy_single_dash_flags() {
        let cli = parse(&[
            "berth",
            "-overwrite",
            "-templates",
            "/tmp/templates",
            "-branch=develop",
        ]);

        assert!(cli.overwrite);
        assert_eq!(cli.templates_dir(), Some(PathBuf::from("/tmp/templates")));
        assert_eq!(cli.branch, "develop");
    }

    #[test]
    fn empty_templates_uses_synced_cache() {
        let cli = parse(&["berth", "-templates", "", "-y"]);

        assert_eq!(cli.templates_dir(), None);
        assert!(cli.pipeline_config().template_source.is_none());
    }

    #[test]
    fn legacy_daemon_flags() {
        let cli = parse(&["berth", "-daemon", "-c", "berth.yml"]);

        assert!(cli.daemon);
        assert_eq!(cli.config, Some(PathBuf::from("berth.yml")));
    }

    #[test]
    fn normalize_leaves_other_args_alone() {
        let args = normalize_legacy_flags(["berth", "-p", "-overwrite", "--debug", "overwrite"]);
        assert_eq!(args, ["berth", "-p", "--overwrite", "--debug", "overwrite"]);
    }

    #[test]
    fn early_exit_on_first_argument_only() {
        assert_eq!(early_exit(&["berth", "help"]), Some(EarlyExit::Help));
        assert_eq!(early_exit(&["berth", "-h"]), Some(EarlyExit::Help));
        assert_eq!(early_exit(&["berth", "version"]), Some(EarlyExit::Version));
        assert_eq!(early_exit(&["berth", "-v"]), Some(EarlyExit::Version));
        assert_eq!(early_exit(&["berth", "-y", "version"]), None);
        assert_eq!(early_exit(&["berth"]), None);
    }

    #[test]
    fn pipeline_config_from_flags() {
        let cli = parse(&["berth", "-y", "-g", "dockerfile,docker-compose", "--overwrite"]);
        let config = cli.pipeline_config();

        assert!(!config.interactive);
        assert!(config.overwrite);
        assert!(config.sync_templates);
        assert!(config.generators.includes(Artifact::ComposeFile));
        assert!(!config.generators.includes(Artifact::ServiceDescriptor));
    }
}
