//! The generation pipeline.
//!
//! One run walks through a fixed sequence of [`Stage`]s and stops at the
//! first failure:
//!
//! ```text
//! RESOLVE_TEMPLATES -> DETECT -> PRECHECK -> ANALYZE -> WRITE_DOCKERFILE
//!     -> [WRITE_SERVICE] -> [WRITE_COMPOSE] -> DONE
//! ```
//!
//! Nothing is retried. Every failure carries one line of context saying
//! which step failed; the overwrite guard's [`BerthError::AlreadyExists`] is
//! returned as is.

use anyhow::anyhow;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cache::{default_cache_dir, CacheLock, SyncOutcome, TemplateCache};
use crate::detection::{Artifact, Detector, StackPack};
use crate::error::{BerthError, Result, ResultExt};

use super::config::PipelineConfig;
use super::result::AnalysisResult;

/// A step of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveTemplates,
    Detect,
    Precheck,
    Analyze,
    WriteDockerfile,
    WriteService,
    WriteCompose,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResolveTemplates => "RESOLVE_TEMPLATES",
            Self::Detect => "DETECT",
            Self::Precheck => "PRECHECK",
            Self::Analyze => "ANALYZE",
            Self::WriteDockerfile => "WRITE_DOCKERFILE",
            Self::WriteService => "WRITE_SERVICE",
            Self::WriteCompose => "WRITE_COMPOSE",
            Self::Done => "DONE",
        };
        write!(f, "{}", name)
    }
}

impl Stage {
    fn for_artifact(artifact: Artifact) -> Self {
        match artifact {
            Artifact::Dockerfile => Self::WriteDockerfile,
            Artifact::ServiceDescriptor => Self::WriteService,
            Artifact::ComposeFile => Self::WriteCompose,
        }
    }
}

/// Where a run reads its templates from.
#[derive(Debug)]
struct TemplateSource {
    dir: PathBuf,
    /// The directory is the shared template cache and must be read under
    /// its lock.
    cached: bool,
}

/// Runs detection and artifact generation for one project at a time.
///
/// A pipeline holds no per-run state, so one instance can serve any number
/// of sequential or concurrent runs.
pub struct Pipeline {
    cache: TemplateCache,
    detector: Box<dyn Detector>,
    cache_dir: Option<PathBuf>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("cache", &self.cache)
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Create a pipeline using `~/.berth` as its template cache.
    pub fn new(cache: TemplateCache, detector: Box<dyn Detector>) -> Self {
        Self {
            cache,
            detector,
            cache_dir: None,
        }
    }

    /// Use `dir` as the template cache instead of `~/.berth`.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// The template cache synchronizer.
    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// The template cache directory.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_cache_dir()
                .ok_or_else(|| anyhow!("could not determine the home directory").into()),
        }
    }

    /// Bring the template cache up to date with `branch`.
    pub fn sync_templates(&self, branch: &str) -> Result<SyncOutcome> {
        let dir = self.cache_dir()?;
        self.cache.sync(&dir, branch)
    }

    /// Run the whole pipeline.
    pub fn run(&self, config: &PipelineConfig) -> Result<AnalysisResult> {
        let project_root = match &config.project_path {
            Some(path) => path.clone(),
            None => std::env::current_dir()
                .map_err(|e| BerthError::fs(".", e))
                .wrap_err(|| "Failed to resolve the project path")?,
        };

        enter(Stage::ResolveTemplates);
        let templates = self.resolve_templates(config)?;

        enter(Stage::Detect);
        let mut pack = self
            .detector
            .detect(&project_root)
            .map_err(detection_error)
            .wrap_err(|| "Failed to detect framework")?;

        enter(Stage::Precheck);
        precheck(&project_root, config)?;

        enter(Stage::Analyze);
        pack.analyze(&project_root, &config.environment, config.interactive)
            .map_err(detection_error)
            .wrap_err(|| "Failed to analyze the project")?;

        let _lock = if templates.cached {
            Some(CacheLock::shared(&templates.dir)?)
        } else {
            None
        };

        tracing::debug!("Generating {}", config.generators);
        for artifact in config.generators.artifacts() {
            enter(Stage::for_artifact(artifact));
            write_artifact(
                pack.as_mut(),
                artifact,
                &templates.dir,
                &project_root,
                config.interactive,
            )?;
        }

        enter(Stage::Done);
        Ok(AnalysisResult {
            ok: true,
            warnings: pack.messages().to_vec(),
            language: pack.name().to_string(),
            framework: pack.framework().to_string(),
            framework_version: pack.framework_version().to_string(),
        })
    }

    fn resolve_templates(&self, config: &PipelineConfig) -> Result<TemplateSource> {
        if let Some(source) = &config.template_source {
            let dir = resolve_template_dir(source)
                .wrap_err(|| format!("Failed to use {} for templates", source.display()))?;
            tracing::debug!("Using templates from {}", dir.display());
            return Ok(TemplateSource { dir, cached: false });
        }

        let dir = self.cache_dir()?;
        if config.sync_templates {
            self.cache
                .sync(&dir, &config.branch)
                .wrap_err(|| "Failed to download latest templates")?;
        }

        Ok(TemplateSource { dir, cached: true })
    }
}

fn enter(stage: Stage) {
    tracing::debug!("Pipeline stage {}", stage);
}

fn resolve_template_dir(source: &Path) -> Result<PathBuf> {
    let dir = std::path::absolute(source).map_err(|e| BerthError::fs(source, e))?;
    if !dir.is_dir() {
        return Err(BerthError::fs(
            &dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }
    Ok(dir)
}

/// Fail if an artifact that would be written already exists.
///
/// `Dockerfile` and `service.yml` are always checked; `docker-compose.yml`
/// only when the compose generator is selected.
fn precheck(project_root: &Path, config: &PipelineConfig) -> Result<()> {
    if config.overwrite {
        return Ok(());
    }

    let guarded = [Artifact::Dockerfile, Artifact::ServiceDescriptor]
        .into_iter()
        .chain(
            config
                .generators
                .includes(Artifact::ComposeFile)
                .then_some(Artifact::ComposeFile),
        );

    for artifact in guarded {
        if project_root.join(artifact.file_name()).exists() {
            return Err(BerthError::AlreadyExists {
                file: artifact.file_name().to_string(),
            });
        }
    }

    Ok(())
}

fn write_artifact(
    pack: &mut dyn StackPack,
    artifact: Artifact,
    template_dir: &Path,
    project_root: &Path,
    interactive: bool,
) -> Result<()> {
    let written = match artifact {
        Artifact::Dockerfile => pack.write_dockerfile(template_dir, project_root, interactive),
        Artifact::ServiceDescriptor => {
            pack.write_service_descriptor(template_dir, project_root, interactive)
        }
        Artifact::ComposeFile => pack.write_compose_file(template_dir, project_root, interactive),
    };

    written
        .map_err(|e| BerthError::Generation {
            artifact: artifact.file_name().to_string(),
            message: format!("{:#}", e),
        })
        .wrap_err(|| format!("Failed to write {}", artifact.file_name()))
}

fn detection_error(err: anyhow::Error) -> BerthError {
    BerthError::Detection {
        message: format!("{:#}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::GeneratorSet;
    use crate::registry::{HttpFetcher, RegistryClient};
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Pack that writes a fixed line per artifact and records every call.
    struct FakePack {
        calls: Arc<Mutex<Vec<String>>>,
        fail_analyze: bool,
        messages: Vec<String>,
    }

    impl FakePack {
        fn write(&mut self, artifact: Artifact, template_dir: &Path, root: &Path) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(artifact.file_name().to_string());
            let template = template_dir.join(format!("fake.{}", artifact.template_suffix()));
            let body = fs::read_to_string(&template)?;
            fs::write(root.join(artifact.file_name()), body)?;
            Ok(())
        }
    }

    impl StackPack for FakePack {
        fn name(&self) -> &str {
            "Ruby"
        }
        fn framework(&self) -> &str {
            "Rails"
        }
        fn framework_version(&self) -> &str {
            ""
        }
        fn analyze(&mut self, _: &Path, environment: &str, _: bool) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push("analyze".into());
            if self.fail_analyze {
                anyhow::bail!("Gemfile.lock is unreadable");
            }
            self.messages.push(format!("analyzed for {}", environment));
            Ok(())
        }
        fn write_dockerfile(&mut self, t: &Path, r: &Path, _: bool) -> anyhow::Result<()> {
            self.write(Artifact::Dockerfile, t, r)
        }
        fn write_service_descriptor(&mut self, t: &Path, r: &Path, _: bool) -> anyhow::Result<()> {
            self.write(Artifact::ServiceDescriptor, t, r)
        }
        fn write_compose_file(&mut self, t: &Path, r: &Path, _: bool) -> anyhow::Result<()> {
            self.write(Artifact::ComposeFile, t, r)
        }
        fn messages(&self) -> &[String] {
            &self.messages
        }
    }

    #[derive(Default)]
    struct FakeDetector {
        calls: Arc<Mutex<Vec<String>>>,
        fail_detect: bool,
        fail_analyze: bool,
    }

    impl Detector for FakeDetector {
        fn detect(&self, _: &Path) -> anyhow::Result<Box<dyn StackPack>> {
            if self.fail_detect {
                anyhow::bail!("no Gemfile found");
            }
            Ok(Box::new(FakePack {
                calls: self.calls.clone(),
                fail_analyze: self.fail_analyze,
                messages: Vec::new(),
            }))
        }
    }

    fn pipeline(detector: FakeDetector) -> Pipeline {
        let client = RegistryClient::with_manifest_url(
            HttpFetcher::new().unwrap(),
            "http://127.0.0.1:9/{{.branch}}/templates.json",
        );
        Pipeline::new(TemplateCache::new(client), Box::new(detector))
    }

    fn templates() -> TempDir {
        let temp = TempDir::new().unwrap();
        for artifact in Artifact::ALL {
            fs::write(
                temp.path().join(format!("fake.{}", artifact.template_suffix())),
                format!("generated {}\n", artifact.file_name()),
            )
            .unwrap();
        }
        temp
    }

    fn config(project: &TempDir, templates: &TempDir) -> PipelineConfig {
        PipelineConfig {
            project_path: Some(project.path().to_path_buf()),
            template_source: Some(templates.path().to_path_buf()),
            interactive: false,
            ..Default::default()
        }
    }

    #[test]
    fn writes_dockerfile_only_by_default() {
        let project = TempDir::new().unwrap();
        let templates = templates();

        let result = pipeline(FakeDetector::default())
            .run(&config(&project, &templates))
            .unwrap();

        assert!(result.ok);
        assert_eq!(result.language, "Ruby");
        assert_eq!(result.warnings, vec!["analyzed for production"]);
        assert!(project.path().join("Dockerfile").exists());
        assert!(!project.path().join("service.yml").exists());
        assert!(!project.path().join("docker-compose.yml").exists());
    }

    #[test]
    fn writes_in_generation_order() {
        let project = TempDir::new().unwrap();
        let templates = templates();
        let detector = FakeDetector::default();
        let calls = detector.calls.clone();

        let mut cfg = config(&project, &templates);
        cfg.generators = GeneratorSet::parse("docker-compose,service");
        pipeline(detector).run(&cfg).unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["analyze", "Dockerfile", "service.yml", "docker-compose.yml"]
        );
    }

    #[test]
    fn existing_dockerfile_stops_before_analysis() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join("Dockerfile"), "FROM scratch\n").unwrap();
        let templates = templates();
        let detector = FakeDetector::default();
        let calls = detector.calls.clone();

        let err = pipeline(detector)
            .run(&config(&project, &templates))
            .unwrap_err();

        assert!(matches!(&err, BerthError::AlreadyExists { file } if file == "Dockerfile"));
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(
            fs::read_to_string(project.path().join("Dockerfile")).unwrap(),
            "FROM scratch\n"
        );
    }

    #[test]
    fn compose_file_is_guarded_only_when_selected() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join("docker-compose.yml"), "services: {}\n").unwrap();
        let templates = templates();

        let cfg = config(&project, &templates);
        pipeline(FakeDetector::default()).run(&cfg).unwrap();

        fs::remove_file(project.path().join("Dockerfile")).unwrap();
        let mut cfg = config(&project, &templates);
        cfg.generators = GeneratorSet::parse("docker-compose");
        let err = pipeline(FakeDetector::default()).run(&cfg).unwrap_err();

        assert!(
            matches!(&err, BerthError::AlreadyExists { file } if file == "docker-compose.yml")
        );
    }

    #[test]
    fn overwrite_replaces_existing_files() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join("Dockerfile"), "old").unwrap();
        let templates = templates();

        let mut cfg = config(&project, &templates);
        cfg.overwrite = true;
        pipeline(FakeDetector::default()).run(&cfg).unwrap();

        assert_eq!(
            fs::read_to_string(project.path().join("Dockerfile")).unwrap(),
            "generated Dockerfile\n"
        );
    }

    #[test]
    fn detection_failure_is_wrapped() {
        let project = TempDir::new().unwrap();
        let templates = templates();

        let err = pipeline(FakeDetector {
            fail_detect: true,
            ..Default::default()
        })
        .run(&config(&project, &templates))
        .unwrap_err();

        assert!(matches!(err.root(), BerthError::Detection { .. }));
        assert_eq!(
            err.to_string(),
            "Failed to detect framework due to no Gemfile found"
        );
    }

    #[test]
    fn analyze_failure_is_detection_error() {
        let project = TempDir::new().unwrap();
        let templates = templates();

        let err = pipeline(FakeDetector {
            fail_analyze: true,
            ..Default::default()
        })
        .run(&config(&project, &templates))
        .unwrap_err();

        assert!(matches!(err.root(), BerthError::Detection { .. }));
        assert!(err.to_string().starts_with("Failed to analyze the project"));
        assert!(!project.path().join("Dockerfile").exists());
    }

    #[test]
    fn write_failure_is_generation_error() {
        let project = TempDir::new().unwrap();
        let templates = templates();
        fs::remove_file(templates.path().join("fake.service.yml.template")).unwrap();

        let mut cfg = config(&project, &templates);
        cfg.generators = GeneratorSet::parse("service,docker-compose");
        let err = pipeline(FakeDetector::default()).run(&cfg).unwrap_err();

        assert!(
            matches!(err.root(), BerthError::Generation { artifact, .. } if artifact == "service.yml")
        );
        assert!(project.path().join("Dockerfile").exists());
        assert!(!project.path().join("docker-compose.yml").exists());
    }

    #[test]
    fn missing_template_dir_is_filesystem_error() {
        let project = TempDir::new().unwrap();
        let mut cfg = PipelineConfig {
            project_path: Some(project.path().to_path_buf()),
            ..Default::default()
        };
        cfg.template_source = Some(project.path().join("nope"));

        let err = pipeline(FakeDetector::default()).run(&cfg).unwrap_err();

        assert!(matches!(err.root(), BerthError::Filesystem { .. }));
        assert!(err.to_string().starts_with("Failed to use"));
    }

    #[test]
    fn unreachable_registry_fails_sync() {
        let project = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let cfg = PipelineConfig {
            project_path: Some(project.path().to_path_buf()),
            interactive: false,
            ..Default::default()
        };

        let err = pipeline(FakeDetector::default())
            .with_cache_dir(cache.path().join("templates"))
            .run(&cfg)
            .unwrap_err();

        assert!(matches!(err.root(), BerthError::Network { .. }));
        assert!(err
            .to_string()
            .starts_with("Failed to download latest templates"));
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::ResolveTemplates.to_string(), "RESOLVE_TEMPLATES");
        assert_eq!(Stage::for_artifact(Artifact::ComposeFile), Stage::WriteCompose);
    }
}
