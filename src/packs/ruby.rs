//! Ruby projects, recognised by a `Gemfile`.

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use super::Analysis;

/// Files that mark a Ruby project.
pub const MARKERS: &[&str] = &["Gemfile"];

/// Regex for a framework gem declared in a Gemfile.
static FRAMEWORK_GEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*gem\s+['"](rails|sinatra|hanami)['"]"#)
        .expect("FRAMEWORK_GEM must compile")
});

/// Find the framework and its locked version.
pub fn analyze(project_root: &Path) -> Result<Analysis> {
    let gemfile_path = project_root.join("Gemfile");
    let gemfile = fs::read_to_string(&gemfile_path)
        .with_context(|| format!("Failed to read {}", gemfile_path.display()))?;

    let mut analysis = Analysis::default();

    let Some(caps) = FRAMEWORK_GEM.captures(&gemfile) else {
        analysis
            .messages
            .push("No Ruby web framework found in Gemfile".to_string());
        return Ok(analysis);
    };
    let gem = caps[1].to_string();
    analysis.framework = Some(framework_name(&gem).to_string());

    match fs::read_to_string(project_root.join("Gemfile.lock")) {
        Ok(lock) => {
            analysis.framework_version = locked_version(&lock, &gem);
            if analysis.framework_version.is_none() {
                analysis
                    .messages
                    .push(format!("{} is not listed in Gemfile.lock", gem));
            }
        }
        Err(_) => analysis.messages.push(
            "No Gemfile.lock found; run `bundle install` to pin framework versions".to_string(),
        ),
    }

    Ok(analysis)
}

fn framework_name(gem: &str) -> &'static str {
    match gem {
        "rails" => "Rails",
        "sinatra" => "Sinatra",
        _ => "Hanami",
    }
}

/// Version of `gem` in the `specs:` section of a Gemfile.lock.
fn locked_version(lock: &str, gem: &str) -> Option<String> {
    let pattern = format!(r"(?m)^    {} \(([^)]+)\)", regex::escape(gem));
    let re = Regex::new(&pattern).ok()?;
    re.captures(lock).map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LOCKFILE: &str = "GEM
  remote: https://rubygems.org/
  specs:
    actionpack (7.1.3)
    rails (7.1.3)
      actionpack (= 7.1.3)
    railties (7.1.3)
";

    #[test]
    fn detects_rails_with_locked_version() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("Gemfile"),
            "source 'https://rubygems.org'\ngem 'rails', '~> 7.1'\n",
        )
        .unwrap();
        fs::write(temp.path().join("Gemfile.lock"), LOCKFILE).unwrap();

        let analysis = analyze(temp.path()).unwrap();

        assert_eq!(analysis.framework.as_deref(), Some("Rails"));
        assert_eq!(analysis.framework_version.as_deref(), Some("7.1.3"));
        assert!(analysis.messages.is_empty());
    }

    #[test]
    fn missing_lockfile_is_reported() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Gemfile"), "gem \"sinatra\"\n").unwrap();

        let analysis = analyze(temp.path()).unwrap();

        assert_eq!(analysis.framework.as_deref(), Some("Sinatra"));
        assert!(analysis.framework_version.is_none());
        assert!(analysis.messages[0].contains("Gemfile.lock"));
    }

    #[test]
    fn plain_gemfile_has_no_framework() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Gemfile"), "gem 'rake'\n").unwrap();

        let analysis = analyze(temp.path()).unwrap();

        assert!(analysis.framework.is_none());
        assert_eq!(analysis.messages.len(), 1);
    }

    #[test]
    fn locked_version_ignores_dependency_lines() {
        assert_eq!(locked_version(LOCKFILE, "actionpack"), Some("7.1.3".into()));
        assert_eq!(locked_version(LOCKFILE, "sinatra"), None);
    }
}
