//! Node.js projects, recognised by a `package.json`.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

use super::Analysis;

/// Files that mark a Node.js project.
pub const MARKERS: &[&str] = &["package.json"];

/// Framework packages in detection order, with their display names.
const FRAMEWORKS: &[(&str, &str)] = &[
    ("next", "Next.js"),
    ("@nestjs/core", "NestJS"),
    ("express", "Express"),
    ("fastify", "Fastify"),
];

/// Find the framework among the declared dependencies.
pub fn analyze(project_root: &Path) -> Result<Analysis> {
    let path = project_root.join("package.json");
    let content =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let package: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let mut analysis = Analysis::default();

    let found = FRAMEWORKS.iter().find_map(|(pkg, name)| {
        dependency(&package, pkg).map(|requirement| (*name, requirement))
    });

    match found {
        Some((name, requirement)) => {
            analysis.framework = Some(name.to_string());
            analysis.framework_version = clean_version(requirement);
            if analysis.framework_version.is_none() {
                analysis.messages.push(format!(
                    "{} version requirement '{}' does not name a version",
                    name, requirement
                ));
            }
        }
        None => analysis
            .messages
            .push("No Node.js web framework found in package.json".to_string()),
    }

    if !project_root.join("package-lock.json").exists() && !project_root.join("yarn.lock").exists()
    {
        analysis
            .messages
            .push("No lockfile found; dependency versions are not pinned".to_string());
    }

    Ok(analysis)
}

fn dependency<'a>(package: &'a Value, name: &str) -> Option<&'a str> {
    ["dependencies", "devDependencies"]
        .iter()
        .find_map(|section| package.get(section)?.get(name)?.as_str())
}

/// Turn a semver requirement like `^4.18.2` into `4.18.2`.
fn clean_version(requirement: &str) -> Option<String> {
    let version = requirement.trim().trim_start_matches(['^', '~', '>', '=', 'v', ' ']);
    if version.starts_with(|c: char| c.is_ascii_digit()) {
        Some(version.to_string())
    } else {
        None
    }
}
