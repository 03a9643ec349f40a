//! Python projects, recognised by `requirements.txt`, `pyproject.toml` or
//! `setup.py`.

use anyhow::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use super::Analysis;

/// Files that mark a Python project.
pub const MARKERS: &[&str] = &["requirements.txt", "pyproject.toml", "setup.py"];

/// Framework distributions in detection order, with their display names.
const FRAMEWORKS: &[(&str, &str)] = &[
    ("django", "Django"),
    ("flask", "Flask"),
    ("fastapi", "FastAPI"),
];

/// Regex for a PEP 508 requirement: name, optional extras, optional specifier.
static REQUIREMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_.\-]+)\s*(?:\[[^\]]*\])?\s*(?:(===?|~=|>=|<=|!=|>|<)\s*([0-9][0-9A-Za-z.*]*))?")
        .expect("REQUIREMENT must compile")
});

/// Regex for a Poetry dependency line: `django = "^4.2"`.
static POETRY_DEPENDENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([A-Za-z0-9_.\-]+)\s*=\s*"[\^~=]*([0-9][0-9.]*)""#)
        .expect("POETRY_DEPENDENCY must compile")
});

/// A parsed dependency line.
#[derive(Debug, Clone, PartialEq)]
struct Requirement {
    name: String,
    /// Only set for exact pins.
    version: Option<String>,
}

/// Find the framework among the declared requirements.
pub fn analyze(project_root: &Path) -> Result<Analysis> {
    let mut requirements = Vec::new();
    for file in ["requirements.txt", "pyproject.toml"] {
        if let Ok(content) = fs::read_to_string(project_root.join(file)) {
            requirements.extend(content.lines().filter_map(parse_line));
        }
    }

    let mut analysis = Analysis::default();

    let found = FRAMEWORKS.iter().find_map(|(dist, name)| {
        requirements
            .iter()
            .find(|r| r.name == *dist)
            .map(|r| (*name, r.version.clone()))
    });

    match found {
        Some((name, version)) => {
            analysis.framework = Some(name.to_string());
            if version.is_none() {
                analysis
                    .messages
                    .push(format!("{} is not pinned to an exact version", name));
            }
            analysis.framework_version = version;
        }
        None => analysis
            .messages
            .push("No Python web framework found in the project requirements".to_string()),
    }

    Ok(analysis)
}

fn parse_line(line: &str) -> Option<Requirement> {
    let line = line
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == ',')
        .trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
        return None;
    }

    if let Some(caps) = POETRY_DEPENDENCY.captures(line) {
        return Some(Requirement {
            name: caps[1].to_lowercase(),
            version: Some(caps[2].to_string()),
        });
    }

    let caps = REQUIREMENT.captures(line)?;
    let exact = matches!(caps.get(2).map(|m| m.as_str()), Some("==") | Some("==="));

    Some(Requirement {
        name: caps[1].to_lowercase(),
        version: if exact {
            caps.get(3).map(|m| m.as_str().to_string())
        } else {
            None
        },
    })
}
