//! Template placeholder substitution.
//!
//! Templates use `{{.Name}}` placeholders (whitespace inside the braces is
//! allowed). Known names are replaced; anything else is left untouched so
//! it reaches the generated file verbatim.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Regex matching a `{{.Name}}` placeholder.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*\.([A-Za-z]+)\s*\}\}").expect("PLACEHOLDER must compile")
});

/// Values available to templates.
#[derive(Debug, Clone, Default)]
pub struct Vars<'a> {
    pub language: &'a str,
    pub framework: &'a str,
    pub framework_version: &'a str,
    pub environment: &'a str,
}

impl Vars<'_> {
    fn lookup(&self, key: &str) -> Option<&str> {
        match key {
            "Language" => Some(self.language),
            "Framework" => Some(self.framework),
            "FrameworkVersion" => Some(self.framework_version),
            "Environment" => Some(self.environment),
            _ => None,
        }
    }
}

/// Substitute known placeholders in `template`.
pub fn render(template: &str, vars: &Vars<'_>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match vars.lookup(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
