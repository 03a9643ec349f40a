//! Outcome of a pipeline run.

use serde::Serialize;

/// Summary of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub ok: bool,
    /// Non-fatal findings, in the order the pack reported them.
    pub warnings: Vec<String>,
    pub language: String,
    pub framework: String,
    pub framework_version: String,
}

impl AnalysisResult {
    /// `Rails 7.1.3 (Ruby)`, leaving out whatever is unknown.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.framework.is_empty() {
            parts.push(self.framework.clone());
        }
        if !self.framework_version.is_empty() {
            parts.push(self.framework_version.clone());
        }

        match (parts.is_empty(), self.language.is_empty()) {
            (true, _) => self.language.clone(),
            (false, true) => parts.join(" "),
            (false, false) => format!("{} ({})", parts.join(" "), self.language),
        }
    }
}
