//! Hints shown after a command finishes.

/// Suggest committing the generated files.
pub fn after_generate(files: &[&str]) -> String {
    format!(
        "Review the generated files, then commit them: git add {}",
        files.join(" ")
    )
}

/// Suggest creating a stack from the generated service descriptor.
pub fn after_service(environment: &str) -> String {
    format!(
        "Create a stack from the service descriptor: cx stacks create --name='CHANGEME' --environment='{}' --service_yaml=service.yml",
        environment
    )
}

/// Suggest how to regenerate when artifacts already exist.
pub fn after_already_exists() -> &'static str {
    "Run again with --overwrite to replace the existing files."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn after_generate_lists_files() {
        let hint = after_generate(&["Dockerfile", "service.yml"]);
        assert!(hint.ends_with("git add Dockerfile service.yml"));
    }

    #[test]
    fn after_service_uses_environment() {
        let hint = after_service("staging");
        assert!(hint.contains("--environment='staging'"));
        assert!(hint.ends_with("--service_yaml=service.yml"));
    }

    #[test]
    fn already_exists_mentions_overwrite() {
        assert!(after_already_exists().contains("--overwrite"));
    }
}
