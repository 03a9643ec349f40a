//! Daemon configuration loading.

use std::fs;
use std::path::Path;

use crate::config::schema::DaemonConfig;
use crate::error::{BerthError, Result};

/// Load the daemon configuration.
///
/// Without a path the defaults are used. A path that does not exist is
/// [`BerthError::ConfigNotFound`]; an empty file yields the defaults.
pub fn load_daemon_config(path: Option<&Path>) -> Result<DaemonConfig> {
    let Some(path) = path else {
        tracing::debug!("No daemon config given, using defaults");
        return Ok(DaemonConfig::default());
    };

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BerthError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            BerthError::fs(path, e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into a [`DaemonConfig`].
///
/// `source_path` is only used for error reporting.
pub fn parse_config(content: &str, source_path: &Path) -> Result<DaemonConfig> {
    if content.trim().is_empty() {
        return Ok(DaemonConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| BerthError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}
