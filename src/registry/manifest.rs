//! Template manifest definitions.
//!
//! The manifest lists every template file of one release together with the
//! URL it is downloaded from. Its `version` is opaque: two manifests are the
//! same release exactly when their versions are equal.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

use crate::error::{BerthError, Result};

/// File name of the manifest inside the template cache.
pub const MANIFEST_FILE: &str = "templates.json";

/// A versioned list of template files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Release version, compared only for equality.
    #[serde(default, deserialize_with = "deserialize_version")]
    pub version: String,

    /// Dockerfile templates.
    #[serde(default)]
    pub dockerfiles: Vec<DownloadEntry>,

    /// Service descriptor (`service.yml`) templates.
    #[serde(default, rename = "service-ymls")]
    pub service_descriptors: Vec<DownloadEntry>,

    /// Compose file templates.
    #[serde(default, rename = "docker-compose-ymls")]
    pub compose_files: Vec<DownloadEntry>,
}

/// One downloadable template file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadEntry {
    /// Where to download the file from.
    pub url: String,
    /// File name inside the template cache.
    pub name: String,
}

/// Accepts `"3"` as well as `3` so older registries keep working.
fn deserialize_version<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Version {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Version::deserialize(deserializer)? {
        Version::Text(s) => s,
        Version::Number(n) => n.to_string(),
    })
}

impl Manifest {
    /// Parse and validate a manifest from JSON bytes.
    ///
    /// `source_name` identifies the document in error messages.
    pub fn from_slice(bytes: &[u8], source_name: &str) -> Result<Self> {
        let manifest: Manifest =
            serde_json::from_slice(bytes).map_err(|e| BerthError::Parse {
                source_name: source_name.to_string(),
                message: e.to_string(),
            })?;

        manifest.validate().map_err(|message| BerthError::Parse {
            source_name: source_name.to_string(),
            message,
        })?;

        Ok(manifest)
    }

    /// Every entry, dockerfiles first, then service descriptors, then
    /// compose files, each in manifest order.
    pub fn entries(&self) -> impl Iterator<Item = &DownloadEntry> {
        self.dockerfiles
            .iter()
            .chain(self.service_descriptors.iter())
            .chain(self.compose_files.iter())
    }

    /// Total number of entries across all lists.
    pub fn entry_count(&self) -> usize {
        self.dockerfiles.len() + self.service_descriptors.len() + self.compose_files.len()
    }

    /// Check that entry names are usable as cache file names.
    ///
    /// Names must be unique across the whole manifest, must be bare file
    /// names and must not collide with the manifest file itself.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();

        for entry in self.entries() {
            let name = entry.name.as_str();

            if name.is_empty() {
                return Err(format!("entry for {} has an empty name", entry.url));
            }
            if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
                return Err(format!("entry name '{}' is not a plain file name", name));
            }
            if name == MANIFEST_FILE {
                return Err(format!("entry name '{}' is reserved", name));
            }
            if !seen.insert(name) {
                return Err(format!("duplicate entry name '{}'", name));
            }
        }

        Ok(())
    }
}
