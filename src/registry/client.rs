//! Registry client for the remote template manifest.

use crate::error::Result;

use super::fetch::HttpFetcher;
use super::manifest::{Manifest, MANIFEST_FILE};

/// Placeholder substituted with the branch in manifest and entry URLs.
pub const BRANCH_PLACEHOLDER: &str = "{{.branch}}";

/// Default location of the manifest, with the branch left as a placeholder.
pub const DEFAULT_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/berth-dev/berth/{{.branch}}/templates/templates.json";

/// Default template branch.
pub const DEFAULT_BRANCH: &str = "master";

/// A parsed manifest together with the body it was parsed from.
#[derive(Debug, Clone)]
pub struct RemoteManifest {
    pub manifest: Manifest,
    /// The response body as published, written to the cache unchanged.
    pub body: Vec<u8>,
}

/// Retrieves and parses the remote template manifest.
///
/// No retries happen at this layer; callers decide how to react to a
/// failed fetch.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    fetcher: HttpFetcher,
    manifest_url: String,
}

impl RegistryClient {
    /// Create a client for the default manifest location.
    pub fn new() -> Result<Self> {
        Ok(Self::with_manifest_url(
            HttpFetcher::new()?,
            DEFAULT_MANIFEST_URL,
        ))
    }

    /// Create a client for a custom manifest URL template.
    pub fn with_manifest_url(fetcher: HttpFetcher, manifest_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            manifest_url: manifest_url.into(),
        }
    }

    /// The fetcher used for the manifest and its entries.
    pub fn fetcher(&self) -> &HttpFetcher {
        &self.fetcher
    }

    /// The manifest URL for `branch`.
    pub fn manifest_url(&self, branch: &str) -> String {
        resolve_branch(&self.manifest_url, branch)
    }

    /// Fetch and parse the manifest published on `branch`.
    pub fn fetch_manifest(&self, branch: &str) -> Result<RemoteManifest> {
        let url = self.manifest_url(branch);
        tracing::debug!("Fetching template manifest from {}", url);

        let body = self.fetcher.fetch(&url)?;
        let manifest = Manifest::from_slice(&body, MANIFEST_FILE)?;
        Ok(RemoteManifest { manifest, body })
    }
}

/// Substitute `branch` into a URL template.
pub fn resolve_branch(url: &str, branch: &str) -> String {
    url.replace(BRANCH_PLACEHOLDER, branch)
}
