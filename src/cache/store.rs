//! Template cache synchronization.
//!
//! A cache directory holds exactly one manifest version: `templates.json`
//! plus one file per manifest entry. A sync either leaves the directory
//! untouched or replaces it as a whole. New files are downloaded into a
//! staging directory next to the cache and renamed into place only once
//! every entry has been written, so a failed download never damages a
//! previously working cache.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BerthError, Result};
use crate::registry::{resolve_branch, Manifest, RegistryClient, RemoteManifest, MANIFEST_FILE};

use super::lock::{parent_of, CacheLock};

/// What a sync did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The cache was created or replaced with a new version.
    Downloaded {
        /// Version now in the cache.
        version: String,
        /// Number of template files downloaded.
        files: usize,
    },
    /// The cached version already matched the remote one.
    UpToDate {
        /// Version in the cache.
        version: String,
    },
}

impl SyncOutcome {
    /// The version held by the cache after the sync.
    pub fn version(&self) -> &str {
        match self {
            Self::Downloaded { version, .. } | Self::UpToDate { version } => version,
        }
    }

    /// Whether any file was downloaded.
    pub fn downloaded(&self) -> bool {
        matches!(self, Self::Downloaded { .. })
    }
}

/// Keeps a local template directory consistent with the remote manifest.
#[derive(Debug, Clone)]
pub struct TemplateCache {
    client: RegistryClient,
}

impl TemplateCache {
    /// Create a cache synchronizer backed by `client`.
    pub fn new(client: RegistryClient) -> Self {
        Self { client }
    }

    /// The registry client in use.
    pub fn client(&self) -> &RegistryClient {
        &self.client
    }

    /// Bring `cache_dir` up to date with the manifest published on `branch`.
    ///
    /// The remote manifest is always fetched. Files are downloaded only when
    /// the cache has no manifest or its version differs from the remote one.
    /// Holds the exclusive cache lock for the whole operation.
    pub fn sync(&self, cache_dir: &Path, branch: &str) -> Result<SyncOutcome> {
        let _lock = CacheLock::exclusive(cache_dir)?;

        tracing::info!("Checking templates in {}", cache_dir.display());
        let remote = self.client.fetch_manifest(branch)?;

        match read_local_manifest(cache_dir)? {
            None => {
                tracing::info!("No local templates found. Downloading now.");
            }
            Some(local) if local.version != remote.manifest.version => {
                tracing::info!(
                    "Newer templates found ({} -> {}). Downloading them now",
                    local.version,
                    remote.manifest.version
                );
            }
            Some(local) => {
                tracing::info!("Local templates are up to date ({})", local.version);
                return Ok(SyncOutcome::UpToDate {
                    version: local.version,
                });
            }
        }

        let files = self.download(cache_dir, &remote, branch)?;

        Ok(SyncOutcome::Downloaded {
            version: remote.manifest.version,
            files,
        })
    }

    /// Download `remote` into a staging directory and swap it into place.
    fn download(&self, cache_dir: &Path, remote: &RemoteManifest, branch: &str) -> Result<usize> {
        let manifest = &remote.manifest;
        let parent = parent_of(cache_dir);
        fs::create_dir_all(&parent).map_err(|e| BerthError::fs(&parent, e))?;

        let staging = tempfile::Builder::new()
            .prefix(&format!(".{}.staging-", dir_name(cache_dir)))
            .tempdir_in(&parent)
            .map_err(|e| BerthError::fs(&parent, e))?;

        let manifest_path = staging.path().join(MANIFEST_FILE);
        fs::write(&manifest_path, &remote.body)
            .map_err(|e| BerthError::fs(&manifest_path, e))?;

        let fetcher = self.client.fetcher();
        for entry in manifest.entries() {
            let url = resolve_branch(&entry.url, branch);
            tracing::debug!("Downloading {} from {}", entry.name, url);
            fetcher.fetch_to(&url, &staging.path().join(&entry.name))?;
        }

        let staged = staging.keep();
        swap_into_place(&staged, cache_dir, &parent)?;

        Ok(manifest.entry_count())
    }
}

/// Read the cached manifest, if there is a usable one.
///
/// A manifest that cannot be parsed is treated as absent so the next sync
/// repairs the cache instead of failing forever.
pub fn read_local_manifest(cache_dir: &Path) -> Result<Option<Manifest>> {
    let path = cache_dir.join(MANIFEST_FILE);

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(BerthError::fs(&path, e)),
    };

    match Manifest::from_slice(&bytes, &path.display().to_string()) {
        Ok(manifest) => Ok(Some(manifest)),
        Err(e) => {
            tracing::warn!("Ignoring unreadable local manifest: {}", e);
            Ok(None)
        }
    }
}

/// Replace `cache_dir` with `staged`.
///
/// The current directory is moved aside first and restored if the final
/// rename fails.
fn swap_into_place(staged: &Path, cache_dir: &Path, parent: &Path) -> Result<()> {
    let backup = if cache_dir.exists() {
        let backup = backup_path(cache_dir, parent);
        if backup.exists() {
            fs::remove_dir_all(&backup).map_err(|e| BerthError::fs(&backup, e))?;
        }
        if let Err(e) = fs::rename(cache_dir, &backup) {
            let _ = fs::remove_dir_all(staged);
            return Err(BerthError::fs(cache_dir, e));
        }
        Some(backup)
    } else {
        None
    };

    if let Err(e) = fs::rename(staged, cache_dir) {
        if let Some(backup) = &backup {
            if let Err(restore) = fs::rename(backup, cache_dir) {
                tracing::warn!(
                    "Could not restore previous templates from {}: {}",
                    backup.display(),
                    restore
                );
            }
        }
        let _ = fs::remove_dir_all(staged);
        return Err(BerthError::fs(cache_dir, e));
    }

    if let Some(backup) = backup {
        if let Err(e) = fs::remove_dir_all(&backup) {
            tracing::warn!("Could not remove {}: {}", backup.display(), e);
        }
    }

    Ok(())
}

fn dir_name(cache_dir: &Path) -> String {
    cache_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "templates".to_string())
}

fn backup_path(cache_dir: &Path, parent: &Path) -> PathBuf {
    parent.join(format!(
        ".{}.old-{}",
        dir_name(cache_dir),
        std::process::id()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::HttpFetcher;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    fn cache_for(server: &MockServer) -> TemplateCache {
        TemplateCache::new(RegistryClient::with_manifest_url(
            HttpFetcher::new().unwrap(),
            server.url("/{{.branch}}/templates.json"),
        ))
    }

    fn manifest_json(server: &MockServer, version: &str) -> String {
        format!(
            r#"{{
                "version": "{version}",
                "dockerfiles": [{{"url": "{df}", "name": "ruby.dockerfile.template"}}],
                "service-ymls": [{{"url": "{svc}", "name": "ruby.service.yml.template"}}]
            }}"#,
            df = server.url("/{{.branch}}/ruby.dockerfile.template"),
            svc = server.url("/{{.branch}}/ruby.service.yml.template"),
        )
    }

    #[test]
    fn first_sync_downloads_everything() {
        let server = MockServer::start();
        let manifest = server.mock(|when, then| {
            when.method(GET).path("/master/templates.json");
            then.status(200).body(manifest_json(&server, "3"));
        });
        let dockerfile = server.mock(|when, then| {
            when.method(GET).path("/master/ruby.dockerfile.template");
            then.status(200).body("FROM ruby");
        });
        let service = server.mock(|when, then| {
            when.method(GET).path("/master/ruby.service.yml.template");
            then.status(200).body("services:");
        });

        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join("nested").join(".berth");

        let outcome = cache_for(&server).sync(&cache_dir, "master").unwrap();

        manifest.assert_calls(1);
        dockerfile.assert_calls(1);
        service.assert_calls(1);
        assert_eq!(
            outcome,
            SyncOutcome::Downloaded {
                version: "3".into(),
                files: 2
            }
        );
        assert_eq!(
            fs::read_to_string(cache_dir.join("ruby.dockerfile.template")).unwrap(),
            "FROM ruby"
        );
        let local = read_local_manifest(&cache_dir).unwrap().unwrap();
        assert_eq!(local.version, "3");
    }

    #[test]
    fn cached_manifest_is_the_published_body() {
        let server = MockServer::start();
        let published = manifest_json(&server, "3");
        server.mock(|when, then| {
            when.method(GET).path("/master/templates.json");
            then.status(200).body(&published);
        });
        for path in [
            "/master/ruby.dockerfile.template",
            "/master/ruby.service.yml.template",
        ] {
            server.mock(|when, then| {
                when.method(GET).path(path);
                then.status(200).body("x");
            });
        }

        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join(".berth");

        cache_for(&server).sync(&cache_dir, "master").unwrap();

        assert_eq!(
            fs::read_to_string(cache_dir.join(MANIFEST_FILE)).unwrap(),
            published
        );
    }

    #[test]
    fn second_sync_with_same_version_downloads_nothing() {
        let server = MockServer::start();
        let manifest = server.mock(|when, then| {
            when.method(GET).path("/master/templates.json");
            then.status(200).body(manifest_json(&server, "3"));
        });
        let dockerfile = server.mock(|when, then| {
            when.method(GET).path("/master/ruby.dockerfile.template");
            then.status(200).body("FROM ruby");
        });
        server.mock(|when, then| {
            when.method(GET).path("/master/ruby.service.yml.template");
            then.status(200).body("services:");
        });

        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join(".berth");
        let cache = cache_for(&server);

        assert!(cache.sync(&cache_dir, "master").unwrap().downloaded());
        let second = cache.sync(&cache_dir, "master").unwrap();

        assert_eq!(second, SyncOutcome::UpToDate { version: "3".into() });
        manifest.assert_calls(2);
        dockerfile.assert_calls(1);
    }

    #[test]
    fn version_change_rewrites_every_file() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/master/templates.json");
            then.status(200).body(manifest_json(&server, "4"));
        });
        let dockerfile = server.mock(|when, then| {
            when.method(GET).path("/master/ruby.dockerfile.template");
            then.status(200).body("FROM ruby:3.3");
        });
        let service = server.mock(|when, then| {
            when.method(GET).path("/master/ruby.service.yml.template");
            then.status(200).body("services: {}");
        });

        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join(".berth");
        fs::create_dir_all(&cache_dir).unwrap();
        fs::write(cache_dir.join(MANIFEST_FILE), r#"{"version": "3"}"#).unwrap();
        fs::write(cache_dir.join("ruby.dockerfile.template"), "FROM ruby:2.7").unwrap();
        fs::write(cache_dir.join("obsolete.template"), "old").unwrap();

        let outcome = cache_for(&server).sync(&cache_dir, "master").unwrap();

        assert_eq!(outcome.version(), "4");
        dockerfile.assert_calls(1);
        service.assert_calls(1);
        assert_eq!(
            fs::read_to_string(cache_dir.join("ruby.dockerfile.template")).unwrap(),
            "FROM ruby:3.3"
        );
        assert!(!cache_dir.join("obsolete.template").exists());
        assert_eq!(read_local_manifest(&cache_dir).unwrap().unwrap().version, "4");
    }

    #[test]
    fn failed_download_keeps_previous_cache() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/master/templates.json");
            then.status(200).body(manifest_json(&server, "4"));
        });
        server.mock(|when, then| {
            when.method(GET).path("/master/ruby.dockerfile.template");
            then.status(200).body("FROM ruby:3.3");
        });
        server.mock(|when, then| {
            when.method(GET).path("/master/ruby.service.yml.template");
            then.status(503);
        });

        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join(".berth");
        fs::create_dir_all(&cache_dir).unwrap();
        fs::write(cache_dir.join(MANIFEST_FILE), r#"{"version": "3"}"#).unwrap();
        fs::write(cache_dir.join("ruby.dockerfile.template"), "FROM ruby:2.7").unwrap();

        let err = cache_for(&server).sync(&cache_dir, "master").unwrap_err();

        assert!(matches!(err, BerthError::Network { .. }));
        assert_eq!(read_local_manifest(&cache_dir).unwrap().unwrap().version, "3");
        assert_eq!(
            fs::read_to_string(cache_dir.join("ruby.dockerfile.template")).unwrap(),
            "FROM ruby:2.7"
        );

        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.contains("staging"))
            .collect();
        assert!(leftovers.is_empty(), "staging left behind: {:?}", leftovers);
    }

    #[test]
    fn unreachable_registry_fails_even_with_local_cache() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/master/templates.json");
            then.status(500);
        });

        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join(".berth");
        fs::create_dir_all(&cache_dir).unwrap();
        fs::write(cache_dir.join(MANIFEST_FILE), r#"{"version": "3"}"#).unwrap();

        let err = cache_for(&server).sync(&cache_dir, "master").unwrap_err();
        assert!(matches!(err, BerthError::Network { .. }));
    }

    #[test]
    fn corrupt_local_manifest_is_repaired() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/master/templates.json");
            then.status(200).body(r#"{"version": "5"}"#);
        });

        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join(".berth");
        fs::create_dir_all(&cache_dir).unwrap();
        fs::write(cache_dir.join(MANIFEST_FILE), "garbage").unwrap();

        let outcome = cache_for(&server).sync(&cache_dir, "master").unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::Downloaded {
                version: "5".into(),
                files: 0
            }
        );
        assert_eq!(read_local_manifest(&cache_dir).unwrap().unwrap().version, "5");
    }

    #[test]
    fn branch_is_substituted_in_entry_urls() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/develop/templates.json");
            then.status(200).body(manifest_json(&server, "9"));
        });
        let dockerfile = server.mock(|when, then| {
            when.method(GET).path("/develop/ruby.dockerfile.template");
            then.status(200).body("FROM ruby");
        });
        server.mock(|when, then| {
            when.method(GET).path("/develop/ruby.service.yml.template");
            then.status(200).body("services:");
        });

        let temp = TempDir::new().unwrap();
        cache_for(&server)
            .sync(&temp.path().join(".berth"), "develop")
            .unwrap();

        dockerfile.assert_calls(1);
    }

    #[test]
    fn read_local_manifest_missing_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(read_local_manifest(temp.path()).unwrap().is_none());
    }
}
