//! File-based locking for the template cache.
//!
//! The lock file lives beside the cache directory rather than inside it,
//! because a sync replaces the directory wholesale.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{BerthError, Result};

/// Lock mode for the template cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockMode {
    /// Readers of the cache (template rendering).
    Shared,
    /// Writers of the cache (sync).
    Exclusive,
}

/// A held lock on a template cache directory. Released on drop.
#[derive(Debug)]
pub struct CacheLock {
    _file: File,
}

impl CacheLock {
    /// Block until an exclusive lock on `cache_dir` is held.
    pub fn exclusive(cache_dir: &Path) -> Result<Self> {
        Self::acquire(cache_dir, LockMode::Exclusive)
    }

    /// Block until a shared lock on `cache_dir` is held.
    pub fn shared(cache_dir: &Path) -> Result<Self> {
        Self::acquire(cache_dir, LockMode::Shared)
    }

    fn acquire(cache_dir: &Path, mode: LockMode) -> Result<Self> {
        let lock_path = lock_path_for(cache_dir);

        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BerthError::fs(parent, e))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| BerthError::fs(&lock_path, e))?;

        tracing::debug!("Waiting for {:?} lock on {}", mode, lock_path.display());

        match mode {
            LockMode::Shared => file.lock_shared(),
            LockMode::Exclusive => file.lock(),
        }
        .map_err(|e| BerthError::fs(&lock_path, e))?;

        Ok(Self { _file: file })
    }
}

/// Path of the lock file guarding `cache_dir`: `<parent>/.<name>.lock`.
pub fn lock_path_for(cache_dir: &Path) -> PathBuf {
    let name = cache_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "templates".to_string());

    parent_of(cache_dir).join(format!(".{}.lock", name))
}

/// Parent directory of `path`, treating a bare relative name as `.`.
pub(crate) fn parent_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
