//! Local template cache.
//!
//! This module keeps a directory of template files consistent with the
//! remote manifest and guards it with a file lock so concurrent runs never
//! observe a half-written cache.

pub mod lock;
pub mod store;

pub use lock::{lock_path_for, CacheLock};
pub use store::{read_local_manifest, SyncOutcome, TemplateCache};

use std::path::PathBuf;

/// Name of the cache directory inside the user's home directory.
pub const CACHE_DIR_NAME: &str = ".berth";

/// Get the default cache directory, `~/.berth`.
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CACHE_DIR_NAME))
}
