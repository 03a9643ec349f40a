//! Error types for Berth operations.
//!
//! This module defines [`BerthError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Each failure is reported with the taxonomy variant that describes it
//!   (`Network`, `Parse`, `Filesystem`, ...)
//! - Callers add one line of context with [`ResultExt::wrap_err`]; the
//!   original kind stays reachable through [`BerthError::root`]
//! - Use `anyhow::Error` (via `BerthError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Berth operations.
#[derive(Debug, Error)]
pub enum BerthError {
    /// Transport, DNS or HTTP status failure while fetching a URL.
    #[error("Failed to fetch {url}: {message}")]
    Network { url: String, message: String },

    /// Malformed or invalid template manifest.
    #[error("Failed to parse {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// Create/read/write failure in the cache or project directory.
    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output artifact already present and overwriting was not allowed.
    #[error("{file} already exists. Use the overwrite flag to overwrite it")]
    AlreadyExists { file: String },

    /// The detection collaborator could not identify or analyze the project.
    #[error("{message}")]
    Detection { message: String },

    /// The detection collaborator failed to write an artifact.
    #[error("{artifact}: {message}")]
    Generation { artifact: String, message: String },

    /// Configuration file not found at the given location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// A pipeline run was requested after the service started shutting down.
    #[error("Service is shutting down")]
    ServiceStopped,

    /// An error with one line of context describing what was being attempted.
    #[error("{context} due to {source}")]
    Context {
        context: String,
        #[source]
        source: Box<BerthError>,
    },

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BerthError {
    /// Build a filesystem error for `path`.
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// The innermost error, with every layer of context removed.
    pub fn root(&self) -> &BerthError {
        let mut current = self;
        while let BerthError::Context { source, .. } = current {
            current = source;
        }
        current
    }
}

/// Result type alias for Berth operations.
pub type Result<T> = std::result::Result<T, BerthError>;

/// Adds context to a failed [`Result`].
pub trait ResultExt<T> {
    /// Wrap the error with a lazily built context line.
    fn wrap_err<F, S>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for Result<T> {
    fn wrap_err<F, S>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| BerthError::Context {
            context: context().into(),
            source: Box::new(source),
        })
    }
}
