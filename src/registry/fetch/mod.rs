//! Template fetching from remote sources.
//!
//! This module provides the HTTP fetcher used for the manifest and every
//! template entry.

pub mod http;

pub use http::{HttpFetcher, DEFAULT_TIMEOUT};
