//! Remote template registry.
//!
//! The registry publishes a JSON manifest ([`Manifest`]) per branch that
//! lists every template file and the URL to download it from.
//!
//! # Example
//!
//! ```no_run
//! use berth::registry::RegistryClient;
//!
//! let client = RegistryClient::new().unwrap();
//! let remote = client.fetch_manifest("master").unwrap();
//! println!("Templates version {}", remote.manifest.version);
//! ```

pub mod client;
pub mod fetch;
pub mod manifest;

// Re-exports
pub use client::{
    resolve_branch, RegistryClient, RemoteManifest, BRANCH_PLACEHOLDER, DEFAULT_BRANCH,
    DEFAULT_MANIFEST_URL,
};
pub use fetch::{HttpFetcher, DEFAULT_TIMEOUT};
pub use manifest::{DownloadEntry, Manifest, MANIFEST_FILE};
