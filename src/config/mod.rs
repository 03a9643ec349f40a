//! Daemon configuration.
//!
//! The one-shot command takes everything from flags. The daemon reads a
//! YAML file given with `-c` once at startup; see [`DaemonConfig`] for the
//! keys and their defaults.
//!
//! # Example
//!
//! ```
//! use berth::config::parse_config;
//! use std::path::Path;
//!
//! let config = parse_config("environment: staging", Path::new("berth.yml")).unwrap();
//! assert_eq!(config.environment, "staging");
//! assert_eq!(config.branch, "master");
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_daemon_config, parse_config};
pub use schema::{DaemonConfig, DEFAULT_REFRESH_INTERVAL_SECS};
