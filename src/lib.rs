//! Berth - Scaffold container deployment files for a project.
//!
//! Berth detects a project's stack and writes a `Dockerfile`, a
//! `service.yml` and a `docker-compose.yml` from a versioned template set
//! that it keeps synced from a remote registry.
//!
//! # Modules
//!
//! - [`cache`] - Local template cache, sync and locking
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Daemon configuration loading
//! - [`detection`] - Detector and stack pack interfaces
//! - [`error`] - Error types and result aliases
//! - [`packs`] - Built-in Ruby, Node.js and Python packs
//! - [`pipeline`] - Generation orchestration
//! - [`registry`] - Remote template manifest
//! - [`service`] - Long-running service mode
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use berth::pipeline::GeneratorSet;
//! use berth::detection::Artifact;
//!
//! let generators = GeneratorSet::parse("dockerfile,service");
//! assert!(generators.includes(Artifact::ServiceDescriptor));
//! assert!(!generators.includes(Artifact::ComposeFile));
//! ```
//!
//! For complete runs, see the integration tests.

pub mod cache;
pub mod cli;
pub mod config;
pub mod detection;
pub mod error;
pub mod packs;
pub mod pipeline;
pub mod registry;
pub mod service;
pub mod ui;

pub use error::{BerthError, Result};
