//! Command-line interface for Berth.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{early_exit, normalize_legacy_flags, parse_args, try_parse_args, Cli, EarlyExit};
pub use commands::{Command, CommandDispatcher, CommandResult};
