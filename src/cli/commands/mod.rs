//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. The
//! [`CommandDispatcher`] picks the one-shot [`generate`] command or the
//! [`daemon`] command from the parsed flags.

pub mod daemon;
pub mod dispatcher;
pub mod generate;

pub use dispatcher::{build_pipeline, Command, CommandDispatcher, CommandResult};
