//! User-facing terminal output.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for terminal usage
//! - [`MockUI`] for tests
//! - A text prompt and post-run hints
//!
//! Diagnostics go through `tracing` to stderr; everything the user is meant
//! to read goes through a [`UserInterface`].
//!
//! # Example
//!
//! ```
//! use berth::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.show_header("berth");
//! ui.success("Dockerfile written");
//! assert_eq!(ui.successes(), ["Dockerfile written"]);
//! ```

pub mod hints;
pub mod mock;
pub mod prompts;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use prompts::prompt_text;
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, BerthTheme};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show a dimmed hint about what to do next.
    fn show_hint(&mut self, hint: &str);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}
