//! Terminal UI.

use console::Term;
use std::io::Write;

use super::{should_use_colors, BerthTheme, UserInterface};

/// Terminal UI writing to stdout.
pub struct TerminalUI {
    term: Term,
    theme: BerthTheme,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new() -> Self {
        let theme = if should_use_colors() {
            BerthTheme::new()
        } else {
            BerthTheme::plain()
        };

        Self {
            term: Term::stdout(),
            theme,
        }
    }
}

impl Default for TerminalUI {
    fn default() -> Self {
        Self::new()
    }
}

impl UserInterface for TerminalUI {
    fn message(&mut self, msg: &str) {
        writeln!(self.term, "{}", msg).ok();
    }

    fn success(&mut self, msg: &str) {
        writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
    }

    fn warning(&mut self, msg: &str) {
        writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.term, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
    }

    fn show_hint(&mut self, hint: &str) {
        writeln!(self.term, "{}", self.theme.format_hint(hint)).ok();
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}
