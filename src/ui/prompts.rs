//! Interactive prompts.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;

use crate::error::{BerthError, Result};

/// Convert dialoguer errors to BerthError.
fn map_dialoguer_err(e: dialoguer::Error) -> BerthError {
    BerthError::Other(anyhow::Error::new(e).context("Failed to read from the terminal"))
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Ask a free-form question on stderr. An empty answer is allowed.
pub fn prompt_text(question: &str) -> Result<String> {
    Input::<String>::with_theme(&prompt_theme())
        .with_prompt(question)
        .allow_empty(true)
        .interact_text_on(&Term::stderr())
        .map_err(map_dialoguer_err)
}
