use console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::prelude::*;

/// The operator's side of an interactive session.
pub(crate) trait Prompt {
    /// Lets the operator pick one of `items`; returns its index.
    fn select(
        &mut self,
        prompt: &str,
        items: &[String],
        default: usize,
    ) -> ClaimsetResult<usize>;

    fn confirm(
        &mut self,
        prompt: &str,
        default: bool,
    ) -> ClaimsetResult<bool>;

    /// Reads a line of text, pre-filled with `initial`.
    fn input(
        &mut self,
        prompt: &str,
        initial: &str,
    ) -> ClaimsetResult<String>;

    /// Shows a block of text to the operator.
    fn show(&mut self, text: &str);
}

/// Prompts on the terminal (stderr), leaving stdout untouched.
pub(crate) struct TerminalPrompt {
    theme: ColorfulTheme,
    term: Term,
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self {
            theme: ColorfulTheme::default(),
            term: Term::stderr(),
        }
    }
}

impl Prompt for TerminalPrompt {
    fn select(
        &mut self,
        prompt: &str,
        items: &[String],
        default: usize,
    ) -> ClaimsetResult<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact_on(&self.term)?)
    }

    fn confirm(
        &mut self,
        prompt: &str,
        default: bool,
    ) -> ClaimsetResult<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .show_default(true)
            .interact_on(&self.term)?)
    }

    fn input(
        &mut self,
        prompt: &str,
        initial: &str,
    ) -> ClaimsetResult<String> {
        Ok(Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text_on(&self.term)?)
    }

    fn show(&mut self, text: &str) {
        if let Err(e) = self.term.write_line(text) {
            log::warn!("unable to write to terminal: {e}");
        }
    }
}
