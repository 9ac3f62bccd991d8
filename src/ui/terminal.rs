//! Terminal UI.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use std::io::Write;

use crate::error::{KickoffError, Result};
use crate::shell::is_ci;

use super::{KickoffTheme, OutputMode, ProgressSpinner, SpinnerHandle, UserInterface};

/// Terminal UI writing to stdout, prompting with dialoguer when attached to a TTY.
pub struct TerminalUI {
    term: Term,
    theme: KickoffTheme,
    mode: OutputMode,
    interactive: bool,
}

impl TerminalUI {
    /// Create a new terminal UI; prompts are skipped off a TTY or under CI.
    pub fn new(mode: OutputMode) -> Self {
        let term = Term::stdout();
        let interactive = term.is_term() && !is_ci();
        Self {
            term,
            theme: KickoffTheme::detect(),
            mode,
            interactive,
        }
    }

    /// Disable colors regardless of terminal support.
    pub fn without_colors(mut self) -> Self {
        self.theme = KickoffTheme::plain();
        self
    }
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn theme(&self) -> &KickoffTheme {
        &self.theme
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode != OutputMode::Silent {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode != OutputMode::Silent {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.term, "{}", self.theme.format_error(msg)).ok();
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        if !self.interactive {
            return Ok(default);
        }
        Confirm::with_theme(&prompt_theme())
            .with_prompt(question)
            .default(default)
            .interact_on(&self.term)
            .map_err(|e| KickoffError::Io(e.into()))
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() && self.interactive {
            Box::new(ProgressSpinner::new(message))
        } else {
            Box::new(ProgressSpinner::hidden())
        }
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn show_progress(&mut self, percent: u8) {
        if self.mode.shows_status() {
            writeln!(self.term, "  {}", self.theme.format_bar(percent)).ok();
        }
    }

    fn print_raw(&mut self, text: &str) {
        writeln!(self.term, "{}", text).ok();
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_ui_output_mode() {
        let ui = TerminalUI::new(OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn non_interactive_confirm_uses_default() {
        let mut ui = TerminalUI::new(OutputMode::Normal);
        if !ui.is_interactive() {
            assert!(ui.confirm("Reset?", true).unwrap());
            assert!(!ui.confirm("Reset?", false).unwrap());
        }
    }
}
