//! Progress spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::theme::KickoffTheme;
use super::SpinnerHandle;

/// A spinner shown while a step runs.
pub struct ProgressSpinner {
    bar: ProgressBar,
    theme: KickoffTheme,
}

impl ProgressSpinner {
    /// Create a new spinner with a message.
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self {
            bar,
            theme: KickoffTheme::detect(),
        }
    }

    /// Create a spinner that doesn't show (for silent mode).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            theme: KickoffTheme::plain(),
        }
    }

    fn finish(&mut self, line: String) {
        self.bar
            .set_style(ProgressStyle::default_spinner().template("{msg}").unwrap());
        self.bar.finish_with_message(line);
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.finish(line);
    }

    fn finish_error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.finish(line);
    }

    fn finish_skipped(&mut self, msg: &str) {
        let line = self.theme.format_skipped(msg);
        self.finish(line);
    }
}

/// Spinner text for a step: `[2/6] Installing plugins...`.
pub fn step_message(index: usize, total: usize, label: &str) -> String {
    format!("[{}/{}] {}", index + 1, total, label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_spinner_finishes_quietly() {
        let mut spinner = ProgressSpinner::hidden();
        spinner.set_message("Working");
        spinner.finish_success("Done");
    }

    #[test]
    fn spinner_finish_variants() {
        ProgressSpinner::new("a").finish_success("ok");
        ProgressSpinner::new("b").finish_error("failed");
        ProgressSpinner::new("c").finish_skipped("skipped");
    }

    #[test]
    fn step_message_is_one_based() {
        assert_eq!(step_message(0, 6, "Preparing setup..."), "[1/6] Preparing setup...");
        assert_eq!(step_message(5, 6, "Cleaning up..."), "[6/6] Cleaning up...");
    }
}
