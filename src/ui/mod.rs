//! User interface components.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for terminal usage
//! - [`MockUI`] for tests
//! - Spinners, theme and the pure progress reporter in [`report`]
//!
//! # Example
//!
//! ```
//! use kickoff::ui::{OutputMode, TerminalUI, UserInterface};
//!
//! let mut ui = TerminalUI::new(OutputMode::Quiet);
//! ui.success("Setup complete!");
//! ```

pub mod mock;
pub mod output;
pub mod report;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI, SpinnerStatus};
pub use output::OutputMode;
pub use report::{format_position, format_status, format_summary, StatusPayload};
pub use spinner::{step_message, ProgressSpinner};
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, KickoffTheme};

use crate::error::Result;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Styles used for formatted output.
    fn theme(&self) -> &KickoffTheme;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Ask a yes/no question; non-interactive UIs return `default`.
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show overall progress as a bar.
    fn show_progress(&mut self, percent: u8);

    /// Print machine-readable output regardless of mode.
    fn print_raw(&mut self, text: &str);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);

    /// Mark as skipped.
    fn finish_skipped(&mut self, msg: &str);
}
