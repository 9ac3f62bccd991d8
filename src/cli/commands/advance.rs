//! Advance command implementation.
//!
//! The `kickoff advance` command runs the next pending step, or every
//! remaining step with `--all`, and reports where provisioning stands.
//! Pollers call it repeatedly with `--json` until `completed` is true.

use std::path::Path;

use crate::cli::args::AdvanceArgs;
use crate::config::FailurePolicy;
use crate::error::{KickoffError, Result};
use crate::runner::{AdvanceMode, RunOutcome, SequenceEvent};
use crate::steps::StepStatus;
use crate::ui::{format_status, step_message, SpinnerHandle, StatusPayload, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::workspace::Workspace;

/// Exit code when another invocation holds the lease.
pub const EXIT_BUSY: i32 = 3;

/// The advance command implementation.
pub struct AdvanceCommand {
    workspace: Workspace,
    args: AdvanceArgs,
}

impl AdvanceCommand {
    /// Create a new advance command.
    pub fn new(workspace: &Workspace, args: AdvanceArgs) -> Self {
        Self {
            workspace: workspace.clone(),
            args,
        }
    }

    /// Get the site root path.
    pub fn site_root(&self) -> &Path {
        self.workspace.site_root()
    }

    /// Get the command arguments.
    pub fn args(&self) -> &AdvanceArgs {
        &self.args
    }

    fn mode(&self) -> AdvanceMode {
        if self.args.all {
            AdvanceMode::RunToCompletion
        } else {
            AdvanceMode::SingleStep
        }
    }
}

impl Command for AdvanceCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(config) = self.workspace.config_or_report(ui)? else {
            return Ok(CommandResult::failure(2));
        };

        let policy = self
            .args
            .continue_on_failure
            .then_some(FailurePolicy::Continue);
        let sequencer = self.workspace.sequencer(&config, policy)?;

        let result = if self.args.json {
            sequencer.advance(self.mode())?
        } else {
            if self.args.all {
                let app_name = config.app_name.as_deref().unwrap_or("Kickoff");
                ui.show_header(app_name);
            }

            let mut spinner: Option<Box<dyn SpinnerHandle>> = None;
            sequencer.advance_with_progress(self.mode(), |event| match event {
                SequenceEvent::StepStarting { step, index, total } => {
                    spinner = Some(ui.start_spinner(&step_message(index, total, &step.label)));
                }
                SequenceEvent::StepFinished { step, result, .. } => {
                    if let Some(mut s) = spinner.take() {
                        match result.status() {
                            StepStatus::Completed => s.finish_success(&result.summary_line()),
                            StepStatus::Skipped => s.finish_skipped(&result.summary_line()),
                            StepStatus::Failed => s.finish_error(&format!(
                                "{} failed: {}",
                                step.name, result.message
                            )),
                        }
                    }
                }
                SequenceEvent::Completed => {}
            })?
        };

        if self.args.json {
            let payload = StatusPayload::from_result(&result);
            let json =
                serde_json::to_string(&payload).map_err(|e| KickoffError::Other(e.into()))?;
            ui.print_raw(&json);
        } else {
            if ui.output_mode().shows_details() {
                for line in &result.log {
                    ui.message(&format!("  {}", line));
                }
            }
            ui.show_progress(result.progress_percent);
            let status = format_status(&result);
            match result.outcome {
                RunOutcome::Busy => ui.warning(&status),
                RunOutcome::Failed => ui.error(&status),
                RunOutcome::AlreadyComplete => ui.message(&status),
                RunOutcome::Advanced if result.completed => ui.success(&status),
                RunOutcome::Advanced => ui.message(&status),
            }
        }

        Ok(match result.outcome {
            RunOutcome::Busy => CommandResult::failure(EXIT_BUSY),
            RunOutcome::Failed => CommandResult::failure(1),
            RunOutcome::Advanced | RunOutcome::AlreadyComplete => CommandResult::success(),
        })
    }
}
