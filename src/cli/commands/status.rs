//! Status command implementation.
//!
//! The `kickoff status` command shows where provisioning stands without
//! running anything.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::args::StatusArgs;
use crate::error::{KickoffError, Result};
use crate::state::{JournalEntry, ProgressStore};
use crate::steps::StepRegistry;
use crate::ui::{format_position, format_summary, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::workspace::Workspace;

/// The status command implementation.
pub struct StatusCommand {
    workspace: Workspace,
    args: StatusArgs,
}

/// Machine-readable status.
#[derive(Debug, Serialize)]
struct StatusReport<'a> {
    completed: bool,
    progress: u8,
    current_step_index: usize,
    total_steps: usize,
    next_step: Option<&'a str>,
    fingerprint: Option<String>,
    lease_expires_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    journal: Vec<JournalEntry>,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(workspace: &Workspace, args: StatusArgs) -> Self {
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
    pub fn args(&self) -> &StatusArgs {
        &self.args
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(config) = self.workspace.config_or_report(ui)? else {
            return Ok(CommandResult::failure(2));
        };

        let registry = StepRegistry::from_config(&config)?;
        let store = self.workspace.store()?;
        let progress = store.load()?;
        let journal = store.journal(self.args.limit)?;
        let now = Utc::now();

        if self.args.json {
            let next_step = if progress.completed {
                None
            } else {
                registry
                    .get(progress.current_step_index)
                    .map(|s| s.name.as_str())
            };
            let report = StatusReport {
                completed: progress.completed,
                progress: progress.percent(registry.len()),
                current_step_index: progress.current_step_index,
                total_steps: registry.len(),
                next_step,
                fingerprint: progress.fingerprint.clone(),
                lease_expires_at: progress.lease_expiry.filter(|expiry| *expiry > now),
                updated_at: progress.updated_at,
                journal,
            };
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| KickoffError::Other(e.into()))?;
            ui.print_raw(&json);
            return Ok(CommandResult::success());
        }

        let app_name = config.app_name.as_deref().unwrap_or("Kickoff");
        ui.show_header(&format!("{} - Status", app_name));

        ui.message(&format_position(&progress, &registry));
        ui.show_progress(progress.percent(registry.len()));

        if progress.lease_active(now) {
            if let Some(expiry) = progress.lease_expiry {
                ui.warning(&format!(
                    "A run is in progress (lease expires {})",
                    expiry.format("%Y-%m-%d %H:%M:%S")
                ));
            }
        }

        if let Some(updated) = progress.updated_at {
            ui.message(&format!(
                "Last update: {}",
                updated.format("%Y-%m-%d %H:%M:%S")
            ));
        }

        if let Some(recorded) = &progress.fingerprint {
            if *recorded != registry.fingerprint() && !progress.is_fresh() {
                ui.warning(
                    "Step sequence changed since this run started. \
                     Run 'kickoff reset' to start over.",
                );
            }
        }

        if !journal.is_empty() {
            ui.message("");
            ui.message("Recent steps:");
            for line in format_summary(&journal).lines() {
                ui.message(&format!("  {}", line));
            }
        }

        Ok(CommandResult::success())
    }
}
