//! Reset command implementation.
//!
//! The `kickoff reset` command deletes recorded progress, the lease and
//! the journal, so the next `advance` starts from the first step. Steps
//! are idempotent, so work already done on the site is detected and skipped.

use std::path::Path;

use crate::cli::args::ResetArgs;
use crate::error::Result;
use crate::state::ProgressStore;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::workspace::Workspace;

/// The reset command implementation.
pub struct ResetCommand {
    workspace: Workspace,
    args: ResetArgs,
}

impl ResetCommand {
    /// Create a new reset command.
    pub fn new(workspace: &Workspace, args: ResetArgs) -> Self {
        Self {
            workspace: workspace.clone(),
            args,
        }
    }

    /// Get the site root path.
    pub fn site_root(&self) -> &Path {
        self.workspace.site_root()
    }
}

impl Command for ResetCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = self.workspace.store()?;

        if !self.args.yes {
            let question = format!(
                "Reset provisioning progress for {}?",
                self.workspace.site_root().display()
            );
            if !ui.confirm(&question, false)? {
                ui.message("Reset cancelled.");
                return Ok(CommandResult::success());
            }
        }

        store.reset()?;
        ui.success("Progress reset. The next run starts from the first step.");
        Ok(CommandResult::success())
    }
}
