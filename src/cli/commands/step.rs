//! Step command implementation.
//!
//! The `kickoff step <name>` command runs one step on its own. Recorded
//! progress does not move; the result only lands in the journal. The run
//! lease is still taken so a manual step never overlaps a sequence run.

use std::path::Path;

use tracing::warn;

use crate::cli::args::StepArgs;
use crate::error::Result;
use crate::state::{holder_token, JournalEntry, ProgressStore};
use crate::steps::{StepExecutor, StepRegistry, StepStatus};
use crate::ui::UserInterface;

use super::advance::EXIT_BUSY;
use super::dispatcher::{Command, CommandResult};
use super::workspace::Workspace;

/// The step command implementation.
pub struct StepCommand {
    workspace: Workspace,
    args: StepArgs,
}

impl StepCommand {
    /// Create a new step command.
    pub fn new(workspace: &Workspace, args: StepArgs) -> Self {
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

impl Command for StepCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(config) = self.workspace.config_or_report(ui)? else {
            return Ok(CommandResult::failure(2));
        };

        let registry = StepRegistry::from_config(&config)?;
        if registry.find(&self.args.name).is_none() {
            let known: Vec<&str> = registry.iter().map(|s| s.name.as_str()).collect();
            ui.error(&format!(
                "Unknown step '{}'. Available: {}",
                self.args.name,
                known.join(", ")
            ));
            return Ok(CommandResult::failure(1));
        }

        let store = self.workspace.store()?;
        let holder = holder_token();
        let ttl = std::time::Duration::from_secs(config.settings.lease_ttl_secs);
        if !store.acquire_lease(&holder, ttl)? {
            ui.warning("Provisioning already in progress");
            return Ok(CommandResult::failure(EXIT_BUSY));
        }

        let executor = StepExecutor::new(self.workspace.site(&config));
        let mut spinner = ui.start_spinner(&format!("Running {}...", self.args.name));
        let result = executor.execute_named(&registry, &self.args.name);

        let journaled = store.append_journal(
            &[JournalEntry::from_result(&result)],
            config.settings.history_retention,
        );
        if let Err(e) = store.release_lease(&holder) {
            warn!("Failed to release lease: {}", e);
        }
        journaled?;

        match result.status() {
            StepStatus::Completed => {
                spinner.finish_success(&result.summary_line());
                ui.success(&format!("{}: {}", result.name, result.message));
                Ok(CommandResult::success())
            }
            StepStatus::Skipped => {
                spinner.finish_skipped(&result.summary_line());
                ui.message(&format!("{}: {}", result.name, result.message));
                Ok(CommandResult::success())
            }
            StepStatus::Failed => {
                spinner.finish_error(&result.summary_line());
                ui.error(&format!("Step '{}' failed: {}", result.name, result.message));
                Ok(CommandResult::failure(1))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_support::{quick_setup_workspace, store_of};
    use crate::site::MemorySite;
    use crate::ui::MockUI;
    use std::sync::Arc;
    use std::time::Duration;

    fn step(name: &str) -> StepArgs {
        StepArgs {
            name: name.to_string(),
        }
    }

    #[test]
    fn runs_named_step_without_moving_progress() {
        let site = Arc::new(MemorySite::new());
        let (_temp, workspace) = quick_setup_workspace(site.clone());
        let mut ui = MockUI::new();

        let result = StepCommand::new(&workspace, step("plugins"))
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert_eq!(site.mutation_count("install_plugin"), 3);
        let store = store_of(&workspace);
        assert_eq!(store.load().unwrap().current_step_index, 0);
        assert_eq!(store.journal(10).unwrap()[0].step, "plugins");
        assert!(store.lease().unwrap().is_none());
    }

    #[test]
    fn second_run_is_skipped() {
        let site = Arc::new(MemorySite::new());
        let (_temp, workspace) = quick_setup_workspace(site.clone());
        StepCommand::new(&workspace, step("theme"))
            .execute(&mut MockUI::new())
            .unwrap();
        let mut ui = MockUI::new();

        let result = StepCommand::new(&workspace, step("theme"))
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_message("theme: already complete"));
        assert_eq!(site.mutation_count("install_theme"), 1);
    }

    #[test]
    fn unknown_step_exits_1() {
        let (_temp, workspace) = quick_setup_workspace(Arc::new(MemorySite::new()));
        let mut ui = MockUI::new();

        let result = StepCommand::new(&workspace, step("nope"))
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("Unknown step 'nope'"));
        assert!(ui.has_error("prepare, theme"));
    }

    #[test]
    fn failing_step_exits_1() {
        let site = Arc::new(MemorySite::new());
        site.fail_on("install_plugin:elementor");
        let (_temp, workspace) = quick_setup_workspace(site);
        let mut ui = MockUI::new();

        let result = StepCommand::new(&workspace, step("plugins"))
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("Step 'plugins' failed"));
        assert!(!store_of(&workspace).journal(1).unwrap()[0].success);
    }

    #[test]
    fn busy_lease_blocks_step() {
        let site = Arc::new(MemorySite::new());
        let (_temp, workspace) = quick_setup_workspace(site.clone());
        store_of(&workspace)
            .acquire_lease("runner", Duration::from_secs(60))
            .unwrap();
        let mut ui = MockUI::new();

        let result = StepCommand::new(&workspace, step("theme"))
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, EXIT_BUSY);
        assert!(site.mutations().is_empty());
    }
}
