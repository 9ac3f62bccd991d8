//! List command implementation.
//!
//! The `kickoff list` command shows the configured steps in order.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::ListArgs;
use crate::config::FailurePolicy;
use crate::error::{KickoffError, Result};
use crate::steps::StepRegistry;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::workspace::Workspace;

/// The list command implementation.
pub struct ListCommand {
    workspace: Workspace,
    args: ListArgs,
}

#[derive(Debug, Serialize)]
struct StepListing<'a> {
    index: usize,
    name: &'a str,
    label: &'a str,
    kind: &'static str,
    on_failure: FailurePolicy,
}

#[derive(Debug, Serialize)]
struct Listing<'a> {
    fingerprint: String,
    steps: Vec<StepListing<'a>>,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(workspace: &Workspace, args: ListArgs) -> Self {
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

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(config) = self.workspace.config_or_report(ui)? else {
            return Ok(CommandResult::failure(2));
        };

        let registry = StepRegistry::from_config(&config)?;
        let default_policy = config.settings.on_failure;

        if self.args.json {
            let listing = Listing {
                fingerprint: registry.fingerprint(),
                steps: registry
                    .iter()
                    .enumerate()
                    .map(|(index, step)| StepListing {
                        index,
                        name: &step.name,
                        label: &step.label,
                        kind: step.action.kind(),
                        on_failure: step.failure_policy(default_policy),
                    })
                    .collect(),
            };
            let json = serde_json::to_string_pretty(&listing)
                .map_err(|e| KickoffError::Other(e.into()))?;
            ui.print_raw(&json);
            return Ok(CommandResult::success());
        }

        ui.message("Steps:");
        let width = registry.iter().map(|s| s.name.len()).max().unwrap_or(0);
        for (index, step) in registry.iter().enumerate() {
            let mut line = format!(
                "  {}. {:<width$}  {}",
                index + 1,
                step.name,
                step.label,
                width = width
            );
            if step.failure_policy(default_policy) == FailurePolicy::Continue {
                line.push_str("  [continue on failure]");
            }
            ui.message(&line);
        }

        if ui.output_mode().shows_details() {
            ui.message("");
            ui.message(&format!("Fingerprint: {}", registry.fingerprint()));
        }

        Ok(CommandResult::success())
    }
}
