//! Config command implementation.
//!
//! The `kickoff config` command shows resolved configuration, or the JSON
//! Schema of the config file with `--schema`.

use std::path::Path;

use crate::cli::args::ConfigArgs;
use crate::config::{ConfigPaths, KickoffConfig};
use crate::error::{KickoffError, Result};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::workspace::Workspace;

/// The config command implementation.
pub struct ConfigCommand {
    workspace: Workspace,
    args: ConfigArgs,
}

impl ConfigCommand {
    /// Create a new config command.
    pub fn new(workspace: &Workspace, args: ConfigArgs) -> Self {
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
    pub fn args(&self) -> &ConfigArgs {
        &self.args
    }
}

impl Command for ConfigCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.args.schema {
            let schema = schemars::schema_for!(KickoffConfig);
            let json =
                serde_json::to_string_pretty(&schema).map_err(|e| KickoffError::Other(e.into()))?;
            ui.print_raw(&json);
            return Ok(CommandResult::success());
        }

        let Some(config) = self.workspace.config_or_report(ui)? else {
            return Ok(CommandResult::failure(2));
        };

        if self.args.json {
            let json =
                serde_json::to_string_pretty(&config).map_err(|e| KickoffError::Other(e.into()))?;
            ui.print_raw(&json);
            return Ok(CommandResult::success());
        }

        // Show config file path(s)
        let paths = ConfigPaths::discover(self.workspace.site_root());
        let existing = paths.all_existing();
        if !existing.is_empty() {
            for path in &existing {
                ui.message(&format!("# {}", path.display()));
            }
            ui.message("");
        }

        let yaml = serde_yaml::to_string(&config).map_err(|e| KickoffError::Other(e.into()))?;
        ui.message(&yaml);

        Ok(CommandResult::success())
    }
}
