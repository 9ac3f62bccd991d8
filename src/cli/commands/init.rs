//! Init command implementation.
//!
//! The `kickoff init` command writes the stock WordPress quick-setup
//! sequence to `.kickoff/config.yml` as a starting point.

use std::path::Path;

use crate::cli::args::InitArgs;
use crate::config::{default_config_path, write_config, KickoffConfig};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::workspace::Workspace;

/// The init command implementation.
pub struct InitCommand {
    workspace: Workspace,
    args: InitArgs,
}

impl InitCommand {
    /// Create a new init command.
    pub fn new(workspace: &Workspace, args: InitArgs) -> Self {
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
    pub fn args(&self) -> &InitArgs {
        &self.args
    }
}

impl Command for InitCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let site_root = self.workspace.site_root();
        let target = default_config_path(site_root);

        if target.exists() && !self.args.force {
            ui.error(&format!(
                "Configuration already exists at {} (use --force to overwrite)",
                target.display()
            ));
            return Ok(CommandResult::failure(1));
        }

        let path = write_config(site_root, &KickoffConfig::quick_setup())?;
        ui.success(&format!("Created {}", path.display()));
        ui.message("Edit the steps, then run 'kickoff advance --all'.");

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_merged_config;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn init_writes_quick_setup() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path());
        let mut ui = MockUI::new();

        let result = InitCommand::new(&workspace, InitArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_success("config.yml"));
        let config = load_merged_config(temp.path()).unwrap();
        assert_eq!(config, KickoffConfig::quick_setup());
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path());
        let path = default_config_path(temp.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "steps: []\n").unwrap();
        let mut ui = MockUI::new();

        let result = InitCommand::new(&workspace, InitArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("--force"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "steps: []\n");
    }

    #[test]
    fn init_force_overwrites() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path());
        let path = default_config_path(temp.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "steps: []\n").unwrap();

        let result = InitCommand::new(&workspace, InitArgs { force: true })
            .execute(&mut MockUI::new())
            .unwrap();

        assert!(result.success);
        assert!(fs::read_to_string(&path).unwrap().contains("hello-elementor"));
    }
}
