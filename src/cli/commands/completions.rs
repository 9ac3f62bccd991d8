//! Shell completions generation.
//!
//! The `kickoff completions <shell>` command prints a completion script;
//! install it with e.g. `kickoff completions zsh > ~/.zfunc/_kickoff`.

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::args::{Cli, CompletionsArgs};
use crate::error::{KickoffError, Result};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The completions command implementation.
pub struct CompletionsCommand {
    args: CompletionsArgs,
}

impl CompletionsCommand {
    /// Create a new completions command.
    pub fn new(args: CompletionsArgs) -> Self {
        Self { args }
    }
}

/// Completion script for `shell`.
pub fn completion_script(shell: Shell) -> Result<String> {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, "kickoff", &mut buf);
    String::from_utf8(buf).map_err(|e| KickoffError::Other(e.into()))
}

impl Command for CompletionsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.print_raw(completion_script(self.args.shell)?.trim_end());
        Ok(CommandResult::success())
    }
}
