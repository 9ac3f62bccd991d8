//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{AdvanceArgs, Cli, Commands};
use crate::error::Result;
use crate::ui::UserInterface;

use super::workspace::Workspace;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    workspace: Workspace,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given workspace.
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    /// The workspace commands run against.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Dispatch and execute a command.
    ///
    /// With no subcommand, advances by one step.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ws = &self.workspace;
        match &cli.command {
            Some(Commands::Advance(args)) => {
                super::advance::AdvanceCommand::new(ws, args.clone()).execute(ui)
            }
            Some(Commands::Status(args)) => {
                super::status::StatusCommand::new(ws, args.clone()).execute(ui)
            }
            Some(Commands::Step(args)) => super::step::StepCommand::new(ws, args.clone()).execute(ui),
            Some(Commands::List(args)) => super::list::ListCommand::new(ws, args.clone()).execute(ui),
            Some(Commands::Reset(args)) => {
                super::reset::ResetCommand::new(ws, args.clone()).execute(ui)
            }
            Some(Commands::Init(args)) => super::init::InitCommand::new(ws, args.clone()).execute(ui),
            Some(Commands::Config(args)) => {
                super::config::ConfigCommand::new(ws, args.clone()).execute(ui)
            }
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => super::advance::AdvanceCommand::new(ws, AdvanceArgs::default()).execute(ui),
        }
    }
}
