//! Command-line interface for kickoff.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    AdvanceArgs, Cli, Commands, CompletionsArgs, ConfigArgs, InitArgs, ListArgs, ResetArgs,
    StatusArgs, StepArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult, Workspace, EXIT_BUSY};
