//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Kickoff - Resumable, idempotent site provisioning.
#[derive(Debug, Parser)]
#[command(name = "kickoff")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default .kickoff/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to site root (overrides current directory)
    #[arg(short, long, global = true, env = "KICKOFF_SITE")]
    pub site: Option<PathBuf>,

    /// Directory holding progress records (overrides ~/.kickoff/sites/<hash>)
    #[arg(long, global = true, env = "KICKOFF_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Advance provisioning (default if no command specified)
    Advance(AdvanceArgs),

    /// Show provisioning progress
    Status(StatusArgs),

    /// Run a single step by name, outside the sequence
    Step(StepArgs),

    /// List the configured steps
    List(ListArgs),

    /// Forget recorded progress so provisioning starts over
    Reset(ResetArgs),

    /// Write a starter configuration for a site
    Init(InitArgs),

    /// Show resolved configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `advance` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct AdvanceArgs {
    /// Run every remaining step instead of only the next one
    #[arg(short, long)]
    pub all: bool,

    /// Print the status payload as JSON
    #[arg(long)]
    pub json: bool,

    /// Keep going after a failed step (with --all)
    #[arg(long)]
    pub continue_on_failure: bool,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, clap::Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Number of journal entries to show
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,
}

impl Default for StatusArgs {
    fn default() -> Self {
        Self {
            json: false,
            limit: 10,
        }
    }
}

/// Arguments for the `step` command.
#[derive(Debug, Clone, clap::Args)]
pub struct StepArgs {
    /// Step name
    pub name: String,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `reset` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ResetArgs {
    /// Don't ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `init` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct InitArgs {
    /// Overwrite an existing configuration
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the JSON Schema for the config file instead
    #[arg(long, conflicts_with = "json")]
    pub schema: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["kickoff"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_advance_flags() {
        let cli = Cli::try_parse_from(["kickoff", "advance", "--all", "--json"]).unwrap();
        match cli.command {
            Some(Commands::Advance(args)) => {
                assert!(args.all);
                assert!(args.json);
                assert!(!args.continue_on_failure);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "kickoff",
            "status",
            "--site",
            "/srv/www",
            "--state-dir",
            "/tmp/state",
            "--quiet",
        ])
        .unwrap();
        assert_eq!(cli.site, Some(PathBuf::from("/srv/www")));
        assert_eq!(cli.state_dir, Some(PathBuf::from("/tmp/state")));
        assert!(cli.quiet);
    }

    #[test]
    fn status_limit_defaults_to_ten() {
        let cli = Cli::try_parse_from(["kickoff", "status"]).unwrap();
        match cli.command {
            Some(Commands::Status(args)) => assert_eq!(args.limit, 10),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn step_requires_a_name() {
        assert!(Cli::try_parse_from(["kickoff", "step"]).is_err());
        let cli = Cli::try_parse_from(["kickoff", "step", "theme"]).unwrap();
        match cli.command {
            Some(Commands::Step(args)) => assert_eq!(args.name, "theme"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn schema_conflicts_with_json() {
        assert!(Cli::try_parse_from(["kickoff", "config", "--schema", "--json"]).is_err());
    }
}
