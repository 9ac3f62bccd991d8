//! Kickoff CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use kickoff::cli::{Cli, CommandDispatcher, Workspace};
use kickoff::ui::{OutputMode, TerminalUI, UserInterface};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Logs go to stderr; stdout carries status and JSON payloads.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("kickoff=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kickoff=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("Kickoff starting with args: {:?}", cli);

    let output_mode = OutputMode::from_flags(cli.verbose, cli.quiet);

    // Spinners pick their theme up from the environment.
    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let site_root = cli
        .site
        .as_ref()
        .cloned()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    let mut ui = TerminalUI::new(output_mode);
    if cli.no_color {
        ui = ui.without_colors();
    }

    let dispatcher = CommandDispatcher::new(Workspace::from_cli(&cli, site_root));

    match dispatcher.dispatch(&cli, &mut ui) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
