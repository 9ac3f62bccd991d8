//! Kickoff - Resumable, idempotent site provisioning.
//!
//! Kickoff drives a fixed sequence of provisioning steps (install a theme,
//! install and activate plugins, create pages and a menu, set options)
//! against a WordPress site. Every invocation is short: it takes a lease,
//! runs one step or all remaining ones, persists where it got to, and
//! returns a progress percentage. Re-running a step never duplicates work.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`runner`] - The sequencer that advances provisioning
//! - [`shell`] - External command execution
//! - [`site`] - The site collaborator (WP-CLI or in-memory)
//! - [`state`] - Durable progress, lease and journal
//! - [`steps`] - Step definitions and idempotent execution
//! - [`ui`] - Spinners, prompts, and progress reporting
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kickoff::config::KickoffConfig;
//! use kickoff::runner::{AdvanceMode, Sequencer, SequencerOptions};
//! use kickoff::site::MemorySite;
//! use kickoff::state::MemoryProgressStore;
//! use kickoff::steps::StepRegistry;
//!
//! let registry = StepRegistry::from_config(&KickoffConfig::quick_setup()).unwrap();
//! let sequencer = Sequencer::new(
//!     registry,
//!     Arc::new(MemorySite::new()),
//!     Arc::new(MemoryProgressStore::new()),
//!     SequencerOptions::default(),
//! );
//!
//! let first = sequencer.advance(AdvanceMode::SingleStep).unwrap();
//! assert_eq!(first.progress_percent, 16);
//!
//! let rest = sequencer.advance(AdvanceMode::RunToCompletion).unwrap();
//! assert!(rest.completed);
//! assert_eq!(rest.progress_percent, 100);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod shell;
pub mod site;
pub mod state;
pub mod steps;
pub mod ui;

pub use error::{KickoffError, Result};
