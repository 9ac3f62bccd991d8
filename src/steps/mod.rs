//! Step definitions and execution.
//!
//! - [`StepRegistry`] - The ordered, immutable list of steps
//! - [`StepAction`] - What a step does to the site
//! - [`StepExecutor`] - Runs a step idempotently against a site
//! - [`StepResult`] - Captures the outcome of one step
//!
//! # Example
//!
//! ```
//! use kickoff::config::KickoffConfig;
//! use kickoff::site::MemorySite;
//! use kickoff::steps::{StepExecutor, StepRegistry, StepStatus};
//! use std::sync::Arc;
//!
//! let registry = StepRegistry::from_config(&KickoffConfig::quick_setup()).unwrap();
//! let site = Arc::new(MemorySite::new().with_theme("hello-elementor", true));
//! let executor = StepExecutor::new(site);
//!
//! let result = executor.execute_named(&registry, "theme");
//! assert_eq!(result.status(), StepStatus::Skipped);
//! ```

pub mod executor;
pub mod registry;

pub use executor::{format_duration, CollaboratorOutcome, StepExecutor, StepResult, StepStatus};
pub use registry::{Step, StepAction, StepRegistry};
