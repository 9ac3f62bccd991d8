//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Commands that touch a site share a
//! [`Workspace`] built once from the global flags.
//!
//! # Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success, or nothing left to do |
//! | 1 | A step failed, or an error occurred |
//! | 2 | No configuration found |
//! | 3 | Another invocation holds the run lease |

pub mod advance;
pub mod completions;
pub mod config;
pub mod dispatcher;
pub mod init;
pub mod list;
pub mod reset;
pub mod status;
pub mod step;
pub mod workspace;

pub use advance::EXIT_BUSY;
pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use workspace::Workspace;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::Workspace;
    use crate::config::{write_config, KickoffConfig};
    use crate::site::MemorySite;
    use crate::state::FileProgressStore;

    /// A temp site with the quick-setup config, state kept inside the temp dir.
    pub fn quick_setup_workspace(site: Arc<MemorySite>) -> (TempDir, Workspace) {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), &KickoffConfig::quick_setup()).unwrap();
        let workspace = Workspace::new(temp.path())
            .with_state_dir(temp.path().join("state"))
            .with_site(site);
        (temp, workspace)
    }

    pub fn store_of(workspace: &Workspace) -> FileProgressStore {
        workspace.store().unwrap()
    }
}
