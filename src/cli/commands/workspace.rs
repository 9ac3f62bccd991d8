//! Shared setup for commands that work on a site.
//!
//! A [`Workspace`] resolves the global flags into the pieces every command
//! needs: the config, the progress store and the site collaborator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::cli::args::Cli;
use crate::config::{load_config, FailurePolicy, KickoffConfig};
use crate::error::{KickoffError, Result};
use crate::runner::{Sequencer, SequencerOptions};
use crate::site::{Site, WpCliSite};
use crate::state::{FileProgressStore, SiteId};
use crate::steps::StepRegistry;
use crate::ui::UserInterface;

/// Site root, config location and state location for one invocation.
#[derive(Clone)]
pub struct Workspace {
    site_root: PathBuf,
    config_path: Option<PathBuf>,
    state_dir: Option<PathBuf>,
    site: Option<Arc<dyn Site>>,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("site_root", &self.site_root)
            .field("config_path", &self.config_path)
            .field("state_dir", &self.state_dir)
            .finish_non_exhaustive()
    }
}

impl Workspace {
    /// Workspace for a site root with default config and state locations.
    pub fn new(site_root: impl Into<PathBuf>) -> Self {
        Self {
            site_root: site_root.into(),
            config_path: None,
            state_dir: None,
            site: None,
        }
    }

    /// Workspace from the global CLI flags.
    pub fn from_cli(cli: &Cli, site_root: PathBuf) -> Self {
        Self {
            site_root,
            config_path: cli.config.clone(),
            state_dir: cli.state_dir.clone(),
            site: None,
        }
    }

    /// Load config from `path` instead of `.kickoff/config.yml`.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Keep progress records in `dir`.
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(dir.into());
        self
    }

    /// Drive `site` instead of WP-CLI.
    pub fn with_site(mut self, site: Arc<dyn Site>) -> Self {
        self.site = Some(site);
        self
    }

    /// The site root.
    pub fn site_root(&self) -> &Path {
        &self.site_root
    }

    /// Load the config.
    pub fn config(&self) -> Result<KickoffConfig> {
        load_config(&self.site_root, self.config_path.as_deref())
    }

    /// Load the config, reporting a missing one to the user.
    ///
    /// Returns `Ok(None)` when no config exists; callers exit with code 2.
    pub fn config_or_report(&self, ui: &mut dyn UserInterface) -> Result<Option<KickoffConfig>> {
        match self.config() {
            Ok(config) => Ok(Some(config)),
            Err(KickoffError::ConfigNotFound { .. }) => {
                ui.error("No configuration found. Run 'kickoff init' first.");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Progress store for this site.
    pub fn store(&self) -> Result<FileProgressStore> {
        match &self.state_dir {
            Some(dir) => Ok(FileProgressStore::new(dir)),
            None => {
                let id = SiteId::from_path(&self.site_root)?;
                debug!("Site {} ({}) state in default location", id.name(), id.hash());
                Ok(FileProgressStore::for_site(&id))
            }
        }
    }

    /// Site collaborator for this workspace.
    pub fn site(&self, config: &KickoffConfig) -> Arc<dyn Site> {
        match &self.site {
            Some(site) => Arc::clone(site),
            None => Arc::new(WpCliSite::from_config(&config.site, &self.site_root)),
        }
    }

    /// Build a sequencer from a loaded config.
    pub fn sequencer(
        &self,
        config: &KickoffConfig,
        policy: Option<FailurePolicy>,
    ) -> Result<Sequencer> {
        let registry = StepRegistry::from_config(config)?;
        let mut options = SequencerOptions::from_settings(&config.settings);
        if let Some(policy) = policy {
            options.failure_policy = policy;
        }
        Ok(Sequencer::new(
            registry,
            self.site(config),
            Arc::new(self.store()?),
            options,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::write_config;
    use crate::site::MemorySite;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    #[test]
    fn missing_config_is_reported() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path());
        let mut ui = MockUI::new();

        let config = workspace.config_or_report(&mut ui).unwrap();

        assert!(config.is_none());
        assert!(ui.has_error("kickoff init"));
    }

    #[test]
    fn state_dir_override_is_used() {
        let temp = TempDir::new().unwrap();
        let state = temp.path().join("state");
        let workspace = Workspace::new(temp.path()).with_state_dir(&state);

        assert_eq!(workspace.store().unwrap().dir(), state.as_path());
    }

    #[test]
    fn default_store_is_keyed_by_site() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path());
        let id = SiteId::from_path(temp.path()).unwrap();

        let store = workspace.store().unwrap();
        assert!(store.dir().ends_with(id.hash()));
    }

    #[test]
    fn sequencer_applies_policy_override() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), &KickoffConfig::quick_setup()).unwrap();
        let workspace = Workspace::new(temp.path())
            .with_state_dir(temp.path().join("state"))
            .with_site(Arc::new(MemorySite::new()));

        let config = workspace.config().unwrap();
        let sequencer = workspace
            .sequencer(&config, Some(FailurePolicy::Continue))
            .unwrap();

        assert_eq!(sequencer.options().failure_policy, FailurePolicy::Continue);
        assert_eq!(sequencer.registry().len(), 6);
        assert!(sequencer.store().load().unwrap().is_fresh());
    }
}
