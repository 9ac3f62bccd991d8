//! Configuration file discovery and loading.
//!
//! Configuration lives next to the site being provisioned:
//!
//! 1. Site config (`.kickoff/config.yml`)
//! 2. Local overrides (`.kickoff/config.local.yml`), deep-merged on top

use crate::config::merger::merge_configs;
use crate::config::schema::KickoffConfig;
use crate::error::{KickoffError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding kickoff configuration inside a site root.
pub const CONFIG_DIR: &str = ".kickoff";

/// Paths to configuration files in merge order.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Site config: .kickoff/config.yml
    pub site: Option<PathBuf>,

    /// Local overrides: .kickoff/config.local.yml
    pub site_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given site root.
    pub fn discover(site_root: &Path) -> Self {
        Self {
            site: existing(default_config_path(site_root)),
            site_local: existing(site_root.join(CONFIG_DIR).join("config.local.yml")),
        }
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.site.iter().chain(self.site_local.iter()).collect()
    }

    /// Check if the site config exists.
    pub fn has_site_config(&self) -> bool {
        self.site.is_some()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

/// Location of the primary config file for a site root.
pub fn default_config_path(site_root: &Path) -> PathBuf {
    site_root.join(CONFIG_DIR).join("config.yml")
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<KickoffConfig> {
    let value = load_config_value(path)?;
    from_value(value, path)
}

/// Parse YAML content into a config, using `source_path` for errors.
pub fn parse_config(content: &str, source_path: &Path) -> Result<KickoffConfig> {
    serde_yaml::from_str(content).map_err(|e| KickoffError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a config file as a raw YAML value (for merging).
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            KickoffError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            KickoffError::Io(e)
        }
    })?;

    serde_yaml::from_str(&content).map_err(|e| KickoffError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn from_value(value: serde_yaml::Value, path: &Path) -> Result<KickoffConfig> {
    let value = if value.is_null() {
        serde_yaml::Value::Mapping(Default::default())
    } else {
        value
    };
    serde_yaml::from_value(value).map_err(|e| KickoffError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and merge the config layers for a site.
///
/// # Errors
///
/// Returns `ConfigNotFound` if `.kickoff/config.yml` does not exist.
pub fn load_merged_config(site_root: &Path) -> Result<KickoffConfig> {
    let paths = ConfigPaths::discover(site_root);

    if !paths.has_site_config() {
        return Err(KickoffError::ConfigNotFound {
            path: default_config_path(site_root),
        });
    }

    let mut layers = Vec::new();
    for path in paths.all_existing() {
        layers.push(load_config_value(path)?);
    }

    from_value(merge_configs(&layers), &default_config_path(site_root))
}

/// Load config with an optional path override.
///
/// If `config_override` is provided, loads only that file without merging.
pub fn load_config(site_root: &Path, config_override: Option<&Path>) -> Result<KickoffConfig> {
    match config_override {
        Some(path) => load_config_file(path),
        None => load_merged_config(site_root),
    }
}

/// Write a config to `.kickoff/config.yml`, creating the directory.
pub fn write_config(site_root: &Path, config: &KickoffConfig) -> Result<PathBuf> {
    let path = default_config_path(site_root);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let content = serde_yaml::to_string(config).map_err(|e| KickoffError::ConfigValidationError {
        message: format!("Failed to serialize config: {}", e),
    })?;
    fs::write(&path, content)?;
    Ok(path)
}
