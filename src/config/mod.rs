//! Configuration loading, parsing, and validation for kickoff.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Layer merging in [`merger`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use kickoff::config::{load_merged_config, validate, write_config, KickoffConfig};
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! write_config(temp.path(), &KickoffConfig::quick_setup()).unwrap();
//!
//! let config = load_merged_config(temp.path()).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.steps.len(), 6);
//! ```

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use schema::{
    ActionConfig, FailurePolicy, KickoffConfig, MenuConfig, PageConfig, PluginConfig, Settings,
    SiteConfig, StepConfig,
};

pub use loader::{
    default_config_path, load_config, load_config_file, load_config_value, load_merged_config,
    parse_config, write_config, ConfigPaths, CONFIG_DIR,
};

pub use merger::{deep_merge, merge_configs};

pub use validator::{validate, validate_config, ValidationError};
