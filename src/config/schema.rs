//! Configuration schema definitions for kickoff.
//!
//! This module contains all the struct definitions that map to
//! the YAML configuration file format.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure for `.kickoff/config.yml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct KickoffConfig {
    /// Site name (for display purposes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// How to reach the site being provisioned
    pub site: SiteConfig,

    /// Global settings
    pub settings: Settings,

    /// Provisioning steps, in execution order
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

/// Connection details for the WP-CLI collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SiteConfig {
    /// WP-CLI executable
    pub wp_cli: String,

    /// WordPress root passed as `--path` (defaults to the site root)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Extra arguments appended to every WP-CLI invocation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            wp_cli: default_wp_cli(),
            path: None,
            extra_args: Vec::new(),
        }
    }
}

fn default_wp_cli() -> String {
    "wp".to_string()
}

/// Global settings that apply to every step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Settings {
    /// How long a run lease stays valid, in seconds
    #[serde(
        default = "default_lease_ttl_secs",
        skip_serializing_if = "is_default_lease_ttl"
    )]
    pub lease_ttl_secs: u64,

    /// What to do after a failed step when running to completion
    #[serde(default)]
    pub on_failure: FailurePolicy,

    /// Number of journal entries to keep
    #[serde(
        default = "default_history_retention",
        skip_serializing_if = "is_default_history_retention"
    )]
    pub history_retention: usize,

    /// Site option set once provisioning completes
    #[serde(default = "default_completion_option")]
    pub completion_option: String,

    /// Plugin slug to deactivate and delete once provisioning completes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_uninstall: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lease_ttl_secs: default_lease_ttl_secs(),
            on_failure: FailurePolicy::default(),
            history_retention: default_history_retention(),
            completion_option: default_completion_option(),
            self_uninstall: None,
        }
    }
}

fn default_lease_ttl_secs() -> u64 {
    300
}

fn is_default_lease_ttl(v: &u64) -> bool {
    *v == default_lease_ttl_secs()
}

fn default_history_retention() -> usize {
    50
}

fn is_default_history_retention(v: &usize) -> bool {
    *v == default_history_retention()
}

fn default_completion_option() -> String {
    "kickoff_completed".to_string()
}

fn default_true() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

fn is_false(v: &bool) -> bool {
    !v
}

/// Whether a run-to-completion pass keeps going after a failed step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failure.
    #[default]
    Halt,
    /// Attempt the remaining steps anyway.
    Continue,
}

/// Configuration for a single provisioning step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepConfig {
    /// Stable identifier; progress is tracked by position, so keep order stable
    pub name: String,

    /// Human-readable progress message
    pub label: String,

    /// Override of `settings.on_failure` for this step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<FailurePolicy>,

    /// What the step does
    pub action: ActionConfig,
}

/// The work a step performs against the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionConfig {
    /// Verify the site is reachable and installed.
    Prepare,

    /// Install (and optionally activate) a theme.
    Theme {
        /// Theme slug, e.g. `hello-elementor`
        slug: String,
        /// Download location or directory slug
        source: String,
        /// Switch to the theme once installed
        #[serde(default = "default_true", skip_serializing_if = "is_true")]
        activate: bool,
    },

    /// Install a set of plugins.
    Plugins {
        /// Plugins to install
        plugins: Vec<PluginConfig>,
    },

    /// Activate already-installed plugins.
    ActivatePlugins {
        /// Plugin slugs to activate
        plugins: Vec<String>,
    },

    /// Create pages and, optionally, a navigation menu linking them.
    Pages {
        /// Pages to create, in menu order
        pages: Vec<PageConfig>,
        /// Menu to create and assign
        #[serde(default, skip_serializing_if = "Option::is_none")]
        menu: Option<MenuConfig>,
    },

    /// Set site options.
    Options {
        /// Option names and desired values
        options: BTreeMap<String, String>,
    },
}

impl ActionConfig {
    /// Short identifier of the action kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ActionConfig::Prepare => "prepare",
            ActionConfig::Theme { .. } => "theme",
            ActionConfig::Plugins { .. } => "plugins",
            ActionConfig::ActivatePlugins { .. } => "activate_plugins",
            ActionConfig::Pages { .. } => "pages",
            ActionConfig::Options { .. } => "options",
        }
    }
}

/// A plugin to install.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PluginConfig {
    /// Plugin slug (directory name once installed)
    pub slug: String,
    /// Download location or directory slug
    pub source: String,
}

/// A page to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PageConfig {
    /// Page title; pages are matched by title
    pub title: String,

    /// Page content
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,

    /// Use this page as the static front page
    #[serde(default, skip_serializing_if = "is_false")]
    pub front_page: bool,
}

/// Navigation menu wiring for created pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MenuConfig {
    /// Menu name; an existing menu with this name means the step is done
    pub name: String,

    /// Theme menu location to assign the menu to
    #[serde(default = "default_menu_location")]
    pub location: String,
}

fn default_menu_location() -> String {
    "primary".to_string()
}

impl KickoffConfig {
    /// The stock WordPress quick-setup sequence written by `kickoff init`.
    pub fn quick_setup() -> Self {
        let plugin = |slug: &str, source: &str| PluginConfig {
            slug: slug.to_string(),
            source: source.to_string(),
        };
        let page = |title: &str, front_page: bool| PageConfig {
            title: title.to_string(),
            body: String::new(),
            front_page,
        };

        let mut onboarding = BTreeMap::new();
        onboarding.insert("elementor_onboarded".to_string(), "1".to_string());

        Self {
            app_name: Some("WordPress Quick Setup".to_string()),
            site: SiteConfig::default(),
            settings: Settings::default(),
            steps: vec![
                StepConfig {
                    name: "prepare".to_string(),
                    label: "Preparing setup...".to_string(),
                    on_failure: None,
                    action: ActionConfig::Prepare,
                },
                StepConfig {
                    name: "theme".to_string(),
                    label: "Installing Hello Elementor theme...".to_string(),
                    on_failure: Some(FailurePolicy::Continue),
                    action: ActionConfig::Theme {
                        slug: "hello-elementor".to_string(),
                        source: "https://downloads.wordpress.org/theme/hello-elementor.latest-stable.zip"
                            .to_string(),
                        activate: true,
                    },
                },
                StepConfig {
                    name: "plugins".to_string(),
                    label: "Installing plugins...".to_string(),
                    on_failure: None,
                    action: ActionConfig::Plugins {
                        plugins: vec![
                            plugin(
                                "elementor",
                                "https://downloads.wordpress.org/plugin/elementor.latest-stable.zip",
                            ),
                            plugin(
                                "envato-elements",
                                "https://downloads.wordpress.org/plugin/envato-elements.latest-stable.zip",
                            ),
                            plugin(
                                "pro-elements",
                                "https://github.com/proelements/proelements/releases/latest/download/pro-elements.zip",
                            ),
                        ],
                    },
                },
                StepConfig {
                    name: "activate_plugins".to_string(),
                    label: "Activating plugins...".to_string(),
                    on_failure: None,
                    action: ActionConfig::ActivatePlugins {
                        plugins: vec![
                            "elementor".to_string(),
                            "envato-elements".to_string(),
                            "pro-elements".to_string(),
                        ],
                    },
                },
                StepConfig {
                    name: "pages".to_string(),
                    label: "Creating pages and menu...".to_string(),
                    on_failure: None,
                    action: ActionConfig::Pages {
                        pages: vec![
                            page("Home", true),
                            page("About Us", false),
                            page("Our Services", false),
                            page("Contact Us", false),
                        ],
                        menu: Some(MenuConfig {
                            name: "Main Menu".to_string(),
                            location: default_menu_location(),
                        }),
                    },
                },
                StepConfig {
                    name: "cleanup".to_string(),
                    label: "Finishing setup...".to_string(),
                    on_failure: None,
                    action: ActionConfig::Options {
                        options: onboarding,
                    },
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let yaml = r#"
steps:
  - name: prepare
    label: Preparing
    action:
      kind: prepare
"#;
        let config: KickoffConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.steps.len(), 1);
        assert_eq!(config.steps[0].action, ActionConfig::Prepare);
        assert_eq!(config.site.wp_cli, "wp");
        assert_eq!(config.settings.lease_ttl_secs, 300);
        assert_eq!(config.settings.on_failure, FailurePolicy::Halt);
    }

    #[test]
    fn parses_theme_action_with_default_activate() {
        let yaml = r#"
name: theme
label: Installing theme
action:
  kind: theme
  slug: hello-elementor
  source: hello-elementor
"#;
        let step: StepConfig = serde_yaml::from_str(yaml).unwrap();
        match step.action {
            ActionConfig::Theme { slug, activate, .. } => {
                assert_eq!(slug, "hello-elementor");
                assert!(activate);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn parses_pages_with_menu_location_default() {
        let yaml = r#"
name: pages
label: Pages
action:
  kind: pages
  pages:
    - title: Home
      front_page: true
    - title: About
  menu:
    name: Main Menu
"#;
        let step: StepConfig = serde_yaml::from_str(yaml).unwrap();
        match step.action {
            ActionConfig::Pages { pages, menu } => {
                assert_eq!(pages.len(), 2);
                assert!(pages[0].front_page);
                assert!(pages[1].body.is_empty());
                assert_eq!(menu.unwrap().location, "primary");
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_action_kind() {
        let yaml = r#"
name: mystery
label: ???
action:
  kind: summon_demons
"#;
        assert!(serde_yaml::from_str::<StepConfig>(yaml).is_err());
    }

    #[test]
    fn step_on_failure_override_parses() {
        let yaml = r#"
name: theme
label: Theme
on_failure: continue
action:
  kind: prepare
"#;
        let step: StepConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(step.on_failure, Some(FailurePolicy::Continue));
    }

    #[test]
    fn quick_setup_has_stock_sequence() {
        let config = KickoffConfig::quick_setup();
        let names: Vec<_> = config.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "prepare",
                "theme",
                "plugins",
                "activate_plugins",
                "pages",
                "cleanup"
            ]
        );
    }

    #[test]
    fn quick_setup_survives_yaml_round_trip() {
        let config = KickoffConfig::quick_setup();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: KickoffConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn action_kind_names() {
        assert_eq!(ActionConfig::Prepare.kind(), "prepare");
        assert_eq!(
            ActionConfig::ActivatePlugins { plugins: vec![] }.kind(),
            "activate_plugins"
        );
    }
}
