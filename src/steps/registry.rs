//! The ordered step registry.
//!
//! A [`StepRegistry`] is built once from validated configuration and never
//! changes afterwards. Progress is tracked by position, so the registry also
//! produces a fingerprint that lets a resumed run detect that the sequence it
//! started with has been edited.

use crate::config::{
    validate, ActionConfig, FailurePolicy, KickoffConfig, MenuConfig, PageConfig, PluginConfig,
};
use crate::error::Result;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// What a step does, resolved from its configured action.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    /// Check the site is reachable.
    Prepare,

    /// Install a theme, then optionally activate it.
    InstallTheme {
        slug: String,
        source: String,
        activate: bool,
    },

    /// Install plugins that are not already present.
    InstallPlugins { plugins: Vec<PluginConfig> },

    /// Activate installed plugins.
    ActivatePlugins { plugins: Vec<String> },

    /// Create pages, then wire them into a menu.
    CreatePages {
        pages: Vec<PageConfig>,
        menu: Option<MenuConfig>,
    },

    /// Set site options.
    SetOptions { options: BTreeMap<String, String> },
}

impl StepAction {
    /// Short identifier of the action kind, matching the config `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            StepAction::Prepare => "prepare",
            StepAction::InstallTheme { .. } => "theme",
            StepAction::InstallPlugins { .. } => "plugins",
            StepAction::ActivatePlugins { .. } => "activate_plugins",
            StepAction::CreatePages { .. } => "pages",
            StepAction::SetOptions { .. } => "options",
        }
    }
}

impl From<&ActionConfig> for StepAction {
    fn from(action: &ActionConfig) -> Self {
        match action {
            ActionConfig::Prepare => StepAction::Prepare,
            ActionConfig::Theme {
                slug,
                source,
                activate,
            } => StepAction::InstallTheme {
                slug: slug.clone(),
                source: source.clone(),
                activate: *activate,
            },
            ActionConfig::Plugins { plugins } => StepAction::InstallPlugins {
                plugins: plugins.clone(),
            },
            ActionConfig::ActivatePlugins { plugins } => StepAction::ActivatePlugins {
                plugins: plugins.clone(),
            },
            ActionConfig::Pages { pages, menu } => StepAction::CreatePages {
                pages: pages.clone(),
                menu: menu.clone(),
            },
            ActionConfig::Options { options } => StepAction::SetOptions {
                options: options.clone(),
            },
        }
    }
}

/// A single provisioning step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Stable identifier.
    pub name: String,

    /// Progress message shown while the step runs.
    pub label: String,

    /// Per-step failure policy override.
    pub on_failure: Option<FailurePolicy>,

    /// What the step does.
    pub action: StepAction,
}

impl Step {
    /// Create a step with no failure policy override.
    pub fn new(name: &str, label: &str, action: StepAction) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            on_failure: None,
            action,
        }
    }

    /// The failure policy in effect, given the deployment default.
    pub fn failure_policy(&self, default: FailurePolicy) -> FailurePolicy {
        self.on_failure.unwrap_or(default)
    }
}

/// Ordered, immutable list of steps.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRegistry {
    steps: Vec<Step>,
}

impl StepRegistry {
    /// Build from a list of steps.
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Validate configuration and build the registry from its steps.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` if the configuration is malformed.
    pub fn from_config(config: &KickoffConfig) -> Result<Self> {
        validate(config)?;

        let steps = config
            .steps
            .iter()
            .map(|step| Step {
                name: step.name.clone(),
                label: step.label.clone(),
                on_failure: step.on_failure,
                action: StepAction::from(&step.action),
            })
            .collect();

        Ok(Self { steps })
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the registry has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`.
    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Step named `name`.
    pub fn find(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Position of the step named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.name == name)
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Iterate over steps in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// Hash of step names and action kinds, as 16 hex characters.
    ///
    /// Labels and action parameters are excluded so wording changes and
    /// extra plugins do not invalidate an in-flight run.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for step in &self.steps {
            hasher.update(step.name.as_bytes());
            hasher.update([0u8]);
            hasher.update(step.action.kind().as_bytes());
            hasher.update([b'\n']);
        }
        let digest = hasher.finalize();
        hex::encode(&digest[..8])
    }
}
