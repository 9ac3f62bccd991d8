//! Configuration validation rules.
//!
//! A malformed step list is a programming error, not a runtime condition,
//! so everything here is checked before a registry is built:
//! - At least one step, each with a unique, well-formed name and a label
//! - Theme, plugin and page actions carry the data they need
//! - At most one front page per pages step
//! - The lease TTL is non-zero

use crate::config::schema::{ActionConfig, KickoffConfig, StepConfig};
use crate::error::{KickoffError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static STEP_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_-]*$").unwrap());

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Step name if error is step-specific
    pub step: Option<String>,
}

impl ValidationError {
    fn new(rule: &str, message: String, step: Option<&str>) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            step: step.map(String::from),
        }
    }
}

/// Validate a configuration and return all errors.
///
/// Collects every problem rather than stopping at the first one.
pub fn validate_config(config: &KickoffConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.steps.is_empty() {
        errors.push(ValidationError::new(
            "no-steps",
            "Configuration defines no steps".to_string(),
            None,
        ));
    }

    if config.settings.lease_ttl_secs == 0 {
        errors.push(ValidationError::new(
            "zero-lease-ttl",
            "settings.lease_ttl_secs must be greater than zero".to_string(),
            None,
        ));
    }

    let mut seen = HashSet::new();
    for step in &config.steps {
        if !seen.insert(step.name.as_str()) {
            errors.push(ValidationError::new(
                "duplicate-step",
                format!("Step '{}' is defined more than once", step.name),
                Some(&step.name),
            ));
        }
        errors.extend(validate_step(step));
    }

    errors
}

fn validate_step(step: &StepConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let name = step.name.as_str();

    if !STEP_NAME.is_match(name) {
        errors.push(ValidationError::new(
            "invalid-step-name",
            format!(
                "Step name '{}' must start with a lowercase letter and contain only a-z, 0-9, '_' or '-'",
                name
            ),
            Some(name),
        ));
    }

    if step.label.trim().is_empty() {
        errors.push(ValidationError::new(
            "missing-label",
            format!("Step '{}' has an empty label", name),
            Some(name),
        ));
    }

    match &step.action {
        ActionConfig::Prepare => {}
        ActionConfig::Theme { slug, source, .. } => {
            if slug.trim().is_empty() || source.trim().is_empty() {
                errors.push(ValidationError::new(
                    "incomplete-theme",
                    format!("Step '{}' needs both a theme slug and a source", name),
                    Some(name),
                ));
            }
        }
        ActionConfig::Plugins { plugins } => {
            if plugins.is_empty() {
                errors.push(empty_list(name, "plugins"));
            }
            for plugin in plugins {
                if plugin.slug.trim().is_empty() || plugin.source.trim().is_empty() {
                    errors.push(ValidationError::new(
                        "incomplete-plugin",
                        format!("Step '{}' lists a plugin without a slug or source", name),
                        Some(name),
                    ));
                }
            }
        }
        ActionConfig::ActivatePlugins { plugins } => {
            if plugins.is_empty() {
                errors.push(empty_list(name, "plugins"));
            }
        }
        ActionConfig::Pages { pages, menu } => {
            if pages.is_empty() {
                errors.push(empty_list(name, "pages"));
            }
            let mut titles = HashSet::new();
            for page in pages {
                if page.title.trim().is_empty() {
                    errors.push(ValidationError::new(
                        "empty-page-title",
                        format!("Step '{}' has a page without a title", name),
                        Some(name),
                    ));
                } else if !titles.insert(page.title.as_str()) {
                    errors.push(ValidationError::new(
                        "duplicate-page",
                        format!("Step '{}' lists page '{}' twice", name, page.title),
                        Some(name),
                    ));
                }
            }
            if pages.iter().filter(|p| p.front_page).count() > 1 {
                errors.push(ValidationError::new(
                    "multiple-front-pages",
                    format!("Step '{}' marks more than one front page", name),
                    Some(name),
                ));
            }
            if let Some(menu) = menu {
                if menu.name.trim().is_empty() {
                    errors.push(ValidationError::new(
                        "empty-menu-name",
                        format!("Step '{}' has a menu without a name", name),
                        Some(name),
                    ));
                }
            }
        }
        ActionConfig::Options { options } => {
            if options.is_empty() {
                errors.push(empty_list(name, "options"));
            }
        }
    }

    errors
}

fn empty_list(step: &str, field: &str) -> ValidationError {
    ValidationError::new(
        "empty-list",
        format!("Step '{}' has an empty '{}' list", step, field),
        Some(step),
    )
}

/// Validate and return Result (for convenience).
///
/// # Errors
///
/// Returns `ConfigValidationError` if any validation rules fail.
pub fn validate(config: &KickoffConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(KickoffError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
