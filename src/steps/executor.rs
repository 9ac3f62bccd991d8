//! Step execution engine.
//!
//! Runs one step's action against a [`Site`]. Every mutating call is
//! preceded by a read that checks whether the work is already done, so a
//! step can be executed any number of times without creating duplicates.
//! Collaborator failures never escape as errors; they become a failed
//! [`StepResult`] the sequencer can retry.

use crate::site::{PageHandle, Site, SiteError, SiteResult};
use crate::steps::registry::{Step, StepAction, StepRegistry};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::{MenuConfig, PageConfig, PluginConfig};

/// Status of an executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The step changed the site.
    Completed,

    /// Everything the step does was already in place.
    Skipped,

    /// The step failed.
    Failed,
}

impl StepStatus {
    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Completed => '✓',
            StepStatus::Skipped => '⊘',
            StepStatus::Failed => '✗',
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Completed => "completed",
            StepStatus::Skipped => "skipped",
            StepStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Result of executing a step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Step name.
    pub name: String,

    /// Step label.
    pub label: String,

    /// Whether the step succeeded.
    pub success: bool,

    /// What happened, or why it failed.
    pub message: String,

    /// Whether all of the step's work was already done.
    pub skipped: bool,

    /// Execution duration.
    pub duration: Duration,
}

impl StepResult {
    /// Create a failure result.
    pub fn failure(name: &str, label: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            success: false,
            message: message.into(),
            skipped: false,
            duration: Duration::ZERO,
        }
    }

    /// Get the status of this result.
    pub fn status(&self) -> StepStatus {
        if !self.success {
            StepStatus::Failed
        } else if self.skipped {
            StepStatus::Skipped
        } else {
            StepStatus::Completed
        }
    }

    /// Generate a summary line for display.
    pub fn summary_line(&self) -> String {
        let status = self.status();
        match status {
            StepStatus::Completed => format!(
                "{} {} ({})",
                status.display_char(),
                self.name,
                format_duration(self.duration)
            ),
            StepStatus::Skipped => format!("{} {} (already complete)", status.display_char(), self.name),
            StepStatus::Failed => format!("{} {} - {}", status.display_char(), self.name, self.message),
        }
    }
}

/// Format a duration compactly (`120ms`, `2.5s`, `1m 4s`).
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{}s", secs, millis / 100)
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Normalized result of one collaborator operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorOutcome {
    /// Whether the operation succeeded.
    pub ok: bool,

    /// Whether the operation changed the site.
    pub changed: bool,

    /// Short description of what happened.
    pub detail: String,
}

impl CollaboratorOutcome {
    /// The site was changed.
    pub fn done(detail: impl Into<String>) -> Self {
        Self {
            ok: true,
            changed: true,
            detail: detail.into(),
        }
    }

    /// The work was already in place.
    pub fn unchanged(detail: impl Into<String>) -> Self {
        Self {
            ok: true,
            changed: false,
            detail: detail.into(),
        }
    }

    /// The operation failed.
    pub fn failed(what: &str, error: &SiteError) -> Self {
        Self {
            ok: false,
            changed: false,
            detail: format!("{}: {}", what, error),
        }
    }
}

/// Collects collaborator outcomes while a step runs.
#[derive(Debug, Default)]
struct Outcomes(Vec<CollaboratorOutcome>);

impl Outcomes {
    /// Keep the value of a read, recording a failure if it errored.
    fn check<T>(&mut self, what: &str, result: SiteResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{} failed: {}", what, e);
                self.0.push(CollaboratorOutcome::failed(what, &e));
                None
            }
        }
    }

    /// Record the result of a mutation.
    fn apply<T>(&mut self, what: &str, result: SiteResult<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.0.push(CollaboratorOutcome::done(what));
                Some(value)
            }
            Err(e) => {
                warn!("{} failed: {}", what, e);
                self.0.push(CollaboratorOutcome::failed(what, &e));
                None
            }
        }
    }

    fn unchanged(&mut self, detail: impl Into<String>) {
        let detail = detail.into();
        debug!("{}", detail);
        self.0.push(CollaboratorOutcome::unchanged(detail));
    }

    fn into_result(self, step: &Step, duration: Duration) -> StepResult {
        let failures: Vec<_> = self.0.iter().filter(|o| !o.ok).map(|o| o.detail.as_str()).collect();
        let changes: Vec<_> = self
            .0
            .iter()
            .filter(|o| o.ok && o.changed)
            .map(|o| o.detail.as_str())
            .collect();

        let (success, skipped, message) = if !failures.is_empty() {
            (false, false, failures.join("; "))
        } else if changes.is_empty() {
            let detail = self
                .0
                .iter()
                .map(|o| o.detail.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let message = if detail.is_empty() {
                "already complete".to_string()
            } else {
                format!("already complete ({})", detail)
            };
            (true, true, message)
        } else {
            (true, false, changes.join(", "))
        };

        StepResult {
            name: step.name.clone(),
            label: step.label.clone(),
            success,
            message,
            skipped,
            duration,
        }
    }
}

/// Executes steps against a site.
#[derive(Clone)]
pub struct StepExecutor {
    site: Arc<dyn Site>,
}

impl fmt::Debug for StepExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepExecutor").finish_non_exhaustive()
    }
}

impl StepExecutor {
    /// Create an executor for `site`.
    pub fn new(site: Arc<dyn Site>) -> Self {
        Self { site }
    }

    /// Execute a step's action.
    pub fn execute(&self, step: &Step) -> StepResult {
        info!("Running step '{}'", step.name);
        let start = Instant::now();
        let mut outcomes = Outcomes::default();

        match &step.action {
            StepAction::Prepare => self.prepare(&mut outcomes),
            StepAction::InstallTheme {
                slug,
                source,
                activate,
            } => self.install_theme(slug, source, *activate, &mut outcomes),
            StepAction::InstallPlugins { plugins } => self.install_plugins(plugins, &mut outcomes),
            StepAction::ActivatePlugins { plugins } => {
                self.activate_plugins(plugins, &mut outcomes)
            }
            StepAction::CreatePages { pages, menu } => {
                self.create_pages(pages, menu.as_ref(), &mut outcomes)
            }
            StepAction::SetOptions { options } => self.set_options(options, &mut outcomes),
        }

        let result = outcomes.into_result(step, start.elapsed());
        if result.success {
            info!("Step '{}' {}: {}", step.name, result.status(), result.message);
        } else {
            warn!("Step '{}' failed: {}", step.name, result.message);
        }
        result
    }

    /// Execute the step named `name`, wherever it sits in the sequence.
    ///
    /// An unknown name yields a failed result with the message `unknown step`.
    pub fn execute_named(&self, registry: &StepRegistry, name: &str) -> StepResult {
        match registry.find(name) {
            Some(step) => self.execute(step),
            None => {
                warn!("Unknown step '{}'", name);
                StepResult::failure(name, name, "unknown step")
            }
        }
    }

    fn prepare(&self, outcomes: &mut Outcomes) {
        outcomes.apply("site is reachable", self.site.prepare());
    }

    fn install_theme(&self, slug: &str, source: &str, activate: bool, outcomes: &mut Outcomes) {
        let Some(exists) = outcomes.check(&format!("check theme {}", slug), self.site.theme_exists(slug))
        else {
            return;
        };

        if exists {
            outcomes.unchanged(format!("theme {} installed", slug));
        } else if outcomes
            .apply(
                &format!("installed theme {}", slug),
                self.site.install_theme(slug, source),
            )
            .is_none()
        {
            return;
        }

        if !activate {
            return;
        }

        let Some(active) = outcomes.check("read active theme", self.site.active_theme()) else {
            return;
        };
        if active.as_deref() == Some(slug) {
            outcomes.unchanged(format!("theme {} active", slug));
        } else {
            outcomes.apply(
                &format!("activated theme {}", slug),
                self.site.activate_theme(slug),
            );
        }
    }

    fn install_plugins(&self, plugins: &[PluginConfig], outcomes: &mut Outcomes) {
        for plugin in plugins {
            let slug = plugin.slug.as_str();
            match outcomes.check(
                &format!("check plugin {}", slug),
                self.site.plugin_exists(slug),
            ) {
                Some(true) => outcomes.unchanged(format!("plugin {} installed", slug)),
                Some(false) => {
                    outcomes.apply(
                        &format!("installed plugin {}", slug),
                        self.site.install_plugin(slug, &plugin.source),
                    );
                }
                None => {}
            }
        }
    }

    fn activate_plugins(&self, plugins: &[String], outcomes: &mut Outcomes) {
        for slug in plugins {
            let Some(installed) = outcomes.check(
                &format!("check plugin {}", slug),
                self.site.plugin_exists(slug),
            ) else {
                continue;
            };
            if !installed {
                outcomes.0.push(CollaboratorOutcome::failed(
                    &format!("activate plugin {}", slug),
                    &SiteError::failed("activate_plugin", "plugin is not installed"),
                ));
                continue;
            }

            match outcomes.check(
                &format!("check plugin {} status", slug),
                self.site.plugin_active(slug),
            ) {
                Some(true) => outcomes.unchanged(format!("plugin {} active", slug)),
                Some(false) => {
                    outcomes.apply(
                        &format!("activated plugin {}", slug),
                        self.site.activate_plugin(slug),
                    );
                }
                None => {}
            }
        }
    }

    fn create_pages(&self, pages: &[PageConfig], menu: Option<&MenuConfig>, outcomes: &mut Outcomes) {
        if let Some(menu) = menu {
            let Some(existing) = outcomes.check(
                &format!("look up menu {}", menu.name),
                self.site.find_menu(&menu.name),
            ) else {
                return;
            };
            if existing.is_some() {
                warn!(
                    "Menu '{}' already exists; assuming pages are in place without checking them",
                    menu.name
                );
                outcomes.unchanged(format!("menu {} exists", menu.name));
                return;
            }
        }

        let mut handles: Vec<PageHandle> = Vec::with_capacity(pages.len());
        for page in pages {
            let title = page.title.as_str();
            let Some(found) = outcomes.check(
                &format!("look up page {}", title),
                self.site.find_page(title),
            ) else {
                return;
            };

            let handle = match found {
                Some(handle) => {
                    outcomes.unchanged(format!("page {} exists", title));
                    handle
                }
                None => match outcomes.apply(
                    &format!("created page {}", title),
                    self.site.create_page(title, &page.body),
                ) {
                    Some(handle) => handle,
                    None => return,
                },
            };

            if page.front_page {
                let Some(current) =
                    outcomes.check("read front page", self.site.front_page())
                else {
                    return;
                };
                if current == Some(handle) {
                    outcomes.unchanged(format!("front page is {}", title));
                } else if outcomes
                    .apply(
                        &format!("set front page to {}", title),
                        self.site.set_front_page(handle),
                    )
                    .is_none()
                {
                    return;
                }
            }
            handles.push(handle);
        }

        let Some(menu) = menu else {
            return;
        };
        let Some(menu_handle) = outcomes.apply(
            &format!("created menu {}", menu.name),
            self.site.create_menu(&menu.name),
        ) else {
            return;
        };

        for (page, handle) in pages.iter().zip(&handles) {
            if outcomes
                .apply(
                    &format!("added {} to {}", page.title, menu.name),
                    self.site.add_menu_item(menu_handle, *handle),
                )
                .is_none()
            {
                return;
            }
        }

        outcomes.apply(
            &format!("assigned {} to {}", menu.name, menu.location),
            self.site.set_menu_location(menu_handle, &menu.location),
        );
    }

    fn set_options(&self, options: &BTreeMap<String, String>, outcomes: &mut Outcomes) {
        for (key, desired) in options {
            let Some(current) = outcomes.check(
                &format!("read option {}", key),
                self.site.option_value(key),
            ) else {
                continue;
            };
            if current.as_deref() == Some(desired.as_str()) {
                outcomes.unchanged(format!("option {} set", key));
            } else {
                outcomes.apply(
                    &format!("set option {}", key),
                    self.site.update_option(key, desired),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KickoffConfig;
    use crate::site::MemorySite;

    fn registry() -> StepRegistry {
        StepRegistry::from_config(&KickoffConfig::quick_setup()).unwrap()
    }

    fn run(site: &Arc<MemorySite>, name: &str) -> StepResult {
        let executor = StepExecutor::new(site.clone());
        executor.execute_named(&registry(), name)
    }

    #[test]
    fn prepare_checks_reachability() {
        let site = Arc::new(MemorySite::new());
        assert!(run(&site, "prepare").success);

        let down = Arc::new(MemorySite::new().unreachable());
        let result = run(&down, "prepare");
        assert!(!result.success);
        assert!(result.message.contains("not installed"));
    }

    #[test]
    fn theme_installs_and_activates() {
        let site = Arc::new(MemorySite::new().with_theme("twentytwentyfour", true));
        let result = run(&site, "theme");

        assert!(result.success);
        assert!(!result.skipped);
        assert_eq!(
            site.mutations(),
            vec![
                "install_theme:hello-elementor",
                "activate_theme:hello-elementor"
            ]
        );
    }

    #[test]
    fn theme_already_active_is_skipped() {
        let site = Arc::new(MemorySite::new().with_theme("hello-elementor", true));
        let result = run(&site, "theme");

        assert!(result.success);
        assert!(result.skipped);
        assert!(site.mutations().is_empty());
    }

    #[test]
    fn installed_but_inactive_theme_is_only_activated() {
        let site = Arc::new(MemorySite::new().with_theme("hello-elementor", false));
        run(&site, "theme");
        assert_eq!(site.mutations(), vec!["activate_theme:hello-elementor"]);
    }

    #[test]
    fn plugin_failure_lists_failed_slug_and_keeps_others() {
        let site = Arc::new(MemorySite::new());
        site.fail_on("install_plugin:envato-elements");

        let result = run(&site, "plugins");
        assert!(!result.success);
        assert!(result.message.contains("envato-elements"));
        assert!(!result.message.contains("pro-elements"));
        assert!(site.plugin_exists("elementor").unwrap());
        assert!(site.plugin_exists("pro-elements").unwrap());

        site.clear_failures();
        let retry = run(&site, "plugins");
        assert!(retry.success);
        // Only the plugin that failed is installed on retry.
        assert_eq!(site.mutation_count("install_plugin"), 3);
    }

    #[test]
    fn activating_missing_plugin_fails() {
        let site = Arc::new(
            MemorySite::new()
                .with_plugin("elementor", true)
                .with_plugin("envato-elements", false),
        );
        let result = run(&site, "activate_plugins");

        assert!(!result.success);
        assert!(result.message.contains("pro-elements"));
        assert_eq!(site.mutations(), vec!["activate_plugin:envato-elements"]);
    }

    #[test]
    fn pages_create_front_page_and_menu() {
        let site = Arc::new(MemorySite::new().with_page("About Us"));
        let result = run(&site, "pages");

        assert!(result.success, "{}", result.message);
        assert_eq!(site.mutation_count("create_page"), 3);
        assert_eq!(site.front_page_title().as_deref(), Some("Home"));
        assert_eq!(
            site.menu_items("Main Menu"),
            vec!["Home", "About Us", "Our Services", "Contact Us"]
        );
        assert!(site.menu_location("Main Menu", "primary"));
    }

    #[test]
    fn existing_menu_short_circuits_pages() {
        let site = Arc::new(MemorySite::new().with_menu("Main Menu"));
        let result = run(&site, "pages");

        assert!(result.success);
        assert!(result.skipped);
        assert!(site.mutations().is_empty());
        assert!(site.page_titles().is_empty());
    }

    #[test]
    fn pages_without_menu_rerun_as_skipped() {
        let page = |title: &str, front_page: bool| PageConfig {
            title: title.to_string(),
            body: String::new(),
            front_page,
        };
        let step = Step::new(
            "pages",
            "Creating pages...",
            StepAction::CreatePages {
                pages: vec![page("Home", true), page("Contact Us", false)],
                menu: None,
            },
        );
        let site = Arc::new(MemorySite::new());
        let executor = StepExecutor::new(site.clone());

        let first = executor.execute(&step);
        assert!(first.success);
        assert!(!first.skipped);
        assert_eq!(site.mutation_count("set_front_page"), 1);
        let mutations = site.mutations().len();

        let second = executor.execute(&step);
        assert!(second.success);
        assert!(second.skipped);
        assert_eq!(site.mutations().len(), mutations);
        assert_eq!(site.front_page_title().as_deref(), Some("Home"));
    }

    #[test]
    fn pages_stop_at_first_failure() {
        let site = Arc::new(MemorySite::new());
        site.fail_on("create_menu");
        let result = run(&site, "pages");

        assert!(!result.success);
        assert_eq!(site.mutation_count("add_menu_item"), 0);
    }

    #[test]
    fn options_only_written_when_different() {
        let site = Arc::new(MemorySite::new().with_option("elementor_onboarded", "1"));
        let result = run(&site, "cleanup");
        assert!(result.skipped);
        assert!(site.mutations().is_empty());

        let fresh = Arc::new(MemorySite::new());
        let result = run(&fresh, "cleanup");
        assert!(!result.skipped);
        assert_eq!(fresh.option("elementor_onboarded").as_deref(), Some("1"));
    }

    #[test]
    fn unknown_step_fails_without_panicking() {
        let site = Arc::new(MemorySite::new());
        let result = run(&site, "summon_demons");

        assert!(!result.success);
        assert_eq!(result.message, "unknown step");
        assert!(site.calls().is_empty());
    }

    #[test]
    fn summary_lines() {
        let failed = StepResult::failure("plugins", "Installing plugins...", "boom");
        assert_eq!(failed.summary_line(), "✗ plugins - boom");

        let skipped = StepResult {
            success: true,
            skipped: true,
            ..failed.clone()
        };
        assert_eq!(skipped.summary_line(), "⊘ plugins (already complete)");
    }

    #[test]
    fn format_duration_ranges() {
        assert_eq!(format_duration(Duration::from_millis(120)), "120ms");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(64)), "1m 4s");
    }
}
