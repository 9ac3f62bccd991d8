//! Integration tests for the steps public API.

use std::sync::Arc;

use kickoff::config::{KickoffConfig, MenuConfig, PageConfig};
use kickoff::site::MemorySite;
use kickoff::steps::{Step, StepAction, StepExecutor, StepRegistry, StepStatus};

fn page(title: &str, front_page: bool) -> PageConfig {
    PageConfig {
        title: title.to_string(),
        body: String::new(),
        front_page,
    }
}

fn pages_step() -> Step {
    Step::new(
        "pages",
        "Creating pages...",
        StepAction::CreatePages {
            pages: vec![page("Home", true), page("Contact", false)],
            menu: Some(MenuConfig {
                name: "Main Menu".to_string(),
                location: "primary".to_string(),
            }),
        },
    )
}

#[test]
fn pages_step_builds_menu_in_order() {
    let site = Arc::new(MemorySite::new());
    let executor = StepExecutor::new(site.clone());

    let result = executor.execute(&pages_step());

    assert_eq!(result.status(), StepStatus::Completed);
    assert_eq!(site.front_page_title().as_deref(), Some("Home"));
    assert_eq!(site.menu_items("Main Menu"), vec!["Home", "Contact"]);
    assert!(site.menu_location("Main Menu", "primary"));
}

#[test]
fn existing_page_is_reused() {
    let site = Arc::new(MemorySite::new().with_page("Home"));
    let executor = StepExecutor::new(site.clone());

    executor.execute(&pages_step());

    assert_eq!(site.mutation_count("create_page"), 1);
    assert_eq!(site.page_titles().len(), 2);
}

#[test]
fn second_execution_is_skipped() {
    let site = Arc::new(MemorySite::new());
    let executor = StepExecutor::new(site.clone());
    executor.execute(&pages_step());
    let before = site.mutations();

    let again = executor.execute(&pages_step());

    assert_eq!(again.status(), StepStatus::Skipped);
    assert!(again.message.starts_with("already complete"));
    assert_eq!(site.mutations(), before);
}

#[test]
fn activation_fails_for_missing_plugin() {
    let site = Arc::new(MemorySite::new().with_plugin("elementor", false));
    let executor = StepExecutor::new(site.clone());
    let step = Step::new(
        "activate",
        "Activating plugins...",
        StepAction::ActivatePlugins {
            plugins: vec!["elementor".to_string(), "pro-elements".to_string()],
        },
    );

    let result = executor.execute(&step);

    assert_eq!(result.status(), StepStatus::Failed);
    assert!(result.message.contains("pro-elements"));
    assert!(site.is_plugin_active("elementor"));
}

#[test]
fn unknown_step_name_fails() {
    let registry = StepRegistry::from_config(&KickoffConfig::quick_setup()).unwrap();
    let executor = StepExecutor::new(Arc::new(MemorySite::new()));

    let result = executor.execute_named(&registry, "does-not-exist");

    assert!(!result.success);
    assert_eq!(result.message, "unknown step");
}

#[test]
fn fingerprint_tracks_sequence_shape() {
    let registry = StepRegistry::from_config(&KickoffConfig::quick_setup()).unwrap();
    let mut reordered = KickoffConfig::quick_setup();
    reordered.steps.swap(1, 2);
    let other = StepRegistry::from_config(&reordered).unwrap();

    assert_eq!(registry.fingerprint(), registry.clone().fingerprint());
    assert_ne!(registry.fingerprint(), other.fingerprint());
}
