//! Integration tests for config module public API.

use kickoff::config::{
    load_config, load_merged_config, validate, validate_config, ActionConfig, FailurePolicy,
    KickoffConfig,
};
use kickoff::steps::StepRegistry;
use kickoff::KickoffError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, name: &str, content: &str) {
    let dir = root.join(".kickoff");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), content).unwrap();
}

const SITE_CONFIG: &str = r#"
app_name: Bakery
site:
  wp_cli: /usr/local/bin/wp
  path: /var/www/bakery
settings:
  on_failure: continue
steps:
  - name: prepare
    label: Preparing setup...
    action:
      kind: prepare
  - name: theme
    label: Installing theme...
    on_failure: halt
    action:
      kind: theme
      slug: astra
      source: astra
  - name: pages
    label: Creating pages...
    action:
      kind: pages
      pages:
        - title: Home
          front_page: true
        - title: Menu
      menu:
        name: Main Menu
"#;

#[test]
fn full_config_workflow() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "config.yml", SITE_CONFIG);

    let config = load_merged_config(temp.path()).unwrap();
    validate(&config).unwrap();

    assert_eq!(config.app_name.as_deref(), Some("Bakery"));
    assert_eq!(config.site.wp_cli, "/usr/local/bin/wp");
    assert_eq!(config.settings.on_failure, FailurePolicy::Continue);
    assert_eq!(config.settings.lease_ttl_secs, 300);

    let registry = StepRegistry::from_config(&config).unwrap();
    assert_eq!(registry.len(), 3);
    assert_eq!(
        registry.find("theme").unwrap().failure_policy(config.settings.on_failure),
        FailurePolicy::Halt
    );
    match &config.steps[2].action {
        ActionConfig::Pages { pages, menu } => {
            assert!(pages[0].front_page);
            assert_eq!(menu.as_ref().unwrap().location, "primary");
        }
        other => panic!("unexpected action: {:?}", other),
    }
}

#[test]
fn local_overrides_merge_on_top() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "config.yml", SITE_CONFIG);
    write(
        temp.path(),
        "config.local.yml",
        "site:\n  path: /home/dev/bakery\nsettings:\n  lease_ttl_secs: 60\n",
    );

    let config = load_merged_config(temp.path()).unwrap();

    assert_eq!(
        config.site.path.as_deref(),
        Some(Path::new("/home/dev/bakery"))
    );
    assert_eq!(config.site.wp_cli, "/usr/local/bin/wp");
    assert_eq!(config.settings.lease_ttl_secs, 60);
    assert_eq!(config.steps.len(), 3);
}

#[test]
fn override_path_skips_discovery() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "config.yml", SITE_CONFIG);
    let other = temp.path().join("other.yml");
    fs::write(
        &other,
        "steps:\n  - name: only\n    label: Only\n    action:\n      kind: prepare\n",
    )
    .unwrap();

    let config = load_config(temp.path(), Some(&other)).unwrap();

    assert_eq!(config.steps.len(), 1);
    assert!(config.app_name.is_none());
}

#[test]
fn missing_config_is_not_found() {
    let temp = TempDir::new().unwrap();
    let err = load_merged_config(temp.path()).unwrap_err();
    assert!(matches!(err, KickoffError::ConfigNotFound { .. }));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "config.yml", "steps: [\n");
    let err = load_merged_config(temp.path()).unwrap_err();
    assert!(matches!(err, KickoffError::ConfigParseError { .. }));
}

#[test]
fn validation_reports_every_problem() {
    let mut config = KickoffConfig::quick_setup();
    config.steps[1].name = "Theme".to_string();
    config.steps[2].label = String::new();
    config.settings.lease_ttl_secs = 0;

    let errors = validate_config(&config);
    let rules: Vec<&str> = errors.iter().map(|e| e.rule.as_str()).collect();

    assert!(rules.contains(&"invalid-step-name"));
    assert!(rules.contains(&"missing-label"));
    assert!(rules.contains(&"zero-lease-ttl"));
    assert!(StepRegistry::from_config(&config).is_err());
}

#[test]
fn default_config_has_no_steps() {
    let errors = validate_config(&KickoffConfig::default());
    assert!(errors.iter().any(|e| e.rule == "no-steps"));
}
