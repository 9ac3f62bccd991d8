//! In-memory site.
//!
//! `MemorySite` models themes, plugins, pages, menus and options in a
//! mutex-guarded struct. Every mutating call is appended to a log so tests
//! can assert that nothing was created twice, and individual operations can
//! be made to fail.

use super::{MenuHandle, PageHandle, Site, SiteError, SiteResult};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

type Hook = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Default)]
struct SiteState {
    reachable: bool,
    themes: BTreeSet<String>,
    active_theme: Option<String>,
    plugins: BTreeMap<String, bool>,
    pages: BTreeMap<u64, String>,
    front_page: Option<u64>,
    menus: BTreeMap<u64, MenuState>,
    options: BTreeMap<String, String>,
    next_id: u64,
    failures: HashSet<String>,
    mutations: Vec<String>,
    calls: Vec<String>,
}

#[derive(Debug, Default)]
struct MenuState {
    name: String,
    items: Vec<u64>,
    locations: BTreeSet<String>,
}

impl SiteState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A fully in-memory [`Site`].
pub struct MemorySite {
    state: Mutex<SiteState>,
    hook: Option<Hook>,
}

impl Default for MemorySite {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemorySite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySite").finish_non_exhaustive()
    }
}

impl MemorySite {
    /// Create an empty, reachable site.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SiteState {
                reachable: true,
                ..Default::default()
            }),
            hook: None,
        }
    }

    /// Mark a theme as installed.
    pub fn with_theme(self, slug: &str, active: bool) -> Self {
        {
            let mut state = self.lock();
            state.themes.insert(slug.to_string());
            if active {
                state.active_theme = Some(slug.to_string());
            }
        }
        self
    }

    /// Mark a plugin as installed.
    pub fn with_plugin(self, slug: &str, active: bool) -> Self {
        self.lock().plugins.insert(slug.to_string(), active);
        self
    }

    /// Add an existing page.
    pub fn with_page(self, title: &str) -> Self {
        {
            let mut state = self.lock();
            let id = state.allocate_id();
            state.pages.insert(id, title.to_string());
        }
        self
    }

    /// Add an existing, empty menu.
    pub fn with_menu(self, name: &str) -> Self {
        {
            let mut state = self.lock();
            let id = state.allocate_id();
            state.menus.insert(
                id,
                MenuState {
                    name: name.to_string(),
                    ..Default::default()
                },
            );
        }
        self
    }

    /// Set an option value.
    pub fn with_option(self, key: &str, value: &str) -> Self {
        self.lock()
            .options
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Make the site unreachable, so `prepare` fails.
    pub fn unreachable(self) -> Self {
        self.lock().reachable = false;
        self
    }

    /// Install a callback invoked with the operation key before every call.
    ///
    /// Concurrency tests use this to hold a step in flight.
    pub fn with_hook(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Make an operation fail until [`clear_failures`](Self::clear_failures).
    ///
    /// Keys are `operation` or `operation:subject`, e.g.
    /// `install_plugin:elementor` or `create_menu`.
    pub fn fail_on(&self, key: &str) {
        self.lock().failures.insert(key.to_string());
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Mutating calls in the order they were made, as `operation:subject`.
    pub fn mutations(&self) -> Vec<String> {
        self.lock().mutations.clone()
    }

    /// Number of mutating calls for an operation (any subject).
    pub fn mutation_count(&self, operation: &str) -> usize {
        let prefix = format!("{}:", operation);
        self.lock()
            .mutations
            .iter()
            .filter(|m| m.as_str() == operation || m.starts_with(&prefix))
            .count()
    }

    /// Every call made, reads included.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Whether a plugin is installed and active.
    pub fn is_plugin_active(&self, slug: &str) -> bool {
        self.lock().plugins.get(slug).copied().unwrap_or(false)
    }

    /// Titles of all pages, in creation order.
    pub fn page_titles(&self) -> Vec<String> {
        self.lock().pages.values().cloned().collect()
    }

    /// Title of the front page, if one is set.
    pub fn front_page_title(&self) -> Option<String> {
        let state = self.lock();
        state.front_page.and_then(|id| state.pages.get(&id).cloned())
    }

    /// Page titles in a menu, in item order.
    pub fn menu_items(&self, name: &str) -> Vec<String> {
        let state = self.lock();
        state
            .menus
            .values()
            .find(|m| m.name == name)
            .map(|m| {
                m.items
                    .iter()
                    .filter_map(|id| state.pages.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether a menu is assigned to a location.
    pub fn menu_location(&self, name: &str, location: &str) -> bool {
        self.lock()
            .menus
            .values()
            .any(|m| m.name == name && m.locations.contains(location))
    }

    /// Current value of an option.
    pub fn option(&self, key: &str) -> Option<String> {
        self.lock().options.get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, SiteState> {
        // A panicking test thread must not wedge the others.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a call, run the hook and apply injected failures.
    fn enter(&self, operation: &str, subject: Option<&str>) -> SiteResult<MutexGuard<'_, SiteState>> {
        let key = match subject {
            Some(subject) => format!("{}:{}", operation, subject),
            None => operation.to_string(),
        };

        if let Some(hook) = &self.hook {
            hook(&key);
        }

        let mut state = self.lock();
        state.calls.push(key.clone());
        if state.failures.contains(&key) || state.failures.contains(operation) {
            return Err(SiteError::failed(key, "injected failure"));
        }
        Ok(state)
    }

    fn mutate(&self, operation: &str, subject: &str) -> SiteResult<MutexGuard<'_, SiteState>> {
        let mut state = self.enter(operation, Some(subject))?;
        state.mutations.push(format!("{}:{}", operation, subject));
        Ok(state)
    }
}

impl Site for MemorySite {
    fn prepare(&self) -> SiteResult<()> {
        let state = self.enter("prepare", None)?;
        if state.reachable {
            Ok(())
        } else {
            Err(SiteError::Unavailable("site is not installed".to_string()))
        }
    }

    fn theme_exists(&self, slug: &str) -> SiteResult<bool> {
        Ok(self.enter("theme_exists", Some(slug))?.themes.contains(slug))
    }

    fn install_theme(&self, slug: &str, _source: &str) -> SiteResult<()> {
        self.mutate("install_theme", slug)?
            .themes
            .insert(slug.to_string());
        Ok(())
    }

    fn active_theme(&self) -> SiteResult<Option<String>> {
        Ok(self.enter("active_theme", None)?.active_theme.clone())
    }

    fn activate_theme(&self, slug: &str) -> SiteResult<()> {
        let mut state = self.mutate("activate_theme", slug)?;
        if !state.themes.contains(slug) {
            return Err(SiteError::failed(
                format!("activate_theme:{}", slug),
                "theme is not installed",
            ));
        }
        state.active_theme = Some(slug.to_string());
        Ok(())
    }

    fn plugin_exists(&self, slug: &str) -> SiteResult<bool> {
        Ok(self
            .enter("plugin_exists", Some(slug))?
            .plugins
            .contains_key(slug))
    }

    fn install_plugin(&self, slug: &str, _source: &str) -> SiteResult<()> {
        self.mutate("install_plugin", slug)?
            .plugins
            .entry(slug.to_string())
            .or_insert(false);
        Ok(())
    }

    fn plugin_active(&self, slug: &str) -> SiteResult<bool> {
        Ok(self
            .enter("plugin_active", Some(slug))?
            .plugins
            .get(slug)
            .copied()
            .unwrap_or(false))
    }

    fn activate_plugin(&self, slug: &str) -> SiteResult<()> {
        let mut state = self.mutate("activate_plugin", slug)?;
        match state.plugins.get_mut(slug) {
            Some(active) => {
                *active = true;
                Ok(())
            }
            None => Err(SiteError::failed(
                format!("activate_plugin:{}", slug),
                "plugin is not installed",
            )),
        }
    }

    fn find_page(&self, title: &str) -> SiteResult<Option<PageHandle>> {
        let state = self.enter("find_page", Some(title))?;
        Ok(state
            .pages
            .iter()
            .find(|(_, t)| t.as_str() == title)
            .map(|(id, _)| PageHandle(*id)))
    }

    fn create_page(&self, title: &str, _body: &str) -> SiteResult<PageHandle> {
        let mut state = self.mutate("create_page", title)?;
        if let Some((id, _)) = state.pages.iter().find(|(_, t)| t.as_str() == title) {
            return Ok(PageHandle(*id));
        }
        let id = state.allocate_id();
        state.pages.insert(id, title.to_string());
        Ok(PageHandle(id))
    }

    fn front_page(&self) -> SiteResult<Option<PageHandle>> {
        Ok(self.enter("front_page", None)?.front_page.map(PageHandle))
    }

    fn set_front_page(&self, page: PageHandle) -> SiteResult<()> {
        let mut state = self.mutate("set_front_page", &page.to_string())?;
        if !state.pages.contains_key(&page.0) {
            return Err(SiteError::failed("set_front_page", "no such page"));
        }
        state.front_page = Some(page.0);
        Ok(())
    }

    fn find_menu(&self, name: &str) -> SiteResult<Option<MenuHandle>> {
        let state = self.enter("find_menu", Some(name))?;
        Ok(state
            .menus
            .iter()
            .find(|(_, m)| m.name == name)
            .map(|(id, _)| MenuHandle(*id)))
    }

    fn create_menu(&self, name: &str) -> SiteResult<MenuHandle> {
        let mut state = self.mutate("create_menu", name)?;
        if let Some((id, _)) = state.menus.iter().find(|(_, m)| m.name == name) {
            return Ok(MenuHandle(*id));
        }
        let id = state.allocate_id();
        state.menus.insert(
            id,
            MenuState {
                name: name.to_string(),
                ..Default::default()
            },
        );
        Ok(MenuHandle(id))
    }

    fn add_menu_item(&self, menu: MenuHandle, page: PageHandle) -> SiteResult<()> {
        let mut state = self.mutate("add_menu_item", &format!("{}/{}", menu, page))?;
        match state.menus.get_mut(&menu.0) {
            Some(entry) => {
                entry.items.push(page.0);
                Ok(())
            }
            None => Err(SiteError::failed("add_menu_item", "no such menu")),
        }
    }

    fn set_menu_location(&self, menu: MenuHandle, location: &str) -> SiteResult<()> {
        let mut state = self.mutate("set_menu_location", location)?;
        for entry in state.menus.values_mut() {
            entry.locations.remove(location);
        }
        match state.menus.get_mut(&menu.0) {
            Some(entry) => {
                entry.locations.insert(location.to_string());
                Ok(())
            }
            None => Err(SiteError::failed("set_menu_location", "no such menu")),
        }
    }

    fn option_value(&self, key: &str) -> SiteResult<Option<String>> {
        Ok(self.enter("option_value", Some(key))?.options.get(key).cloned())
    }

    fn update_option(&self, key: &str, value: &str) -> SiteResult<()> {
        self.mutate("update_option", key)?
            .options
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn mark_provisioning_complete(&self, option: &str) -> SiteResult<()> {
        self.mutate("mark_provisioning_complete", option)?
            .options
            .insert(option.to_string(), "1".to_string());
        Ok(())
    }

    fn self_uninstall(&self, plugin: &str) -> SiteResult<()> {
        self.mutate("self_uninstall", plugin)?.plugins.remove(plugin);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_page_is_idempotent_by_title() {
        let site = MemorySite::new();
        let first = site.create_page("Home", "").unwrap();
        let second = site.create_page("Home", "").unwrap();

        assert_eq!(first, second);
        assert_eq!(site.page_titles(), vec!["Home"]);
        assert_eq!(site.find_page("Home").unwrap(), Some(first));
    }

    #[test]
    fn create_menu_is_idempotent_by_name() {
        let site = MemorySite::new();
        let first = site.create_menu("Main Menu").unwrap();
        let second = site.create_menu("Main Menu").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn injected_failures_apply_until_cleared() {
        let site = MemorySite::new();
        site.fail_on("install_plugin:elementor");

        assert!(site.install_plugin("elementor", "src").is_err());
        assert!(site.install_plugin("envato-elements", "src").is_ok());

        site.clear_failures();
        assert!(site.install_plugin("elementor", "src").is_ok());
        assert!(site.plugin_exists("elementor").unwrap());
    }

    #[test]
    fn operation_wide_failure_key() {
        let site = MemorySite::new();
        site.fail_on("create_menu");
        assert!(site.create_menu("Main Menu").is_err());
    }

    #[test]
    fn mutations_exclude_reads() {
        let site = MemorySite::new().with_plugin("elementor", false);
        site.plugin_exists("elementor").unwrap();
        site.activate_plugin("elementor").unwrap();

        assert_eq!(site.mutations(), vec!["activate_plugin:elementor"]);
        assert_eq!(site.calls().len(), 2);
        assert!(site.is_plugin_active("elementor"));
    }

    #[test]
    fn activate_missing_plugin_fails() {
        let site = MemorySite::new();
        assert!(site.activate_plugin("ghost").is_err());
    }

    #[test]
    fn unreachable_site_fails_prepare() {
        let site = MemorySite::new().unreachable();
        assert!(matches!(site.prepare(), Err(SiteError::Unavailable(_))));
    }

    #[test]
    fn menu_wiring() {
        let site = MemorySite::new();
        let home = site.create_page("Home", "").unwrap();
        let about = site.create_page("About Us", "").unwrap();
        let menu = site.create_menu("Main Menu").unwrap();
        site.add_menu_item(menu, home).unwrap();
        site.add_menu_item(menu, about).unwrap();
        site.set_menu_location(menu, "primary").unwrap();
        site.set_front_page(home).unwrap();

        assert_eq!(site.menu_items("Main Menu"), vec!["Home", "About Us"]);
        assert!(site.menu_location("Main Menu", "primary"));
        assert_eq!(site.front_page_title().as_deref(), Some("Home"));
    }

    #[test]
    fn hook_sees_every_call() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let site = MemorySite::new().with_hook(move |key| sink.lock().unwrap().push(key.to_string()));

        site.theme_exists("hello-elementor").unwrap();
        site.prepare().unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["theme_exists:hello-elementor", "prepare"]
        );
    }

    #[test]
    fn teardown_marks_and_removes() {
        let site = MemorySite::new().with_plugin("kickoff-bootstrap", true);
        site.mark_provisioning_complete("kickoff_completed").unwrap();
        site.self_uninstall("kickoff-bootstrap").unwrap();

        assert_eq!(site.option("kickoff_completed").as_deref(), Some("1"));
        assert!(!site.plugin_exists("kickoff-bootstrap").unwrap());
    }
}
