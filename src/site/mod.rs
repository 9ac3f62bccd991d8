//! The site being provisioned.
//!
//! Every side effect a step requests goes through the [`Site`] trait, one
//! method per resource kind. Two implementations ship with the crate:
//!
//! - [`WpCliSite`] drives a WordPress installation through WP-CLI
//! - [`MemorySite`] keeps everything in memory, for tests and embedding
//!
//! Read-only methods (`theme_exists`, `find_page`, ...) let the step executor
//! check for existing work before calling a mutating method.

pub mod memory;
pub mod wp_cli;

pub use memory::MemorySite;
pub use wp_cli::WpCliSite;

use std::fmt;
use thiserror::Error;

/// Failure reported by a site operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SiteError {
    /// The site cannot be reached or is not installed.
    #[error("Site unavailable: {0}")]
    Unavailable(String),

    /// An operation ran and reported failure.
    #[error("{operation} failed: {message}")]
    Failed { operation: String, message: String },

    /// An operation produced output that could not be understood.
    #[error("Unexpected output from {operation}: {output}")]
    UnexpectedOutput { operation: String, output: String },
}

impl SiteError {
    /// Build a [`SiteError::Failed`].
    pub fn failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Result of a site operation.
pub type SiteResult<T> = std::result::Result<T, SiteError>;

/// Identifier of a page on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageHandle(pub u64);

/// Identifier of a navigation menu on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MenuHandle(pub u64);

impl fmt::Display for PageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MenuHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability interface to the site being provisioned.
///
/// Implementations must be safe to call from several invocations at once;
/// the sequencer's lease only serializes whole steps.
pub trait Site: Send + Sync {
    /// Verify the site is reachable and installed.
    fn prepare(&self) -> SiteResult<()>;

    /// Whether a theme with this slug is installed.
    fn theme_exists(&self, slug: &str) -> SiteResult<bool>;

    /// Install a theme from `source`.
    fn install_theme(&self, slug: &str, source: &str) -> SiteResult<()>;

    /// Slug of the active theme, if known.
    fn active_theme(&self) -> SiteResult<Option<String>>;

    /// Switch the site to an installed theme.
    fn activate_theme(&self, slug: &str) -> SiteResult<()>;

    /// Whether a plugin with this slug is installed.
    fn plugin_exists(&self, slug: &str) -> SiteResult<bool>;

    /// Install a plugin from `source`.
    fn install_plugin(&self, slug: &str, source: &str) -> SiteResult<()>;

    /// Whether an installed plugin is active.
    fn plugin_active(&self, slug: &str) -> SiteResult<bool>;

    /// Activate an installed plugin.
    fn activate_plugin(&self, slug: &str) -> SiteResult<()>;

    /// Look up a page by title.
    fn find_page(&self, title: &str) -> SiteResult<Option<PageHandle>>;

    /// Create a published page; returns the existing page if the title is taken.
    fn create_page(&self, title: &str, body: &str) -> SiteResult<PageHandle>;

    /// The page shown as the static front page, if one is set.
    fn front_page(&self) -> SiteResult<Option<PageHandle>>;

    /// Use `page` as the static front page.
    fn set_front_page(&self, page: PageHandle) -> SiteResult<()>;

    /// Look up a navigation menu by name.
    fn find_menu(&self, name: &str) -> SiteResult<Option<MenuHandle>>;

    /// Create a navigation menu; returns the existing menu if the name is taken.
    fn create_menu(&self, name: &str) -> SiteResult<MenuHandle>;

    /// Append a page to a menu.
    fn add_menu_item(&self, menu: MenuHandle, page: PageHandle) -> SiteResult<()>;

    /// Assign a menu to a theme location such as `primary`.
    fn set_menu_location(&self, menu: MenuHandle, location: &str) -> SiteResult<()>;

    /// Current value of a site option.
    fn option_value(&self, key: &str) -> SiteResult<Option<String>>;

    /// Set a site option.
    fn update_option(&self, key: &str, value: &str) -> SiteResult<()>;

    /// Record on the site that provisioning finished.
    fn mark_provisioning_complete(&self, option: &str) -> SiteResult<()>;

    /// Deactivate and delete the bootstrap plugin.
    fn self_uninstall(&self, plugin: &str) -> SiteResult<()>;
}
