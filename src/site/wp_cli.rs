//! WP-CLI backed site.
//!
//! Each [`Site`] method maps to one `wp` invocation. Existence checks rely on
//! the `is-installed` / `is-active` exit codes; creation commands use
//! `--porcelain` so the new id is the only thing on stdout.

use super::{MenuHandle, PageHandle, Site, SiteError, SiteResult};
use crate::config::SiteConfig;
use crate::shell::{display_command, execute, CommandOptions, CommandResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A WordPress installation driven through the `wp` command.
#[derive(Debug, Clone)]
pub struct WpCliSite {
    program: String,
    path: Option<PathBuf>,
    extra_args: Vec<String>,
    options: CommandOptions,
}

#[derive(Debug, Deserialize)]
struct MenuRow {
    term_id: u64,
    name: String,
}

impl WpCliSite {
    /// Build from site configuration; `site_root` is the working directory.
    pub fn from_config(config: &SiteConfig, site_root: &Path) -> Self {
        Self {
            program: config.wp_cli.clone(),
            path: config.path.clone(),
            extra_args: config.extra_args.clone(),
            options: CommandOptions {
                cwd: Some(site_root.to_path_buf()),
                ..Default::default()
            },
        }
    }

    /// Full argument vector for a WP-CLI subcommand.
    fn argv(&self, args: &[&str]) -> Vec<String> {
        let mut argv: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        if let Some(path) = &self.path {
            argv.push(format!("--path={}", path.display()));
        }
        argv.extend(self.extra_args.iter().cloned());
        argv
    }

    fn run(&self, args: &[&str]) -> SiteResult<CommandResult> {
        let argv = self.argv(args);
        execute(&self.program, &argv, &self.options)
            .map_err(|e| SiteError::Unavailable(e.to_string()))
    }

    /// Run a command that must succeed; returns trimmed stdout.
    fn run_ok(&self, args: &[&str]) -> SiteResult<String> {
        let result = self.run(args)?;
        if result.success {
            Ok(result.stdout.trim().to_string())
        } else {
            Err(SiteError::failed(
                display_command(&self.program, &self.argv(args)),
                result.failure_message(),
            ))
        }
    }

    /// Run a yes/no query encoded in the exit code.
    fn run_check(&self, args: &[&str]) -> SiteResult<bool> {
        let result = self.run(args)?;
        match result.exit_code {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(SiteError::failed(
                display_command(&self.program, &self.argv(args)),
                result.failure_message(),
            )),
        }
    }

    /// Run a command whose stdout is a single numeric id.
    fn run_id(&self, args: &[&str]) -> SiteResult<u64> {
        let stdout = self.run_ok(args)?;
        parse_id(&stdout).ok_or_else(|| SiteError::UnexpectedOutput {
            operation: display_command(&self.program, &self.argv(args)),
            output: stdout,
        })
    }

    fn get_option(&self, key: &str) -> SiteResult<Option<String>> {
        let args = ["option", "get", key];
        let result = self.run(&args)?;
        match result.exit_code {
            Some(0) => Ok(Some(result.stdout.trim_end_matches(['\r', '\n']).to_string())),
            // `wp option get` exits 1 when the option does not exist.
            Some(1) => Ok(None),
            _ => Err(SiteError::failed(
                display_command(&self.program, &self.argv(&args)),
                result.failure_message(),
            )),
        }
    }
}

/// First whitespace-separated token parsed as an id.
fn parse_id(output: &str) -> Option<u64> {
    output.split_whitespace().next()?.parse().ok()
}

impl Site for WpCliSite {
    fn prepare(&self) -> SiteResult<()> {
        if self.run_check(&["core", "is-installed"])? {
            Ok(())
        } else {
            Err(SiteError::Unavailable(
                "WordPress is not installed at this path".to_string(),
            ))
        }
    }

    fn theme_exists(&self, slug: &str) -> SiteResult<bool> {
        self.run_check(&["theme", "is-installed", slug])
    }

    fn install_theme(&self, _slug: &str, source: &str) -> SiteResult<()> {
        self.run_ok(&["theme", "install", source]).map(|_| ())
    }

    fn active_theme(&self) -> SiteResult<Option<String>> {
        self.get_option("stylesheet")
    }

    fn activate_theme(&self, slug: &str) -> SiteResult<()> {
        self.run_ok(&["theme", "activate", slug]).map(|_| ())
    }

    fn plugin_exists(&self, slug: &str) -> SiteResult<bool> {
        self.run_check(&["plugin", "is-installed", slug])
    }

    fn install_plugin(&self, _slug: &str, source: &str) -> SiteResult<()> {
        self.run_ok(&["plugin", "install", source]).map(|_| ())
    }

    fn plugin_active(&self, slug: &str) -> SiteResult<bool> {
        self.run_check(&["plugin", "is-active", slug])
    }

    fn activate_plugin(&self, slug: &str) -> SiteResult<()> {
        self.run_ok(&["plugin", "activate", slug]).map(|_| ())
    }

    fn find_page(&self, title: &str) -> SiteResult<Option<PageHandle>> {
        let title_arg = format!("--title={}", title);
        let stdout = self.run_ok(&[
            "post",
            "list",
            "--post_type=page",
            &title_arg,
            "--format=ids",
        ])?;
        Ok(parse_id(&stdout).map(PageHandle))
    }

    fn create_page(&self, title: &str, body: &str) -> SiteResult<PageHandle> {
        if let Some(existing) = self.find_page(title)? {
            return Ok(existing);
        }
        let title_arg = format!("--post_title={}", title);
        let body_arg = format!("--post_content={}", body);
        self.run_id(&[
            "post",
            "create",
            "--post_type=page",
            "--post_status=publish",
            &title_arg,
            &body_arg,
            "--porcelain",
        ])
        .map(PageHandle)
    }

    fn front_page(&self) -> SiteResult<Option<PageHandle>> {
        if self.get_option("show_on_front")?.as_deref() != Some("page") {
            return Ok(None);
        }
        Ok(self
            .get_option("page_on_front")?
            .as_deref()
            .and_then(parse_id)
            .filter(|id| *id != 0)
            .map(PageHandle))
    }

    fn set_front_page(&self, page: PageHandle) -> SiteResult<()> {
        self.run_ok(&["option", "update", "show_on_front", "page"])?;
        let id = page.to_string();
        self.run_ok(&["option", "update", "page_on_front", &id])
            .map(|_| ())
    }

    fn find_menu(&self, name: &str) -> SiteResult<Option<MenuHandle>> {
        let operation = "menu list";
        let stdout = self.run_ok(&["menu", "list", "--fields=term_id,name", "--format=json"])?;
        let rows: Vec<MenuRow> = if stdout.is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&stdout).map_err(|_| SiteError::UnexpectedOutput {
                operation: operation.to_string(),
                output: stdout.clone(),
            })?
        };
        Ok(rows
            .into_iter()
            .find(|row| row.name == name)
            .map(|row| MenuHandle(row.term_id)))
    }

    fn create_menu(&self, name: &str) -> SiteResult<MenuHandle> {
        if let Some(existing) = self.find_menu(name)? {
            return Ok(existing);
        }
        self.run_id(&["menu", "create", name, "--porcelain"])
            .map(MenuHandle)
    }

    fn add_menu_item(&self, menu: MenuHandle, page: PageHandle) -> SiteResult<()> {
        let menu = menu.to_string();
        let page = page.to_string();
        self.run_ok(&["menu", "item", "add-post", &menu, &page])
            .map(|_| ())
    }

    fn set_menu_location(&self, menu: MenuHandle, location: &str) -> SiteResult<()> {
        let menu = menu.to_string();
        self.run_ok(&["menu", "location", "assign", &menu, location])
            .map(|_| ())
    }

    fn option_value(&self, key: &str) -> SiteResult<Option<String>> {
        self.get_option(key)
    }

    fn update_option(&self, key: &str, value: &str) -> SiteResult<()> {
        self.run_ok(&["option", "update", key, value]).map(|_| ())
    }

    fn mark_provisioning_complete(&self, option: &str) -> SiteResult<()> {
        self.update_option(option, "1")
    }

    fn self_uninstall(&self, plugin: &str) -> SiteResult<()> {
        self.run_ok(&["plugin", "deactivate", plugin, "--uninstall"])
            .map(|_| ())
    }
}
