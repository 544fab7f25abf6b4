//! Decides, per platform and build environment, what the application menu
//! looks like, and builds the transient developer context menu.
//!
//! The builder produces plain [`MenuNode`] trees and hands them to a
//! [`MenuInstaller`]; it never talks to the OS directly. Templates are value
//! types: built fresh on every call, comparable, and owned exclusively by
//! their parent — the installed menu's lifetime belongs to the platform.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::platform::Platform;

use super::i18n::Translator;
use super::window::MainWindow;

pub const APP_NAME: &str = "ScreenLink";

const HOMEPAGE_URL: &str = "https://screenlink.app/";
const DOCS_URL: &str = "https://github.com/screenlink/screenlink/blob/main/README.md";
const ISSUES_URL: &str = "https://github.com/screenlink/screenlink/issues";

/// Whether this is a development or a production build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// The facts the menu layer branches on, resolved once at the call site.
///
/// Keeping these explicit (instead of reading `std::env` inside the builder)
/// makes every build function pure: same context, same template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildContext {
    pub platform: Platform,
    pub environment: Environment,
    /// Opts production builds into the developer surfaces.
    pub debug_production: bool,
}

impl BuildContext {
    pub fn new(platform: Platform, environment: Environment, debug_production: bool) -> Self {
        Self {
            platform,
            environment,
            debug_production,
        }
    }

    /// Reads the ambient environment once. `SCREENLINK_ENV` overrides the
    /// compile-time default; `SCREENLINK_DEBUG_PROD=true` or the config flag
    /// re-enables developer surfaces in a production build.
    pub fn detect(config: &AppConfig) -> Self {
        let environment = match std::env::var("SCREENLINK_ENV").as_deref() {
            Ok("development") => Environment::Development,
            Ok("production") => Environment::Production,
            _ if cfg!(debug_assertions) => Environment::Development,
            _ => Environment::Production,
        };
        let debug_production = config.debug_production
            || matches!(
                std::env::var("SCREENLINK_DEBUG_PROD").as_deref(),
                Ok("true")
            );
        Self::new(Platform::current(), environment, debug_production)
    }

    /// Single gate for every developer surface: the dev View entries and the
    /// right-click inspector are both governed by this flag, wired
    /// independently at their two call sites.
    pub fn dev_tools_enabled(&self) -> bool {
        self.environment == Environment::Development || self.debug_production
    }
}

/// Menu entries that delegate to an OS convention rather than to
/// application logic. The installer maps these onto the platform's
/// predefined items; dispatching them is a no-op on our side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeRole {
    About,
    Services,
    Hide,
    HideOthers,
    ShowAll,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    Minimize,
    CloseWindow,
    BringAllToFront,
}

/// What activating a menu entry does.
///
/// Actions are data, not closures, so templates stay comparable and the
/// wiring to collaborators lives in one dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Handled by the OS (see [`NativeRole`]).
    Native(NativeRole),
    Reload,
    ToggleFullScreen,
    ToggleDevTools,
    /// Opens the inspector at the coordinates captured when the triggering
    /// right-click happened.
    InspectElement { x: i32, y: i32 },
    OpenExternal(String),
    SetLocale(String),
    /// Stops the signaling service, then terminates the application.
    Quit,
}

/// One entry in a menu tree. Trees are finite and strictly acyclic: every
/// node is owned by exactly one parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuNode {
    Item {
        label: String,
        accelerator: Option<String>,
        action: MenuAction,
    },
    /// Radio-style checkable entry (used for locale selection).
    Check {
        label: String,
        checked: bool,
        action: MenuAction,
    },
    Separator,
    Submenu {
        label: String,
        children: Vec<MenuNode>,
    },
}

impl MenuNode {
    pub fn item(label: impl Into<String>, action: MenuAction) -> Self {
        MenuNode::Item {
            label: label.into(),
            accelerator: None,
            action,
        }
    }

    pub fn item_with_accelerator(
        label: impl Into<String>,
        accelerator: impl Into<String>,
        action: MenuAction,
    ) -> Self {
        MenuNode::Item {
            label: label.into(),
            accelerator: Some(accelerator.into()),
            action,
        }
    }

    pub fn check(label: impl Into<String>, checked: bool, action: MenuAction) -> Self {
        MenuNode::Check {
            label: label.into(),
            checked,
            action,
        }
    }

    pub fn separator() -> Self {
        MenuNode::Separator
    }

    pub fn submenu(label: impl Into<String>, children: Vec<MenuNode>) -> Self {
        MenuNode::Submenu {
            label: label.into(),
            children,
        }
    }

    /// The display label, if this node kind has one.
    pub fn label(&self) -> Option<&str> {
        match self {
            MenuNode::Item { label, .. }
            | MenuNode::Check { label, .. }
            | MenuNode::Submenu { label, .. } => Some(label),
            MenuNode::Separator => None,
        }
    }
}

/// The root-level menu bar: an ordered sequence of top-level nodes.
pub type MenuTemplate = Vec<MenuNode>;

/// Abstracts the native menu machinery so the builder can be exercised
/// without a windowing system.
pub trait MenuInstaller {
    /// Installs the template as the process-wide application menu.
    fn install(&self, template: &MenuTemplate);
    /// Installs no application menu at all.
    fn install_none(&self);
    /// Pops up a transient menu anchored to the main window, at the given
    /// window coordinates when provided.
    fn show_popup(&self, template: &MenuTemplate, position: Option<(i32, i32)>);
}

/// Builds and installs the application menu for one main window.
pub struct MenuBuilder {
    window: Arc<dyn MainWindow>,
    installer: Arc<dyn MenuInstaller>,
    translator: Option<Arc<dyn Translator>>,
}

impl MenuBuilder {
    /// The translator is optional; without it the Language menu is omitted.
    pub fn new(
        window: Arc<dyn MainWindow>,
        installer: Arc<dyn MenuInstaller>,
        translator: Option<Arc<dyn Translator>>,
    ) -> Self {
        Self {
            window,
            installer,
            translator,
        }
    }

    /// Decides and installs the application menu.
    ///
    /// Idempotent; safe to call again after the context changes. Expects the
    /// windowing subsystem to be up already.
    pub fn build_menu(&self, ctx: &BuildContext) {
        if ctx.dev_tools_enabled() {
            self.setup_development_environment();
        }

        if ctx.platform.has_global_menu_bar() {
            self.installer.install(&self.menu_bar_template(ctx));
        } else {
            // No application menu on platforms without a global menu bar.
            self.installer.install_none();
        }
    }

    /// Hooks the right-click inspector onto the main window. Every event
    /// builds its own single-entry menu carrying the coordinates from that
    /// event, so a popup can never fire with stale ones.
    fn setup_development_environment(&self) {
        let installer = Arc::clone(&self.installer);
        self.window
            .on_context_menu_requested(Box::new(move |x, y| {
                installer.show_popup(&dev_context_menu(x, y), Some((x, y)));
            }));
    }

    /// The full menu bar for the global-menu-bar platform.
    pub fn menu_bar_template(&self, ctx: &BuildContext) -> MenuTemplate {
        let mut template = vec![
            self.app_submenu(),
            self.edit_submenu(),
            self.view_submenu(ctx),
            self.window_submenu(),
            self.help_submenu(),
        ];
        if let Some(translator) = &self.translator {
            template.push(self.language_submenu(translator.as_ref()));
        }
        template
    }

    fn app_submenu(&self) -> MenuNode {
        MenuNode::submenu(
            APP_NAME,
            vec![
                MenuNode::item(
                    format!("About {APP_NAME}"),
                    MenuAction::Native(NativeRole::About),
                ),
                MenuNode::separator(),
                // Placeholder the OS fills in with its own services.
                MenuNode::item("Services", MenuAction::Native(NativeRole::Services)),
                MenuNode::separator(),
                MenuNode::item(
                    format!("Hide {APP_NAME}"),
                    MenuAction::Native(NativeRole::Hide),
                ),
                MenuNode::item("Hide Others", MenuAction::Native(NativeRole::HideOthers)),
                MenuNode::item("Show All", MenuAction::Native(NativeRole::ShowAll)),
                MenuNode::separator(),
                MenuNode::item_with_accelerator("Quit", "Cmd+Q", MenuAction::Quit),
            ],
        )
    }

    fn edit_submenu(&self) -> MenuNode {
        MenuNode::submenu(
            "Edit",
            vec![
                MenuNode::item("Undo", MenuAction::Native(NativeRole::Undo)),
                MenuNode::item("Redo", MenuAction::Native(NativeRole::Redo)),
                MenuNode::separator(),
                MenuNode::item("Cut", MenuAction::Native(NativeRole::Cut)),
                MenuNode::item("Copy", MenuAction::Native(NativeRole::Copy)),
                MenuNode::item("Paste", MenuAction::Native(NativeRole::Paste)),
                MenuNode::item("Select All", MenuAction::Native(NativeRole::SelectAll)),
            ],
        )
    }

    fn view_submenu(&self, ctx: &BuildContext) -> MenuNode {
        let children = if ctx.dev_tools_enabled() {
            vec![
                MenuNode::item_with_accelerator("Reload", "CmdOrCtrl+R", MenuAction::Reload),
                MenuNode::item_with_accelerator(
                    "Toggle Full Screen",
                    "Ctrl+Cmd+F",
                    MenuAction::ToggleFullScreen,
                ),
                MenuNode::item_with_accelerator(
                    "Toggle Developer Tools",
                    "Alt+Cmd+I",
                    MenuAction::ToggleDevTools,
                ),
            ]
        } else {
            vec![MenuNode::item_with_accelerator(
                "Toggle Full Screen",
                "Ctrl+Cmd+F",
                MenuAction::ToggleFullScreen,
            )]
        };
        MenuNode::submenu("View", children)
    }

    fn window_submenu(&self) -> MenuNode {
        MenuNode::submenu(
            "Window",
            vec![
                MenuNode::item("Minimize", MenuAction::Native(NativeRole::Minimize)),
                MenuNode::item("Close", MenuAction::Native(NativeRole::CloseWindow)),
                MenuNode::separator(),
                MenuNode::item(
                    "Bring All to Front",
                    MenuAction::Native(NativeRole::BringAllToFront),
                ),
            ],
        )
    }

    fn help_submenu(&self) -> MenuNode {
        MenuNode::submenu(
            "Help",
            vec![
                MenuNode::item(
                    "Learn More",
                    MenuAction::OpenExternal(HOMEPAGE_URL.to_string()),
                ),
                MenuNode::item(
                    "Documentation",
                    MenuAction::OpenExternal(DOCS_URL.to_string()),
                ),
                // Both community entries currently land on the issue tracker.
                MenuNode::item(
                    "Community Discussions",
                    MenuAction::OpenExternal(ISSUES_URL.to_string()),
                ),
                MenuNode::item(
                    "Search Issues",
                    MenuAction::OpenExternal(ISSUES_URL.to_string()),
                ),
            ],
        )
    }

    fn language_submenu(&self, translator: &dyn Translator) -> MenuNode {
        let current = translator.current_locale();
        let children = translator
            .supported_locales()
            .into_iter()
            .map(|code| {
                MenuNode::check(
                    translator.translate(&code),
                    code == current,
                    MenuAction::SetLocale(code),
                )
            })
            .collect();
        MenuNode::submenu(translator.translate("Language"), children)
    }
}

/// The transient developer context menu for one right-click event. The
/// coordinates live inside the action value, captured at event time.
pub fn dev_context_menu(x: i32, y: i32) -> MenuTemplate {
    vec![MenuNode::item(
        "Inspect element",
        MenuAction::InspectElement { x, y },
    )]
}
