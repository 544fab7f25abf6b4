//! muda-backed implementation of the menu installer.
//!
//! Translates [`MenuNode`] templates into native muda menus, keeps the
//! id → action registry the menu-event thread reads from, and owns the
//! installed menu objects. muda hands out raw pointers to its items on
//! macOS, so the most recently installed menu (and the most recent popup)
//! must be kept alive here until it is replaced.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use muda::accelerator::Accelerator;
use muda::{
    AboutMetadata, CheckMenuItem, ContextMenu, IsMenuItem, Menu, MenuId, MenuItem,
    PredefinedMenuItem, Submenu,
};
use tao::window::Window;

use super::menu::{MenuAction, MenuInstaller, MenuNode, MenuTemplate, NativeRole, APP_NAME};

/// Maps menu ids back to the actions they trigger. Shared with the
/// menu-event forwarding thread.
pub type ActionMap = Arc<Mutex<HashMap<MenuId, MenuAction>>>;

pub struct NativeMenuInstaller {
    window: Arc<Window>,
    actions: ActionMap,
    /// The currently installed application menu, kept alive until replaced.
    installed: Mutex<Option<Menu>>,
    /// The most recent context popup plus its registered ids.
    popup: Mutex<(Option<Menu>, Vec<MenuId>)>,
}

impl NativeMenuInstaller {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            actions: Arc::new(Mutex::new(HashMap::new())),
            installed: Mutex::new(None),
            popup: Mutex::new((None, Vec::new())),
        }
    }

    /// Handle for the menu-event forwarding thread.
    pub fn action_map(&self) -> ActionMap {
        Arc::clone(&self.actions)
    }

    fn build_native(&self, template: &MenuTemplate) -> Menu {
        let menu = Menu::new();
        let mut actions = self
            .actions
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        for node in template {
            let entry = build_entry(node, &mut actions);
            if let Err(e) = menu.append(entry.as_ref()) {
                tracing::warn!("Failed to append menu entry: {}", e);
            }
        }
        menu
    }

    #[allow(unused_variables)]
    fn init_for_window(&self, menu: &Menu) {
        #[cfg(target_os = "macos")]
        menu.init_for_nsapp();

        #[cfg(target_os = "windows")]
        {
            use tao::platform::windows::WindowExtWindows;
            unsafe {
                if let Err(e) = menu.init_for_hwnd(self.window.hwnd() as isize) {
                    tracing::warn!("Failed to attach menu to window: {}", e);
                }
            }
        }

        #[cfg(target_os = "linux")]
        {
            use gtk::prelude::*;
            use tao::platform::unix::WindowExtUnix;
            let gtk_window: &gtk::Window = self.window.gtk_window().upcast_ref();
            if let Err(e) = menu.init_for_gtk_window(gtk_window, None::<&gtk::Box>) {
                tracing::warn!("Failed to attach menu to window: {}", e);
            }
        }
    }

    #[allow(unused_variables)]
    fn show_native_popup(&self, menu: &Menu, position: Option<(i32, i32)>) {
        let position = position.map(|(x, y)| {
            muda::dpi::Position::Logical(muda::dpi::LogicalPosition::new(
                f64::from(x),
                f64::from(y),
            ))
        });

        #[cfg(target_os = "macos")]
        {
            use tao::platform::macos::WindowExtMacOS;
            unsafe {
                menu.show_context_menu_for_nsview(self.window.ns_view() as _, position);
            }
        }

        #[cfg(target_os = "windows")]
        {
            use tao::platform::windows::WindowExtWindows;
            unsafe {
                let _ = menu.show_context_menu_for_hwnd(self.window.hwnd() as isize, position);
            }
        }

        #[cfg(target_os = "linux")]
        {
            use gtk::prelude::*;
            use tao::platform::unix::WindowExtUnix;
            let gtk_window: &gtk::Window = self.window.gtk_window().upcast_ref();
            menu.show_context_menu_for_gtk_window(gtk_window, position);
        }
    }
}

impl MenuInstaller for NativeMenuInstaller {
    fn install(&self, template: &MenuTemplate) {
        // A fresh install owns the registry; stale popup ids go with it.
        self.actions
            .lock()
            .expect("Mutex was poisoned. This should not happen.")
            .clear();
        let menu = self.build_native(template);
        self.init_for_window(&menu);
        tracing::info!(submenus = template.len(), "installed application menu");
        *self
            .installed
            .lock()
            .expect("Mutex was poisoned. This should not happen.") = Some(menu);
    }

    fn install_none(&self) {
        self.actions
            .lock()
            .expect("Mutex was poisoned. This should not happen.")
            .clear();
        *self
            .installed
            .lock()
            .expect("Mutex was poisoned. This should not happen.") = None;
        tracing::info!("no application menu on this platform");
    }

    fn show_popup(&self, template: &MenuTemplate, position: Option<(i32, i32)>) {
        let mut popup = self
            .popup
            .lock()
            .expect("Mutex was poisoned. This should not happen.");

        // Drop the previous popup's registrations before adding new ones.
        {
            let mut actions = self
                .actions
                .lock()
                .expect("Mutex was poisoned. This should not happen.");
            for id in popup.1.drain(..) {
                actions.remove(&id);
            }
        }

        let before: Vec<MenuId> = {
            let actions = self
                .actions
                .lock()
                .expect("Mutex was poisoned. This should not happen.");
            actions.keys().cloned().collect()
        };
        let menu = self.build_native(template);
        let new_ids: Vec<MenuId> = {
            let actions = self
                .actions
                .lock()
                .expect("Mutex was poisoned. This should not happen.");
            actions
                .keys()
                .filter(|id| !before.contains(id))
                .cloned()
                .collect()
        };

        self.show_native_popup(&menu, position);
        *popup = (Some(menu), new_ids);
    }
}

fn parse_accelerator(accelerator: &Option<String>) -> Option<Accelerator> {
    let raw = accelerator.as_deref()?;
    match raw.parse() {
        Ok(accel) => Some(accel),
        Err(e) => {
            tracing::warn!("Invalid accelerator {:?}: {}", raw, e);
            None
        }
    }
}

fn build_entry(node: &MenuNode, actions: &mut HashMap<MenuId, MenuAction>) -> Box<dyn IsMenuItem> {
    match node {
        MenuNode::Item {
            label,
            accelerator,
            action,
        } => match action {
            MenuAction::Native(role) => predefined_item(*role, label),
            _ => {
                let item = MenuItem::new(label, true, parse_accelerator(accelerator));
                actions.insert(item.id().clone(), action.clone());
                Box::new(item)
            }
        },
        MenuNode::Check {
            label,
            checked,
            action,
        } => {
            let item = CheckMenuItem::new(label, true, *checked, None);
            actions.insert(item.id().clone(), action.clone());
            Box::new(item)
        }
        MenuNode::Separator => Box::new(PredefinedMenuItem::separator()),
        MenuNode::Submenu { label, children } => {
            let submenu = Submenu::new(label, true);
            for child in children {
                let entry = build_entry(child, actions);
                if let Err(e) = submenu.append(entry.as_ref()) {
                    tracing::warn!("Failed to append entry to {:?}: {}", label, e);
                }
            }
            Box::new(submenu)
        }
    }
}

fn predefined_item(role: NativeRole, label: &str) -> Box<dyn IsMenuItem> {
    let text = Some(label);
    let item = match role {
        NativeRole::About => PredefinedMenuItem::about(
            text,
            Some(AboutMetadata {
                name: Some(APP_NAME.to_string()),
                ..Default::default()
            }),
        ),
        NativeRole::Services => PredefinedMenuItem::services(text),
        NativeRole::Hide => PredefinedMenuItem::hide(text),
        NativeRole::HideOthers => PredefinedMenuItem::hide_others(text),
        NativeRole::ShowAll => PredefinedMenuItem::show_all(text),
        NativeRole::Undo => PredefinedMenuItem::undo(text),
        NativeRole::Redo => PredefinedMenuItem::redo(text),
        NativeRole::Cut => PredefinedMenuItem::cut(text),
        NativeRole::Copy => PredefinedMenuItem::copy(text),
        NativeRole::Paste => PredefinedMenuItem::paste(text),
        NativeRole::SelectAll => PredefinedMenuItem::select_all(text),
        NativeRole::Minimize => PredefinedMenuItem::minimize(text),
        NativeRole::CloseWindow => PredefinedMenuItem::close_window(text),
        NativeRole::BringAllToFront => PredefinedMenuItem::bring_all_to_front(text),
    };
    Box::new(item)
}
