//! The main-window seam.
//!
//! The menu layer only ever talks to [`MainWindow`]; the tao/wry-backed
//! implementation lives here too, so the rest of the app stays free of
//! windowing types.

use std::rc::Rc;
use std::sync::{Arc, Mutex};

use tao::event_loop::EventLoopProxy;
use tao::window::{Fullscreen, Window};
use wry::WebView;

use super::events::UserEvent;

/// Narrow interface to the window the menus control.
pub trait MainWindow {
    /// Asks the shell to close this window (and with it, the application).
    fn request_close(&self);
    fn toggle_full_screen(&self);
    fn is_full_screen(&self) -> bool;
    /// Reloads the WebView content.
    fn reload(&self);
    fn toggle_developer_tools(&self);
    /// Opens the inspector focused on whatever sits at the given client
    /// coordinates.
    fn inspect_element_at(&self, x: i32, y: i32);
    /// Registers the handler invoked with the cursor coordinates of each
    /// right-click. A later registration replaces an earlier one.
    fn on_context_menu_requested(&self, handler: Box<dyn Fn(i32, i32)>);
}

/// The real main window: a tao window hosting a wry WebView.
pub struct TaoMainWindow {
    window: Arc<Window>,
    webview: Rc<WebView>,
    proxy: EventLoopProxy<UserEvent>,
    context_menu_handler: Mutex<Option<Box<dyn Fn(i32, i32)>>>,
}

impl TaoMainWindow {
    pub fn new(window: Arc<Window>, webview: Rc<WebView>, proxy: EventLoopProxy<UserEvent>) -> Self {
        Self {
            window,
            webview,
            proxy,
            context_menu_handler: Mutex::new(None),
        }
    }

    /// Runs the registered context-menu handler, if any. Called from the
    /// event loop when the WebView reports a right-click.
    pub fn emit_context_menu(&self, x: i32, y: i32) {
        let guard = self
            .context_menu_handler
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        match guard.as_ref() {
            Some(handler) => handler(x, y),
            None => tracing::debug!("context menu requested but no handler is registered"),
        }
    }
}

impl MainWindow for TaoMainWindow {
    fn request_close(&self) {
        let _ = self.proxy.send_event(UserEvent::CloseRequested);
    }

    fn toggle_full_screen(&self) {
        if self.is_full_screen() {
            self.window.set_fullscreen(None);
        } else {
            self.window.set_fullscreen(Some(Fullscreen::Borderless(None)));
        }
    }

    fn is_full_screen(&self) -> bool {
        self.window.fullscreen().is_some()
    }

    fn reload(&self) {
        if let Err(e) = self.webview.evaluate_script("window.location.reload();") {
            tracing::warn!("Failed to reload WebView: {}", e);
        }
    }

    fn toggle_developer_tools(&self) {
        if self.webview.is_devtools_open() {
            self.webview.close_devtools();
        } else {
            self.webview.open_devtools();
        }
    }

    fn inspect_element_at(&self, x: i32, y: i32) {
        if !self.webview.is_devtools_open() {
            self.webview.open_devtools();
        }
        // WebKit offers no direct inspect-at-point API; log the element so
        // the open inspector console shows what was under the cursor.
        let script = format!(
            "console.log('Inspect element at ({x}, {y}):', document.elementFromPoint({x}, {y}));"
        );
        if let Err(e) = self.webview.evaluate_script(&script) {
            tracing::warn!("Failed to inspect element at ({}, {}): {}", x, y, e);
        }
    }

    fn on_context_menu_requested(&self, handler: Box<dyn Fn(i32, i32)>) {
        *self
            .context_menu_handler
            .lock()
            .expect("Mutex was poisoned. This should not happen.") = Some(handler);
    }
}
