//! Defines the event and message structures for communication between the
//! WebView, the native menus, and the event loop.

use serde::Deserialize;
use tao::event_loop::EventLoopProxy;

use super::menu::MenuAction;

/// Events delivered to the tao event loop (the UI thread).
///
/// Everything that must run on the main thread — menu dispatch, popup
/// display, shutdown — funnels through these.
#[derive(Debug)]
pub enum UserEvent {
    /// A native menu entry was activated.
    MenuActivated(MenuAction),
    /// The WebView reported a right-click at the given client coordinates.
    ContextMenuRequested { x: i32, y: i32 },
    /// The frontend asked to close the main window.
    CloseRequested,
    /// Final shutdown: the event loop should exit.
    Quit,
}

/// A message received from the WebView via the IPC channel.
#[derive(Deserialize, Debug)]
pub struct IpcMessage {
    /// The name of the command to execute.
    pub command: String,
    /// The payload associated with the command, as a JSON value.
    pub payload: serde_json::Value,
}

/// Abstracts the sending of user events so menu collaborators can be
/// exercised without a live event loop. Fire-and-forget by design.
pub trait EventProxy: Send + Sync + Clone + 'static {
    fn send_event(&self, event: UserEvent);
}

impl EventProxy for EventLoopProxy<UserEvent> {
    fn send_event(&self, event: UserEvent) {
        // The underlying proxy only fails once the loop is gone, at which
        // point there is nobody left to care; log it and move on.
        if let Err(e) = self.send_event(event) {
            tracing::warn!("Failed to send event to event loop: {}", e);
        }
    }
}
