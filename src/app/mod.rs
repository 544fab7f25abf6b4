//! Application layer: menus, their collaborators, and the glue between the
//! WebView and the event loop.

pub mod dispatch;
pub mod events;
pub mod i18n;
pub mod lifecycle;
pub mod menu;
pub mod native_menu;
pub mod shell;
pub mod window;

use events::{EventProxy, IpcMessage, UserEvent};

/// Decodes one IPC message from the WebView and forwards it to the event
/// loop. Unknown commands and malformed payloads are logged and dropped.
pub fn handle_ipc_message<P: EventProxy>(message: String, proxy: P) {
    let ipc_message: IpcMessage = match serde_json::from_str(&message) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!("Received malformed IPC message: {}", e);
            return;
        }
    };

    match ipc_message.command.as_str() {
        "contextMenu" => {
            let x = ipc_message.payload["x"].as_i64().unwrap_or(0) as i32;
            let y = ipc_message.payload["y"].as_i64().unwrap_or(0) as i32;
            proxy.send_event(UserEvent::ContextMenuRequested { x, y });
        }
        "closeWindow" => proxy.send_event(UserEvent::CloseRequested),
        other => tracing::warn!("Unknown IPC command: {}", other),
    }
}
