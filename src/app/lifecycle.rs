//! Application lifecycle seam.

use super::events::{EventProxy, UserEvent};

/// Terminates the application.
pub trait AppLifecycle {
    fn quit(&self);
}

/// Lifecycle backed by the event loop: quitting asks the loop to exit on its
/// next turn rather than tearing the process down mid-event.
pub struct ProxyLifecycle<P: EventProxy> {
    proxy: P,
}

impl<P: EventProxy> ProxyLifecycle<P> {
    pub fn new(proxy: P) -> Self {
        Self { proxy }
    }
}

impl<P: EventProxy> AppLifecycle for ProxyLifecycle<P> {
    fn quit(&self) {
        tracing::info!("quit requested");
        self.proxy.send_event(UserEvent::Quit);
    }
}
