//! Platform-specific integration helpers.
//!
//! Keep OS quirks here to avoid leaking them into the app's core logic.

/// The two platform families the menu layer distinguishes.
///
/// macOS is the only target with a global, focus-independent menu bar at the
/// top of the screen; every other target gets no application menu at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Other,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }

    /// Whether this platform's convention places an app-wide menu bar at the
    /// top of the screen, independent of window focus.
    pub fn has_global_menu_bar(self) -> bool {
        matches!(self, Platform::MacOs)
    }
}
