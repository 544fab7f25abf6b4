pub mod settings;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub window_size: (f64, f64),
    pub window_position: (f64, f64),
    /// Local port the signaling service binds on startup.
    pub signaling_port: u16,
    /// Enables the developer surfaces (dev menu entries and the right-click
    /// inspector) in a production build. Equivalent to setting
    /// `SCREENLINK_DEBUG_PROD=true` in the environment.
    pub debug_production: bool,
    /// How long Quit may wait for the signaling service to confirm shutdown.
    /// `None` means fire-and-forget: the stop request is issued but not
    /// awaited before the process terminates.
    pub quit_grace_ms: Option<u64>,
    /// Locale codes offered by the Language menu once the translation
    /// service ships.
    pub languages: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        settings::load_config(None)
    }

    pub fn quit_grace(&self) -> Option<std::time::Duration> {
        self.quit_grace_ms.map(std::time::Duration::from_millis)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_size: (1100.0, 720.0),
            window_position: (120.0, 120.0),
            signaling_port: 3131,
            debug_production: false,
            quit_grace_ms: None,
            languages: ["en", "de", "fr", "es", "uk"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}
