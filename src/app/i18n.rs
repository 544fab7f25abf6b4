//! Optional translation capability.
//!
//! The translation service is a capability the menu layer may or may not be
//! handed. When it is absent the Language menu is omitted entirely; the rest
//! of the application carries no localization logic of its own.

use std::sync::Mutex;

/// Narrow interface to a translation service.
///
/// `Send + Sync` because the deferred locale-correction step runs on a
/// background task (see `dispatch::LocaleRetry`).
pub trait Translator: Send + Sync {
    /// Resolves a translation key to display text for the current locale.
    fn translate(&self, key: &str) -> String;
    /// The locale currently in effect.
    fn current_locale(&self) -> String;
    /// Switches the active locale. Must be idempotent.
    fn set_locale(&self, code: &str);
    /// Locale codes the service can switch between.
    fn supported_locales(&self) -> Vec<String>;
}

/// In-memory translator backed by a fixed locale list.
///
/// Resolves locale codes to their native display names and passes every
/// other key through unchanged. This is the implementation the Language
/// menu will use once it is enabled; today it is exercised by tests only.
pub struct StaticTranslator {
    locales: Vec<String>,
    current: Mutex<String>,
}

impl StaticTranslator {
    pub fn new(locales: Vec<String>, initial: &str) -> Self {
        Self {
            locales,
            current: Mutex::new(initial.to_string()),
        }
    }

    fn display_name(code: &str) -> Option<&'static str> {
        match code {
            "en" => Some("English"),
            "de" => Some("Deutsch"),
            "fr" => Some("Français"),
            "es" => Some("Español"),
            "uk" => Some("Українська"),
            _ => None,
        }
    }
}

impl Translator for StaticTranslator {
    fn translate(&self, key: &str) -> String {
        Self::display_name(key)
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }

    fn current_locale(&self) -> String {
        self.current
            .lock()
            .expect("Mutex was poisoned. This should not happen.")
            .clone()
    }

    fn set_locale(&self, code: &str) {
        let mut current = self
            .current
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        if *current != code {
            tracing::info!(from = %*current, to = %code, "switching locale");
            *current = code.to_string();
        }
    }

    fn supported_locales(&self) -> Vec<String> {
        self.locales.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_codes_and_passes_through_unknown_keys() {
        let translator = StaticTranslator::new(vec!["en".into(), "de".into()], "en");
        assert_eq!(translator.translate("de"), "Deutsch");
        assert_eq!(translator.translate("Language"), "Language");
    }

    #[test]
    fn set_locale_is_idempotent() {
        let translator = StaticTranslator::new(vec!["en".into(), "fr".into()], "en");
        translator.set_locale("fr");
        translator.set_locale("fr");
        assert_eq!(translator.current_locale(), "fr");
    }
}
