//! Routes activated menu actions to their collaborators.
//!
//! Every action funnels through [`ActionDispatcher::dispatch`] on the event
//! thread. The one ordering-sensitive path is Quit: the signaling service
//! stop request is issued before the lifecycle is asked to terminate, on
//! every path, so the service can never outlive the process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::core::SignalingServer;

use super::i18n::Translator;
use super::lifecycle::AppLifecycle;
use super::menu::MenuAction;
use super::shell::LinkOpener;
use super::window::MainWindow;

/// Narrow interface to the background signaling service.
pub trait SignalingService {
    /// Requests shutdown. Issue-only: callers must not assume the service is
    /// already down when this returns.
    fn stop(&self);
    /// Best-effort wait for shutdown confirmation, bounded by `timeout`.
    fn wait_stopped(&self, timeout: Duration) -> bool {
        let _ = timeout;
        true
    }
}

impl SignalingService for SignalingServer {
    fn stop(&self) {
        SignalingServer::stop(self);
    }

    fn wait_stopped(&self, timeout: Duration) -> bool {
        SignalingServer::wait_stopped(self, timeout)
    }
}

/// How Quit couples to the signaling-service shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuitConfig {
    /// With a grace period, Quit waits (bounded) for the service to confirm
    /// shutdown after issuing the stop request. Without one the stop request
    /// is fire-and-forget.
    pub grace: Option<Duration>,
}

impl QuitConfig {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            grace: config.quit_grace(),
        }
    }
}

/// One-shot deferred correction for locale switches.
///
/// macOS occasionally ignores the first locale switch issued right after a
/// menu interaction. Instead of blindly switching twice, we schedule a single
/// check: if the requested locale did not stick after the delay, the switch
/// is repeated once. The check is cancellable so it never fires against a
/// window that was torn down in the meantime.
#[derive(Clone)]
pub struct LocaleRetry {
    runtime: tokio::runtime::Handle,
    delay: Duration,
    cancelled: Arc<AtomicBool>,
}

impl LocaleRetry {
    const DEFAULT_DELAY: Duration = Duration::from_millis(500);

    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self::with_delay(runtime, Self::DEFAULT_DELAY)
    }

    pub fn with_delay(runtime: tokio::runtime::Handle, delay: Duration) -> Self {
        Self {
            runtime,
            delay,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Schedules the check-and-correct step for one switch request.
    pub fn schedule(&self, translator: Arc<dyn Translator>, code: String) {
        let cancelled = Arc::clone(&self.cancelled);
        let delay = self.delay;
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if cancelled.load(Ordering::Relaxed) {
                return;
            }
            if translator.current_locale() != code {
                tracing::debug!(locale = %code, "locale switch did not stick, repeating once");
                translator.set_locale(&code);
            }
        });
    }

    /// Abandons any pending checks. Called when the owning window goes away.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// Wires menu actions to the main window, the link opener, the signaling
/// service, the app lifecycle, and the optional translator.
pub struct ActionDispatcher {
    window: Arc<dyn MainWindow>,
    opener: Arc<dyn LinkOpener>,
    signaling: Arc<dyn SignalingService>,
    lifecycle: Arc<dyn AppLifecycle>,
    translator: Option<Arc<dyn Translator>>,
    locale_retry: LocaleRetry,
    quit: QuitConfig,
}

impl ActionDispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        window: Arc<dyn MainWindow>,
        opener: Arc<dyn LinkOpener>,
        signaling: Arc<dyn SignalingService>,
        lifecycle: Arc<dyn AppLifecycle>,
        translator: Option<Arc<dyn Translator>>,
        locale_retry: LocaleRetry,
        quit: QuitConfig,
    ) -> Self {
        Self {
            window,
            opener,
            signaling,
            lifecycle,
            translator,
            locale_retry,
            quit,
        }
    }

    pub fn dispatch(&self, action: MenuAction) {
        tracing::debug!(?action, "dispatching menu action");
        match action {
            // The OS already performed these.
            MenuAction::Native(role) => tracing::trace!(?role, "delegated to OS"),
            MenuAction::Reload => self.window.reload(),
            MenuAction::ToggleFullScreen => self.window.toggle_full_screen(),
            MenuAction::ToggleDevTools => self.window.toggle_developer_tools(),
            MenuAction::InspectElement { x, y } => self.window.inspect_element_at(x, y),
            MenuAction::OpenExternal(url) => self.opener.open(&url),
            MenuAction::SetLocale(code) => self.set_locale(code),
            MenuAction::Quit => self.quit(),
        }
    }

    fn set_locale(&self, code: String) {
        match &self.translator {
            Some(translator) => {
                translator.set_locale(&code);
                self.locale_retry.schedule(Arc::clone(translator), code);
            }
            None => tracing::warn!(locale = %code, "locale switch requested without a translator"),
        }
    }

    /// The stop request must be issued before termination proceeds, so the
    /// signaling service never outlives the process.
    fn quit(&self) {
        self.signaling.stop();
        if let Some(grace) = self.quit.grace {
            if !self.signaling.wait_stopped(grace) {
                tracing::warn!("quitting with the signaling service still winding down");
            }
        }
        self.lifecycle.quit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::menu::NativeRole;
    use std::sync::Mutex;

    /// Shared call log; every double appends the name of what was invoked.
    type CallLog = Arc<Mutex<Vec<String>>>;

    struct LogWindow(CallLog);

    impl MainWindow for LogWindow {
        fn request_close(&self) {
            self.0.lock().unwrap().push("request_close".into());
        }
        fn toggle_full_screen(&self) {
            self.0.lock().unwrap().push("toggle_full_screen".into());
        }
        fn is_full_screen(&self) -> bool {
            false
        }
        fn reload(&self) {
            self.0.lock().unwrap().push("reload".into());
        }
        fn toggle_developer_tools(&self) {
            self.0.lock().unwrap().push("toggle_developer_tools".into());
        }
        fn inspect_element_at(&self, x: i32, y: i32) {
            self.0.lock().unwrap().push(format!("inspect:{x},{y}"));
        }
        fn on_context_menu_requested(&self, _handler: Box<dyn Fn(i32, i32)>) {}
    }

    struct LogOpener(CallLog);

    impl LinkOpener for LogOpener {
        fn open(&self, url: &str) {
            self.0.lock().unwrap().push(format!("open:{url}"));
        }
    }

    struct LogSignaling(CallLog);

    impl SignalingService for LogSignaling {
        fn stop(&self) {
            self.0.lock().unwrap().push("stop".into());
        }
        fn wait_stopped(&self, _timeout: Duration) -> bool {
            self.0.lock().unwrap().push("wait_stopped".into());
            true
        }
    }

    struct LogLifecycle(CallLog);

    impl AppLifecycle for LogLifecycle {
        fn quit(&self) {
            self.0.lock().unwrap().push("quit".into());
        }
    }

    /// Translator whose first switch does not take effect, mimicking the
    /// macOS first-switch hiccup.
    struct FlakyTranslator {
        current: Mutex<String>,
        set_calls: Mutex<Vec<String>>,
        ignore_first: Mutex<bool>,
    }

    impl FlakyTranslator {
        fn new(initial: &str) -> Self {
            Self {
                current: Mutex::new(initial.to_string()),
                set_calls: Mutex::new(Vec::new()),
                ignore_first: Mutex::new(true),
            }
        }
    }

    impl Translator for FlakyTranslator {
        fn translate(&self, key: &str) -> String {
            key.to_string()
        }
        fn current_locale(&self) -> String {
            self.current.lock().unwrap().clone()
        }
        fn set_locale(&self, code: &str) {
            self.set_calls.lock().unwrap().push(code.to_string());
            let mut ignore_first = self.ignore_first.lock().unwrap();
            if *ignore_first {
                *ignore_first = false;
            } else {
                *self.current.lock().unwrap() = code.to_string();
            }
        }
        fn supported_locales(&self) -> Vec<String> {
            vec!["en".into(), "de".into()]
        }
    }

    fn dispatcher(
        log: &CallLog,
        translator: Option<Arc<dyn Translator>>,
        retry: LocaleRetry,
        quit: QuitConfig,
    ) -> ActionDispatcher {
        ActionDispatcher::new(
            Arc::new(LogWindow(Arc::clone(log))),
            Arc::new(LogOpener(Arc::clone(log))),
            Arc::new(LogSignaling(Arc::clone(log))),
            Arc::new(LogLifecycle(Arc::clone(log))),
            translator,
            retry,
            quit,
        )
    }

    fn log() -> CallLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test]
    async fn quit_stops_signaling_before_terminating() {
        let calls = log();
        let d = dispatcher(
            &calls,
            None,
            LocaleRetry::new(tokio::runtime::Handle::current()),
            QuitConfig { grace: None },
        );

        d.dispatch(MenuAction::Quit);

        assert_eq!(*calls.lock().unwrap(), vec!["stop", "quit"]);
    }

    #[tokio::test]
    async fn quit_with_grace_waits_between_stop_and_terminate() {
        let calls = log();
        let d = dispatcher(
            &calls,
            None,
            LocaleRetry::new(tokio::runtime::Handle::current()),
            QuitConfig {
                grace: Some(Duration::from_millis(100)),
            },
        );

        d.dispatch(MenuAction::Quit);

        assert_eq!(*calls.lock().unwrap(), vec!["stop", "wait_stopped", "quit"]);
    }

    #[tokio::test]
    async fn window_primitives_route_to_the_window() {
        let calls = log();
        let d = dispatcher(
            &calls,
            None,
            LocaleRetry::new(tokio::runtime::Handle::current()),
            QuitConfig { grace: None },
        );

        d.dispatch(MenuAction::Reload);
        d.dispatch(MenuAction::ToggleFullScreen);
        d.dispatch(MenuAction::ToggleDevTools);
        d.dispatch(MenuAction::InspectElement { x: 120, y: 340 });

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "reload",
                "toggle_full_screen",
                "toggle_developer_tools",
                "inspect:120,340"
            ]
        );
    }

    #[tokio::test]
    async fn external_links_route_to_the_opener_and_native_roles_do_nothing() {
        let calls = log();
        let d = dispatcher(
            &calls,
            None,
            LocaleRetry::new(tokio::runtime::Handle::current()),
            QuitConfig { grace: None },
        );

        d.dispatch(MenuAction::Native(NativeRole::Copy));
        d.dispatch(MenuAction::OpenExternal("https://screenlink.app/".into()));

        assert_eq!(*calls.lock().unwrap(), vec!["open:https://screenlink.app/"]);
    }

    #[tokio::test]
    async fn locale_switch_is_repeated_once_when_it_does_not_stick() {
        let translator = Arc::new(FlakyTranslator::new("en"));
        let calls = log();
        let retry = LocaleRetry::with_delay(
            tokio::runtime::Handle::current(),
            Duration::from_millis(10),
        );
        let d = dispatcher(
            &calls,
            Some(translator.clone() as Arc<dyn Translator>),
            retry,
            QuitConfig { grace: None },
        );

        d.dispatch(MenuAction::SetLocale("de".into()));
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(*translator.set_calls.lock().unwrap(), vec!["de", "de"]);
        assert_eq!(translator.current_locale(), "de");
    }

    #[tokio::test]
    async fn successful_locale_switch_is_not_repeated() {
        let translator = Arc::new(FlakyTranslator::new("en"));
        *translator.ignore_first.lock().unwrap() = false;
        let calls = log();
        let retry = LocaleRetry::with_delay(
            tokio::runtime::Handle::current(),
            Duration::from_millis(10),
        );
        let d = dispatcher(
            &calls,
            Some(translator.clone() as Arc<dyn Translator>),
            retry,
            QuitConfig { grace: None },
        );

        d.dispatch(MenuAction::SetLocale("de".into()));
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(*translator.set_calls.lock().unwrap(), vec!["de"]);
    }

    #[tokio::test]
    async fn cancelled_retry_never_fires() {
        let translator = Arc::new(FlakyTranslator::new("en"));
        let calls = log();
        let retry = LocaleRetry::with_delay(
            tokio::runtime::Handle::current(),
            Duration::from_millis(30),
        );
        let d = dispatcher(
            &calls,
            Some(translator.clone() as Arc<dyn Translator>),
            retry.clone(),
            QuitConfig { grace: None },
        );

        d.dispatch(MenuAction::SetLocale("de".into()));
        retry.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;

        // The stuck first switch is left alone once the window is gone.
        assert_eq!(*translator.set_calls.lock().unwrap(), vec!["de"]);
        assert_eq!(translator.current_locale(), "en");
    }

    #[tokio::test]
    async fn locale_switch_without_translator_is_ignored() {
        let calls = log();
        let d = dispatcher(
            &calls,
            None,
            LocaleRetry::new(tokio::runtime::Handle::current()),
            QuitConfig { grace: None },
        );

        d.dispatch(MenuAction::SetLocale("de".into()));

        assert!(calls.lock().unwrap().is_empty());
    }
}
