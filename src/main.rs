#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::rc::Rc;
use std::sync::{Arc, Mutex};

use tao::{
    event::{Event, StartCause, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder},
    window::WindowBuilder,
};
use wry::WebViewBuilder;

use screenlink::app::{
    self,
    dispatch::{ActionDispatcher, LocaleRetry, QuitConfig},
    events::UserEvent,
    i18n::Translator,
    lifecycle::ProxyLifecycle,
    menu::{BuildContext, MenuAction, MenuBuilder, APP_NAME},
    native_menu::NativeMenuInstaller,
    shell::SystemLinkOpener,
    window::{MainWindow, TaoMainWindow},
};
use screenlink::config;
use screenlink::core::SignalingServer;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app_config = config::AppConfig::load().unwrap_or_default();
    let build_ctx = BuildContext::detect(&app_config);
    tracing::info!(?build_ctx, "starting {}", APP_NAME);

    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();

    let (width, height) = app_config.window_size;
    let (pos_x, pos_y) = app_config.window_position;
    let window = WindowBuilder::new()
        .with_title(APP_NAME)
        .with_inner_size(tao::dpi::LogicalSize::new(width, height))
        .with_position(tao::dpi::LogicalPosition::new(pos_x, pos_y))
        .with_min_inner_size(tao::dpi::LogicalSize::new(900, 560))
        .build(&event_loop)
        .expect("Failed to build Window");
    let window = Arc::new(window);

    let proxy = event_loop.create_proxy();

    let ipc_proxy = proxy.clone();
    let ipc_handler = move |message: String| {
        app::handle_ipc_message(message, ipc_proxy.clone());
    };

    let webview = WebViewBuilder::new(&*window)
        .with_html(include_str!("ui/index.html"))
        .with_devtools(build_ctx.dev_tools_enabled())
        .with_ipc_handler(ipc_handler)
        .build()
        .expect("Failed to build WebView");
    let webview = Rc::new(webview);

    let main_window = Arc::new(TaoMainWindow::new(
        window.clone(),
        webview,
        proxy.clone(),
    ));

    let signaling = Arc::new(
        SignalingServer::bind(app_config.signaling_port)
            .await
            .expect("Failed to start signaling service"),
    );

    let installer = Arc::new(NativeMenuInstaller::new(window.clone()));

    // Forward native menu activations into the event loop.
    let actions = installer.action_map();
    let menu_proxy = proxy.clone();
    std::thread::spawn(move || {
        let receiver = muda::MenuEvent::receiver();
        while let Ok(event) = receiver.recv() {
            let action = actions
                .lock()
                .expect("Mutex was poisoned. This should not happen.")
                .get(&event.id)
                .cloned();
            match action {
                Some(action) => {
                    let _ = menu_proxy.send_event(UserEvent::MenuActivated(action));
                }
                None => tracing::debug!("menu event for unregistered entry: {:?}", event.id),
            }
        }
    });

    // The translation service ships disabled; without it the Language menu
    // is omitted entirely.
    let translator: Option<Arc<dyn Translator>> = None;

    let menu_builder = MenuBuilder::new(
        main_window.clone(),
        installer.clone(),
        translator.clone(),
    );
    menu_builder.build_menu(&build_ctx);

    let locale_retry = LocaleRetry::new(tokio::runtime::Handle::current());
    let dispatcher = ActionDispatcher::new(
        main_window.clone(),
        Arc::new(SystemLinkOpener),
        signaling,
        Arc::new(ProxyLifecycle::new(proxy.clone())),
        translator,
        locale_retry.clone(),
        QuitConfig::from_config(&app_config),
    );

    let config_state = Arc::new(Mutex::new(app_config));

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::NewEvents(StartCause::Init) => {
                tracing::info!("Application initialized.");
            }
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    // Funnel the OS close button through the same path as
                    // the frontend's close request.
                    main_window.request_close();
                }
                WindowEvent::Resized(size) => {
                    let mut config = config_state.lock().unwrap();
                    config.window_size = (size.width.into(), size.height.into());
                }
                WindowEvent::Moved(position) => {
                    let mut config = config_state.lock().unwrap();
                    config.window_position = (position.x.into(), position.y.into());
                }
                _ => (),
            },
            Event::UserEvent(user_event) => match user_event {
                UserEvent::MenuActivated(action) => dispatcher.dispatch(action),
                UserEvent::ContextMenuRequested { x, y } => main_window.emit_context_menu(x, y),
                UserEvent::CloseRequested => dispatcher.dispatch(MenuAction::Quit),
                UserEvent::Quit => {
                    tracing::info!("Shutting down. Saving final window state...");
                    let config = config_state.lock().unwrap();
                    if let Err(e) = config::settings::save_config(&config, None) {
                        tracing::error!("Failed to save config on exit: {}", e);
                    }
                    locale_retry.cancel();
                    *control_flow = ControlFlow::Exit;
                }
            },
            _ => (),
        }
    });
}
