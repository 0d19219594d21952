use tauri::{webview::PageLoadEvent, AppHandle, Manager, RunEvent, WindowEvent};

use crate::{
    append_desktop_log, append_startup_log, context_menu, desktop_bridge, main_window,
    platform::Platform, runtime_paths, shell_config::ShellConfig, splash_window, tray_setup,
    update_flow,
    update_lifecycle::{CheckOrigin, UpdatePolicy},
    window_actions,
    ShellState, UpdateState, DESKTOP_LOG_FILE, MAIN_WINDOW_LABEL, SPLASH_WINDOW_LABEL,
};

fn log_startup_environment(config: &ShellConfig, platform: Platform) {
    append_startup_log(&format!(
        "desktop log path: {}",
        crate::logging::resolve_desktop_log_path(runtime_paths::default_root_dir(), DESKTOP_LOG_FILE)
            .display()
    ));
    append_startup_log(&format!(
        "platform={platform:?} app_url={} app_host={} splash_delay_ms={}",
        config.app_url,
        config.app_host().unwrap_or("<none>"),
        config.splash_delay.as_millis()
    ));
    append_startup_log(&format!(
        "auto_install_on_download={} check_updates_on_startup={}",
        config.auto_install_on_download, config.check_updates_on_startup
    ));
    match std::env::current_exe() {
        Ok(path) => append_startup_log(&format!("executable: {}", path.display())),
        Err(error) => append_startup_log(&format!("failed to resolve executable path: {error}")),
    }
}

/// Runs after the splash delay: main window, tray, then the silent update check.
fn spawn_startup_task(app_handle: AppHandle) {
    tauri::async_runtime::spawn(async move {
        let state = app_handle.state::<ShellState>();
        let splash_delay = state.config.splash_delay;
        tokio::time::sleep(splash_delay).await;

        if let Err(error) = main_window::create_main_window(&app_handle) {
            append_startup_log(&format!("failed to create main window: {error}"));
            splash_window::close_splash(&app_handle, append_startup_log);
        }
        if let Err(error) = tray_setup::setup_tray(&app_handle) {
            append_startup_log(&format!("failed to initialize tray: {error}"));
        }

        if state.config.check_updates_on_startup {
            update_flow::spawn_update_check(&app_handle, CheckOrigin::Automatic);
        } else {
            append_startup_log("startup update check disabled");
        }
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitDecision {
    AllowExplicitExit,
    QuitAfterLastWindow,
    KeepRunning,
}

fn decide_exit(code: Option<i32>, platform: Platform) -> ExitDecision {
    // `None` means the last window closed; explicit exits carry a code.
    if code.is_some() {
        return ExitDecision::AllowExplicitExit;
    }
    if platform.quits_when_all_windows_closed() {
        ExitDecision::QuitAfterLastWindow
    } else {
        ExitDecision::KeepRunning
    }
}

fn handle_exit_requested(code: Option<i32>, api: &tauri::ExitRequestApi) {
    match decide_exit(code, Platform::current()) {
        ExitDecision::AllowExplicitExit => {}
        ExitDecision::QuitAfterLastWindow => append_desktop_log("all windows closed, quitting"),
        ExitDecision::KeepRunning => {
            api.prevent_exit();
            append_desktop_log("all windows closed, staying alive in the tray");
        }
    }
}

pub(crate) fn run() {
    let root_dir = runtime_paths::default_root_dir();
    let config = ShellConfig::load(root_dir.as_deref());
    let platform = Platform::current();

    append_startup_log("desktop process starting");
    if config.verbose_startup_logging {
        log_startup_environment(&config, platform);
    }

    let update_policy = UpdatePolicy {
        auto_install_on_download: config.auto_install_on_download,
    };

    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            append_desktop_log("second instance launched, activating main window");
            window_actions::show_or_recreate_main_window(app, append_desktop_log);
        }))
        .plugin(tauri_plugin_updater::Builder::new().build())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_notification::init())
        .manage(ShellState::new(config))
        .manage(UpdateState::new(
            update_policy,
            env!("CARGO_PKG_VERSION").to_string(),
        ))
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::desktop_bridge_show_context_menu,
            crate::desktop_bridge_commands::desktop_bridge_open_external_url,
        ])
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event {
                match window.label() {
                    MAIN_WINDOW_LABEL => main_window::handle_main_window_destroyed(window.app_handle()),
                    SPLASH_WINDOW_LABEL => append_desktop_log("splash window destroyed"),
                    _ => {}
                }
            }
        })
        .on_page_load(|webview, payload| {
            if !matches!(payload.event(), PageLoadEvent::Finished) {
                return;
            }
            if webview.label() != MAIN_WINDOW_LABEL {
                return;
            }

            append_desktop_log(&format!("page-load finished: {}", payload.url()));
            let app_handle = webview.app_handle();
            let app_url = app_handle.state::<ShellState>().config.app_url.clone();
            if desktop_bridge::should_inject_desktop_bridge(&app_url, payload.url()) {
                desktop_bridge::inject_desktop_bridge(webview);
            }
            main_window::handle_page_loaded(app_handle, payload.url());
        })
        .on_menu_event(|app, event| {
            context_menu::handle_context_menu_event(app, event.id().as_ref())
        })
        .setup(|app| {
            let app_handle = app.handle().clone();
            append_startup_log(&format!(
                "package version {}",
                app_handle.package_info().version
            ));
            splash_window::show_splash(&app_handle, append_startup_log);
            spawn_startup_task(app_handle);
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::ExitRequested { code, api, .. } => {
                handle_exit_requested(code, &api);
            }
            #[cfg(target_os = "macos")]
            RunEvent::Reopen { .. } => {
                window_actions::show_or_recreate_main_window(app_handle, append_desktop_log);
            }
            RunEvent::Exit => {
                append_desktop_log("desktop process exiting");
                update_flow::install_pending_update_on_exit(app_handle);
            }
            _ => {}
        });
}
