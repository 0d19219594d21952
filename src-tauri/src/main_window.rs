use std::time::Duration;

use tauri::{webview::NewWindowResponse, AppHandle, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use url::Url;

use crate::{
    append_desktop_log, connectivity, external_links, icon_assets, platform::Platform,
    runtime_paths, splash_window, ShellState, APP_NAME, MAIN_WINDOW_LABEL, REVEAL_WATCHDOG_SECS,
};

const BLANK_PAGE: &str = "about:blank";

/// URL of a page bundled into the app's frontend dist.
pub fn bundled_page_url(page: &str) -> Result<Url, String> {
    let origin = if cfg!(any(target_os = "windows", target_os = "android")) {
        "http://tauri.localhost/"
    } else {
        "tauri://localhost/"
    };
    Url::parse(origin)
        .and_then(|base| base.join(page))
        .map_err(|error| format!("Failed to build bundled page url for {page}: {error}"))
}

/// True when `page_url` is `page` served from the app's own bundle.
pub fn is_bundled_page(page_url: &Url, page: &str) -> bool {
    let bundled_origin = matches!(
        (page_url.scheme(), page_url.host_str()),
        ("tauri", Some("localhost")) | ("http" | "https", Some("tauri.localhost"))
    );
    bundled_origin && page_url.path().trim_start_matches('/') == page
}

pub fn window_icon_asset(platform: Platform) -> &'static str {
    platform.icon_asset()
}

/// The ready signal: any finished page except the blank placeholder the
/// window is created on. Redirects to other hosts (sign-in pages) count.
pub fn is_ready_page(page_url: &Url) -> bool {
    page_url.scheme() != "about"
}

fn redirect_new_window_request(url: &Url) {
    match external_links::open_external(url.as_str()) {
        Ok(()) => append_desktop_log(&format!("opened {url} in the default browser")),
        Err(error) => append_desktop_log(&format!("refused to open {url} externally: {error}")),
    }
}

/// Creates the main window unless one is already live, then starts loading content.
pub fn create_main_window(app_handle: &AppHandle) -> Result<WebviewWindow, String> {
    let state = app_handle.state::<ShellState>();
    if let Some(window) = state.current_main_window() {
        return Ok(window);
    }

    let blank = Url::parse(BLANK_PAGE)
        .map_err(|error| format!("Failed to parse placeholder url: {error}"))?;
    let mut builder = WebviewWindowBuilder::new(
        app_handle,
        MAIN_WINDOW_LABEL,
        WebviewUrl::External(blank),
    )
    .title(APP_NAME)
    .inner_size(1200.0, 800.0)
    .visible(false)
    .on_new_window(|url, _features| {
        redirect_new_window_request(&url);
        NewWindowResponse::Deny
    });

    let icon_asset = window_icon_asset(Platform::current());
    match runtime_paths::resolve_resource_path(app_handle, icon_asset)
        .ok_or_else(|| format!("Window icon {icon_asset} is not bundled"))
        .and_then(|path| icon_assets::load_icon_image(&path, None))
    {
        Ok(icon) => {
            builder = builder
                .icon(icon)
                .map_err(|error| format!("Failed to set main window icon: {error}"))?;
        }
        Err(error) => append_desktop_log(&format!("using default window icon: {error}")),
    }

    let window = builder
        .build()
        .map_err(|error| format!("Failed to create main window: {error}"))?;
    let generation = state.set_main_window(window.clone());
    spawn_reveal_watchdog(app_handle.clone(), generation);
    connectivity::spawn_app_content_load(window.clone(), state.config.app_url.clone());
    Ok(window)
}

fn reveal_main_window(app_handle: &AppHandle) {
    splash_window::close_splash(app_handle, append_desktop_log);
    show_main_window(app_handle, append_desktop_log);
}

/// Shows the window anyway when no page finishes loading in time.
fn spawn_reveal_watchdog(app_handle: AppHandle, generation: u64) {
    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(Duration::from_secs(REVEAL_WATCHDOG_SECS)).await;
        if !app_handle
            .state::<ShellState>()
            .claim_overdue_reveal(generation)
        {
            return;
        }
        append_desktop_log(&format!(
            "no page finished loading within {REVEAL_WATCHDOG_SECS}s, revealing main window"
        ));
        reveal_main_window(&app_handle);
    });
}

pub fn show_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = app_handle.state::<ShellState>().current_main_window() else {
        log("show_main_window skipped: main window not found");
        return;
    };

    if let Err(error) = window.unminimize() {
        log(&format!("failed to unminimize main window: {error}"));
    }
    if let Err(error) = window.show() {
        log(&format!("failed to show main window: {error}"));
    }
    if let Err(error) = window.set_focus() {
        log(&format!("failed to focus main window: {error}"));
    }
}

/// The main window's ready transition: closes the splash and reveals the window.
pub fn handle_page_loaded(app_handle: &AppHandle, page_url: &Url) {
    if !is_ready_page(page_url) {
        return;
    }
    let state = app_handle.state::<ShellState>();
    state.content_finished.notify_waiters();
    if !state.mark_main_window_revealed() {
        return;
    }

    append_desktop_log(&format!("main window ready: {page_url}"));
    reveal_main_window(app_handle);
}

pub fn handle_main_window_destroyed(app_handle: &AppHandle) {
    if app_handle.state::<ShellState>().clear_main_window() {
        append_desktop_log("main window closed, handle released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        platform::{GENERIC_ICON_ASSET, MACOS_ICON_ASSET, WINDOWS_ICON_ASSET},
        FALLBACK_PAGE,
    };

    fn url(raw: &str) -> Url {
        Url::parse(raw).expect("valid url")
    }

    #[test]
    fn window_icon_follows_platform_family() {
        assert_eq!(window_icon_asset(Platform::from_os_name("darwin")), MACOS_ICON_ASSET);
        assert_eq!(window_icon_asset(Platform::from_os_name("win32")), WINDOWS_ICON_ASSET);
        assert_eq!(window_icon_asset(Platform::from_os_name("linux")), GENERIC_ICON_ASSET);
    }

    #[test]
    fn bundled_page_url_points_at_app_origin() {
        let offline = bundled_page_url(FALLBACK_PAGE).expect("url");
        assert!(offline.path().ends_with("/offline.html"));
        assert!(matches!(offline.scheme(), "tauri" | "http"));
    }

    #[test]
    fn is_bundled_page_requires_bundle_origin() {
        assert!(is_bundled_page(&url("tauri://localhost/offline.html"), FALLBACK_PAGE));
        assert!(is_bundled_page(&url("http://tauri.localhost/offline.html"), FALLBACK_PAGE));
        assert!(!is_bundled_page(&url("https://evil.example.com/offline.html"), FALLBACK_PAGE));
        assert!(!is_bundled_page(&url("tauri://localhost/splash.html"), FALLBACK_PAGE));
    }

    #[test]
    fn ready_page_includes_app_offline_and_redirect_targets() {
        assert!(is_ready_page(&url("https://app.brandbay.io/dashboard")));
        assert!(is_ready_page(&url("tauri://localhost/offline.html")));
        assert!(is_ready_page(&url("https://login.brandbay.io/authorize")));
        assert!(is_ready_page(&url("https://accounts.google.com/o/oauth2/auth")));
    }

    #[test]
    fn ready_page_excludes_blank_placeholder() {
        assert!(!is_ready_page(&url(BLANK_PAGE)));
    }
}
